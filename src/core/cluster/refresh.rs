//! Shared, debounced refresh cadence.
//!
//! A single task owns the interval timer. Manual triggers arrive over a
//! bounded queue and arm a settling deadline; once the deadline passes
//! without a newer trigger, the interval is restarted and ticks
//! immediately. Start-up counts as a trigger. Ticks are fanned out to any
//! number of subscribers through a broadcast channel.

use std::future::pending;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep_until, Instant, Interval, MissedTickBehavior};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(10_000);
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

const TRIGGER_QUEUE_SIZE: usize = 16;
const TICK_CHANNEL_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshConfig {
    pub interval: Duration,
    pub debounce: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REFRESH_INTERVAL,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// One emission of the refresh signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTick {
    /// Monotonic tick counter, starting at 1
    pub seq: u64,
    /// Number of interval (re)starts so far, starting at 1
    pub epoch: u64,
}

/// Cloneable handle to request a refresh, usable from any thread.
#[derive(Debug, Clone)]
pub struct RefreshTrigger {
    tx: mpsc::Sender<()>,
}

impl RefreshTrigger {
    pub fn fire(&self) {
        // A full queue already holds a pending trigger, which is enough
        if let Err(mpsc::error::TrySendError::Closed(_)) = self.tx.try_send(()) {
            log::debug!("Refresh coordinator is gone, trigger dropped");
        }
    }
}

pub struct RefreshCoordinator {
    tick_tx: broadcast::Sender<RefreshTick>,
    trigger: RefreshTrigger,
    shutdown_tx: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

impl RefreshCoordinator {
    /// Spawn the coordinator task. Must be called from within a Tokio runtime.
    pub fn start(config: RefreshConfig) -> Self {
        let (tick_tx, _) = broadcast::channel(TICK_CHANNEL_SIZE);
        let (force_tx, force_rx) = mpsc::channel(TRIGGER_QUEUE_SIZE);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let task = tokio::spawn(coordinator_task(
            config,
            force_rx,
            tick_tx.clone(),
            shutdown_rx,
        ));

        Self {
            tick_tx,
            trigger: RefreshTrigger { tx: force_tx },
            shutdown_tx,
            task,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RefreshTick> {
        self.tick_tx.subscribe()
    }

    pub fn force_refresh(&self) {
        self.trigger.fire();
    }

    pub fn trigger(&self) -> RefreshTrigger {
        self.trigger.clone()
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

async fn settle(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}

async fn next_tick(ticker: &mut Option<Interval>) -> Instant {
    match ticker {
        Some(ticker) => ticker.tick().await,
        None => pending().await,
    }
}

async fn coordinator_task(
    config: RefreshConfig,
    mut force_rx: mpsc::Receiver<()>,
    tick_tx: broadcast::Sender<RefreshTick>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut settle_deadline = Some(Instant::now() + config.debounce);
    let mut ticker: Option<Interval> = None;
    let mut epoch = 0u64;
    let mut seq = 0u64;

    loop {
        tokio::select! {
            trigger = force_rx.recv() => {
                if trigger.is_none() {
                    break;
                }
                // Re-arming restarts the settling window
                settle_deadline = Some(Instant::now() + config.debounce);
                log::trace!("Refresh trigger received, settling");
            }
            _ = settle(settle_deadline) => {
                settle_deadline = None;
                epoch += 1;
                let mut restarted = interval(config.interval);
                restarted.set_missed_tick_behavior(MissedTickBehavior::Skip);
                ticker = Some(restarted);
                log::debug!("Refresh interval (re)started, epoch {}", epoch);
            }
            _ = next_tick(&mut ticker) => {
                seq += 1;
                // send() only fails when nobody is subscribed yet
                let _ = tick_tx.send(RefreshTick { seq, epoch });
                log::trace!("Refresh tick {} (epoch {})", seq, epoch);
            }
            _ = shutdown.recv() => {
                log::debug!("Refresh coordinator shutting down");
                break;
            }
        }
    }
}
