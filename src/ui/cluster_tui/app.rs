use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::core::cluster::{
    reconcile, ClusterRuntime, ClusterSnapshot, ClusterSource, ClassifiedNode, HttpClusterSource,
    OutletMapping, PowerSummary, TopologyState,
};
use crate::core::Config;

use super::event_handler::{MonitorCommand, MonitorEvent};
use super::render::render_ui;

const EVENT_POLL_TIMEOUT: Duration = Duration::from_millis(250);

/// Sub-tabs of the main panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    List,
    Topology,
}

impl View {
    pub fn title(self) -> &'static str {
        match self {
            View::List => "List",
            View::Topology => "Topology",
        }
    }

    fn toggle(self) -> Self {
        match self {
            View::List => View::Topology,
            View::Topology => View::List,
        }
    }
}

/// Cluster monitor application state
pub struct ClusterApp {
    pub snapshot: Arc<ClusterSnapshot>,
    pub topology: TopologyState,
    pub mapping: OutletMapping,
    pub view: View,
    pub should_quit: bool,
    pub show_help: bool,
    pub interval_ms: u64,
    /// Node generation the topology was last reconciled against
    nodes_generation: u64,
}

impl ClusterApp {
    pub fn new(config: ClusterAppConfig) -> Self {
        Self {
            snapshot: Arc::new(ClusterSnapshot::default()),
            topology: TopologyState::default(),
            mapping: config.mapping,
            view: View::List,
            should_quit: false,
            show_help: false,
            interval_ms: config.interval_ms,
            nodes_generation: 0,
        }
    }

    /// Take in a new snapshot, reconciling the topology when the node
    /// inventory changed.
    pub fn apply_snapshot(&mut self, snapshot: Arc<ClusterSnapshot>) {
        if snapshot.nodes_status.generation != self.nodes_generation {
            let previous = std::mem::take(&mut self.topology);
            self.topology = reconcile(previous, snapshot.nodes.clone());
            self.nodes_generation = snapshot.nodes_status.generation;
        }
        self.snapshot = snapshot;
    }

    pub fn selected_node(&self) -> Option<&ClassifiedNode> {
        self.topology.selected_node()
    }

    pub fn selected_power(&self) -> Option<PowerSummary> {
        self.topology
            .selected_power(&self.mapping, &self.snapshot.readings)
    }

    /// Text of the PDU line in the details panel
    pub fn power_label(&self) -> String {
        match self.selected_power() {
            Some(summary) => summary.to_string(),
            None => "No PDU data".to_string(),
        }
    }

    /// Handle keyboard events
    pub fn handle_event(&mut self, event: MonitorEvent) -> MonitorCommand {
        match event {
            MonitorEvent::Quit => self.should_quit = true,
            MonitorEvent::ToggleHelp => self.show_help = !self.show_help,
            MonitorEvent::SwitchView => {
                self.view = self.view.toggle();
                self.topology.clear_selection();
            }
            MonitorEvent::NodeDown => self.topology.select_next(),
            MonitorEvent::NodeUp => self.topology.select_previous(),
            MonitorEvent::ClearSelection => self.topology.clear_selection(),
            MonitorEvent::Refresh => return MonitorCommand::ForceRefresh,
            MonitorEvent::None => {}
        }
        MonitorCommand::Nothing
    }
}

/// Configuration for the cluster app
#[derive(Debug, Clone, Default)]
pub struct ClusterAppConfig {
    pub interval_ms: u64,
    pub mapping: OutletMapping,
}

impl ClusterAppConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval_ms: config.refresh_interval_ms,
            mapping: config.outlet_mapping(),
        }
    }
}

fn map_key(code: KeyCode, show_help: bool) -> MonitorEvent {
    if show_help {
        // Any key closes the help overlay
        return MonitorEvent::ToggleHelp;
    }
    match code {
        KeyCode::Char('q') => MonitorEvent::Quit,
        KeyCode::Char('?') | KeyCode::Char('h') => MonitorEvent::ToggleHelp,
        KeyCode::Tab | KeyCode::BackTab => MonitorEvent::SwitchView,
        KeyCode::Up | KeyCode::Char('k') => MonitorEvent::NodeUp,
        KeyCode::Down | KeyCode::Char('j') => MonitorEvent::NodeDown,
        KeyCode::Esc => MonitorEvent::ClearSelection,
        KeyCode::Char('r') => MonitorEvent::Refresh,
        _ => MonitorEvent::None,
    }
}

/// Run the cluster monitor TUI application
pub fn run_cluster_app(config: &Config) -> Result<()> {
    let source: Arc<dyn ClusterSource> = Arc::new(
        HttpClusterSource::new(
            &config.resource_manager_url,
            &config.power_url,
            config.request_timeout(),
        )
        .context("Failed to create HTTP client")?,
    );
    let runtime =
        ClusterRuntime::new(source, config.refresh()).context("Failed to start pollers")?;
    let mut snapshot_rx = runtime.snapshot_rx.clone();

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = ClusterApp::new(ClusterAppConfig::from_config(config));

    let result = (|| -> Result<()> {
        loop {
            terminal.draw(|frame| render_ui(frame, &app))?;

            if event::poll(EVENT_POLL_TIMEOUT).context("Event poll failed")? {
                if let Event::Key(key) = event::read().context("Event read failed")? {
                    if key.kind == KeyEventKind::Press {
                        let monitor_event = map_key(key.code, app.show_help);
                        if app.handle_event(monitor_event) == MonitorCommand::ForceRefresh {
                            runtime.force_refresh();
                        }
                    }
                }
            }

            if app.should_quit {
                return Ok(());
            }

            // Apply the newest snapshot, if any arrived since the last frame
            if snapshot_rx.has_changed().unwrap_or(false) {
                let snapshot = snapshot_rx.borrow_and_update().clone();
                app.apply_snapshot(snapshot);
            }
        }
    })();

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    runtime.shutdown();
    result
}
