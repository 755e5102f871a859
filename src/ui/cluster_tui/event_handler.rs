/// Events that can occur in the cluster TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Quit the application
    Quit,
    /// Toggle help overlay
    ToggleHelp,
    /// Switch between the list and topology views
    SwitchView,
    /// Select the next node
    NodeDown,
    /// Select the previous node
    NodeUp,
    /// Drop the current selection
    ClearSelection,
    /// Ask for an immediate refresh
    Refresh,
    /// No action
    None,
}

/// Side effects the event loop has to perform after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorCommand {
    ForceRefresh,
    Nothing,
}
