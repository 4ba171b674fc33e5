#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Refresh,
    TogglePause,
    MoreProcesses,
    FewerProcesses,
    ToggleHelp,
    None,
}
