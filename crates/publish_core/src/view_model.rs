use crate::TrackerPhase;

/// Color class for the status icon and progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Red,
    Yellow,
    Green,
    Blue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    Error,
    Warning,
    Success,
    Spinner,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressViewModel {
    pub phase: TrackerPhase,
    /// False when no job is tracked; nothing should be drawn.
    pub visible: bool,
    pub icon: StatusIcon,
    pub tone: Tone,
    pub heading: &'static str,
    /// Present only while a snapshot exists and the job is not terminal.
    pub progress: Option<ProgressBar>,
    pub message: String,
    pub platforms: Vec<PlatformRow>,
    pub error: Option<String>,
    pub result: Option<ResultPanel>,
    pub can_close: bool,
    pub hint: Option<&'static str>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressBar {
    pub percent: u8,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformRow {
    pub name: String,
    pub status: String,
    pub badge: Option<StatusIcon>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPanel {
    pub summary: String,
    pub warning: Option<PlatformWarning>,
}

/// A platform-specific note shown apart from the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformWarning {
    pub platform: String,
    pub text: String,
}
