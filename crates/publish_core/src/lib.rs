//! Publish core: pure job-tracking state machine, reconciler and view-model helpers.
mod effect;
mod msg;
mod reconcile;
mod schedule;
mod snapshot;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use reconcile::{
    effective_status, heading, long_running_hint, platform_badge, platform_warning,
    result_summary, status_icon, tone, EffectiveStatus, LONG_RUNNING_NOTE, WARNING_PLATFORM,
};
pub use schedule::{BackoffPolicy, PollSchedule};
pub use snapshot::{JobResult, JobSnapshot, JobStatus, PlatformResult, PlatformStatus, ResultStatus};
pub use state::{TrackerPhase, TrackerState};
pub use update::update;
pub use view_model::{
    PlatformRow, PlatformWarning, ProgressBar, ProgressViewModel, ResultPanel, StatusIcon, Tone,
};
