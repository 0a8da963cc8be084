use std::time::Duration;

use crate::JobSnapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Issue one status request for the job.
    FetchStatus { job_id: String },
    /// Arm the timer for the next poll.
    SchedulePoll { job_id: String, delay: Duration },
    /// Drop any outstanding request or timer for the job.
    CancelPolling { job_id: String },
    /// The job reached a terminal status; fired once per tracked job.
    NotifyComplete(JobSnapshot),
    /// The caller may tear the view down.
    NotifyClosed,
}
