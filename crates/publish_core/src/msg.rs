use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Caller wants a job tracked. Empty ids are ignored.
    Start(String),
    /// The inter-poll timer elapsed.
    PollDue,
    /// A status response arrived and decoded cleanly.
    StatusReceived {
        snapshot: crate::JobSnapshot,
        /// Wall time since the first poll of this job.
        elapsed: Duration,
    },
    /// The status request failed (transport, non-2xx or malformed body).
    PollFailed { reason: String },
    /// User asked to dismiss the progress view.
    CloseRequested,
    /// Caller tore down the view.
    Dispose,
    /// Fallback for placeholder wiring.
    NoOp,
}
