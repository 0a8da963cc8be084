use std::time::Duration;

use crate::reconcile::{
    effective_status, heading, long_running_hint, platform_badge, platform_warning,
    result_summary, status_icon, tone,
};
use crate::view_model::{PlatformRow, ProgressBar, ProgressViewModel, ResultPanel};
use crate::{JobSnapshot, PollSchedule};

const INITIAL_MESSAGE: &str = "Initializing...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackerPhase {
    /// No job id set.
    #[default]
    Idle,
    Polling,
    Completed,
    Failed,
    TimedOut,
    NetworkError,
    /// Torn down by the caller; accepts nothing further.
    Disposed,
}

impl TrackerPhase {
    /// Polling has stopped because of a client-side error.
    pub fn is_error(self) -> bool {
        matches!(self, TrackerPhase::TimedOut | TrackerPhase::NetworkError)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TrackerPhase::Completed | TrackerPhase::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackerState {
    schedule: PollSchedule,
    phase: TrackerPhase,
    job_id: Option<String>,
    latest: Option<JobSnapshot>,
    error: Option<String>,
    attempts: u32,
    in_flight: bool,
    dirty: bool,
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schedule(schedule: PollSchedule) -> Self {
        Self {
            schedule,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> TrackerPhase {
        self.phase
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    pub fn latest(&self) -> Option<&JobSnapshot> {
        self.latest.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn schedule(&self) -> PollSchedule {
        self.schedule
    }

    /// True while a status request is outstanding.
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Dismissal is allowed once the latest snapshot is terminal, or once
    /// polling stopped on a client-side error.
    pub fn can_close(&self) -> bool {
        let terminal_snapshot = self
            .latest
            .as_ref()
            .is_some_and(|snapshot| snapshot.status.is_terminal());
        terminal_snapshot || self.phase.is_error()
    }

    pub fn view(&self) -> ProgressViewModel {
        let latest = self.latest.as_ref();
        let status = effective_status(latest);
        let tone = tone(status);

        let progress = latest
            .filter(|snapshot| !snapshot.status.is_terminal())
            .map(|snapshot| ProgressBar {
                percent: snapshot.progress_percent(),
                tone,
            });

        let platforms = latest
            .map(|snapshot| {
                snapshot
                    .platforms()
                    .map(|(name, platform_status)| PlatformRow {
                        name: name.clone(),
                        status: platform_status.map(ToString::to_string).unwrap_or_default(),
                        badge: platform_status.and_then(platform_badge),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let result = latest
            .and_then(|snapshot| snapshot.result.as_ref())
            .map(|result| ResultPanel {
                summary: result_summary(result),
                warning: platform_warning(result),
            });

        ProgressViewModel {
            phase: self.phase,
            visible: self.job_id.is_some() && self.phase != TrackerPhase::Disposed,
            icon: status_icon(status),
            tone,
            heading: heading(status),
            progress,
            message: latest
                .and_then(|snapshot| snapshot.message.clone())
                .unwrap_or_else(|| INITIAL_MESSAGE.to_owned()),
            platforms,
            error: self
                .error
                .clone()
                .or_else(|| latest.and_then(|snapshot| snapshot.error.clone())),
            result,
            can_close: self.can_close(),
            hint: latest.and_then(long_running_hint),
            updated_at: latest.and_then(|snapshot| snapshot.updated_at.clone()),
        }
    }

    /// Returns whether the view changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn begin(&mut self, job_id: String) {
        self.phase = TrackerPhase::Polling;
        self.job_id = Some(job_id);
        self.latest = None;
        self.error = None;
        self.attempts = 0;
        self.in_flight = true;
        self.dirty = true;
    }

    /// A response for the current poll is expected.
    pub(crate) fn awaiting_response(&self) -> bool {
        self.phase == TrackerPhase::Polling && self.in_flight
    }

    pub(crate) fn mark_in_flight(&mut self) {
        self.in_flight = true;
    }

    pub(crate) fn apply_snapshot(&mut self, snapshot: JobSnapshot) {
        self.in_flight = false;
        self.phase = match snapshot.status {
            crate::JobStatus::Completed => TrackerPhase::Completed,
            crate::JobStatus::Failed => TrackerPhase::Failed,
            _ => TrackerPhase::Polling,
        };
        self.latest = Some(snapshot);
        self.dirty = true;
    }

    pub(crate) fn bump_attempts(&mut self) -> u32 {
        self.attempts = self.attempts.saturating_add(1);
        self.attempts
    }

    pub(crate) fn fail(&mut self, phase: TrackerPhase, reason: String) {
        self.in_flight = false;
        self.phase = phase;
        self.error = Some(reason);
        self.dirty = true;
    }

    pub(crate) fn dispose(&mut self) -> Option<String> {
        let was_polling = self.phase == TrackerPhase::Polling;
        self.phase = TrackerPhase::Disposed;
        self.in_flight = false;
        self.dirty = true;
        if was_polling {
            self.job_id.clone()
        } else {
            None
        }
    }

    /// The job id, if it is still being polled.
    pub(crate) fn active_job(&self) -> Option<&str> {
        if self.phase == TrackerPhase::Polling {
            self.job_id.as_deref()
        } else {
            None
        }
    }
}

/// Human text for a timeout after `limit`.
pub(crate) fn timeout_message(limit: Duration) -> String {
    let secs = limit.as_secs();
    let span = match secs {
        0 => format!("{} ms", limit.as_millis()),
        60 => "1 minute".to_owned(),
        s if s >= 60 && s % 60 == 0 => format!("{} minutes", s / 60),
        1 => "1 second".to_owned(),
        s => format!("{s} seconds"),
    };
    format!("Polling stopped after {span}. Please check status again.")
}
