use std::sync::mpsc;
use std::time::Duration;

use publish_core::{
    update, JobSnapshot, Msg, PollSchedule, ProgressViewModel, TrackerPhase, TrackerState,
};
use publish_engine::{EngineEvent, PollEngine};

use super::effects::EffectRunner;

/// Notifications for the code that opened the progress view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// The job reached `completed` or `failed`. Sent at most once per job.
    Completed(JobSnapshot),
    /// The view may be dismissed.
    Closed,
}

/// Tracks one publish job at a time and exposes its display state.
///
/// The watcher owns the tracker state; nothing else mutates it. Engine events
/// are applied only when [`pump`](Self::pump) or [`wait`](Self::wait) is
/// called, so all state changes happen on the caller's thread. Dropping the
/// watcher disposes it.
pub struct JobWatcher {
    state: TrackerState,
    runner: EffectRunner,
    changed: bool,
}

impl JobWatcher {
    pub fn new(engine: PollEngine, schedule: PollSchedule) -> (Self, mpsc::Receiver<WatchEvent>) {
        let (hooks_tx, hooks_rx) = mpsc::channel();
        let watcher = Self {
            state: TrackerState::with_schedule(schedule),
            runner: EffectRunner::new(engine, hooks_tx),
            changed: false,
        };
        (watcher, hooks_rx)
    }

    /// Begins tracking `job_id`. Empty ids are ignored.
    pub fn start(&mut self, job_id: &str) {
        self.dispatch(Msg::Start(job_id.to_owned()));
    }

    /// Applies every engine event already delivered. Returns whether the view changed.
    pub fn pump(&mut self) -> bool {
        while let Some(event) = self.runner.try_recv() {
            self.apply_engine_event(event);
        }
        std::mem::take(&mut self.changed)
    }

    /// Blocks up to `timeout` for engine activity, then behaves like [`pump`](Self::pump).
    pub fn wait(&mut self, timeout: Duration) -> bool {
        if let Some(event) = self.runner.recv_timeout(timeout) {
            self.apply_engine_event(event);
        }
        self.pump()
    }

    /// Asks to dismiss the view. Returns true when dismissal was allowed.
    pub fn request_close(&mut self) -> bool {
        let allowed = self.state.can_close();
        self.dispatch(Msg::CloseRequested);
        allowed
    }

    /// Stops all polling for good. Later responses are discarded.
    pub fn dispose(&mut self) {
        self.dispatch(Msg::Dispose);
    }

    pub fn view(&self) -> ProgressViewModel {
        self.state.view()
    }

    pub fn phase(&self) -> TrackerPhase {
        self.state.phase()
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    /// Polling has stopped on a terminal status or a client-side error.
    pub fn is_settled(&self) -> bool {
        let phase = self.state.phase();
        phase.is_terminal() || phase.is_error()
    }

    fn apply_engine_event(&mut self, event: EngineEvent) {
        if let Some(msg) = self.runner.translate(event, self.state.job_id()) {
            self.dispatch(msg);
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let was_polling = self.state.phase() == TrackerPhase::Polling;
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.changed |= state.consume_dirty();
        self.state = state;
        self.runner.run(effects);

        if was_polling && self.is_settled() {
            if let Some(job_id) = self.state.job_id() {
                self.runner.release(job_id);
            }
        }
    }
}

impl Drop for JobWatcher {
    fn drop(&mut self) {
        self.dispose();
    }
}
