use std::sync::mpsc;
use std::time::{Duration, Instant};

use engine_logging::{engine_debug, engine_info, engine_warn};
use publish_core::{Effect, JobSnapshot, Msg};
use publish_engine::{EngineEvent, PollEngine};

use super::watcher::WatchEvent;

/// Executes core effects against the engine and turns engine events into messages.
pub(crate) struct EffectRunner {
    engine: PollEngine,
    hooks: mpsc::Sender<WatchEvent>,
    /// Job whose first poll started the wall clock.
    clock: Option<(String, Instant)>,
}

impl EffectRunner {
    pub(crate) fn new(engine: PollEngine, hooks: mpsc::Sender<WatchEvent>) -> Self {
        Self {
            engine,
            hooks,
            clock: None,
        }
    }

    pub(crate) fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchStatus { job_id } => {
                    if self.clock.as_ref().map(|(id, _)| id.as_str()) != Some(job_id.as_str()) {
                        self.clock = Some((job_id.clone(), Instant::now()));
                    }
                    engine_debug!(job = job_id; "FetchStatus");
                    self.engine.fetch(job_id);
                }
                Effect::SchedulePoll { job_id, delay } => {
                    engine_debug!(job = job_id; "SchedulePoll delay_ms={}", delay.as_millis());
                    self.engine.schedule(job_id, delay);
                }
                Effect::CancelPolling { job_id } => {
                    engine_info!(job = job_id; "CancelPolling");
                    self.release(&job_id);
                }
                Effect::NotifyComplete(snapshot) => {
                    engine_info!(
                        job = snapshot.job_id.as_deref().unwrap_or("?");
                        "NotifyComplete status={}",
                        snapshot.status
                    );
                    let _ = self.hooks.send(WatchEvent::Completed(snapshot));
                }
                Effect::NotifyClosed => {
                    let _ = self.hooks.send(WatchEvent::Closed);
                }
            }
        }
    }

    /// Drops engine bookkeeping for a job that is no longer polled.
    pub(crate) fn release(&mut self, job_id: &str) {
        self.engine.cancel(job_id);
        if self.clock.as_ref().is_some_and(|(id, _)| id == job_id) {
            self.clock = None;
        }
    }

    pub(crate) fn try_recv(&self) -> Option<EngineEvent> {
        self.engine.try_recv()
    }

    pub(crate) fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.engine.recv_timeout(timeout)
    }

    /// Maps an engine event to a core message. Events for any job other than
    /// `current_job` are stale and dropped.
    pub(crate) fn translate(&self, event: EngineEvent, current_job: Option<&str>) -> Option<Msg> {
        let event_job = match &event {
            EngineEvent::StatusFetched { job_id, .. } | EngineEvent::PollDue { job_id } => job_id,
        };
        if current_job != Some(event_job.as_str()) {
            engine_debug!(job = event_job; "dropping stale engine event");
            return None;
        }

        let msg = match event {
            EngineEvent::PollDue { .. } => Msg::PollDue,
            EngineEvent::StatusFetched {
                job_id,
                result: Ok(value),
            } => match JobSnapshot::from_value(value) {
                Ok(snapshot) => Msg::StatusReceived {
                    snapshot,
                    elapsed: self.elapsed(),
                },
                Err(err) => {
                    engine_warn!(job = job_id; "malformed status payload: {}", err);
                    Msg::PollFailed {
                        reason: format!("Malformed job status: {err}"),
                    }
                }
            },
            EngineEvent::StatusFetched {
                job_id,
                result: Err(err),
            } => {
                engine_warn!(job = job_id; "status request failed: {}", err);
                Msg::PollFailed {
                    reason: format!("Failed to fetch job status: {err}"),
                }
            }
        };
        Some(msg)
    }

    fn elapsed(&self) -> Duration {
        self.clock
            .as_ref()
            .map_or(Duration::ZERO, |(_, started)| started.elapsed())
    }
}
