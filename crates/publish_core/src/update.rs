use crate::state::timeout_message;
use crate::{Effect, Msg, TrackerPhase, TrackerState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: TrackerState, msg: Msg) -> (TrackerState, Vec<Effect>) {
    // Disposal is final: late responses and timers are dropped here.
    if state.phase() == TrackerPhase::Disposed {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::Start(raw) => {
            let job_id = raw.trim();
            if job_id.is_empty() || state.active_job() == Some(job_id) {
                return (state, Vec::new());
            }
            let mut effects = Vec::with_capacity(2);
            if let Some(previous) = state.active_job() {
                effects.push(Effect::CancelPolling {
                    job_id: previous.to_owned(),
                });
            }
            state.begin(job_id.to_owned());
            effects.push(Effect::FetchStatus {
                job_id: job_id.to_owned(),
            });
            effects
        }
        Msg::PollDue => {
            // In-flight guard: never overlap two status requests.
            let due = state
                .active_job()
                .filter(|_| !state.in_flight())
                .map(str::to_owned);
            match due {
                Some(job_id) => {
                    state.mark_in_flight();
                    vec![Effect::FetchStatus { job_id }]
                }
                None => Vec::new(),
            }
        }
        Msg::StatusReceived { snapshot, elapsed } => {
            if !state.awaiting_response() {
                return (state, Vec::new());
            }
            let job_id = state.job_id().unwrap_or_default().to_owned();
            if snapshot.status.is_terminal() {
                state.apply_snapshot(snapshot.clone());
                vec![Effect::NotifyComplete(snapshot)]
            } else {
                state.apply_snapshot(snapshot);
                let attempts = state.bump_attempts();
                match state.schedule().next_delay(attempts, elapsed) {
                    Some(delay) => vec![Effect::SchedulePoll { job_id, delay }],
                    None => {
                        let limit = state.schedule().max_duration().unwrap_or(elapsed);
                        state.fail(TrackerPhase::TimedOut, timeout_message(limit));
                        Vec::new()
                    }
                }
            }
        }
        Msg::PollFailed { reason } => {
            if state.awaiting_response() {
                state.fail(TrackerPhase::NetworkError, reason);
            }
            Vec::new()
        }
        Msg::CloseRequested => {
            if state.can_close() {
                vec![Effect::NotifyClosed]
            } else {
                Vec::new()
            }
        }
        Msg::Dispose => match state.dispose() {
            Some(job_id) => vec![Effect::CancelPolling { job_id }],
            None => Vec::new(),
        },
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
