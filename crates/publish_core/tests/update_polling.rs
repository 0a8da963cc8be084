use std::sync::Once;
use std::time::Duration;

use pretty_assertions::assert_eq;
use publish_core::{
    update, BackoffPolicy, Effect, JobSnapshot, Msg, PollSchedule, TrackerPhase, TrackerState,
};
use serde_json::json;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn snapshot(value: serde_json::Value) -> JobSnapshot {
    JobSnapshot::from_value(value).expect("valid snapshot")
}

fn started(job_id: &str) -> TrackerState {
    let (state, effects) = update(TrackerState::new(), Msg::Start(job_id.to_string()));
    assert_eq!(
        effects,
        vec![Effect::FetchStatus {
            job_id: job_id.to_string()
        }]
    );
    state
}

fn receive(state: TrackerState, value: serde_json::Value, elapsed_ms: u64) -> (TrackerState, Vec<Effect>) {
    update(
        state,
        Msg::StatusReceived {
            snapshot: snapshot(value),
            elapsed: Duration::from_millis(elapsed_ms),
        },
    )
}

#[test]
fn non_terminal_statuses_schedule_exactly_one_poll() {
    init_logging();
    for status in ["queued", "starting", "publishing", "uploading"] {
        let state = started("job-1");
        let (state, effects) = receive(state, json!({"status": status}), 10);
        assert_eq!(state.phase(), TrackerPhase::Polling);
        assert_eq!(
            effects,
            vec![Effect::SchedulePoll {
                job_id: "job-1".to_string(),
                delay: Duration::from_millis(3000),
            }],
            "status {status}"
        );
        assert!(!state.in_flight());
    }
}

#[test]
fn failed_job_completes_once_and_stops() {
    init_logging();
    let state = started("job-2");
    let payload = json!({"status": "failed", "error": "token expired"});
    let (state, effects) = receive(state, payload.clone(), 10);

    assert_eq!(state.phase(), TrackerPhase::Failed);
    assert_eq!(effects, vec![Effect::NotifyComplete(snapshot(payload.clone()))]);

    // A stray timer or duplicate response must not fetch or notify again.
    let (state, effects) = update(state, Msg::PollDue);
    assert!(effects.is_empty());
    let (state, effects) = receive(state, payload, 20);
    assert!(effects.is_empty());
    assert_eq!(state.phase(), TrackerPhase::Failed);
}

#[test]
fn in_flight_guard_blocks_overlapping_polls() {
    init_logging();
    let state = started("job-3");
    assert!(state.in_flight());

    let (state, effects) = update(state, Msg::PollDue);
    assert!(effects.is_empty(), "request still outstanding");

    let (state, _) = receive(state, json!({"status": "publishing"}), 10);
    let (state, effects) = update(state, Msg::PollDue);
    assert_eq!(
        effects,
        vec![Effect::FetchStatus {
            job_id: "job-3".to_string()
        }]
    );
    let (_state, effects) = update(state, Msg::PollDue);
    assert!(effects.is_empty());
}

#[test]
fn backoff_delays_grow_per_attempt() {
    init_logging();
    let mut state = started("job-4");
    let mut delays = Vec::new();
    for round in 0..10u64 {
        let (next, effects) = receive(state, json!({"status": "publishing"}), round * 1000);
        match effects.as_slice() {
            [Effect::SchedulePoll { delay, .. }] => delays.push(delay.as_millis()),
            other => panic!("unexpected effects {other:?}"),
        }
        let (next, _) = update(next, Msg::PollDue);
        state = next;
    }
    assert_eq!(
        delays,
        vec![3000, 4000, 5000, 6000, 7000, 8000, 9000, 10_000, 10_000, 10_000]
    );
    assert_eq!(state.attempts(), 10);
}

#[test]
fn exceeding_the_budget_times_out_without_completion() {
    init_logging();
    let schedule = PollSchedule::Backoff(BackoffPolicy {
        max_duration: Duration::from_secs(120),
        ..BackoffPolicy::default()
    });
    let (state, _) = update(
        TrackerState::with_schedule(schedule),
        Msg::Start("job-5".to_string()),
    );
    let (mut state, effects) = receive(state, json!({"status": "publishing", "progress": 80}), 120_000);

    assert!(effects.is_empty());
    assert_eq!(state.phase(), TrackerPhase::TimedOut);
    assert_eq!(
        state.error(),
        Some("Polling stopped after 2 minutes. Please check status again.")
    );
    assert!(state.can_close());
    assert!(state.consume_dirty());

    let (_state, effects) = update(state, Msg::PollDue);
    assert!(effects.is_empty());
}

#[test]
fn fixed_interval_keeps_polling_past_any_budget() {
    init_logging();
    let schedule = PollSchedule::FixedInterval(Duration::from_millis(2000));
    let (state, _) = update(
        TrackerState::with_schedule(schedule),
        Msg::Start("job-6".to_string()),
    );
    let (state, effects) = receive(state, json!({"status": "publishing"}), 3_600_000);
    assert_eq!(state.phase(), TrackerPhase::Polling);
    assert_eq!(
        effects,
        vec![Effect::SchedulePoll {
            job_id: "job-6".to_string(),
            delay: Duration::from_millis(2000),
        }]
    );
}

#[test]
fn transport_failure_stops_polling() {
    init_logging();
    let state = started("job-7");
    let (state, effects) = update(
        state,
        Msg::PollFailed {
            reason: "Failed to fetch job status: http status 500".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.phase(), TrackerPhase::NetworkError);
    assert_eq!(
        state.view().error.as_deref(),
        Some("Failed to fetch job status: http status 500")
    );

    let (_state, effects) = update(state, Msg::PollDue);
    assert!(effects.is_empty());
}

#[test]
fn dispose_drops_late_responses() {
    init_logging();
    let state = started("job-8");
    let (state, _) = receive(state, json!({"status": "publishing", "progress": 40}), 10);
    let (state, _) = update(state, Msg::PollDue);
    assert!(state.in_flight());

    let (state, effects) = update(state, Msg::Dispose);
    assert_eq!(
        effects,
        vec![Effect::CancelPolling {
            job_id: "job-8".to_string()
        }]
    );
    let at_dispose = state.clone();

    let (state, effects) = receive(state, json!({"status": "completed"}), 20);
    assert!(effects.is_empty());
    assert_eq!(state, at_dispose);
    assert_eq!(state.view(), at_dispose.view());

    let (state, effects) = update(state, Msg::Start("job-9".to_string()));
    assert!(effects.is_empty());
    assert_eq!(state.phase(), TrackerPhase::Disposed);
}

#[test]
fn close_requires_a_terminal_snapshot() {
    init_logging();
    let state = started("job-10");
    let (state, effects) = update(state, Msg::CloseRequested);
    assert!(effects.is_empty());

    let (state, _) = receive(state, json!({"status": "publishing"}), 10);
    let (state, effects) = update(state, Msg::CloseRequested);
    assert!(effects.is_empty());
    assert!(!state.view().can_close);

    let (state, _) = update(state, Msg::PollDue);
    let (state, _) = receive(state, json!({"status": "completed"}), 20);
    let (_state, effects) = update(state, Msg::CloseRequested);
    assert_eq!(effects, vec![Effect::NotifyClosed]);
}

#[test]
fn restarting_with_a_new_job_cancels_the_old_one() {
    init_logging();
    let state = started("job-11");
    let (state, effects) = update(state.clone(), Msg::Start("job-11".to_string()));
    assert!(effects.is_empty(), "same id is a no-op");

    let (state, effects) = update(state, Msg::Start("job-12".to_string()));
    assert_eq!(
        effects,
        vec![
            Effect::CancelPolling {
                job_id: "job-11".to_string()
            },
            Effect::FetchStatus {
                job_id: "job-12".to_string()
            },
        ]
    );
    assert_eq!(state.job_id(), Some("job-12"));
    assert!(state.latest().is_none());
}

#[test]
fn a_finished_tracker_can_start_a_new_job() {
    init_logging();
    let state = started("job-13");
    let (state, _) = receive(state, json!({"status": "completed"}), 10);
    let (state, effects) = update(state, Msg::Start("job-14".to_string()));
    assert_eq!(
        effects,
        vec![Effect::FetchStatus {
            job_id: "job-14".to_string()
        }]
    );
    assert_eq!(state.phase(), TrackerPhase::Polling);
}
