use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use publish_engine::{EngineEvent, PollEngine, StatusFetchError, StatusFetcher};
use serde_json::json;

/// Answers after a fixed delay and counts calls.
struct SlowFetcher {
    delay: Duration,
    calls: AtomicUsize,
}

impl SlowFetcher {
    fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait::async_trait]
impl StatusFetcher for SlowFetcher {
    async fn fetch_status(&self, job_id: &str) -> Result<serde_json::Value, StatusFetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(json!({"job_id": job_id, "status": "publishing"}))
    }
}

const WAIT: Duration = Duration::from_secs(2);

#[test]
fn fetch_delivers_status_event() {
    let fetcher = SlowFetcher::new(Duration::from_millis(10));
    let engine = PollEngine::with_fetcher(fetcher.clone());

    engine.fetch("j1");
    let event = engine.recv_timeout(WAIT).expect("event");
    assert_eq!(
        event,
        EngineEvent::StatusFetched {
            job_id: "j1".to_string(),
            result: Ok(json!({"job_id": "j1", "status": "publishing"})),
        }
    );
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn schedule_emits_poll_due_after_delay() {
    let engine = PollEngine::with_fetcher(SlowFetcher::new(Duration::ZERO));
    engine.schedule("j2", Duration::from_millis(30));

    assert_eq!(engine.try_recv(), None);
    let event = engine.recv_timeout(WAIT).expect("event");
    assert_eq!(
        event,
        EngineEvent::PollDue {
            job_id: "j2".to_string()
        }
    );
}

#[test]
fn cancel_discards_in_flight_response() {
    let fetcher = SlowFetcher::new(Duration::from_millis(200));
    let engine = PollEngine::with_fetcher(fetcher.clone());

    engine.fetch("j3");
    std::thread::sleep(Duration::from_millis(50));
    engine.cancel("j3");

    assert_eq!(engine.recv_timeout(Duration::from_millis(400)), None);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn cancel_disarms_pending_timer() {
    let engine = PollEngine::with_fetcher(SlowFetcher::new(Duration::ZERO));
    engine.schedule("j4", Duration::from_millis(100));
    engine.cancel("j4");

    assert_eq!(engine.recv_timeout(Duration::from_millis(300)), None);
}

#[test]
fn cancelling_one_job_leaves_others_running() {
    let engine = PollEngine::with_fetcher(SlowFetcher::new(Duration::from_millis(50)));
    engine.fetch("keep");
    engine.fetch("drop");
    engine.cancel("drop");

    let event = engine.recv_timeout(WAIT).expect("event");
    assert!(matches!(event, EngineEvent::StatusFetched { ref job_id, .. } if job_id == "keep"));
    assert_eq!(engine.recv_timeout(Duration::from_millis(200)), None);
}
