use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_trace};
use tokio_util::sync::CancellationToken;

use crate::fetch::{ClientSettings, ReqwestStatusFetcher, StatusFetcher};
use crate::{EngineEvent, StatusFetchError};

enum EngineCommand {
    Fetch { job_id: String },
    Schedule { job_id: String, delay: Duration },
    Cancel { job_id: String },
}

/// Handle to the background thread that performs status requests and timers.
///
/// Commands are fire-and-forget; results come back as [`EngineEvent`]s. Work for
/// a job that has been cancelled never produces an event.
pub struct PollEngine {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl PollEngine {
    pub fn new(settings: ClientSettings) -> Result<Self, StatusFetchError> {
        let fetcher = ReqwestStatusFetcher::new(settings)?;
        Ok(Self::with_fetcher(Arc::new(fetcher)))
    }

    pub fn with_fetcher(fetcher: Arc<dyn StatusFetcher>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    engine_error!("Failed to start poll engine runtime: {}", err);
                    return;
                }
            };
            let mut jobs: HashMap<String, CancellationToken> = HashMap::new();

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Fetch { job_id } => {
                        let token = jobs.entry(job_id.clone()).or_default().child_token();
                        let fetcher = fetcher.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            run_fetch(fetcher.as_ref(), job_id, token, event_tx).await;
                        });
                    }
                    EngineCommand::Schedule { job_id, delay } => {
                        let token = jobs.entry(job_id.clone()).or_default().child_token();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            run_timer(job_id, delay, token, event_tx).await;
                        });
                    }
                    EngineCommand::Cancel { job_id } => {
                        if let Some(token) = jobs.remove(&job_id) {
                            engine_debug!(job = job_id; "cancelling pending poll work");
                            token.cancel();
                        }
                    }
                }
            }

            // Handle dropped: nothing may be delivered any more.
            for token in jobs.values() {
                token.cancel();
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn fetch(&self, job_id: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Fetch {
            job_id: job_id.into(),
        });
    }

    pub fn schedule(&self, job_id: impl Into<String>, delay: Duration) {
        let _ = self.cmd_tx.send(EngineCommand::Schedule {
            job_id: job_id.into(),
            delay,
        });
    }

    pub fn cancel(&self, job_id: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel {
            job_id: job_id.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn run_fetch(
    fetcher: &dyn StatusFetcher,
    job_id: String,
    token: CancellationToken,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    engine_trace!(job = job_id; "status request sent");
    let result = tokio::select! {
        biased;
        _ = token.cancelled() => None,
        result = fetcher.fetch_status(&job_id) => Some(result),
    };
    // A response racing with cancellation is discarded, not applied.
    match result {
        Some(result) if !token.is_cancelled() => {
            let _ = event_tx.send(EngineEvent::StatusFetched { job_id, result });
        }
        _ => engine_debug!(job = job_id; "status response discarded after cancel"),
    }
}

async fn run_timer(
    job_id: String,
    delay: Duration,
    token: CancellationToken,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    tokio::select! {
        biased;
        _ = token.cancelled() => {}
        _ = tokio::time::sleep(delay) => {
            if !token.is_cancelled() {
                let _ = event_tx.send(EngineEvent::PollDue { job_id });
            }
        }
    }
}
