//! Publish engine: status requests, poll timers and cancellation.
mod engine;
mod fetch;
mod types;

pub use engine::PollEngine;
pub use fetch::{status_url, ClientSettings, ReqwestStatusFetcher, StatusFetcher};
pub use types::{EngineEvent, FailureKind, StatusFetchError};
