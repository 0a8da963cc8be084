use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use publish_core::{BackoffPolicy, PollSchedule};
use publish_engine::ClientSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LogDestination;

pub const DEFAULT_CONFIG_FILENAME: &str = "publish_watch.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid base url {url:?}: {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid schedule: {0}")]
    Schedule(&'static str),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScheduleMode {
    #[default]
    Backoff,
    FixedInterval,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub mode: ScheduleMode,
    pub base_ms: u64,
    pub step_ms: u64,
    pub cap_ms: u64,
    pub max_duration_secs: u64,
    /// Only used in `FixedInterval` mode.
    pub interval_ms: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        let backoff = BackoffPolicy::default();
        Self {
            mode: ScheduleMode::Backoff,
            base_ms: backoff.base.as_millis() as u64,
            step_ms: backoff.step.as_millis() as u64,
            cap_ms: backoff.cap.as_millis() as u64,
            max_duration_secs: backoff.max_duration.as_secs(),
            interval_ms: PollSchedule::DEFAULT_INTERVAL.as_millis() as u64,
        }
    }
}

impl ScheduleConfig {
    /// Rejects schedules that would re-poll without a pause.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.mode {
            ScheduleMode::Backoff => {
                if self.base_ms == 0 && self.step_ms == 0 {
                    return Err(ConfigError::Schedule("base_ms and step_ms are both zero"));
                }
                if self.cap_ms == 0 || self.cap_ms < self.base_ms {
                    return Err(ConfigError::Schedule("cap_ms must be at least base_ms and non-zero"));
                }
                if self.max_duration_secs == 0 {
                    return Err(ConfigError::Schedule("max_duration_secs must be non-zero"));
                }
            }
            ScheduleMode::FixedInterval => {
                if self.interval_ms == 0 {
                    return Err(ConfigError::Schedule("interval_ms must be non-zero"));
                }
            }
        }
        Ok(())
    }

    pub fn to_schedule(&self) -> PollSchedule {
        match self.mode {
            ScheduleMode::Backoff => PollSchedule::Backoff(BackoffPolicy {
                base: Duration::from_millis(self.base_ms),
                step: Duration::from_millis(self.step_ms),
                cap: Duration::from_millis(self.cap_ms),
                max_duration: Duration::from_secs(self.max_duration_secs),
            }),
            ScheduleMode::FixedInterval => {
                PollSchedule::FixedInterval(Duration::from_millis(self.interval_ms))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub base_url: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub schedule: ScheduleConfig,
    pub log_destination: LogDestination,
}

impl Default for WatchConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        Self {
            base_url: client.base_url,
            connect_timeout_ms: client.connect_timeout.as_millis() as u64,
            request_timeout_ms: client.request_timeout.as_millis() as u64,
            schedule: ScheduleConfig::default(),
            log_destination: LogDestination::default(),
        }
    }
}

impl WatchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.base_url).map_err(|source| ConfigError::BaseUrl {
            url: self.base_url.clone(),
            source,
        })?;
        self.schedule.validate()
    }

    pub fn client_settings(&self, bearer_token: Option<String>) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            bearer_token,
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::new(),
        )?)
    }
}

/// Reads a config file. A missing file yields `Ok(None)`.
pub fn read_config(path: &Path) -> Result<Option<WatchConfig>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    Ok(Some(ron::from_str(&content)?))
}

/// Outcome of [`load_config`]. Logging is deferred to [`report`](Self::report)
/// because the config decides where logs go.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: WatchConfig,
    pub path: PathBuf,
    pub found: bool,
    /// Why the file was ignored, if it was.
    pub problem: Option<ConfigError>,
}

impl LoadedConfig {
    pub fn report(&self) {
        match &self.problem {
            Some(err) => engine_warn!("Ignoring config at {:?}, using defaults: {}", self.path, err),
            None if self.found => engine_info!("Loaded config from {:?}", self.path),
            None => engine_info!("No config at {:?}, using defaults", self.path),
        }
    }
}

/// Loads a config file, falling back to defaults on any problem.
pub fn load_config(path: &Path) -> LoadedConfig {
    let (config, found, problem) = match read_config(path) {
        Ok(Some(config)) => (config, true, None),
        Ok(None) => (WatchConfig::default(), false, None),
        Err(err) => (WatchConfig::default(), true, Some(err)),
    };
    LoadedConfig {
        config,
        path: path.to_path_buf(),
        found,
        problem,
    }
}
