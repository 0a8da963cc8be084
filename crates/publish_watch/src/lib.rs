//! Publish watch: tracks a publish job until it settles and renders its progress.
mod platform;

pub use platform::config::{
    load_config, read_config, ConfigError, LoadedConfig, ScheduleConfig, ScheduleMode, WatchConfig,
    DEFAULT_CONFIG_FILENAME,
};
pub use platform::logging::{initialize as initialize_logging, LogDestination, LoggingError};
pub use platform::ui::render::render;
pub use platform::watcher::{JobWatcher, WatchEvent};
