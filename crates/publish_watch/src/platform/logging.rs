//! Logger initialization for the `publish-watch` binary.
//!
//! File output goes to `./publish_watch.log` in the current working directory.

use std::fs::File;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use thiserror::Error;

const LOG_FILE: &str = "./publish_watch.log";

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogDestination {
    #[default]
    File,
    /// Warnings and errors go to stderr, the rest to stdout.
    Terminal,
    Both,
}

impl LogDestination {
    fn wants_file(self) -> bool {
        matches!(self, LogDestination::File | LogDestination::Both)
    }

    fn wants_terminal(self) -> bool {
        matches!(self, LogDestination::Terminal | LogDestination::Both)
    }
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("could not create log file {path:?}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("a logger is already installed")]
    AlreadyInitialized(#[from] log::SetLoggerError),
}

/// Installs the global logger. Nothing is installed when the log file cannot
/// be created, so the caller may retry with [`LogDestination::Terminal`].
pub fn initialize(destination: LogDestination, level: LevelFilter) -> Result<(), LoggingError> {
    let loggers = build_loggers(destination, level, Path::new(LOG_FILE))?;
    CombinedLogger::init(loggers)?;
    Ok(())
}

fn build_loggers(
    destination: LogDestination,
    level: LevelFilter,
    log_path: &Path,
) -> Result<Vec<Box<dyn SharedLogger>>, LoggingError> {
    let config = build_config();
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if destination.wants_file() {
        loggers.push(file_logger(level, config.clone(), log_path)?);
    }
    if destination.wants_terminal() {
        loggers.push(TermLogger::new(
            level,
            config,
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }
    Ok(loggers)
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn file_logger(
    level: LevelFilter,
    config: Config,
    log_path: &Path,
) -> Result<Box<WriteLogger<File>>, LoggingError> {
    let file = File::create(log_path).map_err(|source| LoggingError::LogFile {
        path: log_path.to_path_buf(),
        source,
    })?;
    Ok(WriteLogger::new(level, config, file))
}
