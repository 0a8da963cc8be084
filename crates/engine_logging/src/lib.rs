#![deny(missing_docs)]
//! Shared logging utilities for the publish-watch workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every macro accepts an
//! optional `job = <id>;` prefix that tags the line with the job it concerns:
//!
//! ```
//! use engine_logging::engine_info;
//! engine_info!(job = "4f2a"; "scheduled next poll in {} ms", 3000);
//! engine_info!("engine thread started");
//! ```

/// Re-exported so the macros work without a direct `log` dependency.
pub use log;

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    (job = $job:expr; $($arg:tt)+) => {{
        $crate::log::trace!("[job {}] {}", $job, format_args!($($arg)+));
    }};
    ($($arg:tt)+) => {{
        $crate::log::trace!($($arg)+);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    (job = $job:expr; $($arg:tt)+) => {{
        $crate::log::info!("[job {}] {}", $job, format_args!($($arg)+));
    }};
    ($($arg:tt)+) => {{
        $crate::log::info!($($arg)+);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    (job = $job:expr; $($arg:tt)+) => {{
        $crate::log::debug!("[job {}] {}", $job, format_args!($($arg)+));
    }};
    ($($arg:tt)+) => {{
        $crate::log::debug!($($arg)+);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    (job = $job:expr; $($arg:tt)+) => {{
        $crate::log::warn!("[job {}] {}", $job, format_args!($($arg)+));
    }};
    ($($arg:tt)+) => {{
        $crate::log::warn!($($arg)+);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    (job = $job:expr; $($arg:tt)+) => {{
        $crate::log::error!("[job {}] {}", $job, format_args!($($arg)+));
    }};
    ($($arg:tt)+) => {{
        $crate::log::error!($($arg)+);
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test may have installed the logger already.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
