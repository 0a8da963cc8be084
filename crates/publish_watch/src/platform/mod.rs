pub(crate) mod config;
mod effects;
pub(crate) mod logging;
pub(crate) mod ui;
pub(crate) mod watcher;
