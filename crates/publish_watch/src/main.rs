//! `publish-watch` command-line tool.
//!
//! Polls the status of a publish job until it settles and prints its progress.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc::TryRecvError;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use engine_logging::{engine_info, engine_warn};
use log::LevelFilter;
use publish_core::{effective_status, EffectiveStatus, JobSnapshot};
use publish_engine::PollEngine;
use publish_watch::{
    initialize_logging, load_config, render, JobWatcher, LogDestination, ScheduleMode,
    WatchEvent, DEFAULT_CONFIG_FILENAME,
};

const TICK: Duration = Duration::from_millis(250);

#[derive(Parser)]
#[command(name = "publish-watch")]
#[command(about = "Track a social-media publish job until it finishes", version)]
struct Cli {
    /// Job id returned when the publish was started
    job_id: String,

    /// Path to the RON config file
    #[arg(long, short = 'c', default_value = DEFAULT_CONFIG_FILENAME)]
    config: PathBuf,

    /// Backend root URL (overrides the config file)
    #[arg(long)]
    base_url: Option<String>,

    /// Bearer token for the status endpoint
    #[arg(long, env = "PUBLISH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Poll at a fixed period instead of backing off
    #[arg(long, value_name = "MS")]
    fixed_interval_ms: Option<u64>,

    /// Also write logs to the terminal
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Print the effective config as RON and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let loaded = load_config(&cli.config);
    let mut config = loaded.config.clone();
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(interval_ms) = cli.fixed_interval_ms {
        config.schedule.mode = ScheduleMode::FixedInterval;
        config.schedule.interval_ms = interval_ms;
    }
    if cli.verbose {
        config.log_destination = LogDestination::Both;
    }

    if cli.print_config {
        if let Some(err) = &loaded.problem {
            eprintln!("warning: ignoring {:?}: {err}", loaded.path);
        }
        config.validate()?;
        println!("{}", config.to_ron()?);
        return Ok(ExitCode::SUCCESS);
    }

    if let Err(err) = initialize_logging(config.log_destination, LevelFilter::Info) {
        eprintln!("warning: {err}; logging to the terminal instead");
        initialize_logging(LogDestination::Terminal, LevelFilter::Info)
            .context("failed to initialize logging")?;
    }
    loaded.report();
    config.validate()?;

    if cli.token.is_none() {
        engine_warn!("No bearer token given; the status endpoint will likely reject requests");
    }

    let engine = PollEngine::new(config.client_settings(cli.token))
        .context("failed to build HTTP client")?;
    let (mut watcher, events) = JobWatcher::new(engine, config.schedule.to_schedule());

    watcher.start(&cli.job_id);
    if !watcher.view().visible {
        bail!("job id must not be empty");
    }
    engine_info!(job = cli.job_id; "watching {}", config.base_url);

    let mut completed: Option<JobSnapshot> = None;
    print_view(&watcher);
    loop {
        if watcher.wait(TICK) {
            print_view(&watcher);
        }
        loop {
            match events.try_recv() {
                Ok(WatchEvent::Completed(snapshot)) => completed = Some(snapshot),
                Ok(WatchEvent::Closed) => {}
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        if watcher.is_settled() {
            break;
        }
    }
    watcher.request_close();

    Ok(exit_code(completed.as_ref()))
}

fn print_view(watcher: &JobWatcher) {
    println!();
    for line in render(&watcher.view()) {
        println!("{line}");
    }
}

/// 0 success, 2 partial, 1 job failed, 3 polling error.
fn exit_code(completed: Option<&JobSnapshot>) -> ExitCode {
    let Some(snapshot) = completed else {
        return ExitCode::from(3);
    };
    match effective_status(Some(snapshot)) {
        EffectiveStatus::Success | EffectiveStatus::Completed => ExitCode::SUCCESS,
        EffectiveStatus::Partial => ExitCode::from(2),
        EffectiveStatus::Failed => ExitCode::from(1),
        EffectiveStatus::InProgress => ExitCode::from(3),
    }
}
