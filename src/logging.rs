//! Log setup: a timestamped debug log file plus a terse console stream.

use anyhow::{Context, Result};
use chrono::Local;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::prelude::*;

pub const DEFAULT_LOG_DIR: &str = "logs";
pub const LOG_FILE_NAME: &str = "transcoding.log";

/// `2024-05-01 13:37:00` in local time
struct LocalTimestamp;

impl FormatTime for LocalTimestamp {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Install the global subscriber and return the log file path.
///
/// Everything from DEBUG up is appended to `<log_dir>/transcoding.log`; the
/// console gets bare messages from INFO up, or DEBUG up when `verbose`.
pub fn init(log_dir: &Path, verbose: bool) -> Result<PathBuf> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let log_path = log_dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_timer(LocalTimestamp)
        .with_target(false)
        .with_ansi(false)
        .with_filter(LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer(verbose))
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(log_path)
}

/// Console-only logging for commands that leave no trace on disk
pub fn init_console(verbose: bool) -> Result<()> {
    tracing_subscriber::registry()
        .with(console_layer(verbose))
        .try_init()
        .context("Failed to install log subscriber")
}

fn console_layer<S>(verbose: bool) -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_level(false)
        .with_target(false)
        .with_filter(level)
}
