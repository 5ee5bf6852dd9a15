//! Tracing subscriber setup for binaries embedding these helpers.

use std::fs;
use std::io;
use std::path::Path;

use time::UtcOffset;
use time::macros::format_description;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{self, fmt, prelude::*};

/// Initialize logging with a stderr layer and an optional file layer.
/// Returns a guard that must be kept alive for the duration of the program.
///
/// # Arguments
/// * `no_color` - Disable ANSI colors in stderr output
/// * `log_level` - Override log level (otherwise uses RUST_LOG or defaults to "info")
/// * `log_file` - Append debug-level logs to this file as well
pub fn init_logger(
    no_color: bool,
    log_level: Option<&str>,
    log_file: Option<&Path>,
) -> io::Result<WorkerGuard> {
    let timer = fmt::time::OffsetTime::new(
        UtcOffset::UTC,
        format_description!(
            "[[[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z]"
        ),
    );

    // If log_level is not provided, fall back to RUST_LOG or default to
    // "info".
    let stderr_filter = match log_level {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(timer.clone())
        .with_ansi(!no_color)
        .with_filter(stderr_filter);

    let (result, guard) = if let Some(path) = log_file {
        let file = fs::OpenOptions::new().create(true).append(true).open(path)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let file_layer = fmt::layer()
            .with_writer(non_blocking)
            .with_timer(timer)
            .with_ansi(false) // No ANSI colors in file
            .with_filter(tracing_subscriber::EnvFilter::new("debug"));
        let result = tracing_subscriber::registry()
            .with(stderr_layer)
            .with(file_layer)
            .try_init();
        (result, guard)
    } else {
        let (_, guard) = tracing_appender::non_blocking(std::io::sink());
        let result = tracing_subscriber::registry().with(stderr_layer).try_init();
        (result, guard)
    };

    match result {
        Ok(()) => Ok(guard),
        // Ignore errors due to the subscriber already being set, e.g. when
        // tests initialize logging more than once.
        Err(e) if e.to_string().contains("already been set") => Ok(guard),
        Err(e) => Err(io::Error::other(e)),
    }
}
