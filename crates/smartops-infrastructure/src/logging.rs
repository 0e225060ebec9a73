//! Logging bootstrap.
//!
//! Everything goes to a daily-rolling file under the log directory. Extra
//! layers (the REPL's dispatch printer) are installed next to it and see every
//! event regardless of the file's level filter.

use smartops_core::{Result, SmartOpsError};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

pub const LOG_FILE_PREFIX: &str = "smartops.log";

pub type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Keeps the background log writer alive; drop it last.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file: WorkerGuard,
}

/// `level` as a filter, falling back to `info` when it does not parse.
pub fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|err| {
        eprintln!("invalid log level '{level}' ({err}), using info");
        EnvFilter::new("info")
    })
}

/// `RUST_LOG` if set, else `level`.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| level_filter(level))
}

/// Installs the global subscriber.
///
/// # Errors
///
/// [`SmartOpsError::Io`] when the log directory cannot be created,
/// [`SmartOpsError::Internal`] when a global subscriber is already set.
pub fn init_logging(log_dir: &Path, level: &str, extra: Vec<BoxedLayer>) -> Result<LoggingGuard> {
    std::fs::create_dir_all(log_dir)?;

    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer: BoxedLayer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_filter(build_filter(level))
        .boxed();

    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(extra.len() + 1);
    layers.push(file_layer);
    layers.extend(extra);

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|err| SmartOpsError::internal(format!("failed to install logger: {err}")))?;

    tracing::info!(log_dir = %log_dir.display(), "logging initialized");
    Ok(LoggingGuard { _file: guard })
}
