use std::path::Path;

use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::format::{Format, Json, JsonFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::DEBUG_ENV_VAR;

const DEFAULT_FILTER: &str = "warn";
const DEBUG_FILTER: &str = "debug";

/// Initialize the global tracing subscriber.
///
/// Human-readable logs go to stderr so stdout stays machine-readable.
/// The level comes from `RUST_LOG`, defaulting to `warn`, or `debug` when
/// `BP_DEBUG` is set. With `log_file`, JSON lines are also appended there;
/// keep the returned guard alive until exit so they are flushed.
pub fn init(
    log_file: Option<&Path>,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
    let debug = std::env::var_os(DEBUG_ENV_VAR).is_some();
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(debug)))?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let (writer, guard) = json_file_writer(path)?;
            (Some(json_layer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

/// Non-blocking writer appending to `path`
fn json_file_writer(
    path: &Path,
) -> Result<(NonBlocking, WorkerGuard), Box<dyn std::error::Error + Send + Sync>> {
    let directory = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| format!("log file path has no file name: {}", path.display()))?;
    let appender = tracing_appender::rolling::never(directory, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

/// One JSON object per event
fn json_layer<S>(writer: NonBlocking) -> fmt::Layer<S, JsonFields, Format<Json>, NonBlocking>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fmt::layer().json().with_writer(writer).with_ansi(false)
}

fn default_filter(debug: bool) -> &'static str {
    if debug { DEBUG_FILTER } else { DEFAULT_FILTER }
}
