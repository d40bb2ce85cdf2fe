// Logging setup.
// Installs a tracing subscriber writing to stderr or a log file,
// keeping stdout free for the launcher payload.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::Config;
use crate::error::{FinderError, Result};

/// Initialise the global subscriber. `RUST_LOG` overrides the configured level.
///
/// When logging to a file the returned guard must be held until exit so
/// buffered lines are flushed.
pub fn init_subscriber(config: &Config) -> Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = fmt().with_env_filter(filter).with_target(false);

    let (installed, guard) = match &config.log_file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(path)?);
            let installed = builder.with_ansi(false).with_writer(writer).try_init();
            (installed, Some(guard))
        }
        None => (builder.with_writer(std::io::stderr).try_init(), None),
    };

    // A subscriber set earlier (e.g. by a test harness) stays in place
    if let Err(e) = installed {
        tracing::debug!(error = %e, "tracing subscriber already installed");
    }
    Ok(guard)
}

/// Non-rotating appender for `path`, creating its directory if needed.
fn file_appender(path: &Path) -> Result<RollingFileAppender> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| FinderError::Config(format!("invalid log file '{}'", path.display())))?;

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(dir)
        .map_err(|e| FinderError::Config(format!("cannot open log file '{}': {}", path.display(), e)))
}
