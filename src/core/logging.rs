use super::error::{Error, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Where log output goes for this run
#[derive(Debug, Clone, Copy)]
pub enum LogTarget<'a> {
    /// One-shot commands log warnings to stderr so stdout stays clean
    Stderr,
    /// The TUI owns the terminal, so logs go to a file
    File(&'a Path),
}

fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Install the global tracing subscriber.
///
/// The returned guard flushes buffered file output when dropped and must be
/// kept alive for as long as logging is needed.
pub fn init(target: LogTarget<'_>) -> Result<Option<WorkerGuard>> {
    match target {
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter("codesearch=warn"))
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))?;
            Ok(None)
        }
        LogTarget::File(path) => {
            let dir = path
                .parent()
                .ok_or_else(|| Error::Config(format!("Invalid log path: {}", path.display())))?;
            let file_name = path
                .file_name()
                .ok_or_else(|| Error::Config(format!("Invalid log path: {}", path.display())))?;
            std::fs::create_dir_all(dir)?;

            let file_appender = tracing_appender::rolling::never(dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::fmt()
                .with_env_filter(env_filter("codesearch=info"))
                .with_writer(non_blocking)
                .with_ansi(false) // No ANSI colors in log files
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))?;
            Ok(Some(guard))
        }
    }
}
