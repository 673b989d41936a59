use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Directory and file name of the persistent log
pub const LOG_DIR: &str = "logs";
pub const LOG_FILE: &str = "fbs.log";

/// Level used when RUST_LOG is not set
pub const DEFAULT_FILTER: &str = "info";

/// Open the log file for appending, creating its directory
pub fn open_log_file(dir: &Path) -> std::io::Result<(PathBuf, File)> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((path, file))
}

/// Install the global subscriber: human-readable output on stderr plus a
/// plain-text copy appended to `logs/fbs.log` when that file can be opened
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (file_layer, file_error) = match open_log_file(Path::new(LOG_DIR)) {
        Ok((_, file)) => (
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            ),
            None,
        ),
        Err(e) => (None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    if let Some(e) = file_error {
        tracing::warn!("Logging to stderr only, could not open {}/{}: {}", LOG_DIR, LOG_FILE, e);
    }
}
