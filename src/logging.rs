//! Log file setup
//!
//! The terminal belongs to the dashboard, so logs go to a file: by default
//! `twweather.log` in the XDG cache directory (`~/.cache/twweather/` on Linux).
//! Verbosity follows `RUST_LOG` and defaults to `info`.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

/// File name used inside the cache directory
pub const LOG_FILE_NAME: &str = "twweather.log";

/// Default log path, or `None` when no home directory can be determined
pub fn default_log_path() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "twweather")?;
    Some(project_dirs.cache_dir().join(LOG_FILE_NAME))
}

/// Opens `path` for appending, creating parent directories as needed
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Installs the global subscriber writing to `path` (or the default path).
///
/// Returns the path in use. If no file can be opened, logging stays off and
/// the error is returned for the caller to report.
pub fn init(path: Option<PathBuf>) -> io::Result<PathBuf> {
    let path = path.or_else(default_log_path).ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "no cache directory for the log file")
    })?;
    let file = open_log_file(&path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| io::Error::other(e.to_string()))?;

    tracing::info!(path = %path.display(), "logging initialized");
    Ok(path)
}
