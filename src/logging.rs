//! Tracing setup shared by the server and the snapshot tool.
//!
//! Every launch writes to stdout and to its own timestamped file under the
//! `.assetview/logs` directory. Only the newest files are kept.

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::OnceLock,
    time::SystemTime,
};

use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

use crate::{app_dirs, records::filename};

/// Maximum number of log files kept per program.
const MAX_LOG_FILES: usize = 10;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Errors that may occur while initializing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("No suitable data directory available for logs")]
    NoDataDir,
    #[error("Failed to prepare log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read log directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to remove old log file {path}: {source}")]
    RemoveFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to create log file at {path}: {source}")]
    CreateLogFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to format log filename time: {0}")]
    FormatTime(time::error::Format),
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(tracing::subscriber::SetGlobalDefaultError),
}

/// Install the global subscriber for the program named `program`.
///
/// Log files are named `<program>_<timestamp>.log`, so the server and the
/// snapshot tool prune their own files independently. Calling this twice is a
/// no-op; errors are returned so callers can keep running without a log file.
pub fn init(program: &str) -> Result<(), LoggingError> {
    // Must happen before `non_blocking` spawns its writer thread.
    let offset = filename::capture_local_offset();
    if LOG_GUARD.get().is_some() {
        return Ok(());
    }

    let log_dir = app_dirs::logs_dir().map_err(LoggingError::from)?;
    let file_name = log_file_name(program, OffsetDateTime::now_utc().to_offset(offset))?;
    let log_path = log_dir.join(&file_name);
    touch(&log_path)?;
    prune_old_logs(&log_dir, program, MAX_LOG_FILES)?;

    let timer = display_timer(offset);
    let (file_writer, guard) = tracing_appender::non_blocking(rolling::never(&log_dir, file_name));
    let subscriber = Registry::default()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            fmt::layer()
                .with_timer(timer.clone())
                .with_writer(std::io::stdout),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_timer(timer)
                .with_writer(file_writer),
        );
    tracing::subscriber::set_global_default(subscriber).map_err(LoggingError::SetGlobal)?;
    let _ = LOG_GUARD.set(guard);

    tracing::info!("Logging initialized; log file at {}", log_path.display());
    Ok(())
}

impl From<app_dirs::AppDirError> for LoggingError {
    fn from(error: app_dirs::AppDirError) -> Self {
        match error {
            app_dirs::AppDirError::NoBaseDir => LoggingError::NoDataDir,
            app_dirs::AppDirError::CreateDir { path, source } => {
                LoggingError::CreateDir { path, source }
            }
        }
    }
}

fn touch(path: &Path) -> Result<(), LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(|_| ())
        .map_err(|source| LoggingError::CreateLogFile {
            path: path.to_path_buf(),
            source,
        })
}

fn prune_old_logs(dir: &Path, program: &str, max_files: usize) -> Result<(), LoggingError> {
    let prefix = format!("{program}_");
    let mut logs = fs::read_dir(dir)
        .map_err(|source| LoggingError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|ft| ft.is_file()))
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.starts_with(&prefix) && name.ends_with(".log")
        })
        .map(|entry| {
            let modified = entry
                .metadata()
                .and_then(|meta| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, entry.path())
        })
        .collect::<Vec<_>>();

    if logs.len() <= max_files {
        return Ok(());
    }
    logs.sort_by_key(|(modified, _)| *modified);
    let excess = logs.len() - max_files;
    for (_, path) in logs.into_iter().take(excess) {
        fs::remove_file(&path).map_err(|source| LoggingError::RemoveFile { path, source })?;
    }
    Ok(())
}

fn log_file_name(program: &str, now: OffsetDateTime) -> Result<String, LoggingError> {
    const NAME_FORMAT: &[FormatItem<'_>] =
        format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
    let stamp = now.format(NAME_FORMAT).map_err(LoggingError::FormatTime)?;
    Ok(format!("{program}_{stamp}.log"))
}

fn display_timer(
    offset: UtcOffset,
) -> fmt::time::OffsetTime<time::format_description::BorrowedFormatItem<'static>> {
    const DISPLAY_FORMAT: &[FormatItem<'static>] =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    fmt::time::OffsetTime::new(offset, DISPLAY_FORMAT.into())
}
