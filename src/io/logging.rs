//! File logging for the TUI and CLI.
//!
//! The TUI owns the terminal, so diagnostics go to rotating files under
//! `<data_dir>/logs/` instead of stderr. Events are single-line
//! `key=value` records (`event=storage_write key=projects bytes=512`).
//!
//! Initialization happens at most once per process; a second call with the
//! same directory and level is a no-op, anything else is rejected.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;

const LOG_FILE_BASENAME: &str = "taskdesk";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 2 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

/// Environment variable overriding the configured level
pub const LOG_LEVEL_ENV: &str = "TASKDESK_LOG";

static LOGGING_STATE: OnceLock<LoggingState> = OnceLock::new();

struct LoggingState {
    level: &'static str,
    log_dir: PathBuf,
    _logger: LoggerHandle,
}

/// Error type for logger setup
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("unsupported log level `{0}`; expected trace|debug|info|warn|error|off")]
    InvalidLevel(String),
    #[error("could not create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("logging already initialized at {active} with level {level}")]
    AlreadyInitialized { active: PathBuf, level: &'static str },
    #[error("failed to start logger: {0}")]
    Backend(#[from] flexi_logger::FlexiLoggerError),
}

/// Directory holding log files for a data dir
pub fn log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}

/// Start file logging at `level` into `log_dir`.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<(), LoggingError> {
    let level = normalize_level(level)?;

    if let Some(state) = LOGGING_STATE.get() {
        return check_same(state, level, log_dir);
    }

    std::fs::create_dir_all(log_dir).map_err(|e| LoggingError::CreateDir {
        path: log_dir.to_path_buf(),
        source: e,
    })?;

    let logger = Logger::try_with_str(level)?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()?;

    let state = LoggingState {
        level,
        log_dir: log_dir.to_path_buf(),
        _logger: logger,
    };
    if let Err(state) = LOGGING_STATE.set(state) {
        // Lost a race with another initializer; its logger stays active
        return LOGGING_STATE
            .get()
            .map_or(Ok(()), |active| check_same(active, state.level, &state.log_dir));
    }

    info!(
        "event=app_start module=core status=ok version={} level={}",
        env!("CARGO_PKG_VERSION"),
        level
    );
    Ok(())
}

/// Resolve the effective level: environment override, else the configured one
pub fn effective_level(configured: &str) -> String {
    std::env::var(LOG_LEVEL_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| configured.to_string())
}

/// Active `(level, log_dir)`, if logging was started
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    LOGGING_STATE
        .get()
        .map(|state| (state.level, state.log_dir.clone()))
}

fn check_same(state: &LoggingState, level: &'static str, log_dir: &Path) -> Result<(), LoggingError> {
    if state.level == level && state.log_dir == log_dir {
        Ok(())
    } else {
        Err(LoggingError::AlreadyInitialized {
            active: state.log_dir.clone(),
            level: state.level,
        })
    }
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        "off" => Ok("off"),
        other => Err(LoggingError::InvalidLevel(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn normalize_level_accepts_known_values() {
        assert_eq!(normalize_level("INFO").unwrap(), "info");
        assert_eq!(normalize_level(" warning ").unwrap(), "warn");
        assert!(matches!(
            normalize_level("loud"),
            Err(LoggingError::InvalidLevel(_))
        ));
    }

    #[test]
    fn init_is_idempotent_and_rejects_conflicts() {
        let dir = TempDir::new().unwrap();
        let logs = log_dir(dir.path());
        init_logging("info", &logs).unwrap();
        init_logging("info", &logs).unwrap();

        let other = TempDir::new().unwrap();
        assert!(matches!(
            init_logging("info", other.path()),
            Err(LoggingError::AlreadyInitialized { .. })
        ));
        assert!(init_logging("debug", &logs).is_err());

        let (level, active) = logging_status().unwrap();
        assert_eq!(level, "info");
        assert_eq!(active, logs);
    }
}
