//! File-based logging bootstrap. The terminal is owned by the TUI, so logs go
//! to rotating files under the configured log directory. Init is idempotent
//! per process.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "jotlog";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    log_dir: PathBuf,
    _logger: LoggerHandle,
}

/// Default level per build mode: `debug` for debug builds, `info` otherwise.
/// `JOTLOG_LOG` overrides it with a flexi_logger level spec.
pub fn default_log_level() -> String {
    if let Ok(level) = std::env::var("JOTLOG_LOG") {
        return level;
    }
    if cfg!(debug_assertions) {
        "debug".to_string()
    } else {
        "info".to_string()
    }
}

/// Starts rotating file logging. A second call with the same directory is a
/// no-op; a different directory is rejected.
pub fn init(level: &str, log_dir: &Path) -> Result<(), String> {
    if let Some(state) = LOGGING_STATE.get() {
        if state.log_dir == log_dir {
            return Ok(());
        }
        return Err(format!(
            "logging already initialized at `{}`; refusing to switch to `{}`",
            state.log_dir.display(),
            log_dir.display()
        ));
    }

    let state = LOGGING_STATE.get_or_try_init(|| -> Result<LoggingState, String> {
        std::fs::create_dir_all(log_dir).map_err(|err| {
            format!(
                "failed to create log directory `{}`: {err}",
                log_dir.display()
            )
        })?;

        let logger = Logger::try_with_str(level)
            .map_err(|err| format!("invalid log level `{level}`: {err}"))?
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
            .start()
            .map_err(|err| format!("failed to start logger: {err}"))?;

        info!(
            "jotlog {} started, logging to {}",
            env!("CARGO_PKG_VERSION"),
            log_dir.display()
        );

        Ok(LoggingState {
            log_dir: log_dir.to_path_buf(),
            _logger: logger,
        })
    })?;

    if state.log_dir != log_dir {
        return Err(format!(
            "logging already initialized at `{}`; refusing to switch to `{}`",
            state.log_dir.display(),
            log_dir.display()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::init;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn init_is_idempotent_and_rejects_a_new_directory() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("jotlog-log-{}-{nanos}", std::process::id()));
        let other = dir.join("other");

        init("info", &dir).unwrap();
        init("info", &dir).unwrap();

        let err = init("info", &other).unwrap_err();
        assert!(err.contains("refusing to switch"));
    }
}
