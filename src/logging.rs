//! Logging bootstrap.
//!
//! Lines look like `2026-01-02 09:00:00,123 - INFO - message` on stderr and,
//! when a log directory is configured, in size-rotated files as well.

use crate::config::LogConfig;
use flexi_logger::{
    Cleanup, Criterion, DeferredNow, Duplicate, FileSpec, Logger, LoggerHandle, Naming, WriteMode,
};
use log::Record;
use std::io::{self, Write};

const LOG_FILE_BASENAME: &str = "remindsync";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
pub const DEFAULT_LEVEL: &str = "info";

/// Starts the global logger. The returned handle must stay alive for the
/// whole run or buffered file output is lost.
pub fn init(config: &LogConfig) -> Result<LoggerHandle, String> {
    let level = match normalize_level(&config.level) {
        Ok(level) => level,
        Err(err) => {
            eprintln!("{err}; falling back to `{DEFAULT_LEVEL}`");
            DEFAULT_LEVEL
        }
    };

    let logger = Logger::try_with_env_or_str(level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?
        .format_for_stderr(line_format);

    let logger = match &config.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|err| {
                format!("failed to create log directory `{}`: {err}", dir.display())
            })?;
            logger
                .log_to_file(
                    FileSpec::default()
                        .directory(dir.as_path())
                        .basename(LOG_FILE_BASENAME),
                )
                .rotate(
                    Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(MAX_LOG_FILES),
                )
                .append()
                .write_mode(WriteMode::BufferAndFlush)
                .format_for_files(line_format)
                .duplicate_to_stderr(Duplicate::All)
        }
        None => logger.log_to_stderr(),
    };

    logger
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))
}

fn line_format(w: &mut dyn Write, now: &mut DeferredNow, record: &Record) -> io::Result<()> {
    write!(
        w,
        "{} - {} - {}",
        now.format("%Y-%m-%d %H:%M:%S,%3f"),
        record.level(),
        record.args()
    )
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        "off" => Ok("off"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error|off"
        )),
    }
}
