use log::{info, warn, LevelFilter};
use std::path::{Path, PathBuf};

// For file-based logging with rotation
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::config::LogLevel;
use crate::error::{Error, Result};
use crate::types::AssetId;

/// Environment variable overriding the configured level / filters
pub const LOG_ENV: &str = "PHOTO_CULLER_LOG";

/// Size at which the log file is rolled over
const LOG_ROLL_SIZE: u64 = 10 * 1024 * 1024;

/// Number of archived log files kept
const LOG_ARCHIVES: u32 = 5;

/// Console logger at `level`, overridable through `PHOTO_CULLER_LOG`
/// (standard `env_logger` filter syntax).
///
/// Calling it twice is harmless: the second call is ignored.
pub fn init_logger(level: LogLevel) {
    let _ = env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .parse_env(LOG_ENV)
        .format_timestamp_millis()
        .try_init();
}

/// Log to a rolling file in `log_dir` only, so progress bars on the terminal
/// are not interleaved with log lines. Returns the path of the active log file.
pub fn init_file_logger(log_dir: &Path, level: LogLevel) -> Result<PathBuf> {
    std::fs::create_dir_all(log_dir)?;

    let log_file_path = log_dir.join("photo-culler.log");
    let archived_logs_pattern = log_dir.join("photo-culler.{}.log");

    let file_trigger = SizeTrigger::new(LOG_ROLL_SIZE);
    let file_roller = FixedWindowRoller::builder()
        .build(&archived_logs_pattern.to_string_lossy(), LOG_ARCHIVES)
        .map_err(|e| Error::Configuration(format!("Failed to create log roller: {}", e)))?;
    let compound_policy = CompoundPolicy::new(Box::new(file_trigger), Box::new(file_roller));

    let rolling_file = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] [{M}:{L}] - {m}{n}",
        )))
        .build(&log_file_path, Box::new(compound_policy))
        .map_err(|e| Error::Configuration(format!("Failed to create log appender: {}", e)))?;

    let config = log4rs::Config::builder()
        .appender(Appender::builder().build("file", Box::new(rolling_file)))
        .build(
            Root::builder()
                .appender("file")
                .build(level.to_level_filter()),
        )
        .map_err(|e| Error::Configuration(format!("Failed to build log config: {}", e)))?;

    log4rs::init_config(config)
        .map_err(|e| Error::Configuration(format!("Failed to initialize log4rs: {}", e)))?;

    // A plain level in the environment still wins
    if let Ok(level) = std::env::var(LOG_ENV) {
        if let Ok(level) = level.parse::<LevelFilter>() {
            log::set_max_level(level);
        }
    }

    info!("Photo culler started");
    info!("Logging to file: {}", log_file_path.display());
    Ok(log_file_path)
}

/// Log an asset that was left out of the photo table
pub fn log_skip(id: &AssetId, reason: &dyn std::error::Error) {
    warn!("Skipped - Asset: {}, Reason: {}", id, reason);
}

/// Log file system modification
pub fn log_fs_modification(operation: &str, path: &Path, details: Option<&str>) {
    let details_str = details.unwrap_or("");
    info!(
        "FS CHANGE - Operation: {}, Path: {}{}",
        operation,
        path.display(),
        if details_str.is_empty() {
            "".to_string()
        } else {
            format!(", Details: {}", details_str)
        }
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_twice_is_harmless() {
        init_logger(LogLevel::Debug);
        init_logger(LogLevel::Info);
        log::debug!("logger initialised");
    }
}
