//! Logging setup
//!
//! Library code only talks to the `log` facade. The binary calls [`init`] once
//! to route records either to a log file or, when file logging is disabled, to
//! stderr at warning level and above.

use crate::config::LoggingConfig;
use crate::constants::{CONFIG_DIR_NAME, LOG_FILE_NAME, LOG_TIMESTAMP_FORMAT};
use anyhow::{Context, Result};
use log::LevelFilter;
use std::path::PathBuf;

/// Parse a level name such as "info" or "debug"
pub fn parse_level(level: &str) -> Result<LevelFilter> {
    level
        .parse::<LevelFilter>()
        .map_err(|_| anyhow::anyhow!("unknown level '{}'", level))
}

/// Path of the log file used when file logging is enabled
pub fn get_log_file_path() -> Result<PathBuf> {
    dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
        .map(|dir| dir.join(CONFIG_DIR_NAME).join(LOG_FILE_NAME))
}

fn dispatch(level: LevelFilter) -> fern::Dispatch {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format(LOG_TIMESTAMP_FORMAT),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
}

/// Install the global logger described by `config`
pub fn init(config: &LoggingConfig) -> Result<()> {
    let level = parse_level(&config.level)?;

    let dispatch = if config.enabled {
        let path = get_log_file_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }
        let file = fern::log_file(&path).with_context(|| format!("Failed to open log file: {}", path.display()))?;
        dispatch(level).chain(file)
    } else {
        dispatch(level.min(LevelFilter::Warn)).chain(std::io::stderr())
    };

    dispatch.apply().context("Logger already initialized")?;
    Ok(())
}
