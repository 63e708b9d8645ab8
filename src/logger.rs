//! Logging setup for applications embedding the unit of work.
//!
//! Every operation in this crate logs through the `log` facade. Nothing is
//! printed unless the host installs a logger, either its own or the fern
//! dispatch built here from [`LoggingConfig`].

use anyhow::{Context, Result};
use log::LevelFilter;
use std::path::PathBuf;

use crate::config::LoggingConfig;
use crate::constants::{CONFIG_DIR_NAME, LOG_FILE_NAME, LOG_TIMESTAMP_FORMAT};

/// Build a fern dispatch writing timestamped lines to the configured file.
///
/// When logging is disabled the dispatch has no outputs and filters everything.
pub fn dispatch(config: &LoggingConfig) -> Result<fern::Dispatch> {
    let level = if config.enabled {
        config.level_filter()?
    } else {
        LevelFilter::Off
    };

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}] {:<5} {}: {}",
                chrono::Local::now().format(LOG_TIMESTAMP_FORMAT),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .level_for("sqlx", LevelFilter::Warn);

    if config.enabled {
        let path = match &config.file {
            Some(path) => path.clone(),
            None => get_log_file_path()?,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }
        let file = fern::log_file(&path).with_context(|| format!("Failed to open log file: {}", path.display()))?;
        dispatch = dispatch.chain(file);
    }

    Ok(dispatch)
}

/// Install the dispatch as the global logger.
pub fn init(config: &LoggingConfig) -> Result<()> {
    dispatch(config)?
        .apply()
        .context("A global logger is already installed")?;
    Ok(())
}

/// Default log file location
pub fn get_log_file_path() -> Result<PathBuf> {
    dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
        .map(|dir| dir.join(CONFIG_DIR_NAME).join(LOG_FILE_NAME))
}
