/*
 * Copyright (c) Huawei Technologies Co., Ltd. 2025. All rights reserved.
 * Global Trust Authority is licensed under the Mulan PSL v2.
 * You can use this software according to the terms and conditions of the Mulan PSL v2.
 * You may obtain a copy of Mulan PSL v2 at:
 *     http://license.coscl.org.cn/MulanPSL2
 * THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY KIND, EITHER EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR
 * PURPOSE.
 * See the Mulan PSL v2 for more details.
 */

pub mod config;
pub mod logger;

use std::{path::PathBuf, sync::OnceLock};
use thiserror::Error;

pub use crate::config::{FileLogConfig, LogConfig};
// Re-export log macros for convenient use in other modules
pub use log::{debug, error, info, trace, warn};

static LOGGER: OnceLock<logger::Logger> = OnceLock::new();

#[derive(Error, Debug)]
pub enum LogError {
    #[error("Invalid logging configuration: {0}")]
    Config(String),

    #[error("Logging I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logger initialization failed: {0}")]
    Init(String),
}

/// Initialize logging system
///
/// # Arguments
/// * `config_path` - Path to the logging configuration file
///
/// # Example
/// ```no_run
/// common_log::init_with_yaml("logging.yaml").expect("Failed to initialize logger");
/// log::info!("Logger initialized");
/// ```
pub fn init_with_yaml(config_path: impl Into<PathBuf>) -> Result<(), LogError> {
    let config = LogConfig::from_yaml(config_path)?;
    init_with_config(config)
}

/// Initialize logging system with config
///
/// Only the first successful call installs a logger; later calls fail with `LogError::Init`.
///
/// # Example
/// ```no_run
/// use common_log::{init_with_config, LogConfig};
///
/// let config = LogConfig { level: "debug".to_string(), ..LogConfig::default() };
/// init_with_config(config).expect("Failed to initialize logger");
/// log::debug!("Logger initialized");
/// ```
pub fn init_with_config(config: LogConfig) -> Result<(), LogError> {
    if LOGGER.get().is_some() {
        return Err(LogError::Init("Logger already initialized".to_string()));
    }
    let logger = logger::Logger::new_from_config(config)?;
    if LOGGER.set(logger).is_err() {
        return Err(LogError::Init("Logger already initialized".to_string()));
    }
    Ok(())
}

/// Whether a logger has been installed by this crate
pub fn is_initialized() -> bool {
    LOGGER.get().is_some()
}
