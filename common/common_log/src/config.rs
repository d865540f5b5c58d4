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

use serde::Deserialize;
use std::path::PathBuf;

use crate::LogError;

fn default_level() -> String {
    "info".to_string()
}

fn default_console() -> bool {
    true
}

/// Logging configuration
///
/// ```yaml
/// level: debug
/// console: true
/// file:
///   log_directory: logs
///   log_file_name: eventlog-verify.log
///   max_file_size: 10485760
///   max_zip_count: 6
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_console")]
    pub console: bool,
    #[serde(default)]
    pub file: Option<FileLogConfig>,
}

/// Size-rolled log file; archives are gzip-compressed next to the active file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileLogConfig {
    pub log_directory: String,
    pub log_file_name: String,
    pub max_file_size: u64,
    pub max_zip_count: u32,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            console: default_console(),
            file: None,
        }
    }
}

impl LogConfig {
    pub fn from_yaml(path: impl Into<PathBuf>) -> Result<Self, LogError> {
        let config_str = std::fs::read_to_string(path.into())?;
        let config: LogConfig =
            serde_yaml::from_str(&config_str).map_err(|e| LogError::Config(e.to_string()))?;
        Ok(config)
    }
}
