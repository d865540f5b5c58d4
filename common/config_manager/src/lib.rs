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

/// Configuration management module for loading and accessing application configuration.
///
/// This module provides a thread-safe singleton for configuration data loaded from YAML files.
///
/// # Example
///
/// ```no_run
/// use serde::Deserialize;
///
/// use config_manager::ConfigSingleton;
///
/// #[derive(Deserialize)]
/// struct AppConfig {
///     #[serde(default)]
///     workers: usize,
///     #[serde(default = "default_log_level")]
///     log_level: String,
/// }
///
/// fn default_log_level() -> String {
///     "info".to_string()
/// }
///
/// static CONFIG: ConfigSingleton<AppConfig> = ConfigSingleton::new();
///
/// CONFIG.initialize("config.yaml").expect("Failed to load config");
/// let config = CONFIG.get_instance().expect("Config not initialized");
/// println!("workers: {}, log level: {}", config.workers, config.log_level);
/// ```
pub mod manager;

pub use manager::{ConfigError, ConfigSingleton};
