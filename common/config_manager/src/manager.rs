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
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Configuration not initialized")]
    NotInitialized,
}

/// A thread-safe singleton configuration manager that loads and provides access to configuration data.
///
/// Configuration is set at most once; the first successful `initialize` or `initialize_with` wins
/// and later calls leave it untouched.
///
/// # Type Parameters
///
/// * `T` - The configuration type that must implement `Deserialize`, `Send`, `Sync`, and have a static lifetime.
pub struct ConfigSingleton<T: for<'a> Deserialize<'a> + Send + Sync + 'static> {
    instance: OnceLock<T>,
}

impl<T: for<'a> Deserialize<'a> + Send + Sync + 'static> Default for ConfigSingleton<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: for<'a> Deserialize<'a> + Send + Sync + 'static> ConfigSingleton<T> {
    /// Creates a new, uninitialized `ConfigSingleton` instance.
    pub const fn new() -> Self {
        ConfigSingleton {
            instance: OnceLock::new(),
        }
    }

    /// Loads and parses a YAML configuration file.
    ///
    /// Returns `Ok(())` without reading the file if the singleton is already initialized.
    ///
    /// # Errors
    ///
    /// * `ConfigError::Io` - The file cannot be opened or read
    /// * `ConfigError::Parse` - The YAML content cannot be parsed into `T`
    pub fn initialize<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        if self.instance.get().is_some() {
            return Ok(());
        }

        let file = File::open(path)?;
        let mut contents = String::new();
        let mut reader = BufReader::new(file);
        reader.read_to_string(&mut contents)?;

        let config: T = serde_yaml::from_str(&contents)?;
        let _ = self.instance.set(config);
        Ok(())
    }

    /// Stores an already built configuration, e.g. defaults when no file was given.
    pub fn initialize_with(&self, config: T) {
        let _ = self.instance.set(config);
    }

    /// Retrieves a reference to the initialized configuration instance.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotInitialized` if no configuration has been stored yet.
    pub fn get_instance(&self) -> Result<&T, ConfigError> {
        self.instance.get().ok_or(ConfigError::NotInitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.instance.get().is_some()
    }
}
