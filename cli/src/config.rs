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

use common_log::LogConfig;
use config_manager::{ConfigError, ConfigSingleton};
use serde::Deserialize;
use std::path::Path;
use tpm_boot_verifier::VerificationOptions;

pub static CONFIG: ConfigSingleton<VerifierConfig> = ConfigSingleton::new();

fn default_workers() -> usize {
    1
}

fn default_true() -> bool {
    true
}

/// Configuration file of the verifier
///
/// ```yaml
/// logging:
///   level: info
///   console: true
/// verification:
///   workers: 4
///   check_event_digests: true
///   fail_on_payload_error: true
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifierConfig {
    #[serde(default)]
    pub logging: Option<LogConfig>,
    #[serde(default)]
    pub verification: VerificationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerificationConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default)]
    pub check_event_digests: bool,
    #[serde(default = "default_true")]
    pub fail_on_payload_error: bool,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            check_event_digests: false,
            fail_on_payload_error: default_true(),
        }
    }
}

impl VerificationConfig {
    /// Verification options with command line overrides applied
    pub fn to_options(&self, workers: Option<usize>, check_event_digests: bool) -> VerificationOptions {
        VerificationOptions {
            workers: workers.unwrap_or(self.workers),
            check_event_digests: check_event_digests || self.check_event_digests,
            fail_on_payload_error: self.fail_on_payload_error,
        }
    }
}

/// Load the configuration file, or the defaults when none is given
pub fn load_config(path: Option<&Path>) -> Result<&'static VerifierConfig, ConfigError> {
    match path {
        Some(path) => CONFIG.initialize(path)?,
        None => CONFIG.initialize_with(VerifierConfig::default()),
    }
    CONFIG.get_instance()
}
