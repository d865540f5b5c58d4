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

//! Loader for the JSON reference manifest produced by the RIM tooling.
//!
//! ```json
//! {
//!   "software_identities": [
//!     {
//!       "name": "platform-firmware",
//!       "files": [{ "name": "POST_Code_Module", "hash": "9f86d0..." }],
//!       "variables": [{ "name": "SecureBoot", "hash": "4bf5..." }]
//!     }
//!   ]
//! }
//! ```
//!
//! Hashes are SHA-256 hex strings; embedded whitespace is ignored. Items with an empty name or
//! hash are skipped, and a name seen twice keeps the last hash.

use log::{debug, info};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tpm_boot_verifier::RimManifest;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid hash for {name}: {reason}")]
    InvalidHash { name: String, reason: String },
}

#[derive(Debug, Deserialize)]
struct ManifestDocument {
    #[serde(default)]
    software_identities: Vec<SoftwareIdentity>,
}

#[derive(Debug, Deserialize)]
struct SoftwareIdentity {
    #[serde(default)]
    name: String,
    #[serde(default)]
    files: Vec<MeasuredItem>,
    #[serde(default)]
    variables: Vec<MeasuredItem>,
}

#[derive(Debug, Deserialize)]
struct MeasuredItem {
    #[serde(default)]
    name: String,
    #[serde(default)]
    hash: String,
}

/// Decode a hex digest, ignoring whitespace anywhere in the string
pub fn parse_hex_digest(text: &str) -> Result<Vec<u8>, String> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.len() % 2 != 0 {
        return Err(format!("odd number of hex digits ({})", compact.len()));
    }
    hex::decode(&compact).map_err(|e| e.to_string())
}

pub fn manifest_from_str(json: &str) -> Result<RimManifest, ManifestError> {
    let document: ManifestDocument = serde_json::from_str(json)?;
    let mut manifest = RimManifest::new();

    for identity in &document.software_identities {
        debug!("Loading software identity {}", identity.name);
        for item in identity.files.iter().chain(identity.variables.iter()) {
            if item.name.trim().is_empty() || item.hash.trim().is_empty() {
                continue;
            }
            let digest = parse_hex_digest(&item.hash).map_err(|reason| ManifestError::InvalidHash {
                name: item.name.clone(),
                reason,
            })?;
            manifest.insert(item.name.trim(), digest);
        }
    }
    Ok(manifest)
}

pub fn load_manifest(path: &Path) -> Result<RimManifest, ManifestError> {
    let contents = std::fs::read_to_string(path)?;
    let manifest = manifest_from_str(&contents)?;
    info!("Loaded {} reference digests from {}", manifest.len(), path.display());
    Ok(manifest)
}
