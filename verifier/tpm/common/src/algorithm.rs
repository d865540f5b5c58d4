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

//! Digest algorithm registry.
//!
//! Maps a TPM algorithm identifier (TPM_ALG_ID) to the length of the digest it produces.
//! Only the hash algorithms that may appear in a measured boot log are registered; any other
//! identifier is rejected, because a digest of unknown length makes every following offset in
//! the log unrecoverable.

use serde::{Serialize, Serializer};
use std::convert::TryFrom;
use std::fmt;
use thiserror::Error;

/// SHA-1 digest length in bytes
pub const SHA1_DIGEST_SIZE: usize = 20;
/// SHA-256 digest length in bytes
pub const SHA256_DIGEST_SIZE: usize = 32;
/// SHA-384 digest length in bytes
pub const SHA384_DIGEST_SIZE: usize = 48;
/// SHA-512 digest length in bytes
pub const SHA512_DIGEST_SIZE: usize = 64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlgorithmError {
    #[error("Unsupported algorithm id: 0x{0:04X}")]
    Unsupported(u16),

    #[error("Unsupported algorithm name: {0}")]
    UnsupportedName(String),
}

/// Hash algorithm identifiers as defined by the TCG algorithm registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum AlgorithmId {
    Sha1 = 0x0004,
    Sha256 = 0x000B,
    Sha384 = 0x000C,
    Sha512 = 0x000D,
}

impl TryFrom<u16> for AlgorithmId {
    type Error = AlgorithmError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0x0004 => Ok(AlgorithmId::Sha1),
            0x000B => Ok(AlgorithmId::Sha256),
            0x000C => Ok(AlgorithmId::Sha384),
            0x000D => Ok(AlgorithmId::Sha512),
            _ => Err(AlgorithmError::Unsupported(value)),
        }
    }
}

impl AlgorithmId {
    /// Parse a lowercase algorithm name such as "sha256"
    ///
    /// # Errors
    /// * `AlgorithmError::UnsupportedName` - If the name is not a registered algorithm
    pub fn from_name(name: &str) -> Result<Self, AlgorithmError> {
        match name.to_lowercase().as_str() {
            "sha1" => Ok(AlgorithmId::Sha1),
            "sha256" => Ok(AlgorithmId::Sha256),
            "sha384" => Ok(AlgorithmId::Sha384),
            "sha512" => Ok(AlgorithmId::Sha512),
            _ => Err(AlgorithmError::UnsupportedName(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AlgorithmId::Sha1 => "sha1",
            AlgorithmId::Sha256 => "sha256",
            AlgorithmId::Sha384 => "sha384",
            AlgorithmId::Sha512 => "sha512",
        }
    }

    /// Raw TPM_ALG_ID value
    pub fn id(&self) -> u16 {
        *self as u16
    }

    /// Digest length in bytes
    pub fn digest_size(&self) -> usize {
        match self {
            AlgorithmId::Sha1 => SHA1_DIGEST_SIZE,
            AlgorithmId::Sha256 => SHA256_DIGEST_SIZE,
            AlgorithmId::Sha384 => SHA384_DIGEST_SIZE,
            AlgorithmId::Sha512 => SHA512_DIGEST_SIZE,
        }
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for AlgorithmId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Look up the digest length for a raw algorithm identifier
///
/// # Parameters
/// * `algorithm_id` - TPM_ALG_ID read from the log
///
/// # Returns
/// * `Result<usize, AlgorithmError>` - Digest length in bytes
///
/// # Errors
/// * `AlgorithmError::Unsupported` - If the identifier is not one of SHA-1/256/384/512
pub fn length_for(algorithm_id: u16) -> Result<usize, AlgorithmError> {
    AlgorithmId::try_from(algorithm_id).map(|alg| alg.digest_size())
}
