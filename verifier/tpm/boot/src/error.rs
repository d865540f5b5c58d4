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

//! Error types for event log decoding and verification.

use thiserror::Error;
use tpm_common_verifier::DigestError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventLogError {
    /// The buffer ended in the middle of a field. Fatal for the whole log.
    #[error("Truncated: requested {requested} bytes at offset {offset} but only {remaining} remain")]
    Truncated {
        offset: u64,
        requested: u64,
        remaining: u64,
    },

    /// A digest used an algorithm outside the registry, so its length is unknown. Fatal for the whole log.
    #[error("Unsupported digest algorithm 0x{algorithm_id:04X} at offset {offset}")]
    UnsupportedAlgorithm {
        algorithm_id: u16,
        offset: u64,
    },

    /// An event payload could not be decoded. Scoped to one entry.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Input error: {0}")]
    InputError(String),

    #[error("Crypto error: {0}")]
    CryptoError(String),
}

impl EventLogError {
    /// Byte offset at which a fatal decode error occurred
    pub fn offset(&self) -> Option<u64> {
        match self {
            EventLogError::Truncated { offset, .. } => Some(*offset),
            EventLogError::UnsupportedAlgorithm { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// Whether the error corrupts every following offset in the log
    pub fn is_fatal(&self) -> bool {
        matches!(self, EventLogError::Truncated { .. } | EventLogError::UnsupportedAlgorithm { .. })
    }
}

impl From<DigestError> for EventLogError {
    fn from(e: DigestError) -> Self {
        EventLogError::CryptoError(e.to_string())
    }
}
