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

//! Hash helpers backed by OpenSSL, used to recompute event digests.

use openssl::hash::{hash, MessageDigest};
use thiserror::Error;
use crate::algorithm::AlgorithmId;

#[derive(Error, Debug)]
#[error("Failed to compute {algorithm} digest: {source}")]
pub struct DigestError {
    pub algorithm: AlgorithmId,
    #[source]
    pub source: openssl::error::ErrorStack,
}

pub struct CryptoVerifier;

impl CryptoVerifier {
    pub fn algorithm_to_message_digest(alg: AlgorithmId) -> MessageDigest {
        match alg {
            AlgorithmId::Sha1 => MessageDigest::sha1(),
            AlgorithmId::Sha256 => MessageDigest::sha256(),
            AlgorithmId::Sha384 => MessageDigest::sha384(),
            AlgorithmId::Sha512 => MessageDigest::sha512(),
        }
    }

    /// Compute the digest of `data` with the given algorithm
    ///
    /// # Errors
    /// * `DigestError` - If OpenSSL fails to produce the digest
    pub fn compute_digest(alg: AlgorithmId, data: &[u8]) -> Result<Vec<u8>, DigestError> {
        hash(Self::algorithm_to_message_digest(alg), data)
            .map(|bytes| bytes.to_vec())
            .map_err(|source| DigestError { algorithm: alg, source })
    }

    /// Hex-encoded digest, lowercase
    pub fn compute_digest_hex(alg: AlgorithmId, data: &[u8]) -> Result<String, DigestError> {
        Self::compute_digest(alg, data).map(hex::encode)
    }
}
