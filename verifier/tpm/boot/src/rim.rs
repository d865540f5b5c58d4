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

//! Reference Integrity Manifest access.
//!
//! The verifier only ever asks a manifest one question: what digest is expected for this
//! component or variable name. Where that mapping comes from is up to the caller.

use std::collections::HashMap;

/// Source of expected digests, keyed by component or variable name
///
/// Lookups are case-insensitive: `"SecureBoot"` and `"secureboot"` name the same entry.
pub trait ReferenceManifest {
    fn lookup(&self, name: &str) -> Option<Vec<u8>>;
}

/// In-memory manifest with names folded to lowercase
///
/// Inserting a name that is already present replaces its digest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RimManifest {
    entries: HashMap<String, Vec<u8>>,
}

impl RimManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the digest previously stored under the same name, if any
    pub fn insert(&mut self, name: impl AsRef<str>, digest: Vec<u8>) -> Option<Vec<u8>> {
        self.entries.insert(name.as_ref().to_lowercase(), digest)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl ReferenceManifest for RimManifest {
    fn lookup(&self, name: &str) -> Option<Vec<u8>> {
        self.entries.get(&name.to_lowercase()).cloned()
    }
}

impl<S: AsRef<str>> FromIterator<(S, Vec<u8>)> for RimManifest {
    fn from_iter<I: IntoIterator<Item = (S, Vec<u8>)>>(iter: I) -> Self {
        let mut manifest = RimManifest::new();
        for (name, digest) in iter {
            manifest.insert(name, digest);
        }
        manifest
    }
}
