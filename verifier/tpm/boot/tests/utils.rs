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

//! Builders for synthetic binary event logs.

#![allow(dead_code)]

pub const EV_POST_CODE: u32 = 0x00000001;
pub const EV_NO_ACTION: u32 = 0x00000003;
pub const EV_SEPARATOR: u32 = 0x00000004;
pub const EV_S_CRTM_CONTENTS: u32 = 0x00000007;
pub const EV_S_CRTM_VERSION: u32 = 0x00000008;
pub const EV_EFI_VARIABLE_DRIVER_CONFIG: u32 = 0x80000001;
pub const EV_EFI_VARIABLE_BOOT: u32 = 0x80000002;
pub const EV_EFI_VARIABLE_BOOT2: u32 = 0x8000000C;
pub const EV_EFI_HCRTM_EVENT: u32 = 0x80000010;
pub const EV_EFI_VARIABLE_AUTHORITY: u32 = 0x800000E0;

pub const TPM_ALG_SHA1: u16 = 0x0004;
pub const TPM_ALG_SHA256: u16 = 0x000B;
pub const TPM_ALG_SHA384: u16 = 0x000C;
pub const TPM_ALG_SHA512: u16 = 0x000D;

/// EFI_GLOBAL_VARIABLE, 8BE4DF61-93CA-11D2-AA0D-00E098032B8C
pub const EFI_GLOBAL_VARIABLE: [u8; 16] = [
    0x61, 0xDF, 0xE4, 0x8B, 0xCA, 0x93, 0xD2, 0x11, 0xAA, 0x0D, 0x00, 0xE0, 0x98, 0x03, 0x2B, 0x8C,
];

/// Size of a legacy entry with no event data
pub const LEGACY_HEADER_SIZE: usize = 4 + 4 + 20 + 4;

pub fn legacy_entry(pcr_index: u32, event_type: u32, digest: [u8; 20], event_data: &[u8]) -> Vec<u8> {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&pcr_index.to_le_bytes());
    buffer.extend_from_slice(&event_type.to_le_bytes());
    buffer.extend_from_slice(&digest);
    buffer.extend_from_slice(&(event_data.len() as u32).to_le_bytes());
    buffer.extend_from_slice(event_data);
    buffer
}

pub fn agile_entry(pcr_index: u32, event_type: u32, digests: &[(u16, Vec<u8>)], event_data: &[u8]) -> Vec<u8> {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&pcr_index.to_le_bytes());
    buffer.extend_from_slice(&event_type.to_le_bytes());
    buffer.extend_from_slice(&(digests.len() as u32).to_le_bytes());
    for (algorithm_id, digest) in digests {
        buffer.extend_from_slice(&algorithm_id.to_le_bytes());
        buffer.extend_from_slice(digest);
    }
    buffer.extend_from_slice(&(event_data.len() as u32).to_le_bytes());
    buffer.extend_from_slice(event_data);
    buffer
}

/// TCG_EfiSpecIDEvent announcing the given (algorithm id, digest size) pairs
pub fn spec_id_event(algorithms: &[(u16, u16)]) -> Vec<u8> {
    let mut buffer = b"Spec ID Event03\0".to_vec();
    buffer.extend_from_slice(&0u32.to_le_bytes());
    buffer.extend_from_slice(&[0, 2, 0, 2]);
    buffer.extend_from_slice(&(algorithms.len() as u32).to_le_bytes());
    for (algorithm_id, digest_size) in algorithms {
        buffer.extend_from_slice(&algorithm_id.to_le_bytes());
        buffer.extend_from_slice(&digest_size.to_le_bytes());
    }
    buffer.push(0);
    buffer
}

/// UEFI_VARIABLE_DATA with the name length counted in UTF-16 code units
pub fn uefi_variable(name: &str, data: &[u8]) -> Vec<u8> {
    let units: Vec<u16> = name.encode_utf16().collect();
    let mut buffer = EFI_GLOBAL_VARIABLE.to_vec();
    buffer.extend_from_slice(&(units.len() as u64).to_le_bytes());
    buffer.extend_from_slice(&(data.len() as u64).to_le_bytes());
    for unit in units {
        buffer.extend_from_slice(&unit.to_le_bytes());
    }
    buffer.extend_from_slice(data);
    buffer
}

/// Appends entries to a log that starts with a Spec ID legacy entry
pub struct LogBuilder {
    bytes: Vec<u8>,
}

impl LogBuilder {
    pub fn new() -> Self {
        let spec_id = spec_id_event(&[(TPM_ALG_SHA1, 20), (TPM_ALG_SHA256, 32)]);
        Self::with_legacy(legacy_entry(0, EV_NO_ACTION, [0u8; 20], &spec_id))
    }

    pub fn with_legacy(legacy: Vec<u8>) -> Self {
        Self { bytes: legacy }
    }

    pub fn agile(mut self, pcr_index: u32, event_type: u32, digests: &[(u16, Vec<u8>)], event_data: &[u8]) -> Self {
        self.bytes.extend_from_slice(&agile_entry(pcr_index, event_type, digests, event_data));
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}
