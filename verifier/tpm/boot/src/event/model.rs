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

//! Event Type Definitions
//!
//! Types describing a decoded TCG event log: event type tags, digest records, the legacy
//! (TPM 1.2 format) first entry, crypto-agile (TPM 2.0 format) entries and the structured
//! payloads decoded from them. Every entry type can be encoded back into its wire format.

use serde::{Serialize, Serializer};
use std::fmt;
use tpm_common_verifier::{AlgorithmId, SHA1_DIGEST_SIZE};
use uuid::Uuid;

use crate::byte_reader::UEFI_GUID_SIZE;

/// Size of the signature field at the start of an EV_NO_ACTION event
pub const NO_ACTION_EVENT_SIZE: usize = 16;

/// Fixed part of UEFI_VARIABLE_DATA: GUID + name length + data length
pub const UEFI_VARIABLE_HEADER_SIZE: usize = UEFI_GUID_SIZE + 8 + 8;

/// Spec id event signature 03
pub const SPEC_ID_EVENT_SIGNATURE_03: &[u8] = &[
    0x53, 0x70, 0x65, 0x63, 0x20,  // "Spec "
    0x49, 0x44, 0x20,              // "ID "
    0x45, 0x76, 0x65, 0x6E, 0x74,  // "Event"
    0x30, 0x33,                    // "03"
    0x00                           // Null terminator
];

/// TCG Event Type
///
/// Closed set of the event types defined by the TCG PC Client and EFI platform specifications.
/// Codes outside the set are kept as `Unknown(code)` and are never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    EvPrebootCert,
    EvPostCode,
    EvUnused,
    EvNoAction,
    EvSeparator,
    EvAction,
    EvEventTag,
    EvSCrtmContents,
    EvSCrtmVersion,
    EvCpuMicrocode,
    EvPlatformConfigFlags,
    EvTableOfDevices,
    EvCompactHash,
    EvIpl,
    EvIplPartitionData,
    EvNonhostCode,
    EvNonhostConfig,
    EvNonhostInfo,
    EvOmitBootDeviceEvents,
    EvPostCode2,

    // EFI specific event types
    EvEfiEventBase,
    EvEfiVariableDriverConfig,
    EvEfiVariableBoot,
    EvEfiBootServicesApplication,
    EvEfiBootServicesDriver,
    EvEfiRuntimeServicesDriver,
    EvEfiGptEvent,
    EvEfiAction,
    EvEfiPlatformFirmwareBlob,
    EvEfiHandoffTables,
    EvEfiPlatformFirmwareBlob2,
    EvEfiHandoffTables2,
    EvEfiVariableBoot2,
    EvEfiGptEvent2,
    EvEfiHcrtmEvent,

    EvEfiVariableAuthority,
    EvEfiSpdmFirmwareBlob,
    EvEfiSpdmFirmwareConfig,
    EvEfiSpdmDevicePolicy,
    EvEfiSpdmDeviceAuthority,

    Unknown(u32),
}

impl EventType {
    pub fn from_u32(value: u32) -> Self {
        match value {
            0x00000000 => Self::EvPrebootCert,
            0x00000001 => Self::EvPostCode,
            0x00000002 => Self::EvUnused,
            0x00000003 => Self::EvNoAction,
            0x00000004 => Self::EvSeparator,
            0x00000005 => Self::EvAction,
            0x00000006 => Self::EvEventTag,
            0x00000007 => Self::EvSCrtmContents,
            0x00000008 => Self::EvSCrtmVersion,
            0x00000009 => Self::EvCpuMicrocode,
            0x0000000A => Self::EvPlatformConfigFlags,
            0x0000000B => Self::EvTableOfDevices,
            0x0000000C => Self::EvCompactHash,
            0x0000000D => Self::EvIpl,
            0x0000000E => Self::EvIplPartitionData,
            0x0000000F => Self::EvNonhostCode,
            0x00000010 => Self::EvNonhostConfig,
            0x00000011 => Self::EvNonhostInfo,
            0x00000012 => Self::EvOmitBootDeviceEvents,
            0x00000013 => Self::EvPostCode2,

            0x80000000 => Self::EvEfiEventBase,
            0x80000001 => Self::EvEfiVariableDriverConfig,
            0x80000002 => Self::EvEfiVariableBoot,
            0x80000003 => Self::EvEfiBootServicesApplication,
            0x80000004 => Self::EvEfiBootServicesDriver,
            0x80000005 => Self::EvEfiRuntimeServicesDriver,
            0x80000006 => Self::EvEfiGptEvent,
            0x80000007 => Self::EvEfiAction,
            0x80000008 => Self::EvEfiPlatformFirmwareBlob,
            0x80000009 => Self::EvEfiHandoffTables,
            0x8000000A => Self::EvEfiPlatformFirmwareBlob2,
            0x8000000B => Self::EvEfiHandoffTables2,
            0x8000000C => Self::EvEfiVariableBoot2,
            0x8000000D => Self::EvEfiGptEvent2,
            0x80000010 => Self::EvEfiHcrtmEvent,

            0x800000E0 => Self::EvEfiVariableAuthority,
            0x800000E1 => Self::EvEfiSpdmFirmwareBlob,
            0x800000E2 => Self::EvEfiSpdmFirmwareConfig,
            0x800000E3 => Self::EvEfiSpdmDevicePolicy,
            0x800000E4 => Self::EvEfiSpdmDeviceAuthority,
            code => Self::Unknown(code),
        }
    }

    /// Raw event type code as found on the wire
    pub fn code(&self) -> u32 {
        match self {
            Self::EvPrebootCert => 0x00000000,
            Self::EvPostCode => 0x00000001,
            Self::EvUnused => 0x00000002,
            Self::EvNoAction => 0x00000003,
            Self::EvSeparator => 0x00000004,
            Self::EvAction => 0x00000005,
            Self::EvEventTag => 0x00000006,
            Self::EvSCrtmContents => 0x00000007,
            Self::EvSCrtmVersion => 0x00000008,
            Self::EvCpuMicrocode => 0x00000009,
            Self::EvPlatformConfigFlags => 0x0000000A,
            Self::EvTableOfDevices => 0x0000000B,
            Self::EvCompactHash => 0x0000000C,
            Self::EvIpl => 0x0000000D,
            Self::EvIplPartitionData => 0x0000000E,
            Self::EvNonhostCode => 0x0000000F,
            Self::EvNonhostConfig => 0x00000010,
            Self::EvNonhostInfo => 0x00000011,
            Self::EvOmitBootDeviceEvents => 0x00000012,
            Self::EvPostCode2 => 0x00000013,
            Self::EvEfiEventBase => 0x80000000,
            Self::EvEfiVariableDriverConfig => 0x80000001,
            Self::EvEfiVariableBoot => 0x80000002,
            Self::EvEfiBootServicesApplication => 0x80000003,
            Self::EvEfiBootServicesDriver => 0x80000004,
            Self::EvEfiRuntimeServicesDriver => 0x80000005,
            Self::EvEfiGptEvent => 0x80000006,
            Self::EvEfiAction => 0x80000007,
            Self::EvEfiPlatformFirmwareBlob => 0x80000008,
            Self::EvEfiHandoffTables => 0x80000009,
            Self::EvEfiPlatformFirmwareBlob2 => 0x8000000A,
            Self::EvEfiHandoffTables2 => 0x8000000B,
            Self::EvEfiVariableBoot2 => 0x8000000C,
            Self::EvEfiGptEvent2 => 0x8000000D,
            Self::EvEfiHcrtmEvent => 0x80000010,
            Self::EvEfiVariableAuthority => 0x800000E0,
            Self::EvEfiSpdmFirmwareBlob => 0x800000E1,
            Self::EvEfiSpdmFirmwareConfig => 0x800000E2,
            Self::EvEfiSpdmDevicePolicy => 0x800000E3,
            Self::EvEfiSpdmDeviceAuthority => 0x800000E4,
            Self::Unknown(code) => *code,
        }
    }

    /// Events whose payload is a UEFI_VARIABLE_DATA structure
    pub fn is_efi_variable(&self) -> bool {
        matches!(
            self,
            Self::EvEfiVariableDriverConfig
                | Self::EvEfiVariableBoot
                | Self::EvEfiVariableBoot2
                | Self::EvEfiVariableAuthority
        )
    }

    /// Events whose recorded digest is the hash of the event data itself
    pub fn digest_covers_event_data(&self) -> bool {
        matches!(
            self,
            Self::EvSeparator
                | Self::EvEfiVariableDriverConfig
                | Self::EvEfiVariableAuthority
                | Self::EvPlatformConfigFlags
                | Self::EvTableOfDevices
                | Self::EvOmitBootDeviceEvents
                | Self::EvEfiGptEvent
        )
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EvPrebootCert => write!(f, "EV_PREBOOT_CERT"),
            Self::EvPostCode => write!(f, "EV_POST_CODE"),
            Self::EvUnused => write!(f, "EV_UNUSED"),
            Self::EvNoAction => write!(f, "EV_NO_ACTION"),
            Self::EvSeparator => write!(f, "EV_SEPARATOR"),
            Self::EvAction => write!(f, "EV_ACTION"),
            Self::EvEventTag => write!(f, "EV_EVENT_TAG"),
            Self::EvSCrtmContents => write!(f, "EV_S_CRTM_CONTENTS"),
            Self::EvSCrtmVersion => write!(f, "EV_S_CRTM_VERSION"),
            Self::EvCpuMicrocode => write!(f, "EV_CPU_MICROCODE"),
            Self::EvPlatformConfigFlags => write!(f, "EV_PLATFORM_CONFIG_FLAGS"),
            Self::EvTableOfDevices => write!(f, "EV_TABLE_OF_DEVICES"),
            Self::EvCompactHash => write!(f, "EV_COMPACT_HASH"),
            Self::EvIpl => write!(f, "EV_IPL"),
            Self::EvIplPartitionData => write!(f, "EV_IPL_PARTITION_DATA"),
            Self::EvNonhostCode => write!(f, "EV_NONHOST_CODE"),
            Self::EvNonhostConfig => write!(f, "EV_NONHOST_CONFIG"),
            Self::EvNonhostInfo => write!(f, "EV_NONHOST_INFO"),
            Self::EvOmitBootDeviceEvents => write!(f, "EV_OMIT_BOOT_DEVICE_EVENTS"),
            Self::EvPostCode2 => write!(f, "EV_POST_CODE2"),
            Self::EvEfiEventBase => write!(f, "EV_EFI_EVENT_BASE"),
            Self::EvEfiVariableDriverConfig => write!(f, "EV_EFI_VARIABLE_DRIVER_CONFIG"),
            Self::EvEfiVariableBoot => write!(f, "EV_EFI_VARIABLE_BOOT"),
            Self::EvEfiBootServicesApplication => write!(f, "EV_EFI_BOOT_SERVICES_APPLICATION"),
            Self::EvEfiBootServicesDriver => write!(f, "EV_EFI_BOOT_SERVICES_DRIVER"),
            Self::EvEfiRuntimeServicesDriver => write!(f, "EV_EFI_RUNTIME_SERVICES_DRIVER"),
            Self::EvEfiGptEvent => write!(f, "EV_EFI_GPT_EVENT"),
            Self::EvEfiAction => write!(f, "EV_EFI_ACTION"),
            Self::EvEfiPlatformFirmwareBlob => write!(f, "EV_EFI_PLATFORM_FIRMWARE_BLOB"),
            Self::EvEfiHandoffTables => write!(f, "EV_EFI_HANDOFF_TABLES"),
            Self::EvEfiPlatformFirmwareBlob2 => write!(f, "EV_EFI_PLATFORM_FIRMWARE_BLOB2"),
            Self::EvEfiHandoffTables2 => write!(f, "EV_EFI_HANDOFF_TABLES2"),
            Self::EvEfiVariableBoot2 => write!(f, "EV_EFI_VARIABLE_BOOT2"),
            Self::EvEfiGptEvent2 => write!(f, "EV_EFI_GPT_EVENT2"),
            Self::EvEfiHcrtmEvent => write!(f, "EV_EFI_HCRTM_EVENT"),
            Self::EvEfiVariableAuthority => write!(f, "EV_EFI_VARIABLE_AUTHORITY"),
            Self::EvEfiSpdmFirmwareBlob => write!(f, "EV_EFI_SPDM_FIRMWARE_BLOB"),
            Self::EvEfiSpdmFirmwareConfig => write!(f, "EV_EFI_SPDM_FIRMWARE_CONFIG"),
            Self::EvEfiSpdmDevicePolicy => write!(f, "EV_EFI_SPDM_DEVICE_POLICY"),
            Self::EvEfiSpdmDeviceAuthority => write!(f, "EV_EFI_SPDM_DEVICE_AUTHORITY"),
            Self::Unknown(code) => write!(f, "UNKNOWN_0x{:08X}", code),
        }
    }
}

impl Serialize for EventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One digest of an agile entry: algorithm id followed by a digest of the registered length
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestRecord {
    pub algorithm_id: AlgorithmId,
    pub digest: Vec<u8>,
}

impl DigestRecord {
    pub fn new(algorithm_id: AlgorithmId, digest: Vec<u8>) -> Self {
        Self { algorithm_id, digest }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(2 + self.digest.len());
        buffer.extend_from_slice(&self.algorithm_id.id().to_le_bytes());
        buffer.extend_from_slice(&self.digest);
        buffer
    }
}

/// EFI_GUID in its mixed-endian wire layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UefiGuid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl UefiGuid {
    pub fn to_uuid(&self) -> Uuid {
        Uuid::from_fields(self.data1, self.data2, self.data3, &self.data4)
    }

    pub fn to_bytes(&self) -> [u8; UEFI_GUID_SIZE] {
        let mut buffer = [0u8; UEFI_GUID_SIZE];
        buffer[0..4].copy_from_slice(&self.data1.to_le_bytes());
        buffer[4..6].copy_from_slice(&self.data2.to_le_bytes());
        buffer[6..8].copy_from_slice(&self.data3.to_le_bytes());
        buffer[8..16].copy_from_slice(&self.data4);
        buffer
    }
}

/// Canonical `D1-D2-D3-D4[0:2]-D4[2:8]` rendering in uppercase hex
impl fmt::Display for UefiGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.to_uuid())
    }
}

/// UEFI_VARIABLE_DATA
///
/// `name_length` is the byte length of the name; the wire field counts UTF-16 code units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UefiVariableData {
    pub variable_guid: UefiGuid,
    pub name_length: u64,
    pub data_length: u64,
    pub unicode_name: Vec<u16>,
    pub variable_data: Vec<u8>,
}

impl UefiVariableData {
    /// Decoded variable name, invalid code units replaced with U+FFFD
    pub fn name(&self) -> String {
        String::from_utf16_lossy(&self.unicode_name)
    }

    /// Variable name with trailing NUL characters removed, used as the manifest lookup key
    pub fn trimmed_name(&self) -> String {
        self.name().trim_end_matches('\0').to_string()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(UEFI_VARIABLE_HEADER_SIZE + self.unicode_name.len() * 2 + self.variable_data.len());
        buffer.extend_from_slice(&self.variable_guid.to_bytes());
        buffer.extend_from_slice(&(self.name_length / 2).to_le_bytes());
        buffer.extend_from_slice(&self.data_length.to_le_bytes());
        for unit in &self.unicode_name {
            buffer.extend_from_slice(&unit.to_le_bytes());
        }
        buffer.extend_from_slice(&self.variable_data);
        buffer
    }
}

/// Algorithm announced by the Spec ID event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TcgEfiSpecIdEventAlgorithmSize {
    pub algorithm_id: u16,
    pub digest_size: u16,
}

/// TCG_EfiSpecIDEvent, carried by the legacy first entry of a crypto-agile log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EfiSpecIdEvent {
    pub platform_class: u32,
    pub family_minor: u8,
    pub family_major: u8,
    pub spec_errata: u8,
    pub uintn_size: u8,
    pub digest_algorithms: Vec<TcgEfiSpecIdEventAlgorithmSize>,
    pub vendor_info: Vec<u8>,
}

impl EfiSpecIdEvent {
    pub fn announces(&self, algorithm_id: u16) -> bool {
        self.digest_algorithms.iter().any(|a| a.algorithm_id == algorithm_id)
    }
}

/// Result of the secondary payload decode of an agile entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    /// No structured decode applies; the raw event data is all there is
    Raw,
    UefiVariable(UefiVariableData),
    /// The event type calls for a structured decode but the data did not fit
    Malformed(String),
}

/// First entry of every log, TCG_PCR_EVENT (TPM 1.2 layout, fixed SHA-1 sized digest)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyEntry {
    pub pcr_index: u32,
    pub event_type: EventType,
    pub digest: [u8; SHA1_DIGEST_SIZE],
    pub event_data_size: u32,
    pub event_data: Vec<u8>,
    pub spec_id: Option<EfiSpecIdEvent>,
}

impl LegacyEntry {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(4 + 4 + SHA1_DIGEST_SIZE + 4 + self.event_data.len());
        buffer.extend_from_slice(&self.pcr_index.to_le_bytes());
        buffer.extend_from_slice(&self.event_type.code().to_le_bytes());
        buffer.extend_from_slice(&self.digest);
        buffer.extend_from_slice(&self.event_data_size.to_le_bytes());
        buffer.extend_from_slice(&self.event_data);
        buffer
    }
}

/// TCG_PCR_EVENT2 (crypto-agile layout)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgileEntry {
    pub pcr_index: u32,
    pub event_type: EventType,
    pub digests: Vec<DigestRecord>,
    pub event_size: u32,
    pub event_data: Vec<u8>,
    pub payload: EventPayload,
}

impl AgileEntry {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&self.pcr_index.to_le_bytes());
        buffer.extend_from_slice(&self.event_type.code().to_le_bytes());
        buffer.extend_from_slice(&(self.digests.len() as u32).to_le_bytes());
        for digest in &self.digests {
            buffer.extend_from_slice(&digest.to_bytes());
        }
        buffer.extend_from_slice(&self.event_size.to_le_bytes());
        buffer.extend_from_slice(&self.event_data);
        buffer
    }
}

/// An entry produced by the streaming decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    Legacy(LegacyEntry),
    Agile(AgileEntry),
}

impl LogEntry {
    pub fn as_entry_ref(&self) -> LogEntryRef<'_> {
        match self {
            LogEntry::Legacy(entry) => LogEntryRef::Legacy(entry),
            LogEntry::Agile(entry) => LogEntryRef::Agile(entry),
        }
    }
}

/// Borrowed view over either entry layout, used by verification
#[derive(Debug, Clone, Copy)]
pub enum LogEntryRef<'a> {
    Legacy(&'a LegacyEntry),
    Agile(&'a AgileEntry),
}

impl<'a> LogEntryRef<'a> {
    pub fn pcr_index(&self) -> u32 {
        match self {
            LogEntryRef::Legacy(entry) => entry.pcr_index,
            LogEntryRef::Agile(entry) => entry.pcr_index,
        }
    }

    pub fn event_type(&self) -> EventType {
        match self {
            LogEntryRef::Legacy(entry) => entry.event_type,
            LogEntryRef::Agile(entry) => entry.event_type,
        }
    }

    pub fn event_data(&self) -> &'a [u8] {
        match self {
            LogEntryRef::Legacy(entry) => &entry.event_data,
            LogEntryRef::Agile(entry) => &entry.event_data,
        }
    }

    /// Every recorded digest with its bank; the legacy digest counts as a single SHA-1 bank
    pub fn digests(&self) -> Vec<(AlgorithmId, &'a [u8])> {
        match self {
            LogEntryRef::Legacy(entry) => vec![(AlgorithmId::Sha1, &entry.digest[..])],
            LogEntryRef::Agile(entry) => entry
                .digests
                .iter()
                .map(|d| (d.algorithm_id, d.digest.as_slice()))
                .collect(),
        }
    }

    /// Structured payload; the legacy entry never carries one
    pub fn payload(&self) -> Option<&'a EventPayload> {
        match self {
            LogEntryRef::Legacy(_) => None,
            LogEntryRef::Agile(entry) => Some(&entry.payload),
        }
    }
}
