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

//! Wire decoding of log entries and event payloads.
//!
//! The legacy first entry and the agile entries are decoded straight off the log reader. Payload
//! decoding runs afterwards on a fresh reader scoped to one entry's event data, so a payload that
//! does not fit is reported against that entry only and never moves the outer position.

use log::{debug, warn};
use tpm_common_verifier::{AlgorithmId, SHA1_DIGEST_SIZE};

use crate::byte_reader::{ByteParseable, ByteReader};
use crate::error::EventLogError;
use crate::event::model::{
    AgileEntry, DigestRecord, EfiSpecIdEvent, EventPayload, EventType, LegacyEntry,
    TcgEfiSpecIdEventAlgorithmSize, UefiGuid, UefiVariableData, NO_ACTION_EVENT_SIZE,
    SPEC_ID_EVENT_SIGNATURE_03, UEFI_VARIABLE_HEADER_SIZE,
};

impl ByteParseable for UefiGuid {
    fn parse_from(parser: &mut ByteReader<'_>) -> Result<Self, EventLogError> {
        let data1 = parser.read_u32()?;
        let data2 = parser.read_u16()?;
        let data3 = parser.read_u16()?;
        let data4 = parser.read_array::<8>()?;
        Ok(Self { data1, data2, data3, data4 })
    }
}

impl ByteParseable for DigestRecord {
    /// Reads the algorithm id, then as many digest bytes as the registry assigns to it
    ///
    /// # Errors
    /// * `EventLogError::UnsupportedAlgorithm` - The id is not in the registry; the offset is that of the id field
    /// * `EventLogError::Truncated` - The buffer ends inside the record
    fn parse_from(parser: &mut ByteReader<'_>) -> Result<Self, EventLogError> {
        let offset = parser.position();
        let algorithm_id_raw = parser.read_u16()?;
        let algorithm_id = AlgorithmId::try_from(algorithm_id_raw).map_err(|_| {
            EventLogError::UnsupportedAlgorithm { algorithm_id: algorithm_id_raw, offset }
        })?;
        let digest = parser.read_bytes(algorithm_id.digest_size())?;
        Ok(DigestRecord::new(algorithm_id, digest))
    }
}

impl ByteParseable for EfiSpecIdEvent {
    /// Parses TCG_EfiSpecIDEvent, signature included
    fn parse_from(parser: &mut ByteReader<'_>) -> Result<Self, EventLogError> {
        let signature = parser.read_slice(NO_ACTION_EVENT_SIZE)?;
        if signature != SPEC_ID_EVENT_SIGNATURE_03 {
            return Err(EventLogError::MalformedPayload("missing Spec ID Event03 signature".to_string()));
        }
        let platform_class = parser.read_u32()?;
        let family_minor = parser.read_u8()?;
        let family_major = parser.read_u8()?;
        let spec_errata = parser.read_u8()?;
        let uintn_size = parser.read_u8()?;

        let algorithm_count = parser.read_u32()?;
        // Each announced algorithm takes four bytes; reject counts the buffer cannot hold
        // before reserving anything for them.
        if u64::from(algorithm_count) * 4 > parser.remaining() {
            return Err(EventLogError::MalformedPayload(format!(
                "Spec ID event announces {} algorithms but only {} bytes remain",
                algorithm_count,
                parser.remaining()
            )));
        }
        let mut digest_algorithms = Vec::with_capacity(algorithm_count as usize);
        for _ in 0..algorithm_count {
            let algorithm_id = parser.read_u16()?;
            let digest_size = parser.read_u16()?;
            digest_algorithms.push(TcgEfiSpecIdEventAlgorithmSize { algorithm_id, digest_size });
        }

        let vendor_info_size = parser.read_u8()?;
        let vendor_info = parser.read_bytes(vendor_info_size as usize)?;

        Ok(EfiSpecIdEvent {
            platform_class,
            family_minor,
            family_major,
            spec_errata,
            uintn_size,
            digest_algorithms,
            vendor_info,
        })
    }
}

impl ByteParseable for LegacyEntry {
    /// Parses the TCG_PCR_EVENT that opens every log
    ///
    /// The digest is always 20 bytes, whatever algorithm the platform actually uses.
    fn parse_from(parser: &mut ByteReader<'_>) -> Result<Self, EventLogError> {
        let pcr_index = parser.read_u32()?;
        let event_type = EventType::from_u32(parser.read_u32()?);
        let digest = parser.read_array::<SHA1_DIGEST_SIZE>()?;
        let event_data_size = parser.read_u32()?;
        let event_data = parser.read_bytes(event_data_size as usize)?;

        let spec_id = if event_type == EventType::EvNoAction
            && event_data.starts_with(SPEC_ID_EVENT_SIGNATURE_03)
        {
            match EfiSpecIdEvent::parse_from(&mut ByteReader::new(&event_data)) {
                Ok(spec_id) => Some(spec_id),
                Err(e) => {
                    warn!("Failed to decode Spec ID event in first log entry: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(LegacyEntry {
            pcr_index,
            event_type,
            digest,
            event_data_size,
            event_data,
            spec_id,
        })
    }
}

impl ByteParseable for AgileEntry {
    /// Parses one TCG_PCR_EVENT2
    ///
    /// Any failure aborts the entry; nothing partially read is returned.
    fn parse_from(parser: &mut ByteReader<'_>) -> Result<Self, EventLogError> {
        let pcr_index = parser.read_u32()?;
        let event_type = EventType::from_u32(parser.read_u32()?);

        let digest_count = parser.read_u32()?;
        // The smallest digest record is 2 + 20 bytes, which bounds the preallocation.
        let capacity = (digest_count as u64).min(parser.remaining() / (2 + SHA1_DIGEST_SIZE as u64));
        let mut digests = Vec::with_capacity(capacity as usize);
        for _ in 0..digest_count {
            digests.push(DigestRecord::parse_from(parser)?);
        }

        let event_size = parser.read_u32()?;
        let event_data = parser.read_bytes(event_size as usize)?;
        let payload = decode_payload(event_type, &event_data);

        Ok(AgileEntry {
            pcr_index,
            event_type,
            digests,
            event_size,
            event_data,
            payload,
        })
    }
}

impl UefiVariableData {
    /// Decodes a UEFI_VARIABLE_DATA structure that must span `data` exactly
    ///
    /// # Errors
    /// * `EventLogError::MalformedPayload` - The header is short, a length overflows, or the
    ///   declared name and data lengths do not add up to the event size
    pub fn decode(data: &[u8]) -> Result<Self, EventLogError> {
        let mut parser = ByteReader::new(data);
        let malformed = |e: EventLogError| EventLogError::MalformedPayload(e.to_string());

        let variable_guid = UefiGuid::parse_from(&mut parser).map_err(malformed)?;
        let name_units = parser.read_u64().map_err(malformed)?;
        let data_length = parser.read_u64().map_err(malformed)?;

        let name_length = name_units.checked_mul(2).ok_or_else(|| {
            EventLogError::MalformedPayload(format!("variable name length {} overflows", name_units))
        })?;
        let expected = (UEFI_VARIABLE_HEADER_SIZE as u64)
            .checked_add(name_length)
            .and_then(|size| size.checked_add(data_length));
        if expected != Some(data.len() as u64) {
            return Err(EventLogError::MalformedPayload(format!(
                "UEFI variable declares {} name bytes and {} data bytes, event size is {}",
                name_length,
                data_length,
                data.len()
            )));
        }
        // Both lengths fit in `data.len()` once the size check passed.
        let unicode_name = parser.read_utf16_units(name_units as usize).map_err(malformed)?;
        let variable_data = parser.read_bytes(data_length as usize).map_err(malformed)?;

        Ok(UefiVariableData {
            variable_guid,
            name_length,
            data_length,
            unicode_name,
            variable_data,
        })
    }
}

/// Secondary decode of an agile entry's event data, dispatched on the event type
///
/// Only EFI-variable events carry a structured payload. A payload that fails to decode is
/// returned as `EventPayload::Malformed`; the entry itself stays valid.
pub fn decode_payload(event_type: EventType, event_data: &[u8]) -> EventPayload {
    if !event_type.is_efi_variable() {
        return EventPayload::Raw;
    }
    match UefiVariableData::decode(event_data) {
        Ok(variable) => {
            debug!("Decoded {} variable {}", event_type, variable.trimmed_name());
            EventPayload::UefiVariable(variable)
        }
        Err(EventLogError::MalformedPayload(reason)) => {
            warn!("Malformed {} payload: {}", event_type, reason);
            EventPayload::Malformed(reason)
        }
        Err(e) => {
            warn!("Malformed {} payload: {}", event_type, e);
            EventPayload::Malformed(e.to_string())
        }
    }
}
