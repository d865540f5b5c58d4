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

use tpm_boot_verifier::{
    decode_payload, EventLog, EventLogError, EventPayload, EventType, UefiGuid, UefiVariableData,
};

mod utils;
use utils::*;

#[test]
fn test_decode_well_formed_variable() {
    let data = uefi_variable("SecureBoot", &[0x01]);
    let variable = UefiVariableData::decode(&data).unwrap();

    assert_eq!(variable.name(), "SecureBoot");
    assert_eq!(variable.trimmed_name(), "SecureBoot");
    assert_eq!(variable.name_length, 20);
    assert_eq!(variable.data_length, 1);
    assert_eq!(variable.variable_data, vec![0x01]);
    assert_eq!(
        32 + variable.name_length + variable.data_length,
        data.len() as u64
    );
    assert_eq!(variable.to_bytes(), data);
}

#[test]
fn test_trailing_nul_trimmed_from_name() {
    let data = uefi_variable("PK\0\0", &[]);
    let variable = UefiVariableData::decode(&data).unwrap();
    assert_eq!(variable.name(), "PK\0\0");
    assert_eq!(variable.trimmed_name(), "PK");
}

#[test]
fn test_guid_rendering_and_encoding() {
    let data = uefi_variable("db", &[]);
    let variable = UefiVariableData::decode(&data).unwrap();
    let guid: UefiGuid = variable.variable_guid;

    assert_eq!(guid.data1, 0x8BE4DF61);
    assert_eq!(guid.data2, 0x93CA);
    assert_eq!(guid.data3, 0x11D2);
    assert_eq!(guid.data4, [0xAA, 0x0D, 0x00, 0xE0, 0x98, 0x03, 0x2B, 0x8C]);
    assert_eq!(guid.to_string(), "8BE4DF61-93CA-11D2-AA0D-00E098032B8C");
    assert_eq!(guid.to_bytes(), EFI_GLOBAL_VARIABLE);
}

#[test]
fn test_trailing_bytes_are_malformed() {
    let mut data = uefi_variable("BootOrder", &[0x00, 0x00]);
    data.push(0xFF);
    let err = UefiVariableData::decode(&data).unwrap_err();
    assert!(matches!(err, EventLogError::MalformedPayload(_)));
    assert!(!err.is_fatal());
}

#[test]
fn test_missing_bytes_are_malformed() {
    let mut data = uefi_variable("BootOrder", &[0x00, 0x00]);
    data.pop();
    assert!(matches!(
        UefiVariableData::decode(&data),
        Err(EventLogError::MalformedPayload(_))
    ));
}

#[test]
fn test_short_header_is_malformed() {
    let data = uefi_variable("X", &[]);
    assert!(matches!(
        UefiVariableData::decode(&data[..20]),
        Err(EventLogError::MalformedPayload(_))
    ));
    assert!(matches!(
        UefiVariableData::decode(&[]),
        Err(EventLogError::MalformedPayload(_))
    ));
}

#[test]
fn test_overflowing_lengths_are_malformed() {
    let mut data = EFI_GLOBAL_VARIABLE.to_vec();
    data.extend_from_slice(&u64::MAX.to_le_bytes());
    data.extend_from_slice(&0u64.to_le_bytes());
    assert!(matches!(
        UefiVariableData::decode(&data),
        Err(EventLogError::MalformedPayload(_))
    ));

    let mut data = EFI_GLOBAL_VARIABLE.to_vec();
    data.extend_from_slice(&1u64.to_le_bytes());
    data.extend_from_slice(&(u64::MAX - 10).to_le_bytes());
    data.extend_from_slice(&[0x41, 0x00]);
    assert!(matches!(
        UefiVariableData::decode(&data),
        Err(EventLogError::MalformedPayload(_))
    ));
}

#[test]
fn test_name_length_counts_code_units() {
    // A byte-count reading of the length field would only consume half of the name.
    let data = uefi_variable("Boot0001", &[0xAA; 6]);
    let variable = UefiVariableData::decode(&data).unwrap();
    assert_eq!(variable.unicode_name.len(), 8);
    assert_eq!(variable.name_length, 16);
}

#[test]
fn test_invalid_utf16_is_replaced() {
    let mut data = EFI_GLOBAL_VARIABLE.to_vec();
    data.extend_from_slice(&2u64.to_le_bytes());
    data.extend_from_slice(&0u64.to_le_bytes());
    data.extend_from_slice(&[0x00, 0xD8, 0x41, 0x00]);
    let variable = UefiVariableData::decode(&data).unwrap();
    assert_eq!(variable.name(), "\u{FFFD}A");
}

#[test]
fn test_dispatch_on_event_type() {
    let data = uefi_variable("SecureBoot", &[1]);
    for event_type in [
        EventType::EvEfiVariableDriverConfig,
        EventType::EvEfiVariableBoot,
        EventType::EvEfiVariableBoot2,
        EventType::EvEfiVariableAuthority,
    ] {
        assert!(matches!(decode_payload(event_type, &data), EventPayload::UefiVariable(_)));
    }
    for event_type in [
        EventType::EvPostCode,
        EventType::EvSCrtmContents,
        EventType::EvSCrtmVersion,
        EventType::EvEfiHcrtmEvent,
        EventType::EvPrebootCert,
        EventType::Unknown(0x4000_0000),
    ] {
        assert_eq!(decode_payload(event_type, &data), EventPayload::Raw);
    }
}

#[test]
fn test_malformed_payload_keeps_entry_and_decode_continues() {
    let mut bad = uefi_variable("SecureBoot", &[1]);
    bad.push(0);
    let data = LogBuilder::new()
        .agile(7, EV_EFI_VARIABLE_DRIVER_CONFIG, &[(TPM_ALG_SHA256, vec![1; 32])], &bad)
        .agile(7, EV_SEPARATOR, &[(TPM_ALG_SHA256, vec![2; 32])], &[0, 0, 0, 0])
        .build();

    let log = EventLog::parse(&data).unwrap();
    assert_eq!(log.agile.len(), 2);
    assert!(matches!(log.agile[0].payload, EventPayload::Malformed(_)));
    assert_eq!(log.agile[0].event_data, bad);
    assert_eq!(log.agile[1].event_type, EventType::EvSeparator);
}

#[test]
fn test_event_type_codes_round_trip() {
    for code in (0x00..=0x13u32).chain(0x8000_0000..=0x8000_000D).chain([0x8000_0010]).chain(0x8000_00E0..=0x8000_00E4) {
        let event_type = EventType::from_u32(code);
        assert!(!event_type.is_unknown(), "0x{:08X} should be known", code);
        assert_eq!(event_type.code(), code);
    }
    assert_eq!(EventType::from_u32(0x8000_000E), EventType::Unknown(0x8000_000E));
    assert_eq!(EventType::Unknown(7).code(), 7);
    assert_eq!(EventType::EvEfiVariableBoot.to_string(), "EV_EFI_VARIABLE_BOOT");
    assert_eq!(EventType::EvEfiHcrtmEvent.to_string(), "EV_EFI_HCRTM_EVENT");
    assert_eq!(EventType::Unknown(0xABCD).to_string(), "UNKNOWN_0x0000ABCD");
}
