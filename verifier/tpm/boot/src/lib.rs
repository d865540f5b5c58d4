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

//! TCG event log decoding and boot measurement verification.
//!
//! ```rust ignore
//! use tpm_boot_verifier::{BootVerifier, EventLog, RimManifest};
//!
//! let log = EventLog::parse(&bytes)?;
//! let manifest: RimManifest = [("SecureBoot", expected)].into_iter().collect();
//! let report = BootVerifier::new(&manifest).with_workers(4).verify(&log)?;
//! assert!(report.status().is_success());
//! ```

pub mod byte_reader;
pub mod error;
pub mod event;
pub mod rim;
pub mod verifier;

pub use byte_reader::{ByteParseable, ByteReader, UEFI_GUID_SIZE};
pub use error::EventLogError;
pub use event::log::{EventLog, EventLogDecoder};
pub use event::model::{
    AgileEntry, DigestRecord, EfiSpecIdEvent, EventPayload, EventType, LegacyEntry, LogEntry,
    LogEntryRef, TcgEfiSpecIdEventAlgorithmSize, UefiGuid, UefiVariableData,
};
pub use event::parser::decode_payload;
pub use rim::{ReferenceManifest, RimManifest};
pub use verifier::{
    aggregate_status, check_event_digests, lookup_key, payload_issues, verify_entry,
    verify_event_log, verify_event_log_parallel, AggregateStatus, BootVerifier, DigestCheck,
    EntryVerdict, PayloadIssue, VerificationOptions, VerificationReport, Verdict,
};
