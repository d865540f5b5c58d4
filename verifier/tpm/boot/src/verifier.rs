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

//! Verification Engine
//!
//! Maps every decoded entry to a manifest lookup key, compares the expected digest against the
//! digests recorded for the entry and produces a `Verdict`. Verification is a pure function of
//! the decoded log and the manifest, so entries can be evaluated on several threads at once.

use std::fmt;

use log::{info, warn};
use serde::Serialize;
use tpm_common_verifier::{AlgorithmId, CryptoVerifier};

use crate::error::EventLogError;
use crate::event::log::EventLog;
use crate::event::model::{EventPayload, EventType, LogEntryRef};
use crate::rim::ReferenceManifest;

/// Manifest component measured by EV_POST_CODE
pub const POST_CODE_MODULE: &str = "POST_Code_Module";
/// Manifest component measured by EV_S_CRTM_CONTENTS
pub const SRTM_MODULE: &str = "SRTM_Module";
/// Manifest component measured by EV_EFI_HCRTM_EVENT
pub const HCRTM_MODULE: &str = "HCRTM_Module";

pub const SKIP_UNRECOGNIZED: &str = "unrecognized event type";
pub const SKIP_NO_DIGESTS: &str = "no digests recorded";
pub const SKIP_MALFORMED_PAYLOAD: &str = "malformed event payload";
pub const SKIP_NO_PAYLOAD: &str = "variable payload not decoded";
pub const SKIP_NOT_MEASURED_COMPONENT: &str = "event type has no manifest component";

/// Outcome of verifying one entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Verdict {
    Matched,
    Mismatched,
    NotFound,
    Skipped(String),
}

impl Verdict {
    /// Whether the verdict keeps the aggregate status at success
    pub fn is_acceptable(&self) -> bool {
        matches!(self, Verdict::Matched | Verdict::Skipped(_))
    }

    fn skipped(reason: &str) -> Self {
        Verdict::Skipped(reason.to_string())
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Matched => write!(f, "MATCHED"),
            Verdict::Mismatched => write!(f, "MISMATCHED"),
            Verdict::NotFound => write!(f, "NOT FOUND"),
            Verdict::Skipped(reason) => write!(f, "SKIPPED ({})", reason),
        }
    }
}

/// Verdict together with the entry that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryVerdict {
    pub entry_index: usize,
    pub pcr_index: u32,
    pub event_type: EventType,
    #[serde(flatten)]
    pub verdict: Verdict,
}

/// An agile entry whose structured payload could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadIssue {
    pub entry_index: usize,
    pub pcr_index: u32,
    pub event_type: EventType,
    pub reason: String,
}

/// A recorded digest that differs from the hash of the entry's own event data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestCheck {
    pub entry_index: usize,
    pub algorithm: AlgorithmId,
    pub recorded: String,
    pub computed: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateStatus {
    Success,
    Failure,
}

impl AggregateStatus {
    pub fn is_success(&self) -> bool {
        *self == AggregateStatus::Success
    }
}

impl fmt::Display for AggregateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateStatus::Success => write!(f, "SUCCESS"),
            AggregateStatus::Failure => write!(f, "FAILURE"),
        }
    }
}

/// Manifest lookup key of an entry, or `None` when the entry is not verified against the manifest
///
/// EFI variable events are keyed by the variable name without trailing NULs; POST code, S-CRTM
/// and H-CRTM events by their fixed component names.
pub fn lookup_key(entry: LogEntryRef<'_>) -> Option<String> {
    let event_type = entry.event_type();
    if event_type.is_efi_variable() {
        return match entry.payload() {
            Some(EventPayload::UefiVariable(variable)) => Some(variable.trimmed_name()),
            _ => None,
        };
    }
    match event_type {
        EventType::EvPostCode => Some(POST_CODE_MODULE.to_string()),
        EventType::EvSCrtmContents => Some(SRTM_MODULE.to_string()),
        EventType::EvEfiHcrtmEvent => Some(HCRTM_MODULE.to_string()),
        _ => None,
    }
}

fn skip_reason(entry: LogEntryRef<'_>) -> &'static str {
    let event_type = entry.event_type();
    if event_type.is_unknown() {
        return SKIP_UNRECOGNIZED;
    }
    if event_type.is_efi_variable() {
        return match entry.payload() {
            Some(EventPayload::Malformed(_)) => SKIP_MALFORMED_PAYLOAD,
            _ => SKIP_NO_PAYLOAD,
        };
    }
    SKIP_NOT_MEASURED_COMPONENT
}

/// Verify a single entry against the manifest
///
/// A hit matches when the expected digest is byte-for-byte equal to the digest of any one of the
/// entry's banks; lengths must agree as well.
pub fn verify_entry<M: ReferenceManifest + ?Sized>(entry: LogEntryRef<'_>, manifest: &M) -> Verdict {
    let Some(key) = lookup_key(entry) else {
        return Verdict::skipped(skip_reason(entry));
    };
    let digests = entry.digests();
    if digests.is_empty() {
        return Verdict::skipped(SKIP_NO_DIGESTS);
    }
    match manifest.lookup(&key) {
        None => Verdict::NotFound,
        Some(expected) => {
            if digests.iter().any(|(_, digest)| *digest == expected.as_slice()) {
                Verdict::Matched
            } else {
                Verdict::Mismatched
            }
        }
    }
}

fn entry_verdict<M: ReferenceManifest + ?Sized>(
    entry_index: usize,
    entry: LogEntryRef<'_>,
    manifest: &M,
) -> EntryVerdict {
    let verdict = verify_entry(entry, manifest);
    if !verdict.is_acceptable() {
        warn!(
            "Entry {} (PCR {}, {}): {}",
            entry_index,
            entry.pcr_index(),
            entry.event_type(),
            verdict
        );
    }
    EntryVerdict {
        entry_index,
        pcr_index: entry.pcr_index(),
        event_type: entry.event_type(),
        verdict,
    }
}

/// Verify every entry of a log in order
pub fn verify_event_log<M: ReferenceManifest + ?Sized>(log: &EventLog, manifest: &M) -> Vec<EntryVerdict> {
    log.entries()
        .enumerate()
        .map(|(index, entry)| entry_verdict(index, entry, manifest))
        .collect()
}

/// Verify a log on up to `workers` scoped threads
///
/// Entries are split into contiguous chunks, so the result is in entry order and equal to
/// `verify_event_log` over the same inputs.
pub fn verify_event_log_parallel<M: ReferenceManifest + Sync + ?Sized>(
    log: &EventLog,
    manifest: &M,
    workers: usize,
) -> Vec<EntryVerdict> {
    if workers <= 1 || log.len() < 2 {
        return verify_event_log(log, manifest);
    }

    let entries: Vec<(usize, LogEntryRef<'_>)> = log.entries().enumerate().collect();
    let chunk_size = entries.len().div_ceil(workers);

    std::thread::scope(|scope| {
        let handles: Vec<_> = entries
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|(index, entry)| entry_verdict(*index, *entry, manifest))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut results = Vec::with_capacity(entries.len());
        for handle in handles {
            match handle.join() {
                Ok(part) => results.extend(part),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
        results
    })
}

/// Every agile entry whose payload decode failed
pub fn payload_issues(log: &EventLog) -> Vec<PayloadIssue> {
    log.entries()
        .enumerate()
        .filter_map(|(index, entry)| match entry.payload() {
            Some(EventPayload::Malformed(reason)) => Some(PayloadIssue {
                entry_index: index,
                pcr_index: entry.pcr_index(),
                event_type: entry.event_type(),
                reason: reason.clone(),
            }),
            _ => None,
        })
        .collect()
}

/// Recompute digests of entries whose digest is defined over their own event data
///
/// Returns the banks whose recorded digest differs from the recomputed one.
///
/// # Errors
/// * `EventLogError::CryptoError` - The digest could not be computed
pub fn check_event_digests(log: &EventLog) -> Result<Vec<DigestCheck>, EventLogError> {
    let mut mismatches = Vec::new();
    for (index, entry) in log.entries().enumerate() {
        if !entry.event_type().digest_covers_event_data() {
            continue;
        }
        for (algorithm, recorded) in entry.digests() {
            let computed = CryptoVerifier::compute_digest(algorithm, entry.event_data())?;
            if computed.as_slice() != recorded {
                warn!(
                    "Entry {} ({}): recorded {} digest does not match its event data",
                    index,
                    entry.event_type(),
                    algorithm
                );
                mismatches.push(DigestCheck {
                    entry_index: index,
                    algorithm,
                    recorded: hex::encode(recorded),
                    computed: hex::encode(computed),
                });
            }
        }
    }
    Ok(mismatches)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationOptions {
    pub workers: usize,
    pub check_event_digests: bool,
    pub fail_on_payload_error: bool,
}

impl Default for VerificationOptions {
    fn default() -> Self {
        Self {
            workers: 1,
            check_event_digests: false,
            fail_on_payload_error: true,
        }
    }
}

/// Complete verification outcome of one log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub results: Vec<EntryVerdict>,
    pub payload_errors: Vec<PayloadIssue>,
    pub digest_checks: Vec<DigestCheck>,
    #[serde(skip)]
    pub fail_on_payload_error: bool,
}

impl VerificationReport {
    fn count(&self, predicate: impl Fn(&Verdict) -> bool) -> usize {
        self.results.iter().filter(|r| predicate(&r.verdict)).count()
    }

    pub fn matched(&self) -> usize {
        self.count(|v| matches!(v, Verdict::Matched))
    }

    pub fn mismatched(&self) -> usize {
        self.count(|v| matches!(v, Verdict::Mismatched))
    }

    pub fn not_found(&self) -> usize {
        self.count(|v| matches!(v, Verdict::NotFound))
    }

    pub fn skipped(&self) -> usize {
        self.count(|v| matches!(v, Verdict::Skipped(_)))
    }

    /// Success only if every verdict is `Matched` or `Skipped`, no self-check failed and, unless
    /// disabled, no payload was malformed
    pub fn status(&self) -> AggregateStatus {
        let verdicts_ok = self.results.iter().all(|r| r.verdict.is_acceptable());
        let payloads_ok = !self.fail_on_payload_error || self.payload_errors.is_empty();
        if verdicts_ok && payloads_ok && self.digest_checks.is_empty() {
            AggregateStatus::Success
        } else {
            AggregateStatus::Failure
        }
    }
}

/// Aggregate status of a whole run, where a decode error is always a failure
pub fn aggregate_status(outcome: &Result<VerificationReport, EventLogError>) -> AggregateStatus {
    match outcome {
        Ok(report) => report.status(),
        Err(_) => AggregateStatus::Failure,
    }
}

/// Verifies decoded logs against one manifest
pub struct BootVerifier<'m, M: ReferenceManifest + Sync + ?Sized> {
    manifest: &'m M,
    options: VerificationOptions,
}

impl<'m, M: ReferenceManifest + Sync + ?Sized> BootVerifier<'m, M> {
    pub fn new(manifest: &'m M) -> Self {
        Self {
            manifest,
            options: VerificationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: VerificationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.options.workers = workers;
        self
    }

    pub fn with_event_digest_check(mut self, enabled: bool) -> Self {
        self.options.check_event_digests = enabled;
        self
    }

    pub fn with_fail_on_payload_error(mut self, enabled: bool) -> Self {
        self.options.fail_on_payload_error = enabled;
        self
    }

    pub fn options(&self) -> &VerificationOptions {
        &self.options
    }

    pub fn verify(&self, log: &EventLog) -> Result<VerificationReport, EventLogError> {
        let results = verify_event_log_parallel(log, self.manifest, self.options.workers);
        let digest_checks = if self.options.check_event_digests {
            check_event_digests(log)?
        } else {
            Vec::new()
        };
        let report = VerificationReport {
            results,
            payload_errors: payload_issues(log),
            digest_checks,
            fail_on_payload_error: self.options.fail_on_payload_error,
        };
        info!(
            "Verified {} entries: {} matched, {} mismatched, {} not found, {} skipped, status {}",
            report.results.len(),
            report.matched(),
            report.mismatched(),
            report.not_found(),
            report.skipped(),
            report.status()
        );
        Ok(report)
    }

    /// Decode and verify a binary log
    pub fn verify_bytes(&self, data: &[u8]) -> Result<VerificationReport, EventLogError> {
        let log = EventLog::parse(data)?;
        self.verify(&log)
    }
}
