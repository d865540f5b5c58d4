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

use mockall::mock;
use tpm_boot_verifier::{
    aggregate_status, check_event_digests, lookup_key, verify_entry, verify_event_log,
    verify_event_log_parallel, AggregateStatus, BootVerifier, EventLog, EventLogError,
    ReferenceManifest, RimManifest, Verdict,
};
use tpm_common_verifier::{AlgorithmId, CryptoVerifier};

mod utils;
use utils::*;

mock! {
    pub Manifest {}

    impl ReferenceManifest for Manifest {
        fn lookup(&self, name: &str) -> Option<Vec<u8>>;
    }
}

const SECURE_BOOT_DIGEST: [u8; 32] = [0x5A; 32];

fn secure_boot_log() -> EventLog {
    let data = LogBuilder::new()
        .agile(
            7,
            EV_EFI_VARIABLE_BOOT,
            &[(TPM_ALG_SHA256, SECURE_BOOT_DIGEST.to_vec())],
            &uefi_variable("SecureBoot\0", &[0x01]),
        )
        .build();
    EventLog::parse(&data).unwrap()
}

fn manifest(entries: &[(&str, Vec<u8>)]) -> RimManifest {
    entries.iter().map(|(name, digest)| (*name, digest.clone())).collect()
}

#[test]
fn test_variable_digest_matched() {
    let log = secure_boot_log();
    let rim = manifest(&[("SecureBoot", SECURE_BOOT_DIGEST.to_vec())]);

    let results = verify_event_log(&log, &rim);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].verdict, Verdict::Skipped("event type has no manifest component".to_string()));
    assert_eq!(results[1].entry_index, 1);
    assert_eq!(results[1].pcr_index, 7);
    assert_eq!(results[1].verdict, Verdict::Matched);
}

#[test]
fn test_variable_missing_from_manifest() {
    let log = secure_boot_log();
    let rim = manifest(&[("PK", SECURE_BOOT_DIGEST.to_vec())]);
    assert_eq!(verify_event_log(&log, &rim)[1].verdict, Verdict::NotFound);
}

#[test]
fn test_variable_digest_differs_by_one_byte() {
    let log = secure_boot_log();
    let mut expected = SECURE_BOOT_DIGEST.to_vec();
    expected[31] ^= 0x01;
    let rim = manifest(&[("SecureBoot", expected)]);
    assert_eq!(verify_event_log(&log, &rim)[1].verdict, Verdict::Mismatched);
}

#[test]
fn test_lookup_is_case_insensitive() {
    let log = secure_boot_log();
    let rim = manifest(&[("SECUREBOOT", SECURE_BOOT_DIGEST.to_vec())]);
    assert_eq!(rim.lookup("secureboot"), Some(SECURE_BOOT_DIGEST.to_vec()));
    assert_eq!(verify_event_log(&log, &rim)[1].verdict, Verdict::Matched);
}

#[test]
fn test_later_manifest_entry_replaces_earlier() {
    let mut rim = RimManifest::new();
    assert!(rim.insert("Shim", vec![1]).is_none());
    assert_eq!(rim.insert("SHIM", vec![2]), Some(vec![1]));
    assert_eq!(rim.len(), 1);
    assert_eq!(rim.lookup("shim"), Some(vec![2]));
}

#[test]
fn test_prefix_of_digest_does_not_match() {
    let log = secure_boot_log();
    let rim = manifest(&[("SecureBoot", SECURE_BOOT_DIGEST[..20].to_vec())]);
    assert_eq!(verify_event_log(&log, &rim)[1].verdict, Verdict::Mismatched);
}

#[test]
fn test_any_bank_may_match() {
    let sha1 = vec![0x01; 20];
    let sha256 = vec![0x02; 32];
    let data = LogBuilder::new()
        .agile(0, EV_POST_CODE, &[(TPM_ALG_SHA1, sha1.clone()), (TPM_ALG_SHA256, sha256.clone())], b"bios")
        .build();
    let log = EventLog::parse(&data).unwrap();

    for expected in [sha1, sha256] {
        let rim = manifest(&[("POST_Code_Module", expected)]);
        assert_eq!(verify_event_log(&log, &rim)[1].verdict, Verdict::Matched);
    }
    let rim = manifest(&[("POST_Code_Module", vec![0x03; 32])]);
    assert_eq!(verify_event_log(&log, &rim)[1].verdict, Verdict::Mismatched);
}

#[test]
fn test_component_keys() {
    let digest = vec![0x77; 32];
    let data = LogBuilder::new()
        .agile(0, EV_POST_CODE, &[(TPM_ALG_SHA256, digest.clone())], b"post")
        .agile(0, EV_S_CRTM_CONTENTS, &[(TPM_ALG_SHA256, digest.clone())], b"srtm")
        .agile(0, EV_EFI_HCRTM_EVENT, &[(TPM_ALG_SHA256, digest.clone())], b"HCRTM")
        .agile(0, EV_S_CRTM_VERSION, &[(TPM_ALG_SHA256, digest.clone())], b"1.0")
        .build();
    let log = EventLog::parse(&data).unwrap();

    let keys: Vec<Option<String>> = log.entries().map(lookup_key).collect();
    assert_eq!(
        keys,
        vec![
            None,
            Some("POST_Code_Module".to_string()),
            Some("SRTM_Module".to_string()),
            Some("HCRTM_Module".to_string()),
            None,
        ]
    );

    let rim = manifest(&[
        ("post_code_module", digest.clone()),
        ("SRTM_Module", digest.clone()),
        ("HCRTM_MODULE", digest),
    ]);
    let verdicts: Vec<Verdict> = verify_event_log(&log, &rim).into_iter().map(|r| r.verdict).collect();
    assert_eq!(verdicts[1..4], [Verdict::Matched, Verdict::Matched, Verdict::Matched]);
    assert!(matches!(verdicts[4], Verdict::Skipped(_)));
}

#[test]
fn test_skipped_entries() {
    let mut bad = uefi_variable("SecureBoot", &[1]);
    bad.push(0);
    let data = LogBuilder::new()
        .agile(1, 0x0BAD_0BAD, &[(TPM_ALG_SHA256, vec![0; 32])], b"?")
        .agile(0, EV_POST_CODE, &[], b"post")
        .agile(7, EV_EFI_VARIABLE_DRIVER_CONFIG, &[(TPM_ALG_SHA256, vec![0; 32])], &bad)
        .build();
    let log = EventLog::parse(&data).unwrap();
    let rim = manifest(&[("POST_Code_Module", vec![0; 32]), ("SecureBoot", vec![0; 32])]);

    let results = verify_event_log(&log, &rim);
    assert_eq!(results[1].verdict, Verdict::Skipped("unrecognized event type".to_string()));
    assert_eq!(results[2].verdict, Verdict::Skipped("no digests recorded".to_string()));
    assert_eq!(results[3].verdict, Verdict::Skipped("malformed event payload".to_string()));
}

#[test]
fn test_legacy_entry_uses_sha1_bank() {
    let digest = [0x42u8; 20];
    let data = legacy_entry(0, EV_S_CRTM_CONTENTS, digest, b"crtm");
    let log = EventLog::parse(&data).unwrap();

    let rim = manifest(&[("SRTM_Module", digest.to_vec())]);
    let entry = log.entry(0).unwrap();
    assert_eq!(verify_entry(entry, &rim), Verdict::Matched);
}

#[test]
fn test_manifest_queried_with_trimmed_name() {
    let log = secure_boot_log();
    let mut rim = MockManifest::new();
    rim.expect_lookup()
        .withf(|name: &str| name == "SecureBoot")
        .times(1)
        .returning(|_| Some(SECURE_BOOT_DIGEST.to_vec()));

    let entry = log.entry(1).unwrap();
    assert_eq!(verify_entry(entry, &rim), Verdict::Matched);
}

#[test]
fn test_skipped_entries_never_query_manifest() {
    let data = LogBuilder::new()
        .agile(0, EV_S_CRTM_VERSION, &[(TPM_ALG_SHA256, vec![0; 32])], b"1.0")
        .agile(0, 0xFFFF_FFFF, &[(TPM_ALG_SHA256, vec![0; 32])], b"")
        .build();
    let log = EventLog::parse(&data).unwrap();
    let mut rim = MockManifest::new();
    rim.expect_lookup().times(0);

    let results = verify_event_log(&log, &rim);
    assert!(results.iter().all(|r| matches!(r.verdict, Verdict::Skipped(_))));
}

#[test]
fn test_verification_is_idempotent() {
    let log = secure_boot_log();
    let rim = manifest(&[("SecureBoot", SECURE_BOOT_DIGEST.to_vec())]);
    assert_eq!(verify_event_log(&log, &rim), verify_event_log(&log, &rim));
}

#[test]
fn test_parallel_matches_sequential() {
    let mut builder = LogBuilder::new();
    let mut entries = Vec::new();
    for i in 0..37u8 {
        let name = format!("Var{:02}", i);
        builder = builder.agile(
            u32::from(i % 8),
            EV_EFI_VARIABLE_BOOT,
            &[(TPM_ALG_SHA256, vec![i; 32])],
            &uefi_variable(&name, &[i]),
        );
        // Every third variable is missing, every fifth has a wrong digest.
        if i % 3 != 0 {
            let digest = if i % 5 == 0 { vec![0xFF; 32] } else { vec![i; 32] };
            entries.push((name, digest));
        }
    }
    let log = EventLog::parse(&builder.build()).unwrap();
    let rim: RimManifest = entries.into_iter().collect();

    let sequential = verify_event_log(&log, &rim);
    for workers in [0, 1, 2, 3, 4, 8, 64] {
        assert_eq!(verify_event_log_parallel(&log, &rim, workers), sequential, "workers = {}", workers);
    }
    let order: Vec<usize> = sequential.iter().map(|r| r.entry_index).collect();
    assert_eq!(order, (0..38).collect::<Vec<_>>());
}

#[test]
fn test_report_status() {
    let log = secure_boot_log();

    let good = manifest(&[("SecureBoot", SECURE_BOOT_DIGEST.to_vec())]);
    let report = BootVerifier::new(&good).verify(&log).unwrap();
    assert_eq!(report.matched(), 1);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.status(), AggregateStatus::Success);

    let missing = RimManifest::new();
    let report = BootVerifier::new(&missing).verify(&log).unwrap();
    assert_eq!(report.not_found(), 1);
    assert_eq!(report.status(), AggregateStatus::Failure);

    let wrong = manifest(&[("SecureBoot", vec![0; 32])]);
    let report = BootVerifier::new(&wrong).with_workers(4).verify(&log).unwrap();
    assert_eq!(report.mismatched(), 1);
    assert_eq!(report.status(), AggregateStatus::Failure);
}

#[test]
fn test_decode_error_is_failure() {
    let rim = RimManifest::new();
    let outcome = BootVerifier::new(&rim).verify_bytes(&[0x00, 0x01]);
    assert!(matches!(outcome, Err(EventLogError::Truncated { .. })));
    assert_eq!(aggregate_status(&outcome), AggregateStatus::Failure);
}

#[test]
fn test_malformed_payload_flips_status_unless_disabled() {
    let mut bad = uefi_variable("SecureBoot", &[1]);
    bad.push(0);
    let data = LogBuilder::new()
        .agile(7, EV_EFI_VARIABLE_DRIVER_CONFIG, &[(TPM_ALG_SHA256, vec![0; 32])], &bad)
        .build();
    let log = EventLog::parse(&data).unwrap();
    let rim = RimManifest::new();

    let report = BootVerifier::new(&rim).verify(&log).unwrap();
    assert_eq!(report.payload_errors.len(), 1);
    assert_eq!(report.payload_errors[0].entry_index, 1);
    assert_eq!(report.status(), AggregateStatus::Failure);

    let report = BootVerifier::new(&rim).with_fail_on_payload_error(false).verify(&log).unwrap();
    assert_eq!(report.status(), AggregateStatus::Success);
}

#[test]
fn test_event_digest_self_check() {
    let separator = [0u8; 4];
    let sha1 = CryptoVerifier::compute_digest(AlgorithmId::Sha1, &separator).unwrap();
    let sha256 = CryptoVerifier::compute_digest(AlgorithmId::Sha256, &separator).unwrap();
    let data = LogBuilder::new()
        .agile(7, EV_SEPARATOR, &[(TPM_ALG_SHA1, sha1), (TPM_ALG_SHA256, sha256)], &separator)
        .agile(0, EV_SEPARATOR, &[(TPM_ALG_SHA256, vec![0xEE; 32])], &separator)
        // POST code digests cover the measured image, not the event data.
        .agile(0, EV_POST_CODE, &[(TPM_ALG_SHA256, vec![0xEE; 32])], b"post")
        .build();
    let log = EventLog::parse(&data).unwrap();

    let checks = check_event_digests(&log).unwrap();
    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0].entry_index, 2);
    assert_eq!(checks[0].algorithm, AlgorithmId::Sha256);
    assert_eq!(checks[0].recorded, "ee".repeat(32));

    let rim = RimManifest::new();
    let report = BootVerifier::new(&rim).with_fail_on_payload_error(false).verify(&log).unwrap();
    assert!(report.digest_checks.is_empty());
    assert_eq!(report.not_found(), 1);

    let report = BootVerifier::new(&rim).with_event_digest_check(true).verify(&log).unwrap();
    assert_eq!(report.digest_checks.len(), 1);
    assert_eq!(report.status(), AggregateStatus::Failure);
}

#[test]
fn test_verdict_serialization() {
    let log = secure_boot_log();
    let rim = manifest(&[("SecureBoot", SECURE_BOOT_DIGEST.to_vec())]);
    let report = BootVerifier::new(&rim).verify(&log).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["results"][0]["status"], "skipped");
    assert_eq!(json["results"][0]["event_type"], "EV_NO_ACTION");
    assert!(json["results"][0]["reason"].is_string());
    assert_eq!(json["results"][1]["status"], "matched");
    assert!(json["results"][1].get("reason").is_none());
    assert_eq!(serde_json::to_value(Verdict::NotFound).unwrap()["status"], "not_found");
}
