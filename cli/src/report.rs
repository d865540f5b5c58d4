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

use serde_json::{json, Value};
use std::fmt::Write;
use tpm_boot_verifier::{lookup_key, EventLog, VerificationReport};

/// Human readable report, one line per entry followed by a summary
pub fn render_text(report: &VerificationReport, log: &EventLog) -> String {
    let mut out = String::new();
    for result in &report.results {
        let key = log.entry(result.entry_index).and_then(lookup_key).unwrap_or_default();
        let _ = writeln!(
            out,
            "[{:>4}] PCR{:<2} {:<34} {:<20} {}",
            result.entry_index,
            result.pcr_index,
            result.event_type.to_string(),
            key,
            result.verdict
        );
    }

    for issue in &report.payload_errors {
        let _ = writeln!(
            out,
            "payload error: entry {} ({}): {}",
            issue.entry_index, issue.event_type, issue.reason
        );
    }
    for check in &report.digest_checks {
        let _ = writeln!(
            out,
            "digest check: entry {} {} recorded {} computed {}",
            check.entry_index, check.algorithm, check.recorded, check.computed
        );
    }

    let _ = writeln!(
        out,
        "{} entries: {} matched, {} mismatched, {} not found, {} skipped",
        report.results.len(),
        report.matched(),
        report.mismatched(),
        report.not_found(),
        report.skipped()
    );
    let _ = writeln!(out, "Verification {}", report.status());
    out
}

pub fn render_json(report: &VerificationReport) -> Result<Value, serde_json::Error> {
    let mut value = serde_json::to_value(report)?;
    if let Value::Object(obj) = &mut value {
        obj.insert("status".to_string(), serde_json::to_value(report.status())?);
        obj.insert(
            "summary".to_string(),
            json!({
                "entries": report.results.len(),
                "matched": report.matched(),
                "mismatched": report.mismatched(),
                "not_found": report.not_found(),
                "skipped": report.skipped(),
            }),
        );
    }
    Ok(value)
}
