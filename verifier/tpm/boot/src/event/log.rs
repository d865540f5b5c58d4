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

//! Event Log Decoder
//!
//! A TCG event log is a flat sequence of length-prefixed records with no resynchronisation
//! point: the first record is a legacy TCG_PCR_EVENT, every following record is a crypto-agile
//! TCG_PCR_EVENT2, and the log ends when the buffer does. Decoding is therefore strictly
//! sequential, and the first structural error ends it.
//!
//! `EventLogDecoder` streams entries one at a time and can be dropped at any entry boundary.
//! `EventLog` collects a whole log.

use std::iter::FusedIterator;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use log::{debug, error, warn};
use serde_json::{json, Map, Value};

use crate::byte_reader::{ByteParseable, ByteReader};
use crate::error::EventLogError;
use crate::event::model::{AgileEntry, EventPayload, LegacyEntry, LogEntry, LogEntryRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderState {
    ReadingLegacy,
    ReadingAgile,
    Done,
}

/// Streaming decoder over a raw event log buffer
///
/// Yields the legacy entry first, then agile entries until the buffer is exhausted. After the
/// first error it yields nothing more.
pub struct EventLogDecoder<'a> {
    reader: ByteReader<'a>,
    state: DecoderState,
    entry_index: usize,
    announced_algorithms: Option<Vec<u16>>,
    reported_algorithms: Vec<u16>,
}

impl<'a> EventLogDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            reader: ByteReader::new(data),
            state: DecoderState::ReadingLegacy,
            entry_index: 0,
            announced_algorithms: None,
            reported_algorithms: Vec::new(),
        }
    }

    /// Byte offset of the next entry to decode
    pub fn position(&self) -> u64 {
        self.reader.position()
    }

    fn fail(&mut self, e: EventLogError) -> Option<Result<LogEntry, EventLogError>> {
        error!("Event log decode failed at entry {}: {}", self.entry_index, e);
        self.state = DecoderState::Done;
        Some(Err(e))
    }

    // The registry governs digest lengths; an algorithm the Spec ID event did not announce is
    // only worth a warning.
    fn check_announced(&mut self, entry: &AgileEntry) {
        let Some(announced) = &self.announced_algorithms else {
            return;
        };
        for digest in &entry.digests {
            let id = digest.algorithm_id.id();
            if !announced.contains(&id) && !self.reported_algorithms.contains(&id) {
                warn!(
                    "Entry {} uses digest algorithm {} which the Spec ID event does not announce",
                    self.entry_index, digest.algorithm_id
                );
                self.reported_algorithms.push(id);
            }
        }
    }
}

impl Iterator for EventLogDecoder<'_> {
    type Item = Result<LogEntry, EventLogError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            DecoderState::Done => None,
            DecoderState::ReadingLegacy => match LegacyEntry::parse_from(&mut self.reader) {
                Ok(entry) => {
                    debug!(
                        "Entry 0: PCR {} {} (legacy, {} bytes of event data)",
                        entry.pcr_index, entry.event_type, entry.event_data_size
                    );
                    self.announced_algorithms = entry
                        .spec_id
                        .as_ref()
                        .map(|spec| spec.digest_algorithms.iter().map(|a| a.algorithm_id).collect());
                    self.state = DecoderState::ReadingAgile;
                    self.entry_index += 1;
                    Some(Ok(LogEntry::Legacy(entry)))
                }
                Err(e) => self.fail(e),
            },
            DecoderState::ReadingAgile => {
                if self.reader.is_end() {
                    self.state = DecoderState::Done;
                    return None;
                }
                match AgileEntry::parse_from(&mut self.reader) {
                    Ok(entry) => {
                        debug!(
                            "Entry {}: PCR {} {} ({} digests, {} bytes of event data)",
                            self.entry_index,
                            entry.pcr_index,
                            entry.event_type,
                            entry.digests.len(),
                            entry.event_size
                        );
                        self.check_announced(&entry);
                        self.entry_index += 1;
                        Some(Ok(LogEntry::Agile(entry)))
                    }
                    Err(e) => self.fail(e),
                }
            }
        }
    }
}

impl FusedIterator for EventLogDecoder<'_> {}

/// A fully decoded event log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLog {
    pub legacy: LegacyEntry,
    pub agile: Vec<AgileEntry>,
}

impl EventLog {
    /// Decode a binary event log
    ///
    /// # Errors
    /// * `EventLogError::Truncated` - The buffer ends inside an entry
    /// * `EventLogError::UnsupportedAlgorithm` - A digest uses an algorithm outside the registry
    pub fn parse(data: &[u8]) -> Result<Self, EventLogError> {
        let mut decoder = EventLogDecoder::new(data);
        let legacy = match decoder.next() {
            Some(Ok(LogEntry::Legacy(entry))) => entry,
            Some(Err(e)) => return Err(e),
            // The decoder always starts with the legacy entry.
            Some(Ok(LogEntry::Agile(_))) | None => {
                return Err(EventLogError::InputError("event log has no legacy entry".to_string()))
            }
        };

        let mut agile = Vec::new();
        for entry in decoder {
            match entry? {
                LogEntry::Agile(entry) => agile.push(entry),
                LogEntry::Legacy(_) => {
                    return Err(EventLogError::InputError("unexpected legacy entry".to_string()))
                }
            }
        }
        Ok(Self { legacy, agile })
    }

    /// Decode a base64 (standard alphabet) encoded event log
    pub fn from_base64(encoded: &str) -> Result<Self, EventLogError> {
        let data = BASE64
            .decode(encoded.trim().as_bytes())
            .map_err(|e| EventLogError::InputError(format!("Failed to decode event log: {}", e)))?;
        Self::parse(&data)
    }

    /// Number of entries, legacy entry included
    pub fn len(&self) -> usize {
        1 + self.agile.len()
    }

    /// Never true: a decoded log always holds its legacy entry
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn entry(&self, index: usize) -> Option<LogEntryRef<'_>> {
        match index {
            0 => Some(LogEntryRef::Legacy(&self.legacy)),
            n => self.agile.get(n - 1).map(LogEntryRef::Agile),
        }
    }

    /// All entries in log order, legacy entry first
    pub fn entries(&self) -> impl Iterator<Item = LogEntryRef<'_>> + '_ {
        std::iter::once(LogEntryRef::Legacy(&self.legacy)).chain(self.agile.iter().map(LogEntryRef::Agile))
    }

    /// Re-encode the log into its binary wire format
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = self.legacy.to_bytes();
        for entry in &self.agile {
            buffer.extend_from_slice(&entry.to_bytes());
        }
        buffer
    }

    /// Converts the event log to a JSON value for export
    ///
    /// # Errors
    /// * Returns `EventLogError::InputError` if the Spec ID event fails to serialize.
    pub fn to_json_value(&self) -> Result<Value, EventLogError> {
        self.entries()
            .enumerate()
            .map(|(index, entry)| entry_to_json(index, entry))
            .collect::<Result<Vec<Value>, EventLogError>>()
            .map(Value::Array)
    }
}

fn entry_to_json(index: usize, entry: LogEntryRef<'_>) -> Result<Value, EventLogError> {
    let mut obj = Map::new();
    obj.insert("entry_index".to_string(), json!(index));
    obj.insert("pcr_index".to_string(), json!(entry.pcr_index()));
    obj.insert("event_type".to_string(), json!(entry.event_type().to_string()));

    let digests: Vec<Value> = entry
        .digests()
        .into_iter()
        .map(|(algorithm, digest)| json!({ "hash_alg": algorithm.name(), "digest": hex::encode(digest) }))
        .collect();
    obj.insert("digests".to_string(), Value::Array(digests));
    obj.insert("event_size".to_string(), json!(entry.event_data().len()));
    obj.insert("event_data".to_string(), json!(hex::encode(entry.event_data())));

    match entry {
        LogEntryRef::Legacy(legacy) => {
            if let Some(spec_id) = &legacy.spec_id {
                let spec_json = serde_json::to_value(spec_id)
                    .map_err(|e| EventLogError::InputError(format!("Failed to serialize Spec ID event: {}", e)))?;
                obj.insert("spec_id".to_string(), spec_json);
            }
        }
        LogEntryRef::Agile(agile) => match &agile.payload {
            EventPayload::Raw => {}
            EventPayload::UefiVariable(variable) => {
                obj.insert(
                    "event".to_string(),
                    json!({
                        "variable_guid": variable.variable_guid.to_string(),
                        "unicode_name": variable.trimmed_name(),
                        "data": hex::encode(&variable.variable_data),
                    }),
                );
            }
            EventPayload::Malformed(reason) => {
                obj.insert("event".to_string(), json!({ "malformed": reason }));
            }
        },
    }
    Ok(Value::Object(obj))
}
