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

//! Byte Reader Module
//!
//! Bounds-checked sequential reader over an immutable byte buffer, used to decode TPM event logs
//! and the payloads nested inside them. All multi-byte integers are little-endian.
//!
//! Every read either advances the position by exactly the requested size or fails with
//! `EventLogError::Truncated` and leaves the position untouched, so the reported offset of a
//! failure is always the start of the field that could not be read.
//!
//! The module contains two main components:
//! - `ByteReader`: the cursor itself
//! - `ByteParseable`: types implementing this trait can be parsed directly from a `ByteReader`

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;
use crate::error::EventLogError;

/// UEFI GUID size
pub const UEFI_GUID_SIZE: usize = 16;

/// Binary data parsing helper structure
///
/// Internally uses a `Cursor` for position tracking; the remaining length is checked before
/// every read because `Cursor` moves to the end of the buffer on a short read.
pub struct ByteReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

/// Trait for types that can be parsed from a byte stream
///
/// # Example
///
/// ```rust ignore
/// use tpm_boot_verifier::{ByteReader, ByteParseable, EventLogError};
///
/// struct Header {
///     pcr_index: u32,
///     event_type: u32,
/// }
///
/// impl ByteParseable for Header {
///     fn parse_from(parser: &mut ByteReader<'_>) -> Result<Self, EventLogError> {
///         let pcr_index = parser.read_u32()?;
///         let event_type = parser.read_u32()?;
///         Ok(Self { pcr_index, event_type })
///     }
/// }
/// ```
pub trait ByteParseable: Sized {
    /// Parse an instance of the current type from a byte reader
    ///
    /// # Errors
    ///
    /// Returns an `EventLogError` when the byte stream contains insufficient data or is incorrectly formatted
    fn parse_from(parser: &mut ByteReader<'_>) -> Result<Self, EventLogError>;
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    /// Current reading position (byte offset)
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    /// Number of unread bytes remaining
    pub fn remaining(&self) -> u64 {
        self.get_length().saturating_sub(self.cursor.position())
    }

    /// Check if the end of data has been reached
    pub fn is_end(&self) -> bool {
        self.remaining() == 0
    }

    /// Total number of bytes in the data
    pub fn get_length(&self) -> u64 {
        self.cursor.get_ref().len() as u64
    }

    /// Fail with `Truncated` unless `length` more bytes are available
    fn ensure_available(&self, length: u64) -> Result<(), EventLogError> {
        let remaining = self.remaining();
        if length > remaining {
            return Err(EventLogError::Truncated {
                offset: self.position(),
                requested: length,
                remaining,
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, EventLogError> {
        self.ensure_available(1)?;
        self.cursor.read_u8().map_err(|e| self.io_error(1, e))
    }

    /// Read a u16 value (little-endian)
    pub fn read_u16(&mut self) -> Result<u16, EventLogError> {
        self.ensure_available(2)?;
        self.cursor.read_u16::<LittleEndian>().map_err(|e| self.io_error(2, e))
    }

    /// Read a u32 value (little-endian)
    pub fn read_u32(&mut self) -> Result<u32, EventLogError> {
        self.ensure_available(4)?;
        self.cursor.read_u32::<LittleEndian>().map_err(|e| self.io_error(4, e))
    }

    /// Read a u64 value (little-endian)
    pub fn read_u64(&mut self) -> Result<u64, EventLogError> {
        self.ensure_available(8)?;
        self.cursor.read_u64::<LittleEndian>().map_err(|e| self.io_error(8, e))
    }

    /// Borrow the next `length` bytes without copying them
    ///
    /// # Errors
    /// * `EventLogError::Truncated` - When the requested number of bytes exceeds the remaining bytes
    pub fn read_slice(&mut self, length: usize) -> Result<&'a [u8], EventLogError> {
        self.ensure_available(length as u64)?;
        let data: &'a [u8] = *self.cursor.get_ref();
        // ensure_available guarantees start + length <= data.len()
        let start = self.cursor.position() as usize;
        let slice = &data[start..start + length];
        self.cursor.set_position((start + length) as u64);
        Ok(slice)
    }

    /// Read bytes of specified length. A zero length returns an empty vector.
    pub fn read_bytes(&mut self, length: usize) -> Result<Vec<u8>, EventLogError> {
        self.read_slice(length).map(|slice| slice.to_vec())
    }

    /// Read a fixed-size array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], EventLogError> {
        let mut buffer = [0u8; N];
        buffer.copy_from_slice(self.read_slice(N)?);
        Ok(buffer)
    }

    /// Read `count` UTF-16LE code units
    ///
    /// The whole range is bounds-checked up front so that a short buffer fails without consuming
    /// any of it.
    pub fn read_utf16_units(&mut self, count: usize) -> Result<Vec<u16>, EventLogError> {
        let byte_length = count.checked_mul(2).ok_or_else(|| EventLogError::Truncated {
            offset: self.position(),
            requested: u64::MAX,
            remaining: self.remaining(),
        })?;
        let bytes = self.read_slice(byte_length)?;
        Ok(bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect())
    }

    /// Read all remaining bytes
    pub fn read_remaining(&mut self) -> Vec<u8> {
        let data: &'a [u8] = *self.cursor.get_ref();
        let start = (self.cursor.position() as usize).min(data.len());
        self.cursor.set_position(data.len() as u64);
        data[start..].to_vec()
    }

    // Only reachable if the length pre-check and the cursor disagree.
    fn io_error(&self, requested: u64, _e: std::io::Error) -> EventLogError {
        EventLogError::Truncated {
            offset: self.position(),
            requested,
            remaining: self.remaining(),
        }
    }
}
