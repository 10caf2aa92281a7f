//! ANT-FS-style directory decoding (§4.5, C5).
//!
//! Parses a reassembled directory buffer (the concatenation of a download's
//! burst payloads) into a header plus a map of logical entries keyed by
//! index.

use std::collections::HashMap;

use crate::error::DirectoryError;
use crate::time::to_posix;
use crate::wire::{read_u16_le, read_u32_le};

const HEADER_LEN: usize = 16;
const ENTRY_LEN: usize = 16;

const HEADER_VERSION: u8 = 1;
const HEADER_RECORD_LENGTH: u8 = 16;
const HEADER_TIME_FORMAT: u8 = 1;

/// The closed set of file types named in §3, plus an `Other` fallback for
/// any `(subtype << 8) | file_type` combination outside it — a firmware
/// revision could introduce one, and the decoder should stay total rather
/// than error on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileType {
    Unknown0001,
    FitDevice,
    FitActivity,
    Other(u16),
}

impl FileType {
    fn from_composite(composite: u16) -> FileType {
        match composite {
            0x0001 => FileType::Unknown0001,
            0x0180 => FileType::FitDevice,
            0x0480 => FileType::FitActivity,
            other => FileType::Other(other),
        }
    }
}

/// The 16-byte header preceding the entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirectoryHeader {
    pub device_clock_posix: i64,
}

/// One parsed directory entry, delivered to the client via
/// [`crate::interface::ResultSink::on_parse_directory_entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogicalDirectoryEntry {
    pub posix_time: i64,
    pub length: u32,
    pub index: u16,
    pub file_type: FileType,
}

/// Decodes a reassembled directory buffer into its header and entries.
///
/// Duplicate indices: last-writer-wins, per §4.5. A trailing partial record
/// (fewer than 16 bytes left after the header) is not an error — the device
/// pads bursts to a fixed size.
pub fn read(buffer: &[u8]) -> Result<(DirectoryHeader, HashMap<u16, LogicalDirectoryEntry>), DirectoryError> {
    if buffer.len() < HEADER_LEN {
        return Err(DirectoryError::TooShort { len: buffer.len() });
    }

    let version = buffer[0];
    let record_length = buffer[1];
    let time_format = buffer[2];
    if version != HEADER_VERSION {
        return Err(DirectoryError::BadVersion(version));
    }
    if record_length != HEADER_RECORD_LENGTH {
        return Err(DirectoryError::BadRecordLength(record_length));
    }
    if time_format != HEADER_TIME_FORMAT {
        return Err(DirectoryError::BadTimeFormat(time_format));
    }

    let device_clock = read_u32_le(buffer, 8);
    let header = DirectoryHeader { device_clock_posix: to_posix(device_clock) };

    let mut entries = HashMap::new();
    let mut offset = HEADER_LEN;
    while buffer.len() - offset >= ENTRY_LEN {
        let record = &buffer[offset..offset + ENTRY_LEN];
        let index = read_u16_le(record, 0);
        let file_type = record[2];
        let subtype = record[3];
        let length = read_u32_le(record, 8);
        let device_time = read_u32_le(record, 12);

        let entry = LogicalDirectoryEntry {
            posix_time: to_posix(device_time),
            length,
            index,
            file_type: FileType::from_composite(((subtype as u16) << 8) | file_type as u16),
        };
        entries.insert(index, entry);

        offset += ENTRY_LEN;
    }

    Ok((header, entries))
}
