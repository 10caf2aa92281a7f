//! Internal error types. These are distinct from the three client-facing
//! [`crate::interface::ErrorKind`] values: they carry the detail the manager
//! needs to pick the right `ErrorKind` and log message, but are never handed
//! to the result callback directly.

use thiserror::Error;

/// Failure to parse a wire packet, per §4.3.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PacketError {
    #[error("packet length {len} is not in 6..=20 or inconsistent with payload_length {payload_length}")]
    BadLength { len: usize, payload_length: u8 },
    #[error("CRC mismatch: expected {expected:#04x}, computed {computed:#04x}")]
    BadCrc { expected: u8, computed: u8 },
}

/// Failure to parse a reassembled directory buffer, per §4.5.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("directory buffer too short for a header ({len} bytes)")]
    TooShort { len: usize },
    #[error("unsupported header version {0}")]
    BadVersion(u8),
    #[error("unsupported record length {0}")]
    BadRecordLength(u8),
    #[error("unsupported time format {0}")]
    BadTimeFormat(u8),
}

/// A command-variant's rejection of an inbound packet, per §4.7's
/// `read_packet` returning "negative on rejected". Carries enough context for
/// the manager to log a useful `bad_payload` message.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{0}")]
pub struct RejectError(pub &'static str);
