//! External interface adapter (§4.9/§6, C9).
//!
//! The stable façade the transport and UI layers consume. Both traits are
//! implemented by the embedding application; the engine only ever calls into
//! them, never the reverse within the same call stack (§5 re-entrancy rule).

use crate::directory::LogicalDirectoryEntry;

/// Error kinds surfaced to the client (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Packet parse failure: length mismatch or CRC mismatch.
    BadHeader,
    /// Variant-level payload validation failed.
    BadPayload,
    /// Notification with no active slot, transport write failure, or timeout.
    Unexpected,
}

/// The transport callback interface (§6.1): engine → client.
pub trait Transport {
    /// Delivers a serialized packet to the GATT characteristic. A non-zero
    /// return is treated as a fatal transport error.
    fn write_value(&mut self, bytes: &[u8]) -> i32;
    /// The engine is now waiting for device traffic.
    fn start_waiting(&mut self);
    /// The engine is no longer waiting.
    fn finish_waiting(&mut self);
}

/// The result callback interface (§6.2): engine → client. Every method has a
/// no-op default; implementors override only the events they care about.
pub trait ResultSink {
    fn on_error(&mut self, _code: ErrorKind, _message: &str) {}
    fn on_parse_clock(&mut self, _posix_time: i64) {}
    fn on_parse_directory_entry(&mut self, _entry: LogicalDirectoryEntry) {}
    fn on_finish_parsing_directory(&mut self) {}
    fn on_download_file(&mut self, _index: u16, _bytes: Vec<u8>) {}
    fn on_erase_file(&mut self, _index: u16, _ok: bool) {}
    fn on_set_time(&mut self, _ok: bool) {}
}
