//! The protocol manager (§4.8, C8): the top-level orchestrator.
//!
//! Holds at most one in-flight [`Command`], routes inbound notifications to
//! it, dispatches outbound command packets through the client's
//! [`Transport`], and fans completion/error events out to the client's
//! [`ResultSink`]. Mirrors the read-loop/state-dispatch shape of the
//! teacher's `connection/serial.rs`, generalized from one hardware
//! connection to the full command lifecycle.

use log::{debug, trace, warn};

use crate::command::{Command, DownloadCommand, EraseCommand, Outcome, SetTimeCommand};
use crate::config::EngineConfig;
use crate::directory;
use crate::interface::{ErrorKind, ResultSink, Transport};
use crate::packet::Packet;
use crate::time::to_device;

/// Top-level protocol engine. Generic over the transport and result-sink
/// implementations it's wired to, rather than boxed trait objects — per §9's
/// note that no dynamic dispatch is required beyond variant discrimination.
pub struct ProtocolManager<T: Transport, R: ResultSink> {
    transport: T,
    sink: R,
    config: EngineConfig,
    slot: Option<Command>,
    in_callback: bool,
}

impl<T: Transport, R: ResultSink> ProtocolManager<T, R> {
    pub fn new(transport: T, sink: R) -> ProtocolManager<T, R> {
        Self::with_config(transport, sink, EngineConfig::default())
    }

    pub fn with_config(transport: T, sink: R, config: EngineConfig) -> ProtocolManager<T, R> {
        ProtocolManager { transport, sink, config, slot: None, in_callback: false }
    }

    /// Consumes the manager, returning its transport and sink. Useful for
    /// tests that want to inspect a fake transport/sink after a run.
    pub fn into_parts(self) -> (T, R) {
        (self.transport, self.sink)
    }

    /// Borrows the result sink, e.g. so a driving loop can poll
    /// application-defined completion state between `notify_value` calls.
    pub fn sink(&self) -> &R {
        &self.sink
    }

    /// Borrows the transport, e.g. so a test can inspect writes mid-flow
    /// without consuming the manager.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Borrows the engine configuration, so a driving loop can source its
    /// own inactivity timer from [`EngineConfig::inactivity_timeout`] rather
    /// than hardcoding a duration (§5's 16-second client-timer policy).
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// True while a command is in flight (a notification is expected).
    pub fn is_waiting(&self) -> bool {
        self.slot.is_some()
    }

    fn guard_reentrancy(&self) {
        debug_assert!(
            !self.in_callback,
            "manager operation invoked re-entrantly from within a result callback"
        );
    }

    fn run_callback(&mut self, f: impl FnOnce(&mut R)) {
        self.in_callback = true;
        f(&mut self.sink);
        self.in_callback = false;
    }

    fn emit_error(&mut self, kind: ErrorKind, message: &str) {
        warn!("{kind:?}: {message}");
        self.run_callback(|sink| sink.on_error(kind, message));
    }

    fn emit_outcome(&mut self, outcome: Outcome) {
        self.run_callback(|sink| match outcome {
            Outcome::Download { index, bytes } if index == 0 => match directory::read(&bytes) {
                Ok((header, entries)) => {
                    sink.on_parse_clock(header.device_clock_posix);
                    let mut indices: Vec<u16> = entries.keys().copied().collect();
                    indices.sort_unstable();
                    for idx in indices {
                        sink.on_parse_directory_entry(entries[&idx]);
                    }
                    sink.on_finish_parsing_directory();
                }
                Err(err) => sink.on_error(ErrorKind::BadPayload, &err.to_string()),
            },
            Outcome::Download { index, bytes } => sink.on_download_file(index, bytes),
            Outcome::Erase { index, success } => sink.on_erase_file(index, success),
            Outcome::SetTime { success } => sink.on_set_time(success),
        });
    }

    /// Writes raw bytes to the transport, returning whether it succeeded.
    fn raw_write(&mut self, bytes: &[u8]) -> bool {
        self.transport.write_value(bytes) == 0
    }

    fn max_download_length(&self) -> u32 {
        self.config.max_accumulator_bytes.unwrap_or(u32::MAX)
    }

    fn begin_command(&mut self, command: Command) {
        self.guard_reentrancy();
        debug_assert!(self.slot.is_none(), "command issued while another is in flight");

        let bytes = command.make_command_packet().serialize();
        self.slot = Some(command);

        if self.raw_write(&bytes) {
            self.transport.start_waiting();
        } else {
            self.slot = None;
            self.emit_error(ErrorKind::Unexpected, "transport write_value failed");
        }
    }

    /// Starts a directory listing (a download of index 0).
    pub fn download_directory(&mut self) {
        let limit = self.max_download_length();
        self.begin_command(Command::Download(DownloadCommand::new(0, 0, limit)));
    }

    /// Starts downloading a file by index.
    pub fn download_file(&mut self, index: u16) {
        let limit = self.max_download_length();
        self.begin_command(Command::Download(DownloadCommand::new(index, 0, limit)));
    }

    /// Starts erasing a file by index.
    pub fn erase_file(&mut self, index: u16) {
        self.begin_command(Command::Erase(EraseCommand::new(index)));
    }

    /// Sets the device clock to the given whole-second POSIX time (§6.3).
    pub fn set_time(&mut self, posix: i64) {
        self.begin_command(Command::SetTime(SetTimeCommand::new(to_device(posix))));
    }

    /// Convenience for callers with a fractional wall-clock reading: rounds
    /// up to the next whole second per §4.6 before issuing `set_time`.
    pub fn set_time_fractional(&mut self, posix_fractional: f64) {
        self.set_time(crate::time::round_up_to_second(posix_fractional));
    }

    /// Feeds an inbound GATT notification to the engine.
    pub fn notify_value(&mut self, bytes: &[u8]) {
        self.guard_reentrancy();

        let packet = match Packet::parse(bytes) {
            Ok(packet) => packet,
            Err(err) => {
                self.emit_error(ErrorKind::BadHeader, &err.to_string());
                return;
            }
        };
        trace!("notify_value: {packet:?}");

        let Some(command) = self.slot.as_mut() else {
            self.emit_error(ErrorKind::Unexpected, "notification received with no active command");
            return;
        };

        if let Err(reject) = command.read_packet(&packet) {
            self.emit_error(ErrorKind::BadPayload, reject.0);
            return;
        }

        let command_ref = self.slot.as_ref().expect("checked above");
        let Some(outcome) = command_ref.maybe_finish() else {
            return;
        };

        let should_ack_reply = command_ref.should_ack_reply();
        let reply_ack = command_ref.make_reply_ack_packet();
        self.slot = None;

        if should_ack_reply {
            let ack_bytes = reply_ack.expect("should_ack_reply implies a reply-ack packet").serialize();
            if !self.raw_write(&ack_bytes) {
                self.emit_error(ErrorKind::Unexpected, "transport write_value failed for reply-ack");
                self.transport.finish_waiting();
                return;
            }
        }

        self.emit_outcome(outcome);
        self.transport.finish_waiting();
    }

    /// Raised by the client's own timer when no traffic arrives in time.
    pub fn notify_timeout(&mut self) {
        self.guard_reentrancy();

        if self.slot.take().is_some() {
            debug!("notify_timeout: clearing in-flight command");
            self.emit_error(ErrorKind::Unexpected, "timed out waiting for the device");
            self.transport.finish_waiting();
        }
    }
}
