//! Per-command state machines (§4.7, C7).
//!
//! The reference uses runtime polymorphism (a base class, three subclasses);
//! §9 directs reimplementing this as a tagged sum instead, with the shared
//! ack-then-reply skeleton expressed as ordinary state transitions inside
//! each variant rather than as inherited behavior.

pub mod download;
pub mod erase;
pub mod set_time;

pub use download::DownloadCommand;
pub use erase::EraseCommand;
pub use set_time::SetTimeCommand;

use crate::error::RejectError;
use crate::packet::Packet;

/// The terminal result of a command, handed to
/// [`crate::manager::ProtocolManager`] by `maybe_finish`. The manager is the
/// only thing that turns this into a `ResultSink` call.
#[derive(Debug, Clone)]
pub enum Outcome {
    Download { index: u16, bytes: Vec<u8> },
    Erase { index: u16, success: bool },
    SetTime { success: bool },
}

/// One in-flight command.
#[derive(Debug)]
pub enum Command {
    Download(DownloadCommand),
    Erase(EraseCommand),
    SetTime(SetTimeCommand),
}

impl Command {
    /// The outbound packet that kicks off this command.
    pub fn make_command_packet(&self) -> Packet {
        match self {
            Command::Download(c) => c.make_command_packet(),
            Command::Erase(c) => c.make_command_packet(),
            Command::SetTime(c) => c.make_command_packet(),
        }
    }

    /// Feeds an inbound packet to the active variant.
    pub fn read_packet(&mut self, packet: &Packet) -> Result<(), RejectError> {
        match self {
            Command::Download(c) => c.read_packet(packet),
            Command::Erase(c) => c.read_packet(packet),
            Command::SetTime(c) => c.read_packet(packet),
        }
    }

    /// Some(outcome) iff the command has just become terminal.
    pub fn maybe_finish(&self) -> Option<Outcome> {
        match self {
            Command::Download(c) => c.maybe_finish(),
            Command::Erase(c) => c.maybe_finish(),
            Command::SetTime(c) => c.maybe_finish(),
        }
    }

    /// True iff, once terminal, the manager must send a reply-ack write.
    pub fn should_ack_reply(&self) -> bool {
        matches!(self, Command::Erase(c) if c.should_ack_reply())
    }

    /// The reply-ack packet to send, if `should_ack_reply` is true.
    pub fn make_reply_ack_packet(&self) -> Option<Packet> {
        match self {
            Command::Erase(c) if c.should_ack_reply() => Some(c.make_reply_ack_packet()),
            _ => None,
        }
    }
}
