//! Download (directory or file), §4.7.1.

use log::trace;

use crate::burst::Burst;
use crate::error::RejectError;
use crate::packet::Packet;
use crate::wire::{read_u16_le, read_u32_le, write_u16_le, write_u32_le};

use super::Outcome;

pub const CMD_DOWNLOAD: u16 = 0x010B;
pub const CMD_DOWNLOAD_ACK: u16 = CMD_DOWNLOAD | 0x8000;
pub const CMD_DOWNLOAD_REPLY: u16 = 0x030B;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingAck,
    AwaitingReply,
    Done,
}

/// A directory listing is just a download of index 0; the manager is what
/// decides to additionally parse the accumulator as a directory (§4.7.1).
#[derive(Debug)]
pub struct DownloadCommand {
    index: u16,
    offset: u32,
    length_limit: u32,
    announced_length: u32,
    accumulator: Vec<u8>,
    burst: Burst,
    state: State,
}

impl DownloadCommand {
    pub fn new(index: u16, offset: u32, length_limit: u32) -> DownloadCommand {
        DownloadCommand {
            index,
            offset,
            length_limit,
            announced_length: 0,
            accumulator: Vec::new(),
            burst: Burst::new(),
            state: State::AwaitingAck,
        }
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn make_command_packet(&self) -> Packet {
        let mut payload = [0u8; 10];
        write_u16_le(&mut payload, 0, self.index);
        write_u32_le(&mut payload, 2, self.offset);
        write_u32_le(&mut payload, 6, self.length_limit);
        Packet::build(7, CMD_DOWNLOAD, &payload)
    }

    pub fn read_packet(&mut self, packet: &Packet) -> Result<(), RejectError> {
        match self.state {
            State::AwaitingAck => self.read_ack(packet),
            State::AwaitingReply => self.read_reply(packet),
            State::Done => Err(RejectError("download already complete")),
        }
    }

    fn read_ack(&mut self, packet: &Packet) -> Result<(), RejectError> {
        if !packet.is_from_device() || packet.command_id != CMD_DOWNLOAD_ACK {
            return Err(RejectError("not a download ack"));
        }
        if packet.payload.len() != 10 {
            return Err(RejectError("download ack payload wrong size"));
        }

        let index = read_u16_le(&packet.payload, 0);
        let offset = read_u32_le(&packet.payload, 2);
        if index != self.index || offset != self.offset {
            return Err(RejectError("download ack echoes wrong index or offset"));
        }

        let announced = read_u32_le(&packet.payload, 6);
        // For a directory listing (index 0) the announced value is a record
        // count, each record 16 bytes; for a file it is a byte count.
        let announced_bytes = if self.index == 0 {
            announced.saturating_mul(16)
        } else {
            announced
        };
        if announced_bytes > self.length_limit {
            return Err(RejectError("download ack announces length beyond limit"));
        }

        self.announced_length = announced_bytes;
        self.accumulator.reserve(announced_bytes as usize);
        self.state = State::AwaitingReply;
        trace!("download({}): ack, announced {} bytes", self.index, announced_bytes);
        Ok(())
    }

    fn read_reply(&mut self, packet: &Packet) -> Result<(), RejectError> {
        if !packet.is_from_device() || packet.command_id != CMD_DOWNLOAD_REPLY {
            return Err(RejectError("not a download reply"));
        }
        if packet.payload.is_empty() {
            return Err(RejectError("download reply has an empty payload"));
        }

        let burst = self.burst.read_packet(packet.seqno);
        if !burst.is_valid() {
            return Err(RejectError("download reply is out of sequence"));
        }
        if self.accumulator.len() + packet.payload.len() > self.announced_length as usize {
            return Err(RejectError("download reply exceeds the announced length"));
        }

        self.burst = burst;
        self.accumulator.extend_from_slice(&packet.payload);

        if self.burst.has_ended() {
            self.state = State::Done;
        }
        Ok(())
    }

    pub fn maybe_finish(&self) -> Option<Outcome> {
        if self.state == State::Done {
            Some(Outcome::Download { index: self.index, bytes: self.accumulator.clone() })
        } else {
            None
        }
    }
}
