//! Packet assembly and parsing (§4.3, C3).
//!
//! A packet is 6 to 20 bytes: a combined CRC+seqno byte, a payload length,
//! sender/receiver bytes, a 16-bit little-endian command id, and 0..14 bytes
//! of payload. Fields are accessed by byte offset via [`crate::wire`], never
//! through a packed struct layout (§9).

use crate::crc8::crc8;
use crate::error::PacketError;
use crate::wire::{read_u16_le, write_u16_le};

/// `sender`/`receiver` value identifying the host.
pub const HOST: u8 = 3;
/// `sender`/`receiver` value identifying the device.
pub const DEVICE: u8 = 1;

/// The terminal/single-shot sequence number marker.
pub const SEQNO_TERMINAL: u8 = 7;
/// In-memory-only sentinel for an invalid sequence state. Must never appear
/// on the wire.
pub const SEQNO_INVALID: u8 = 8;

/// A parsed or about-to-be-serialized protocol packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub seqno: u8,
    pub sender: u8,
    pub receiver: u8,
    pub command_id: u16,
    pub payload: Vec<u8>,
}

impl Packet {
    /// Builds an outbound packet from the host.
    ///
    /// `seqno` must be `<= 7` and `payload` must be `<= 14` bytes; both are
    /// programmer errors (§7), asserted in debug builds. In release builds
    /// the values are silently truncated rather than causing undefined
    /// behavior.
    pub fn build(seqno: u8, command_id: u16, payload: &[u8]) -> Packet {
        debug_assert!(seqno <= SEQNO_TERMINAL, "seqno {seqno} out of range");
        debug_assert!(payload.len() <= 14, "payload {} bytes too long", payload.len());

        let seqno = seqno & 0x07;
        let payload = if payload.len() > 14 { &payload[..14] } else { payload };

        Packet {
            seqno,
            sender: HOST,
            receiver: DEVICE,
            command_id,
            payload: payload.to_vec(),
        }
    }

    /// Builds a standalone acknowledgement packet: `build(7, cmd | 0x8000, &[])`.
    pub fn build_ack(command_id: u16) -> Packet {
        Packet::build(SEQNO_TERMINAL, command_id | 0x8000, &[])
    }

    /// Serializes this packet to its wire bytes, `6 + payload_length` long.
    pub fn serialize(&self) -> Vec<u8> {
        let payload_length = self.payload.len() as u8;
        let mut rest = Vec::with_capacity(5 + self.payload.len());
        rest.push(payload_length);
        rest.push(self.sender);
        rest.push(self.receiver);
        let mut cmd_bytes = [0u8; 2];
        write_u16_le(&mut cmd_bytes, 0, self.command_id);
        rest.extend_from_slice(&cmd_bytes);
        rest.extend_from_slice(&self.payload);

        let crc = crc8(&rest) & 0x1F;
        let byte0 = (self.seqno << 5) | crc;

        let mut out = Vec::with_capacity(1 + rest.len());
        out.push(byte0);
        out.extend_from_slice(&rest);
        out
    }

    /// Parses a packet from wire bytes.
    pub fn parse(bytes: &[u8]) -> Result<Packet, PacketError> {
        if bytes.len() < 6 || bytes.len() > 20 {
            return Err(PacketError::BadLength {
                len: bytes.len(),
                payload_length: *bytes.get(1).unwrap_or(&0),
            });
        }
        let payload_length = bytes[1];
        if bytes.len() != 6 + payload_length as usize {
            return Err(PacketError::BadLength { len: bytes.len(), payload_length });
        }

        let computed = crc8(&bytes[1..]) & 0x1F;
        let expected = bytes[0] & 0x1F;
        if computed != expected {
            return Err(PacketError::BadCrc { expected, computed });
        }

        let seqno = bytes[0] >> 5;
        let sender = bytes[2];
        let receiver = bytes[3];
        let command_id = read_u16_le(bytes, 4);
        let payload = bytes[6..6 + payload_length as usize].to_vec();

        Ok(Packet { seqno, sender, receiver, command_id, payload })
    }

    /// Total serialized length: `6 + payload_length`.
    pub fn length(&self) -> usize {
        6 + self.payload.len()
    }

    /// True iff this packet is addressed host-to-device.
    pub fn is_from_host(&self) -> bool {
        self.sender == HOST && self.receiver == DEVICE
    }

    /// True iff this packet is addressed device-to-host.
    pub fn is_from_device(&self) -> bool {
        self.sender == DEVICE && self.receiver == HOST
    }
}

/// `(s mod 6) + 1`, the next sequence number in a burst's cycle.
pub fn next_seqno(s: u8) -> u8 {
    (s % 6) + 1
}

/// `observed = expected OR observed = 7`.
pub fn seqno_matches(observed: u8, expected: u8) -> bool {
    observed == expected || observed == SEQNO_TERMINAL
}
