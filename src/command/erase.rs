//! Erase file, §4.7.2.

use log::trace;

use crate::error::RejectError;
use crate::packet::Packet;
use crate::wire::write_u16_le;

use super::Outcome;

pub const CMD_ERASE: u16 = 0x040B;
pub const CMD_ERASE_ACK: u16 = CMD_ERASE | 0x8000;
pub const CMD_ERASE_REPLY: u16 = 0x050B;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingAck,
    AwaitingReply,
    Done,
}

#[derive(Debug)]
pub struct EraseCommand {
    index: u16,
    state: State,
    success: bool,
}

impl EraseCommand {
    pub fn new(index: u16) -> EraseCommand {
        EraseCommand { index, state: State::AwaitingAck, success: false }
    }

    pub fn make_command_packet(&self) -> Packet {
        let mut payload = [0u8; 2];
        write_u16_le(&mut payload, 0, self.index);
        Packet::build(7, CMD_ERASE, &payload)
    }

    pub fn read_packet(&mut self, packet: &Packet) -> Result<(), RejectError> {
        match self.state {
            State::AwaitingAck => self.read_ack(packet),
            State::AwaitingReply => self.read_reply(packet),
            State::Done => Err(RejectError("erase already complete")),
        }
    }

    fn read_ack(&mut self, packet: &Packet) -> Result<(), RejectError> {
        if !packet.is_from_device() || packet.command_id != CMD_ERASE_ACK {
            return Err(RejectError("not an erase ack"));
        }
        self.state = State::AwaitingReply;
        Ok(())
    }

    fn read_reply(&mut self, packet: &Packet) -> Result<(), RejectError> {
        if !packet.is_from_device() || packet.command_id != CMD_ERASE_REPLY {
            return Err(RejectError("not an erase reply"));
        }
        if packet.payload.len() != 1 {
            return Err(RejectError("erase reply payload wrong size"));
        }
        self.success = packet.payload[0] == 0;
        self.state = State::Done;
        trace!("erase({}): reply, success={}", self.index, self.success);
        Ok(())
    }

    pub fn maybe_finish(&self) -> Option<Outcome> {
        if self.state == State::Done {
            Some(Outcome::Erase { index: self.index, success: self.success })
        } else {
            None
        }
    }

    /// Erase always requires an outbound reply-ack once terminal (§4.7.2).
    pub fn should_ack_reply(&self) -> bool {
        true
    }

    pub fn make_reply_ack_packet(&self) -> Packet {
        Packet::build_ack(CMD_ERASE_REPLY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ack_packet() -> Packet {
        Packet::build(7, CMD_ERASE_ACK, &[])
    }

    fn reply_packet(success_byte: u8) -> Packet {
        Packet::build(7, CMD_ERASE_REPLY, &[success_byte])
    }

    #[test]
    fn s3_erase_success_with_reply_ack() {
        let mut cmd = EraseCommand::new(0x1234);
        cmd.read_packet(&ack_packet()).unwrap();
        assert!(cmd.maybe_finish().is_none());

        cmd.read_packet(&reply_packet(0)).unwrap();
        let outcome = cmd.maybe_finish().unwrap();
        match outcome {
            Outcome::Erase { index, success } => {
                assert_eq!(index, 0x1234);
                assert!(success);
            }
            _ => panic!("expected Erase outcome"),
        }
        assert!(cmd.should_ack_reply());
        assert_eq!(cmd.make_reply_ack_packet().command_id, CMD_ERASE_REPLY | 0x8000);
    }

    #[test]
    fn nonzero_payload_byte_is_failure() {
        let mut cmd = EraseCommand::new(1);
        cmd.read_packet(&ack_packet()).unwrap();
        cmd.read_packet(&reply_packet(1)).unwrap();
        match cmd.maybe_finish().unwrap() {
            Outcome::Erase { success, .. } => assert!(!success),
            _ => panic!("expected Erase outcome"),
        }
    }

    #[test]
    fn rejects_reply_before_ack() {
        let mut cmd = EraseCommand::new(1);
        assert!(cmd.read_packet(&reply_packet(0)).is_err());
    }

    #[test]
    fn rejects_second_reply() {
        let mut cmd = EraseCommand::new(1);
        cmd.read_packet(&ack_packet()).unwrap();
        cmd.read_packet(&reply_packet(0)).unwrap();
        assert!(cmd.read_packet(&reply_packet(0)).is_err());
    }
}
