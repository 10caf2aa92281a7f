//! Set clock, §4.7.3.

use crate::error::RejectError;
use crate::packet::Packet;
use crate::wire::write_u32_le;

use super::Outcome;

pub const CMD_SET_TIME: u16 = 0x0108;
pub const CMD_SET_TIME_ACK: u16 = CMD_SET_TIME | 0x8000;

/// No device-originated reply, only an ack; terminal as soon as the ack
/// arrives.
#[derive(Debug)]
pub struct SetTimeCommand {
    device_time: u32,
    has_ack: bool,
}

impl SetTimeCommand {
    pub fn new(device_time: u32) -> SetTimeCommand {
        SetTimeCommand { device_time, has_ack: false }
    }

    pub fn make_command_packet(&self) -> Packet {
        let mut payload = [0u8; 4];
        write_u32_le(&mut payload, 0, self.device_time);
        Packet::build(7, CMD_SET_TIME, &payload)
    }

    /// Only the ack is ever accepted; a packet arriving after terminal finds
    /// no active slot and is rejected one layer up by the manager, so there
    /// is no explicit "already acknowledged" branch needed here for that
    /// case — it exists anyway as a direct guard against a stray duplicate
    /// ack within the same command lifetime.
    pub fn read_packet(&mut self, packet: &Packet) -> Result<(), RejectError> {
        if self.has_ack {
            return Err(RejectError("set-time already acknowledged"));
        }
        if !packet.is_from_device() || packet.command_id != CMD_SET_TIME_ACK {
            return Err(RejectError("not a set-time ack"));
        }
        self.has_ack = true;
        Ok(())
    }

    pub fn maybe_finish(&self) -> Option<Outcome> {
        if self.has_ack {
            Some(Outcome::SetTime { success: true })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s2_set_time_success() {
        let mut cmd = SetTimeCommand::new(0x12345678);
        let packet = cmd.make_command_packet();
        assert_eq!(
            &packet.serialize()[1..],
            &[0x04, 0x03, 0x01, 0x08, 0x01, 0x78, 0x56, 0x34, 0x12]
        );

        let ack = Packet::build(7, CMD_SET_TIME_ACK, &[]);
        cmd.read_packet(&ack).unwrap();
        match cmd.maybe_finish().unwrap() {
            Outcome::SetTime { success } => assert!(success),
            _ => panic!("expected SetTime outcome"),
        }
    }

    #[test]
    fn not_terminal_before_ack() {
        let cmd = SetTimeCommand::new(0);
        assert!(cmd.maybe_finish().is_none());
    }

    #[test]
    fn rejects_second_packet_after_ack() {
        let mut cmd = SetTimeCommand::new(0);
        let ack = Packet::build(7, CMD_SET_TIME_ACK, &[]);
        cmd.read_packet(&ack).unwrap();
        assert!(cmd.read_packet(&ack).is_err());
    }
}
