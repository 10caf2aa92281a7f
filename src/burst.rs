//! Mod-6 burst sequence tracking (§4.4, C4).
//!
//! A `Burst` is a tiny, purely functional value: reading a packet returns a
//! *new* burst rather than mutating the old one, matching §3's "updated
//! purely functionally" data-model note.

use crate::packet::{next_seqno, seqno_matches, SEQNO_INVALID, SEQNO_TERMINAL};

/// Sequencing state for one multi-packet reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Burst {
    next_expected: u8,
}

impl Burst {
    /// A fresh burst that has not yet read any packet.
    pub fn new() -> Burst {
        Burst { next_expected: 0 }
    }

    fn invalid() -> Burst {
        Burst { next_expected: SEQNO_INVALID }
    }

    /// True iff no packet has been read yet.
    pub fn is_empty(&self) -> bool {
        self.next_expected == 0
    }

    /// True iff the terminal packet (seqno 7) has been read.
    pub fn has_ended(&self) -> bool {
        self.next_expected == SEQNO_TERMINAL
    }

    /// True iff this is not the invalid sentinel.
    pub fn is_valid(&self) -> bool {
        self.next_expected != SEQNO_INVALID
    }

    /// Advances the burst with an observed sequence number, returning the new
    /// state. The first packet read by a fresh (`is_empty`) burst is accepted
    /// unconditionally, since there is no real expectation to match yet —
    /// everything after that follows `seqno_matches` against the running
    /// `next_expected`.
    pub fn read_packet(&self, seqno: u8) -> Burst {
        if self.has_ended() {
            return Burst::invalid();
        }
        if !self.is_empty() && !seqno_matches(seqno, self.next_expected) {
            return Burst::invalid();
        }
        if seqno == SEQNO_TERMINAL {
            return Burst { next_expected: SEQNO_TERMINAL };
        }
        Burst { next_expected: next_seqno(seqno) }
    }
}

impl Default for Burst {
    fn default() -> Burst {
        Burst::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_burst_is_empty() {
        let burst = Burst::new();
        assert!(burst.is_empty());
        assert!(!burst.has_ended());
        assert!(burst.is_valid());
    }

    #[test]
    fn accepts_first_packet_whatever_its_seqno() {
        let burst = Burst::new().read_packet(3);
        assert!(burst.is_valid());
        assert!(!burst.is_empty());
    }

    #[test]
    fn cycles_then_terminates() {
        let burst = Burst::new();
        let burst = burst.read_packet(1);
        let burst = burst.read_packet(2);
        assert!(!burst.has_ended());
        let burst = burst.read_packet(7);
        assert!(burst.has_ended());
    }

    #[test]
    fn out_of_order_packet_is_invalid() {
        let burst = Burst::new().read_packet(1);
        let burst = burst.read_packet(5);
        assert!(!burst.is_valid());
    }

    #[test]
    fn property_ended_burst_never_reads_valid_again() {
        let ended = Burst::new().read_packet(7);
        assert!(!ended.read_packet(1).is_valid());
        assert!(!ended.read_packet(7).is_valid());
    }
}
