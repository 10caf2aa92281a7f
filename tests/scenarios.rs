//! Scenario tests S1-S6 from spec.md §8, driving `ProtocolManager` purely
//! through its public surface (`interface::Transport`/`ResultSink` plus the
//! four operations), the way an embedding transport/UI layer would.

use pretty_assertions::assert_eq;
use viiiiva_protocol::directory::LogicalDirectoryEntry;
use viiiiva_protocol::interface::{ErrorKind, ResultSink, Transport};
use viiiiva_protocol::manager::ProtocolManager;
use viiiiva_protocol::packet::Packet;
use viiiiva_protocol::time::DEVICE_EPOCH_POSIX;

#[derive(Default)]
struct FakeTransport {
    writes: Vec<Vec<u8>>,
    waiting_starts: u32,
    waiting_finishes: u32,
}

impl Transport for FakeTransport {
    fn write_value(&mut self, bytes: &[u8]) -> i32 {
        self.writes.push(bytes.to_vec());
        0
    }
    fn start_waiting(&mut self) {
        self.waiting_starts += 1;
    }
    fn finish_waiting(&mut self) {
        self.waiting_finishes += 1;
    }
}

#[derive(Debug, Clone, PartialEq)]
enum RecordedEvent {
    Error(ErrorKind),
    ParseClock(i64),
    ParseDirectoryEntry(LogicalDirectoryEntry),
    FinishParsingDirectory,
    DownloadFile(u16, Vec<u8>),
    EraseFile(u16, bool),
    SetTime(bool),
}

#[derive(Default)]
struct RecordingSink {
    events: Vec<RecordedEvent>,
}

impl ResultSink for RecordingSink {
    fn on_error(&mut self, code: ErrorKind, _message: &str) {
        self.events.push(RecordedEvent::Error(code));
    }
    fn on_parse_clock(&mut self, posix_time: i64) {
        self.events.push(RecordedEvent::ParseClock(posix_time));
    }
    fn on_parse_directory_entry(&mut self, entry: LogicalDirectoryEntry) {
        self.events.push(RecordedEvent::ParseDirectoryEntry(entry));
    }
    fn on_finish_parsing_directory(&mut self) {
        self.events.push(RecordedEvent::FinishParsingDirectory);
    }
    fn on_download_file(&mut self, index: u16, bytes: Vec<u8>) {
        self.events.push(RecordedEvent::DownloadFile(index, bytes));
    }
    fn on_erase_file(&mut self, index: u16, ok: bool) {
        self.events.push(RecordedEvent::EraseFile(index, ok));
    }
    fn on_set_time(&mut self, ok: bool) {
        self.events.push(RecordedEvent::SetTime(ok));
    }
}

fn manager() -> ProtocolManager<FakeTransport, RecordingSink> {
    ProtocolManager::new(FakeTransport::default(), RecordingSink::default())
}

#[test]
fn s1_packet_round_trip_with_known_crc() {
    let packet = Packet::build(7, 0x0600, &[]);
    let bytes = packet.serialize();
    assert_eq!(bytes, vec![0xE3, 0x00, 0x03, 0x01, 0x00, 0x06]);

    let parsed = Packet::parse(&bytes).unwrap();
    assert_eq!(parsed, packet);
    assert_eq!(parsed.seqno, 7);
    assert_eq!(parsed.length(), 6);
    assert!(parsed.is_from_host());
}

#[test]
fn s2_set_time_success() {
    let mut mgr = manager();
    mgr.set_time(0x12345678 + DEVICE_EPOCH_POSIX);

    assert_eq!(mgr.transport().writes.len(), 1);
    assert_eq!(
        &mgr.transport().writes[0][1..],
        &[0x04, 0x03, 0x01, 0x08, 0x01, 0x78, 0x56, 0x34, 0x12]
    );
    assert_eq!(mgr.transport().waiting_starts, 1);

    let ack = Packet::build(7, 0x0108 | 0x8000, &[]);
    mgr.notify_value(&ack.serialize());

    let (transport, sink) = mgr.into_parts();
    assert_eq!(transport.waiting_finishes, 1);
    assert_eq!(sink.events, vec![RecordedEvent::SetTime(true)]);
}

#[test]
fn s3_erase_file_success_with_reply_ack() {
    let mut mgr = manager();
    mgr.erase_file(0x1234);

    let ack = Packet::build(7, 0x040B | 0x8000, &[]);
    mgr.notify_value(&ack.serialize());

    let reply = Packet::build(7, 0x050B, &[0x00]);
    mgr.notify_value(&reply.serialize());

    let (transport, sink) = mgr.into_parts();
    assert_eq!(transport.writes.len(), 2);
    assert_eq!(sink.events, vec![RecordedEvent::EraseFile(0x1234, true)]);
    assert_eq!(transport.waiting_finishes, 1);
}

#[test]
fn s3_erase_file_nonzero_reply_byte_is_failure() {
    let mut mgr = manager();
    mgr.erase_file(0x5678);

    let ack = Packet::build(7, 0x040B | 0x8000, &[]);
    mgr.notify_value(&ack.serialize());
    let reply = Packet::build(7, 0x050B, &[0x01]);
    mgr.notify_value(&reply.serialize());

    let (_, sink) = mgr.into_parts();
    assert_eq!(sink.events, vec![RecordedEvent::EraseFile(0x5678, false)]);
}

#[test]
fn s4_directory_download() {
    let mut mgr = manager();
    mgr.download_directory();

    let mut ack_payload = [0u8; 10];
    ack_payload[6..10].copy_from_slice(&2u32.to_le_bytes());
    let ack = Packet::build(7, 0x010B | 0x8000, &ack_payload);
    mgr.notify_value(&ack.serialize());

    let mut buffer = vec![1, 16, 1, 0, 0, 0, 0, 0, 0x12, 0x34, 0x56, 0x78, 0, 0, 0, 0];
    buffer.extend_from_slice(&[
        0x02, 0x00, 0x80, 0x04, 0x00, 0x00, 0x00, 0x00, 0x1C, 0x00, 0x00, 0x00, 0x11, 0x34, 0x56,
        0x78,
    ]);

    let first = Packet::build(1, 0x030B, &buffer[0..14]);
    let second = Packet::build(2, 0x030B, &buffer[14..28]);
    let third = Packet::build(7, 0x030B, &buffer[28..32]);
    mgr.notify_value(&first.serialize());
    mgr.notify_value(&second.serialize());
    mgr.notify_value(&third.serialize());

    let (_, sink) = mgr.into_parts();
    assert_eq!(sink.events.len(), 3);
    assert_eq!(sink.events[0], RecordedEvent::ParseClock(2_649_980_946));
    match &sink.events[1] {
        RecordedEvent::ParseDirectoryEntry(entry) => {
            assert_eq!(entry.posix_time, 2_649_980_945);
            assert_eq!(entry.length, 28);
            assert_eq!(entry.index, 2);
        }
        other => panic!("expected a directory entry, got {other:?}"),
    }
    assert_eq!(sink.events[2], RecordedEvent::FinishParsingDirectory);
}

#[test]
fn s5_file_download_accumulates_across_burst() {
    let mut mgr = manager();
    mgr.download_file(0x1234);

    let mut ack_payload = [0u8; 10];
    ack_payload[0..2].copy_from_slice(&0x1234u16.to_le_bytes());
    ack_payload[6..10].copy_from_slice(&28u32.to_le_bytes());
    let ack = Packet::build(7, 0x010B | 0x8000, &ack_payload);
    mgr.notify_value(&ack.serialize());

    let first_bytes: Vec<u8> = (1..=14).collect();
    let second_bytes: Vec<u8> = (15..=28).collect();
    let first = Packet::build(1, 0x030B, &first_bytes);
    let second = Packet::build(7, 0x030B, &second_bytes);
    mgr.notify_value(&first.serialize());
    mgr.notify_value(&second.serialize());

    let (_, sink) = mgr.into_parts();
    assert_eq!(
        sink.events,
        vec![RecordedEvent::DownloadFile(0x1234, (1..=28).collect())]
    );
}

#[test]
fn s6_timeout_while_waiting_then_accepts_next_operation() {
    let mut mgr = manager();
    mgr.download_file(1);
    mgr.notify_timeout();

    assert_eq!(mgr.sink().events, vec![RecordedEvent::Error(ErrorKind::Unexpected)]);
    assert_eq!(mgr.transport().waiting_finishes, 1);

    mgr.erase_file(2);
    let (transport, _) = mgr.into_parts();
    assert_eq!(transport.writes.len(), 2);
}
