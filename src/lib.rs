//! Protocol engine for the Viiiiva heart-rate-monitor's proprietary BLE GATT
//! protocol: a single characteristic carrying framed, CRC-8-checked packets
//! that sequence multi-packet "burst" replies and drive a per-command
//! acknowledgement-then-reply state machine.
//!
//! The engine is deliberately narrow: it encodes outbound commands, decodes
//! inbound notifications, and exposes four operations — list directory,
//! download file, erase file, set clock — to a caller that owns the
//! Bluetooth transport. [`manager::ProtocolManager`] is the entry point;
//! [`interface`] defines the two traits ([`interface::Transport`],
//! [`interface::ResultSink`]) that connect it to the outside world.
//!
//! Module map, leaves first: [`crc8`] (C1), [`wire`] (C2), [`packet`] (C3),
//! [`burst`] (C4), [`directory`] (C5), [`time`] (C6), [`command`] (C7),
//! [`manager`] (C8), [`interface`] (C9). [`config`] carries the client-side
//! policy knobs the engine itself does not enforce. [`transport::ble`] and
//! `bin/cli` are out-of-scope collaborators kept here as a runnable demo.

pub mod burst;
pub mod command;
pub mod config;
pub mod crc8;
pub mod directory;
pub mod error;
pub mod interface;
pub mod manager;
pub mod packet;
pub mod time;
pub mod transport;
pub mod wire;
