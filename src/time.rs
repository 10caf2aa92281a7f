//! POSIX seconds to/from the device's epoch (§4.6, C6).
//!
//! The device epoch is 1989-12-31T00:00:00Z, which is POSIX second
//! 631,065,600. No leap-second adjustment, matching the reference device.

/// POSIX seconds at the device epoch (1989-12-31T00:00:00Z).
pub const DEVICE_EPOCH_POSIX: i64 = 631_065_600;

/// Converts POSIX seconds to the device's 32-bit epoch, truncating to 32
/// bits.
pub fn to_device(posix: i64) -> u32 {
    (posix - DEVICE_EPOCH_POSIX) as u32
}

/// Converts a device-epoch timestamp to POSIX seconds.
pub fn to_posix(device: u32) -> i64 {
    device as i64 + DEVICE_EPOCH_POSIX
}

/// Rounds a fractional POSIX time up to the next whole second, compensating
/// for propagation lag before a set-clock command is built. The engine's
/// public `set_time` operation takes an already-whole-second `i64` (§6.3);
/// this helper exists for callers — such as
/// [`crate::manager::ProtocolManager::set_time_fractional`] — that start
/// from a fractional wall-clock reading.
pub fn round_up_to_second(posix_fractional: f64) -> i64 {
    posix_fractional.ceil() as i64
}
