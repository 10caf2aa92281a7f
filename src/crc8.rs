//! CRC-8 validation for packet integrity (§4.1, C1).
//!
//! Unreflected CRC-8 with polynomial 0x07, initial value 0, no input/output
//! reflection, no final XOR — this is exactly the `CRC_8_SMBUS` parameter set
//! published by the `crc` crate, confirmed by the shared self-check value
//! (`0xF4` for the ASCII bytes `"123456789"`). Only the low 5 bits of the
//! result are ever used, since packets pack the CRC into a byte shared with
//! the 3-bit sequence number.

use crc::{Crc, CRC_8_SMBUS};

/// The algorithm, computed once and shared; the underlying table is built by
/// the `crc` crate at `const` evaluation time.
static CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);

/// Computes the CRC-8 of `bytes`.
pub fn crc8(bytes: &[u8]) -> u8 {
    CRC8.checksum(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_check() {
        assert_eq!(crc8(b"123456789"), 0xF4);
    }

    #[test]
    fn empty_input_is_init_value() {
        assert_eq!(crc8(&[]), 0x00);
    }
}
