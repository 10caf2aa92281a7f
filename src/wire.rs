//! Little-endian byte-offset reads and writes (§4.2, C2).
//!
//! Pure arithmetic over caller-supplied buffers at caller-supplied offsets,
//! deliberately not a packed-struct type-pun: per §9's design note, accessing
//! wire fields by offset sidesteps strict-aliasing concerns entirely. No
//! bounds-checking beyond what slice indexing already gives the caller;
//! buffers must be sized for the field width at the given offset.

/// Reads a little-endian `u16` from `buf` at `offset`.
pub fn read_u16_le(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

/// Reads a little-endian `u32` from `buf` at `offset`.
pub fn read_u32_le(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

/// Writes a little-endian `u16` into `buf` at `offset`.
pub fn write_u16_le(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

/// Writes a little-endian `u32` into `buf` at `offset`.
pub fn write_u32_le(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}
