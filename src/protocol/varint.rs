//! Variable-length integer encoding.
//!
//! Seven payload bits per byte, least significant group first, with the high bit
//! set on every byte except the last. Signed values are zigzag-mapped first so
//! that small negative numbers stay as short as small positive ones.

use crate::error::{ProtocolError, Result};

/// Longest encoding of a 32-bit value
pub const MAX_VARINT32_BYTES: usize = 5;
/// Longest encoding of a 64-bit value
pub const MAX_VARINT64_BYTES: usize = 10;

pub fn zigzag_encode32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

pub fn zigzag_decode32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

pub fn zigzag_encode64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

pub fn zigzag_decode64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

fn write_varint_bits(buffer: &mut Vec<u8>, mut value: u64) {
    while (value & !0x7F) != 0 {
        buffer.push(((value & 0x7F) as u8) | 0x80);
        value >>= 7;
    }
    buffer.push(value as u8);
}

fn read_varint_bits(bytes: &[u8], cursor: &mut usize, max_bytes: usize) -> Result<u64> {
    let mut result = 0u64;

    for group in 0..max_bytes {
        let Some(&byte) = bytes.get(*cursor) else {
            return Err(ProtocolError::TruncatedInput {
                needed: 1,
                remaining: 0,
            });
        };
        *cursor += 1;

        result |= ((byte & 0x7F) as u64) << (7 * group);
        if (byte & 0x80) == 0 {
            return Ok(result);
        }
    }

    Err(ProtocolError::MalformedVarInt { max_bytes })
}

pub fn write_unsigned_varint32(buffer: &mut Vec<u8>, value: u32) {
    write_varint_bits(buffer, value as u64);
}

/// Reads an unsigned 32-bit VarInt starting at `cursor`, advancing it past the
/// consumed bytes. Bits above the 32nd in the fifth byte are dropped.
pub fn read_unsigned_varint32(bytes: &[u8], cursor: &mut usize) -> Result<u32> {
    read_varint_bits(bytes, cursor, MAX_VARINT32_BYTES).map(|value| value as u32)
}

pub fn write_varint32(buffer: &mut Vec<u8>, value: i32) {
    write_unsigned_varint32(buffer, zigzag_encode32(value));
}

pub fn read_varint32(bytes: &[u8], cursor: &mut usize) -> Result<i32> {
    read_unsigned_varint32(bytes, cursor).map(zigzag_decode32)
}

pub fn write_unsigned_varint64(buffer: &mut Vec<u8>, value: u64) {
    write_varint_bits(buffer, value);
}

pub fn read_unsigned_varint64(bytes: &[u8], cursor: &mut usize) -> Result<u64> {
    read_varint_bits(bytes, cursor, MAX_VARINT64_BYTES)
}

pub fn write_varint64(buffer: &mut Vec<u8>, value: i64) {
    write_unsigned_varint64(buffer, zigzag_encode64(value));
}

pub fn read_varint64(bytes: &[u8], cursor: &mut usize) -> Result<i64> {
    read_unsigned_varint64(bytes, cursor).map(zigzag_decode64)
}

/// Number of bytes `value` occupies as an unsigned VarInt.
pub fn unsigned_varint_len(value: u64) -> usize {
    let significant_bits = 64 - value.leading_zeros() as usize;
    significant_bits.max(1).div_ceil(7)
}
