use crate::error::{ProtocolError, Result};
use crate::protocol::types::{BlockPosition, GameRuleValue, GameRules, Vector3};
use crate::protocol::varint;
use byteorder::{ByteOrder, LittleEndian};

/// Packet buffer. Holds the encoded bytes and a read cursor.
/// Reads move the cursor forward and never go back; writes always append to the
/// end of the buffer regardless of where the cursor is.
/// Every fixed-width value is little-endian.
#[derive(Debug, Default, Clone)]
pub struct PacketBuffer {
    buffer: Vec<u8>,
    cursor: usize,
}

impl PacketBuffer {
    /// Creates an empty packet buffer with the cursor at 0.
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            cursor: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            cursor: 0,
        }
    }

    /// Wraps received bytes for reading. The cursor starts at 0.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            buffer: bytes.into(),
            cursor: 0,
        }
    }

    pub fn get_buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    pub fn get_cursor(&self) -> usize {
        self.cursor
    }

    /// Number of bytes not yet read.
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    /// Whether every byte has been read.
    pub fn feof(&self) -> bool {
        self.cursor >= self.buffer.len()
    }

    /// Returns the byte under the cursor without consuming it.
    pub fn peek_byte(&self) -> Option<u8> {
        self.buffer.get(self.cursor).copied()
    }

    /// Consumes `length` bytes or fails without moving the cursor.
    fn take(&mut self, length: usize) -> Result<&[u8]> {
        if length > self.remaining() {
            return Err(ProtocolError::TruncatedInput {
                needed: length,
                remaining: self.remaining(),
            });
        }
        let start = self.cursor;
        self.cursor += length;
        Ok(&self.buffer[start..self.cursor])
    }

    /// Appends bytes as-is, without a length prefix.
    pub fn write_bytes_raw(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Booleans are a single byte. Any non-zero byte reads as true; writes always
    /// emit 0x00 or 0x01.
    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(value as u8);
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0x00)
    }

    pub fn write_u16(&mut self, value: u16) {
        let mut bytes = [0u8; 2];
        LittleEndian::write_u16(&mut bytes, value);
        self.write_bytes_raw(&bytes);
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub fn write_i16(&mut self, value: i16) {
        let mut bytes = [0u8; 2];
        LittleEndian::write_i16(&mut bytes, value);
        self.write_bytes_raw(&bytes);
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(LittleEndian::read_i16(self.take(2)?))
    }

    pub fn write_u32(&mut self, value: u32) {
        let mut bytes = [0u8; 4];
        LittleEndian::write_u32(&mut bytes, value);
        self.write_bytes_raw(&bytes);
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub fn write_i32(&mut self, value: i32) {
        let mut bytes = [0u8; 4];
        LittleEndian::write_i32(&mut bytes, value);
        self.write_bytes_raw(&bytes);
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    pub fn write_f32(&mut self, value: f32) {
        let mut bytes = [0u8; 4];
        LittleEndian::write_f32(&mut bytes, value);
        self.write_bytes_raw(&bytes);
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(LittleEndian::read_f32(self.take(4)?))
    }

    pub fn write_u64(&mut self, value: u64) {
        let mut bytes = [0u8; 8];
        LittleEndian::write_u64(&mut bytes, value);
        self.write_bytes_raw(&bytes);
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(LittleEndian::read_u64(self.take(8)?))
    }

    /// Writes a 64-bit value as two 32-bit words, low word first.
    /// Tick counters and blob hashes use this layout instead of a single 8-byte
    /// write, and it has to stay that way to match what peers send.
    pub fn write_u64_words(&mut self, value: u64) {
        self.write_u32((value & 0xFFFF_FFFF) as u32);
        self.write_u32((value >> 32) as u32);
    }

    /// Reads a value written by [`PacketBuffer::write_u64_words`].
    pub fn read_u64_words(&mut self) -> Result<u64> {
        let low = self.read_u32()? as u64;
        let high = self.read_u32()? as u64;
        Ok(low | (high << 32))
    }

    /// Writes an unsigned 32-bit VarInt.
    pub fn write_unsigned_varint(&mut self, value: u32) {
        varint::write_unsigned_varint32(&mut self.buffer, value);
    }

    /// Reads an unsigned 32-bit VarInt.
    pub fn read_unsigned_varint(&mut self) -> Result<u32> {
        varint::read_unsigned_varint32(&self.buffer, &mut self.cursor)
    }

    /// Writes a signed (zigzag) 32-bit VarInt.
    pub fn write_varint(&mut self, value: i32) {
        varint::write_varint32(&mut self.buffer, value);
    }

    /// Reads a signed (zigzag) 32-bit VarInt.
    pub fn read_varint(&mut self) -> Result<i32> {
        varint::read_varint32(&self.buffer, &mut self.cursor)
    }

    pub fn write_unsigned_varlong(&mut self, value: u64) {
        varint::write_unsigned_varint64(&mut self.buffer, value);
    }

    pub fn read_unsigned_varlong(&mut self) -> Result<u64> {
        varint::read_unsigned_varint64(&self.buffer, &mut self.cursor)
    }

    pub fn write_varlong(&mut self, value: i64) {
        varint::write_varint64(&mut self.buffer, value);
    }

    pub fn read_varlong(&mut self) -> Result<i64> {
        varint::read_varint64(&self.buffer, &mut self.cursor)
    }

    /// Writes a length or element count as an unsigned VarInt. Anything that does
    /// not fit in 32 bits is rejected instead of being truncated.
    pub fn write_length_prefix(&mut self, length: usize) -> Result<()> {
        let length = u32::try_from(length).map_err(|_| {
            ProtocolError::InvariantViolation(format!(
                "length {} does not fit in an unsigned 32-bit VarInt",
                length
            ))
        })?;
        self.write_unsigned_varint(length);
        Ok(())
    }

    /// Writes a byte string prefixed with its length as an unsigned VarInt.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_length_prefix(bytes.len())?;
        self.write_bytes_raw(bytes);
        Ok(())
    }

    /// Reads a length-prefixed byte string.
    pub fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let length = self.read_unsigned_varint()? as usize;
        Ok(self.take(length)?.to_vec())
    }

    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_bytes(value.as_bytes())
    }

    /// Reads a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<String> {
        Ok(String::from_utf8(self.read_bytes()?)?)
    }

    pub fn write_entity_unique_id(&mut self, value: i64) {
        self.write_varlong(value);
    }

    pub fn read_entity_unique_id(&mut self) -> Result<i64> {
        self.read_varlong()
    }

    pub fn write_entity_runtime_id(&mut self, value: u64) {
        self.write_unsigned_varlong(value);
    }

    pub fn read_entity_runtime_id(&mut self) -> Result<u64> {
        self.read_unsigned_varlong()
    }

    pub fn write_vector3(&mut self, value: Vector3) {
        self.write_f32(value.x);
        self.write_f32(value.y);
        self.write_f32(value.z);
    }

    pub fn read_vector3(&mut self) -> Result<Vector3> {
        Ok(Vector3 {
            x: self.read_f32()?,
            y: self.read_f32()?,
            z: self.read_f32()?,
        })
    }

    /// Writes a block position as three signed VarInts.
    pub fn write_block_position(&mut self, position: BlockPosition) {
        self.write_varint(position.x);
        self.write_varint(position.y);
        self.write_varint(position.z);
    }

    pub fn read_block_position(&mut self) -> Result<BlockPosition> {
        Ok(BlockPosition {
            x: self.read_varint()?,
            y: self.read_varint()?,
            z: self.read_varint()?,
        })
    }

    /// Writes game rules: a count, then name, type tag and value for each rule.
    /// Integer rules carry the raw bit pattern as an unsigned VarInt.
    pub fn write_game_rules(&mut self, rules: &GameRules) -> Result<()> {
        self.write_length_prefix(rules.len())?;
        for (name, value) in rules {
            self.write_string(name)?;
            self.write_unsigned_varint(value.type_id());
            match value {
                GameRuleValue::Bool(v) => self.write_bool(*v),
                GameRuleValue::Int(v) => self.write_unsigned_varint(*v as u32),
                GameRuleValue::Float(v) => self.write_f32(*v),
            }
        }
        Ok(())
    }

    pub fn read_game_rules(&mut self) -> Result<GameRules> {
        let count = self.read_unsigned_varint()? as usize;
        let mut rules = GameRules::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            let name = self.read_string()?;
            let value = match self.read_unsigned_varint()? {
                GameRuleValue::TYPE_BOOL => GameRuleValue::Bool(self.read_bool()?),
                GameRuleValue::TYPE_INT => GameRuleValue::Int(self.read_unsigned_varint()? as i32),
                GameRuleValue::TYPE_FLOAT => GameRuleValue::Float(self.read_f32()?),
                other => return Err(ProtocolError::UnknownGameRuleType(other)),
            };
            rules.insert(name, value);
        }
        Ok(rules)
    }
}
