use crate::error::Result;
use crate::protocol::buffer::PacketBuffer;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Identifier of sub-chunk data the client already holds in its blob cache.
pub type BlobHash = u64;

/// Item name to legacy numeric id. Wire order is insertion order.
pub type ItemTable = IndexMap<String, i16>;

/// Named game rules in the order they are sent.
pub type GameRules = IndexMap<String, GameRuleValue>;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Integer block coordinates, sent as three zigzag VarInts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPosition {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// One row of the runtime block table. The row's position in the table is the
/// runtime id the client will use for this state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTableEntry {
    pub name: String,
    pub data: i16,
    pub legacy_id: i16,
}

impl BlockTableEntry {
    pub fn new(name: impl Into<String>, data: i16, legacy_id: i16) -> Self {
        Self {
            name: name.into(),
            data,
            legacy_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameRuleValue {
    Bool(bool),
    Int(i32),
    Float(f32),
}

impl GameRuleValue {
    pub const TYPE_BOOL: u32 = 1;
    pub const TYPE_INT: u32 = 2;
    pub const TYPE_FLOAT: u32 = 3;

    pub fn type_id(&self) -> u32 {
        match self {
            GameRuleValue::Bool(_) => Self::TYPE_BOOL,
            GameRuleValue::Int(_) => Self::TYPE_INT,
            GameRuleValue::Float(_) => Self::TYPE_FLOAT,
        }
    }
}

/// Rules sent when the caller does not override them. Natural regeneration is
/// turned off so the client does not heal on its own.
pub fn default_game_rules() -> GameRules {
    let mut rules = GameRules::new();
    rules.insert("naturalregeneration".to_owned(), GameRuleValue::Bool(false));
    rules
}

pub fn write_block_table(buffer: &mut PacketBuffer, table: &[BlockTableEntry]) -> Result<()> {
    buffer.write_length_prefix(table.len())?;
    for entry in table {
        buffer.write_string(&entry.name)?;
        buffer.write_i16(entry.data);
        buffer.write_i16(entry.legacy_id);
    }
    Ok(())
}

pub fn read_block_table(buffer: &mut PacketBuffer) -> Result<Vec<BlockTableEntry>> {
    let count = buffer.read_unsigned_varint()? as usize;
    let mut table = Vec::with_capacity(count.min(buffer.remaining()));
    for _ in 0..count {
        let name = buffer.read_string()?;
        let data = buffer.read_i16()?;
        let legacy_id = buffer.read_i16()?;
        table.push(BlockTableEntry {
            name,
            data,
            legacy_id,
        });
    }
    Ok(table)
}

pub fn write_item_table(buffer: &mut PacketBuffer, table: &ItemTable) -> Result<()> {
    buffer.write_length_prefix(table.len())?;
    for (name, legacy_id) in table {
        buffer.write_string(name)?;
        buffer.write_i16(*legacy_id);
    }
    Ok(())
}

pub fn read_item_table(buffer: &mut PacketBuffer) -> Result<ItemTable> {
    let count = buffer.read_unsigned_varint()? as usize;
    let mut table = ItemTable::with_capacity(count.min(buffer.remaining()));
    for _ in 0..count {
        let name = buffer.read_string()?;
        let legacy_id = buffer.read_i16()?;
        table.insert(name, legacy_id);
    }
    Ok(table)
}
