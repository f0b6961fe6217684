use crate::config::ProtocolConfig;
use crate::error::Result;
use crate::logger::{log, LogSeverity};
use crate::protocol::types::{BlockTableEntry, ItemTable};
use parking_lot::RwLock;
use std::fs;

/// Source of the runtime tables sent when a [`WorldInitPacket`] leaves its own
/// tables unset.
///
/// [`WorldInitPacket`]: crate::protocol::world_init::WorldInitPacket
pub trait RuntimeRegistry: Send + Sync {
    /// Known block states, in runtime id order.
    fn block_states(&self) -> Vec<BlockTableEntry>;

    /// Item names mapped to legacy ids, in wire order.
    fn item_ids(&self) -> ItemTable;
}

/// In-memory registry. Its contents can be replaced at any time; note that a
/// [`TableCache`](crate::protocol::table_cache::TableCache) that already
/// serialized a table will not see the change.
#[derive(Debug, Default)]
pub struct StaticRegistry {
    block_states: RwLock<Vec<BlockTableEntry>>,
    item_ids: RwLock<ItemTable>,
}

impl StaticRegistry {
    pub fn new(block_states: Vec<BlockTableEntry>, item_ids: ItemTable) -> Self {
        Self {
            block_states: RwLock::new(block_states),
            item_ids: RwLock::new(item_ids),
        }
    }

    /// Parses a block state list (`[{"name", "data", "legacy_id"}, ...]`) and an
    /// item id map (`{"minecraft:stone": 1, ...}`). Map order is kept.
    pub fn from_json(block_states_json: &str, item_id_map_json: &str) -> Result<Self> {
        let block_states: Vec<BlockTableEntry> = serde_json::from_str(block_states_json)?;
        let item_ids: ItemTable = serde_json::from_str(item_id_map_json)?;
        Ok(Self::new(block_states, item_ids))
    }

    /// Reads whichever registry files the config names. Missing paths leave the
    /// corresponding table empty.
    pub fn load(config: &ProtocolConfig) -> Result<Self> {
        let block_states: Vec<BlockTableEntry> = match &config.block_states_path {
            Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
            None => Vec::new(),
        };
        let item_ids: ItemTable = match &config.item_id_map_path {
            Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
            None => ItemTable::new(),
        };

        log(
            format!(
                "Loaded {} block states and {} item ids",
                block_states.len(),
                item_ids.len()
            ),
            LogSeverity::Info,
        );
        Ok(Self::new(block_states, item_ids))
    }

    pub fn set_block_states(&self, block_states: Vec<BlockTableEntry>) {
        *self.block_states.write() = block_states;
    }

    pub fn push_block_state(&self, entry: BlockTableEntry) {
        self.block_states.write().push(entry);
    }

    pub fn set_item_id(&self, name: impl Into<String>, legacy_id: i16) {
        self.item_ids.write().insert(name.into(), legacy_id);
    }
}

impl RuntimeRegistry for StaticRegistry {
    fn block_states(&self) -> Vec<BlockTableEntry> {
        self.block_states.read().clone()
    }

    fn item_ids(&self) -> ItemTable {
        self.item_ids.read().clone()
    }
}
