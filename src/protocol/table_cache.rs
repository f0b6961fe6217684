use crate::error::Result;
use crate::logger::{log, LogSeverity};
use crate::protocol::buffer::PacketBuffer;
use crate::protocol::registry::{RuntimeRegistry, StaticRegistry};
use crate::protocol::types::{write_block_table, write_item_table, BlockTableEntry, ItemTable};
use bytes::Bytes;
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

static GLOBAL_TABLE_CACHE: OnceCell<TableCache> = OnceCell::new();

/// Serialized default runtime tables.
///
/// Each table is serialized from the registry the first time it is needed and
/// the bytes are reused for every later encode. Changes made to the registry
/// after that point are never picked up: the cache has no invalidation, only an
/// explicit [`TableCache::reset`] for owners of a non-global instance.
///
/// Concurrent first callers block on the cell while one of them serializes.
pub struct TableCache {
    registry: Arc<dyn RuntimeRegistry>,
    block_table: OnceCell<Bytes>,
    item_table: OnceCell<Bytes>,
}

impl TableCache {
    pub fn new(registry: Arc<dyn RuntimeRegistry>) -> Self {
        Self {
            registry,
            block_table: OnceCell::new(),
            item_table: OnceCell::new(),
        }
    }

    /// Sets the registry behind the process-wide cache. Returns false if the
    /// global cache already exists, in which case the registry is dropped.
    pub fn install_global(registry: Arc<dyn RuntimeRegistry>) -> bool {
        GLOBAL_TABLE_CACHE.set(TableCache::new(registry)).is_ok()
    }

    /// The process-wide cache. Falls back to an empty registry if none was
    /// installed before first use.
    pub fn global() -> &'static TableCache {
        GLOBAL_TABLE_CACHE.get_or_init(|| {
            log(
                "No runtime registry installed, default tables will be empty".to_owned(),
                LogSeverity::Warning,
            );
            TableCache::new(Arc::new(StaticRegistry::default()))
        })
    }

    /// Serialized default block table, including its count prefix. A failed
    /// serialization leaves the cell empty.
    pub fn block_table(&self) -> Result<Bytes> {
        self.block_table
            .get_or_try_init(|| {
                let states = self.registry.block_states();
                log(
                    format!("Caching default block table ({} states)", states.len()),
                    LogSeverity::Debug,
                );
                serialize_block_table(&states)
            })
            .cloned()
    }

    /// Serialized default item table, including its count prefix.
    pub fn item_table(&self) -> Result<Bytes> {
        self.item_table
            .get_or_try_init(|| {
                let items = self.registry.item_ids();
                log(
                    format!("Caching default item table ({} items)", items.len()),
                    LogSeverity::Debug,
                );
                serialize_item_table(&items)
            })
            .cloned()
    }

    pub fn is_block_table_cached(&self) -> bool {
        self.block_table.get().is_some()
    }

    pub fn is_item_table_cached(&self) -> bool {
        self.item_table.get().is_some()
    }

    /// Drops both cached tables so the next encode reads the registry again.
    pub fn reset(&mut self) {
        self.block_table.take();
        self.item_table.take();
    }
}

impl fmt::Debug for TableCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableCache")
            .field("block_table_cached", &self.is_block_table_cached())
            .field("item_table_cached", &self.is_item_table_cached())
            .finish()
    }
}

pub fn serialize_block_table(table: &[BlockTableEntry]) -> Result<Bytes> {
    let mut buffer = PacketBuffer::new();
    write_block_table(&mut buffer, table)?;
    Ok(Bytes::from(buffer.into_inner()))
}

pub fn serialize_item_table(table: &ItemTable) -> Result<Bytes> {
    let mut buffer = PacketBuffer::new();
    write_item_table(&mut buffer, table)?;
    Ok(Bytes::from(buffer.into_inner()))
}
