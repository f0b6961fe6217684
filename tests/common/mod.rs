#![allow(dead_code)]

use bytes::Bytes;
use shulker::protocol::chunk_transfer::ChunkTransferPacket;
use shulker::protocol::handler::PacketHandler;
use shulker::protocol::types::{BlockTableEntry, ItemTable};
use shulker::protocol::world_init::WorldInitPacket;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

pub const BLOCK_STATES_JSON: &str = r#"[
    {"name": "minecraft:stone", "data": 0, "legacy_id": 1},
    {"name": "minecraft:air", "data": 0, "legacy_id": 0}
]"#;

pub const ITEM_ID_MAP_JSON: &str = r#"{"minecraft:stone": 1, "minecraft:apple": 260}"#;

/// Handler that records what it was given and accepts everything.
#[derive(Default)]
pub struct RecordingHandler {
    pub chunks: Vec<ChunkTransferPacket>,
    pub world_inits: Vec<WorldInitPacket>,
}

impl PacketHandler for RecordingHandler {
    fn handle_chunk_transfer(&mut self, packet: &ChunkTransferPacket) -> bool {
        self.chunks.push(packet.clone());
        true
    }

    fn handle_world_init(&mut self, packet: &WorldInitPacket) -> bool {
        self.world_inits.push(packet.clone());
        true
    }
}

pub fn cached_chunk(chunk_x: i32, chunk_z: i32) -> ChunkTransferPacket {
    ChunkTransferPacket::with_cache(
        chunk_x,
        chunk_z,
        16,
        vec![0x0102030405060708, u64::MAX],
        Bytes::from_static(&[0x0A, 0x0B]),
    )
}

/// World init packet carrying its own tables, so it never touches the global cache.
pub fn world_init_with_tables(world_name: &str) -> WorldInitPacket {
    let mut packet = WorldInitPacket::new(-1, 1, world_name.to_owned());
    packet.block_table = Some(vec![
        BlockTableEntry::new("minecraft:stone", 0, 1),
        BlockTableEntry::new("minecraft:air", 0, 0),
    ]);
    let mut items = ItemTable::new();
    items.insert("minecraft:stone".to_owned(), 1);
    packet.item_table = Some(items);
    packet.assign_correlation_id(world_name.as_bytes());
    packet
}

/// Writes `contents` to a per-process temp file and returns its path.
pub fn write_temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "shulker-it-{}-{}",
        std::process::id(),
        name
    ));
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}
