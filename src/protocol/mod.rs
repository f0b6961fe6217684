pub mod buffer;
pub mod chunk_transfer;
pub mod framing;
pub mod handler;
pub mod packet;
pub mod protocol_info;
pub mod registry;
pub mod table_cache;
pub mod types;
pub mod varint;
pub mod world_init;
