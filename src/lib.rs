pub mod config;
pub mod error;
pub mod logger;
pub mod protocol;

// Re-export commonly used items
pub use config::ProtocolConfig;
pub use error::{ProtocolError, Result};
pub use logger::{log, LogSeverity};
pub use protocol::chunk_transfer::ChunkTransferPacket;
pub use protocol::handler::PacketHandler;
pub use protocol::packet::{GamePacket, Packet, PacketHeader};
pub use protocol::world_init::WorldInitPacket;
