use crate::protocol::chunk_transfer::ChunkTransferPacket;
use crate::protocol::world_init::WorldInitPacket;

/// Receives decoded packets. Each method returns whether the packet was
/// actually handled; the defaults decline everything, so implementors only
/// override the packets they care about.
pub trait PacketHandler {
    fn handle_chunk_transfer(&mut self, _packet: &ChunkTransferPacket) -> bool {
        false
    }

    fn handle_world_init(&mut self, _packet: &WorldInitPacket) -> bool {
        false
    }
}
