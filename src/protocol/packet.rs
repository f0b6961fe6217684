use crate::error::{ProtocolError, Result};
use crate::logger::{log, LogSeverity};
use crate::protocol::buffer::PacketBuffer;
use crate::protocol::chunk_transfer::ChunkTransferPacket;
use crate::protocol::handler::PacketHandler;
use crate::protocol::protocol_info::{
    LEVEL_CHUNK_PACKET, PID_MASK, RECIPIENT_SUBCLIENT_ID_SHIFT, SENDER_SUBCLIENT_ID_SHIFT,
    START_GAME_PACKET, SUBCLIENT_ID_MASK,
};
use crate::protocol::world_init::WorldInitPacket;

/// Header written in front of every packet payload: one unsigned VarInt carrying
/// the packet id and the split-screen sub-client ids of both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PacketHeader {
    pub packet_id: u32,
    pub sender_sub_id: u8,
    pub recipient_sub_id: u8,
}

impl PacketHeader {
    pub fn new(packet_id: u32) -> Self {
        Self {
            packet_id,
            sender_sub_id: 0,
            recipient_sub_id: 0,
        }
    }

    pub fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        let raw = buffer.read_unsigned_varint()?;
        Ok(Self {
            packet_id: raw & PID_MASK,
            sender_sub_id: ((raw >> SENDER_SUBCLIENT_ID_SHIFT) & SUBCLIENT_ID_MASK) as u8,
            recipient_sub_id: ((raw >> RECIPIENT_SUBCLIENT_ID_SHIFT) & SUBCLIENT_ID_MASK) as u8,
        })
    }

    pub fn write_to_buffer(&self, buffer: &mut PacketBuffer) {
        buffer.write_unsigned_varint(
            (self.packet_id & PID_MASK)
                | ((self.sender_sub_id as u32 & SUBCLIENT_ID_MASK) << SENDER_SUBCLIENT_ID_SHIFT)
                | ((self.recipient_sub_id as u32 & SUBCLIENT_ID_MASK)
                    << RECIPIENT_SUBCLIENT_ID_SHIFT),
        );
    }
}

/// Packet trait. Every packet has a fixed id, a payload codec, and a single
/// handler method it is routed to.
pub trait Packet: Sized {
    /// Packet ID
    fn packet_id() -> u32;

    /// Reads the payload (everything after the header) in wire order.
    fn decode_payload(buffer: &mut PacketBuffer) -> Result<Self>;

    /// Writes the payload. Must be the exact inverse of `decode_payload`.
    fn encode_payload(&self, buffer: &mut PacketBuffer) -> Result<()>;

    /// Hands the packet to its handler method and reports whether it was consumed.
    fn handle(&self, handler: &mut dyn PacketHandler) -> bool;

    /// Reads header and payload, rejecting a header that belongs to another packet.
    fn read_from_buffer(buffer: &mut PacketBuffer) -> Result<Self> {
        let header = PacketHeader::read_from_buffer(buffer)?;
        if header.packet_id != Self::packet_id() {
            return Err(ProtocolError::UnexpectedPacketId {
                expected: Self::packet_id(),
                actual: header.packet_id,
            });
        }

        let packet = Self::decode_payload(buffer)?;
        report_unread_bytes(buffer, header.packet_id);
        Ok(packet)
    }

    fn write_to_buffer(&self, buffer: &mut PacketBuffer) -> Result<()> {
        PacketHeader::new(Self::packet_id()).write_to_buffer(buffer);
        self.encode_payload(buffer)
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        let mut buffer = PacketBuffer::from_bytes(bytes);
        Self::read_from_buffer(&mut buffer)
    }

    fn encode(&self) -> Result<Vec<u8>> {
        let mut buffer = PacketBuffer::new();
        self.write_to_buffer(&mut buffer)?;
        Ok(buffer.into_inner())
    }
}

fn report_unread_bytes(buffer: &PacketBuffer, packet_id: u32) {
    if !buffer.feof() {
        log(
            format!(
                "Still {} bytes unread in packet 0x{:02x}",
                buffer.remaining(),
                packet_id
            ),
            LogSeverity::Warning,
        );
    }
}

/// Every packet this crate knows how to decode.
#[derive(Debug, Clone, PartialEq)]
pub enum GamePacket {
    ChunkTransfer(ChunkTransferPacket),
    WorldInit(Box<WorldInitPacket>),
}

impl GamePacket {
    pub fn packet_id(&self) -> u32 {
        match self {
            GamePacket::ChunkTransfer(_) => ChunkTransferPacket::packet_id(),
            GamePacket::WorldInit(_) => WorldInitPacket::packet_id(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GamePacket::ChunkTransfer(_) => "ChunkTransferPacket",
            GamePacket::WorldInit(_) => "WorldInitPacket",
        }
    }

    /// Decodes one packet, choosing the variant from the header's packet id.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::decode_with_header(bytes).map(|(_, packet)| packet)
    }

    pub fn decode_with_header(bytes: &[u8]) -> Result<(PacketHeader, Self)> {
        let mut buffer = PacketBuffer::from_bytes(bytes);
        let header = PacketHeader::read_from_buffer(&mut buffer)?;

        let packet = match header.packet_id {
            LEVEL_CHUNK_PACKET => {
                GamePacket::ChunkTransfer(ChunkTransferPacket::decode_payload(&mut buffer)?)
            }
            START_GAME_PACKET => {
                GamePacket::WorldInit(Box::new(WorldInitPacket::decode_payload(&mut buffer)?))
            }
            other => return Err(ProtocolError::UnknownPacket(other)),
        };

        report_unread_bytes(&buffer, header.packet_id);
        Ok((header, packet))
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        self.encode_with_header(PacketHeader::new(self.packet_id()))
    }

    /// Encodes with explicit sub-client ids. The header's packet id is replaced by
    /// this packet's own id.
    pub fn encode_with_header(&self, header: PacketHeader) -> Result<Vec<u8>> {
        let mut buffer = PacketBuffer::new();
        PacketHeader {
            packet_id: self.packet_id(),
            ..header
        }
        .write_to_buffer(&mut buffer);

        match self {
            GamePacket::ChunkTransfer(packet) => packet.encode_payload(&mut buffer)?,
            GamePacket::WorldInit(packet) => packet.encode_payload(&mut buffer)?,
        }
        Ok(buffer.into_inner())
    }

    pub fn handle(&self, handler: &mut dyn PacketHandler) -> bool {
        match self {
            GamePacket::ChunkTransfer(packet) => packet.handle(handler),
            GamePacket::WorldInit(packet) => packet.handle(handler),
        }
    }

    /// Like [`GamePacket::handle`], but logs packets nobody consumed.
    pub fn dispatch(&self, handler: &mut dyn PacketHandler) -> bool {
        let handled = self.handle(handler);
        if !handled {
            log(
                format!(
                    "Unhandled packet 0x{:02x} ({})",
                    self.packet_id(),
                    self.name()
                ),
                LogSeverity::Debug,
            );
        }
        handled
    }
}

impl From<ChunkTransferPacket> for GamePacket {
    fn from(packet: ChunkTransferPacket) -> Self {
        GamePacket::ChunkTransfer(packet)
    }
}

impl From<WorldInitPacket> for GamePacket {
    fn from(packet: WorldInitPacket) -> Self {
        GamePacket::WorldInit(Box::new(packet))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::BlockTableEntry;
    use crate::protocol::types::ItemTable;
    use assert_matches::assert_matches;
    use bytes::Bytes;

    #[derive(Default)]
    struct ChunkOnlyHandler {
        chunks: Vec<(i32, i32)>,
    }

    impl PacketHandler for ChunkOnlyHandler {
        fn handle_chunk_transfer(&mut self, packet: &ChunkTransferPacket) -> bool {
            self.chunks.push((packet.chunk_x(), packet.chunk_z()));
            true
        }
    }

    fn sample_chunk() -> ChunkTransferPacket {
        ChunkTransferPacket::without_cache(1, 2, 4, Bytes::from_static(b"xyz"))
    }

    fn sample_world_init() -> WorldInitPacket {
        let mut packet = WorldInitPacket::new(1, 1, "world".to_owned());
        packet.block_table = Some(vec![BlockTableEntry::new("minecraft:air", 0, 0)]);
        packet.item_table = Some(ItemTable::new());
        packet
    }

    #[test]
    fn test_header_roundtrip() {
        let header = PacketHeader {
            packet_id: LEVEL_CHUNK_PACKET,
            sender_sub_id: 2,
            recipient_sub_id: 3,
        };
        let mut buffer = PacketBuffer::new();
        header.write_to_buffer(&mut buffer);

        let mut read_buffer = PacketBuffer::from_bytes(buffer.into_inner());
        assert_eq!(PacketHeader::read_from_buffer(&mut read_buffer).unwrap(), header);
    }

    #[test]
    fn test_plain_header_is_packet_id() {
        let mut buffer = PacketBuffer::new();
        PacketHeader::new(START_GAME_PACKET).write_to_buffer(&mut buffer);
        assert_eq!(buffer.get_buffer(), &[0x0b]);
    }

    #[test]
    fn test_packet_encode_starts_with_header() {
        let bytes = sample_chunk().encode().unwrap();
        assert_eq!(bytes[0], LEVEL_CHUNK_PACKET as u8);
        assert_eq!(ChunkTransferPacket::decode(&bytes).unwrap(), sample_chunk());
    }

    #[test]
    fn test_decode_rejects_other_packet_id() {
        let bytes = sample_world_init().encode().unwrap();
        assert_matches!(
            ChunkTransferPacket::decode(&bytes),
            Err(ProtocolError::UnexpectedPacketId {
                expected: LEVEL_CHUNK_PACKET,
                actual: START_GAME_PACKET
            })
        );
    }

    #[test]
    fn test_game_packet_routes_by_id() {
        let chunk_bytes = sample_chunk().encode().unwrap();
        assert_eq!(
            GamePacket::decode(&chunk_bytes).unwrap(),
            GamePacket::ChunkTransfer(sample_chunk())
        );

        let world_bytes = sample_world_init().encode().unwrap();
        let decoded = GamePacket::decode(&world_bytes).unwrap();
        assert_eq!(decoded, GamePacket::from(sample_world_init()));
        assert_eq!(decoded.packet_id(), START_GAME_PACKET);
    }

    #[test]
    fn test_game_packet_unknown_id() {
        assert_matches!(
            GamePacket::decode(&[0x7f, 0x00]),
            Err(ProtocolError::UnknownPacket(0x7f))
        );
        assert_matches!(
            GamePacket::decode(&[]),
            Err(ProtocolError::TruncatedInput { .. })
        );
    }

    #[test]
    fn test_encode_with_header_keeps_sub_ids() {
        let packet = GamePacket::from(sample_chunk());
        let bytes = packet
            .encode_with_header(PacketHeader {
                packet_id: 0,
                sender_sub_id: 1,
                recipient_sub_id: 2,
            })
            .unwrap();

        let (header, decoded) = GamePacket::decode_with_header(&bytes).unwrap();
        assert_eq!(header.packet_id, LEVEL_CHUNK_PACKET);
        assert_eq!(header.sender_sub_id, 1);
        assert_eq!(header.recipient_sub_id, 2);
        assert_eq!(decoded, packet);
    }

    #[test]
    fn test_trailing_bytes_still_decode() {
        let mut bytes = sample_chunk().encode().unwrap();
        bytes.extend_from_slice(&[0xDE, 0xAD]);
        assert_eq!(ChunkTransferPacket::decode(&bytes).unwrap(), sample_chunk());
    }

    #[test]
    fn test_dispatch_reports_handled() {
        let mut handler = ChunkOnlyHandler::default();

        assert!(GamePacket::from(sample_chunk()).dispatch(&mut handler));
        assert_eq!(handler.chunks, vec![(1, 2)]);

        assert!(!GamePacket::from(sample_world_init()).dispatch(&mut handler));
        assert_eq!(handler.chunks.len(), 1);
    }
}
