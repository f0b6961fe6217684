use crate::error::{ProtocolError, Result};
use crate::protocol::buffer::PacketBuffer;
use crate::protocol::handler::PacketHandler;
use crate::protocol::packet::Packet;
use crate::protocol::protocol_info::LEVEL_CHUNK_PACKET;
use crate::protocol::types::BlobHash;
use bytes::Bytes;

/// Sends one chunk column to the client.
///
/// With the blob cache enabled, the packet lists the hashes of sub-chunk blobs the
/// client is expected to already have, and `extra_payload` carries only what is
/// not covered by them. The hash list is empty whenever the cache is disabled;
/// both constructors and the decoder keep it that way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkTransferPacket {
    chunk_x: i32,
    chunk_z: i32,
    sub_chunk_count: u32,
    cache_enabled: bool,
    used_blob_hashes: Vec<BlobHash>,
    extra_payload: Bytes,
}

impl ChunkTransferPacket {
    pub fn without_cache(
        chunk_x: i32,
        chunk_z: i32,
        sub_chunk_count: u32,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            chunk_x,
            chunk_z,
            sub_chunk_count,
            cache_enabled: false,
            used_blob_hashes: Vec::new(),
            extra_payload: payload.into(),
        }
    }

    /// `used_blob_hashes` must be in the order the client matches them against
    /// its local cache.
    pub fn with_cache(
        chunk_x: i32,
        chunk_z: i32,
        sub_chunk_count: u32,
        used_blob_hashes: Vec<BlobHash>,
        extra_payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            chunk_x,
            chunk_z,
            sub_chunk_count,
            cache_enabled: true,
            used_blob_hashes,
            extra_payload: extra_payload.into(),
        }
    }

    pub fn chunk_x(&self) -> i32 {
        self.chunk_x
    }

    pub fn chunk_z(&self) -> i32 {
        self.chunk_z
    }

    pub fn sub_chunk_count(&self) -> u32 {
        self.sub_chunk_count
    }

    pub fn is_cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    pub fn used_blob_hashes(&self) -> &[BlobHash] {
        &self.used_blob_hashes
    }

    pub fn extra_payload(&self) -> &Bytes {
        &self.extra_payload
    }
}

impl Packet for ChunkTransferPacket {
    fn packet_id() -> u32 {
        LEVEL_CHUNK_PACKET
    }

    fn decode_payload(buffer: &mut PacketBuffer) -> Result<Self> {
        let chunk_x = buffer.read_varint()?;
        let chunk_z = buffer.read_varint()?;
        let sub_chunk_count = buffer.read_unsigned_varint()?;
        let cache_enabled = buffer.read_bool()?;

        let mut used_blob_hashes = Vec::new();
        if cache_enabled {
            let count = buffer.read_unsigned_varint()? as usize;
            used_blob_hashes.reserve(count.min(buffer.remaining() / 8));
            for _ in 0..count {
                used_blob_hashes.push(buffer.read_u64_words()?);
            }
        }

        let extra_payload = Bytes::from(buffer.read_bytes()?);

        Ok(Self {
            chunk_x,
            chunk_z,
            sub_chunk_count,
            cache_enabled,
            used_blob_hashes,
            extra_payload,
        })
    }

    fn encode_payload(&self, buffer: &mut PacketBuffer) -> Result<()> {
        if !self.cache_enabled && !self.used_blob_hashes.is_empty() {
            return Err(ProtocolError::InvariantViolation(format!(
                "chunk ({}, {}) carries {} blob hashes with the cache disabled",
                self.chunk_x,
                self.chunk_z,
                self.used_blob_hashes.len()
            )));
        }

        buffer.write_varint(self.chunk_x);
        buffer.write_varint(self.chunk_z);
        buffer.write_unsigned_varint(self.sub_chunk_count);
        buffer.write_bool(self.cache_enabled);
        if self.cache_enabled {
            buffer.write_length_prefix(self.used_blob_hashes.len())?;
            for hash in &self.used_blob_hashes {
                buffer.write_u64_words(*hash);
            }
        }
        buffer.write_bytes(&self.extra_payload)?;

        Ok(())
    }

    fn handle(&self, handler: &mut dyn PacketHandler) -> bool {
        handler.handle_chunk_transfer(self)
    }
}
