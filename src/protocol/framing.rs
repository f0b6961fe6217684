use crate::config::ProtocolConfig;
use crate::error::{ProtocolError, Result};
use crate::logger::{log, LogSeverity};
use crate::protocol::packet::{GamePacket, Packet};
use crate::protocol::buffer::PacketBuffer;
use crate::protocol::varint::{read_unsigned_varint32, unsigned_varint_len};
use bytes::{Buf, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{Decoder, Encoder};

/// Largest frame accepted when no limit is configured.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 2 * 1024 * 1024;

/// Length-delimited packet codec for stream transports. Each frame is an
/// unsigned VarInt byte count followed by one encoded packet (header included).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketFramer {
    max_frame_size: usize,
}

impl Default for PacketFramer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_SIZE)
    }
}

impl PacketFramer {
    pub fn new(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    pub fn from_config(config: &ProtocolConfig) -> Self {
        Self::new(config.max_frame_size)
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    fn check_size(&self, size: usize) -> Result<()> {
        if size > self.max_frame_size {
            return Err(ProtocolError::FrameTooLarge {
                size,
                limit: self.max_frame_size,
            });
        }
        Ok(())
    }
}

impl Decoder for PacketFramer {
    type Item = GamePacket;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<GamePacket>> {
        let mut cursor = 0;
        let frame_size = match read_unsigned_varint32(&src[..], &mut cursor) {
            Ok(size) => size as usize,
            // Length prefix not complete yet
            Err(ProtocolError::TruncatedInput { .. }) => return Ok(None),
            Err(err) => return Err(err),
        };
        self.check_size(frame_size)?;

        if src.len() < cursor + frame_size {
            src.reserve(cursor + frame_size - src.len());
            return Ok(None);
        }

        src.advance(cursor);
        let frame = src.split_to(frame_size);
        GamePacket::decode(&frame).map(Some)
    }
}

impl Encoder<GamePacket> for PacketFramer {
    type Error = ProtocolError;

    fn encode(&mut self, item: GamePacket, dst: &mut BytesMut) -> Result<()> {
        let bytes = item.encode()?;
        self.check_size(bytes.len())?;

        let frame = frame_bytes(&bytes)?;
        dst.reserve(frame.len());
        dst.extend_from_slice(&frame);
        Ok(())
    }
}

/// Prefixes `payload` with its length.
fn frame_bytes(payload: &[u8]) -> Result<Vec<u8>> {
    let mut frame =
        PacketBuffer::with_capacity(unsigned_varint_len(payload.len() as u64) + payload.len());
    frame.write_length_prefix(payload.len())?;
    frame.write_bytes_raw(payload);
    Ok(frame.into_inner())
}

/// Encodes a packet, prefixes its length and writes the frame.
pub async fn send_packet<P, W>(packet: &P, writer: &mut W) -> Result<()>
where
    P: Packet,
    W: AsyncWrite + Unpin,
{
    let payload = packet.encode()?;

    let frame = frame_bytes(&payload)?;
    writer.write_all(&frame).await?;
    log(
        format!(
            "Sent packet 0x{:02x} ({} bytes)",
            P::packet_id(),
            payload.len()
        ),
        LogSeverity::Debug,
    );

    Ok(())
}
