use std::string::FromUtf8Error;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while encoding or decoding a packet. None of them are recovered
/// inside the codec; the session decides what happens to the peer.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("truncated input: needed {needed} byte(s), {remaining} remaining")]
    TruncatedInput { needed: usize, remaining: usize },

    #[error("malformed VarInt: no terminating byte within {max_bytes} bytes")]
    MalformedVarInt { max_bytes: usize },

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("unexpected packet id 0x{actual:02x}, expected 0x{expected:02x}")]
    UnexpectedPacketId { expected: u32, actual: u32 },

    #[error("unknown packet id 0x{0:02x}")]
    UnknownPacket(u32),

    #[error("unknown game rule type {0}")]
    UnknownGameRuleType(u32),

    #[error("invalid UTF-8 in string field: {0}")]
    InvalidString(#[from] FromUtf8Error),

    #[error("frame of {size} bytes exceeds limit of {limit}")]
    FrameTooLarge { size: usize, limit: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
