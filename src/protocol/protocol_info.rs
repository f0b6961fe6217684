//! Packet ids shared by every packet in the protocol.

pub const START_GAME_PACKET: u32 = 0x0b;
pub const LEVEL_CHUNK_PACKET: u32 = 0x3a;

/// Packet ids occupy the low ten bits of the header.
pub const PID_MASK: u32 = 0x3ff;

pub const SUBCLIENT_ID_MASK: u32 = 0x03;
pub const SENDER_SUBCLIENT_ID_SHIFT: u32 = 10;
pub const RECIPIENT_SUBCLIENT_ID_SHIFT: u32 = 12;
