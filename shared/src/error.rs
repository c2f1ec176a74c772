//! Error types for the wire protocol
//!
//! Decoding failures are fatal to the frame that produced them, protocol
//! violations are fatal to the session, and encoding failures only reject
//! the single outbound packet that was attempted.

use crate::packet::{InboundKind, OutboundKind};
use crate::GameMode;
use thiserror::Error;

/// Failure to turn an inbound frame into a packet
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The frame ended before a field could be read completely
    #[error("frame truncated: needed {needed} more byte(s), {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// A string field was not valid UTF-8
    #[error("string field is not valid UTF-8")]
    InvalidEncoding,

    /// The leading tag byte names no known inbound packet
    #[error("unknown packet tag {0}")]
    UnknownTag(u8),

    /// The setup packet declared a game mode byte outside the known table
    #[error("unknown game mode byte {0}")]
    InvalidGameMode(u8),

    /// The payload decoded but bytes were left over after it
    #[error("{count} trailing byte(s) after {tag} payload")]
    TrailingBytes { tag: InboundKind, count: usize },
}

/// Failure to build an outbound frame
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("outbound packet {0} has no wire encoding yet")]
    Unsupported(OutboundKind),
}

/// Violations of the session protocol; each one ends the session
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("server speaks protocol version {received:?}, client expects {expected:?}")]
    VersionMismatch { expected: String, received: String },

    #[error("server runs {received} but the session is configured for {expected}")]
    ModeMismatch { expected: GameMode, received: GameMode },

    /// A sync entry updated an entity the client was never introduced to
    #[error("server referenced unknown entity {0}")]
    UnknownEntity(u32),

    #[error("received a non-binary frame ({0})")]
    UnexpectedFrameKind(String),

    #[error("{kind} packet is not valid while the session is {state}")]
    UnexpectedPacket { kind: InboundKind, state: &'static str },
}
