//! Client-level error type

use crate::directory::DirectoryError;
use shared::{DecodeError, EncodeError, ProtocolError};
use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("transport error: {0}")]
    Transport(#[from] tungstenite::Error),

    #[error("server directory: {0}")]
    Directory(#[from] DirectoryError),

    #[error("outbound queue closed")]
    OutboundClosed,

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Whether the error ends the session; an unencodable outbound packet
    /// only rejects that packet
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ClientError::Encode(_))
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
