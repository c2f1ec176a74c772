use std::fmt;
use std::str::FromStr;

pub mod cursor;
pub mod error;
pub mod leaderboard;
pub mod packet;

pub use error::{DecodeError, EncodeError, ProtocolError};
pub use leaderboard::{Leaderboard, ScoreEntry, Standings, TeamEntry};
pub use packet::{DecodeContext, Decoded, InboundKind, InboundPacket, OutboundKind, OutboundPacket};

/// Protocol revision this client speaks; servers announce theirs in setup
pub const CLIENT_VERSION: &str = "32";

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PhysicalState {
    pub position: Vector2,
    pub velocity: Vector2,
}

impl PhysicalState {
    pub const AT_REST: PhysicalState = PhysicalState {
        position: Vector2::ZERO,
        velocity: Vector2::ZERO,
    };
}

/// Game mode of a server, fixed for the lifetime of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameMode {
    #[default]
    FreeForAll,
    TeamDeathmatch,
}

impl GameMode {
    /// Byte used for the mode in the setup packet
    pub fn wire_value(self) -> u8 {
        match self {
            GameMode::FreeForAll => 0,
            GameMode::TeamDeathmatch => 1,
        }
    }

    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(GameMode::FreeForAll),
            1 => Some(GameMode::TeamDeathmatch),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::FreeForAll => "ffa",
            GameMode::TeamDeathmatch => "tdm",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ffa" => Ok(GameMode::FreeForAll),
            "tdm" => Ok(GameMode::TeamDeathmatch),
            other => Err(format!("unknown game mode '{}', expected ffa or tdm", other)),
        }
    }
}
