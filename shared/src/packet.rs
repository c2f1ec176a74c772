//! Packet codec for the arena wire protocol
//!
//! Every frame starts with a one-byte tag followed by a payload whose length
//! is implied by its fields. Sync entries and leaderboards cannot be parsed
//! from bytes alone: the decoder asks a [`DecodeContext`] which entities are
//! new, which one is the local player, and which game mode is in play.

use crate::cursor::{ByteReader, ByteWriter};
use crate::error::{DecodeError, EncodeError};
use crate::leaderboard::Leaderboard;
use crate::{GameMode, PhysicalState, Vector2};
use std::fmt;

/// Session knowledge the decoder needs while reading a frame
pub trait DecodeContext {
    fn game_mode(&self) -> GameMode;

    /// Whether a sync entry for `player_id` carries the introduction block
    fn is_new_entity(&self, player_id: u32) -> bool;

    /// Whether `player_id` is the locally controlled player
    fn is_current_entity(&self, player_id: u32) -> bool;
}

/// Tags of server-to-client packets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InboundKind {
    Setup = 0,
    Killed = 1,
    Kill = 2,
    Remove = 3,
    Sync = 4,
    ClubCollision = 5,
    WallCollision = 6,
    SetLeaderboard = 7,
    SetTargetDim = 8,
}

impl InboundKind {
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            InboundKind::Setup => "setup",
            InboundKind::Killed => "killed",
            InboundKind::Kill => "kill",
            InboundKind::Remove => "remove",
            InboundKind::Sync => "sync",
            InboundKind::ClubCollision => "club_collision",
            InboundKind::WallCollision => "wall_collision",
            InboundKind::SetLeaderboard => "set_leaderboard",
            InboundKind::SetTargetDim => "set_target_dim",
        }
    }
}

impl TryFrom<u8> for InboundKind {
    type Error = DecodeError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        Ok(match tag {
            0 => InboundKind::Setup,
            1 => InboundKind::Killed,
            2 => InboundKind::Kill,
            3 => InboundKind::Remove,
            4 => InboundKind::Sync,
            5 => InboundKind::ClubCollision,
            6 => InboundKind::WallCollision,
            7 => InboundKind::SetLeaderboard,
            8 => InboundKind::SetTargetDim,
            other => return Err(DecodeError::UnknownTag(other)),
        })
    }
}

impl fmt::Display for InboundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Setup {
    pub version: String,
    pub syncer: u32,
    pub mode: GameMode,
    pub current_player_id: u32,
    pub dimensions: Vector2,
    pub target_dimensions: Vector2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kill {
    pub timestamp: u32,
    pub killed_id: u32,
    pub death_position: Vector2,
    pub killer_id: u32,
    pub point_orb_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remove {
    pub timestamp: u32,
    pub player_id: u32,
}

/// Attributes sent once, when an entity first appears to this client
#[derive(Debug, Clone, PartialEq)]
pub struct Introduction {
    /// Absent for the local player, whose name the server never echoes
    pub name: Option<String>,
    pub shield: f32,
    pub team_or_skin: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncEntry {
    pub player_id: u32,
    /// Present when the decoder was told the entity is new
    pub introduction: Option<Introduction>,
    pub player_state: PhysicalState,
    pub mace_state: PhysicalState,
    pub mace_radius: f32,
}

impl SyncEntry {
    pub fn is_new(&self) -> bool {
        self.introduction.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SyncUpdate {
    pub timestamp: u32,
    pub removals: Vec<u32>,
    pub entries: Vec<SyncEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClubCollision {
    pub timestamp: u32,
    pub point: Vector2,
    pub intensity: f32,
    pub first_id: u32,
    pub first_state: PhysicalState,
    pub second_id: u32,
    pub second_state: PhysicalState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallCollision {
    pub timestamp: u32,
    pub point: Vector2,
    pub intensity: f32,
    pub player_id: u32,
    pub player_state: PhysicalState,
    pub mace_radius: f32,
}

/// A decoded server-to-client packet
#[derive(Debug, Clone, PartialEq)]
pub enum InboundPacket {
    Setup(Setup),
    Killed,
    Kill(Kill),
    Remove(Remove),
    Sync(SyncUpdate),
    ClubCollision(ClubCollision),
    WallCollision(WallCollision),
    SetLeaderboard(Leaderboard),
    SetTargetDim { target_dimensions: Vector2 },
}

/// Result of decoding one frame.
///
/// Bytes left over after a recognized payload usually mean the server added
/// fields. The packet is still returned so the caller can choose to tolerate
/// the drift, but the leftover count is kept so it can be reported.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub packet: InboundPacket,
    pub trailing_bytes: usize,
}

impl Decoded {
    pub fn is_exact(&self) -> bool {
        self.trailing_bytes == 0
    }

    pub fn trailing_error(&self) -> Option<DecodeError> {
        (self.trailing_bytes > 0).then(|| DecodeError::TrailingBytes {
            tag: self.packet.kind(),
            count: self.trailing_bytes,
        })
    }

    /// Rejects the frame if anything was left unread
    pub fn into_strict(self) -> Result<InboundPacket, DecodeError> {
        match self.trailing_error() {
            Some(err) => Err(err),
            None => Ok(self.packet),
        }
    }
}

/// Splits a frame into its tag and raw payload without interpreting either
pub fn split_frame(frame: &[u8]) -> Result<(u8, &[u8]), DecodeError> {
    match frame.split_first() {
        Some((&tag, payload)) => Ok((tag, payload)),
        None => Err(DecodeError::Truncated {
            needed: 1,
            remaining: 0,
        }),
    }
}

impl InboundPacket {
    pub fn kind(&self) -> InboundKind {
        match self {
            InboundPacket::Setup(_) => InboundKind::Setup,
            InboundPacket::Killed => InboundKind::Killed,
            InboundPacket::Kill(_) => InboundKind::Kill,
            InboundPacket::Remove(_) => InboundKind::Remove,
            InboundPacket::Sync(_) => InboundKind::Sync,
            InboundPacket::ClubCollision(_) => InboundKind::ClubCollision,
            InboundPacket::WallCollision(_) => InboundKind::WallCollision,
            InboundPacket::SetLeaderboard(_) => InboundKind::SetLeaderboard,
            InboundPacket::SetTargetDim { .. } => InboundKind::SetTargetDim,
        }
    }

    /// Decodes a whole frame, consulting `ctx` where the layout depends on
    /// session state
    pub fn decode<C: DecodeContext + ?Sized>(
        frame: &[u8],
        ctx: &C,
    ) -> Result<Decoded, DecodeError> {
        let mut reader = ByteReader::new(frame);
        let kind = InboundKind::try_from(reader.read_u8()?)?;

        let packet = match kind {
            InboundKind::Setup => InboundPacket::Setup(decode_setup(&mut reader)?),
            InboundKind::Killed => InboundPacket::Killed,
            InboundKind::Kill => InboundPacket::Kill(Kill {
                timestamp: reader.read_u32_le()?,
                killed_id: reader.read_u32_le()?,
                death_position: reader.read_vec2_le()?,
                killer_id: reader.read_u32_le()?,
                point_orb_count: reader.read_u32_le()?,
            }),
            InboundKind::Remove => InboundPacket::Remove(Remove {
                timestamp: reader.read_u32_le()?,
                player_id: reader.read_u32_le()?,
            }),
            InboundKind::Sync => InboundPacket::Sync(decode_sync(&mut reader, ctx)?),
            InboundKind::ClubCollision => InboundPacket::ClubCollision(ClubCollision {
                timestamp: reader.read_u32_le()?,
                point: reader.read_vec2_le()?,
                intensity: reader.read_f32_le()?,
                first_id: reader.read_u32_le()?,
                first_state: reader.read_physical_state_le()?,
                second_id: reader.read_u32_le()?,
                second_state: reader.read_physical_state_le()?,
            }),
            InboundKind::WallCollision => InboundPacket::WallCollision(WallCollision {
                timestamp: reader.read_u32_le()?,
                point: reader.read_vec2_le()?,
                intensity: reader.read_f32_le()?,
                player_id: reader.read_u32_le()?,
                player_state: reader.read_physical_state_le()?,
                mace_radius: reader.read_f32_le()?,
            }),
            InboundKind::SetLeaderboard => {
                InboundPacket::SetLeaderboard(Leaderboard::decode(&mut reader, ctx.game_mode())?)
            }
            InboundKind::SetTargetDim => InboundPacket::SetTargetDim {
                target_dimensions: reader.read_vec2_le()?,
            },
        };

        Ok(Decoded {
            packet,
            trailing_bytes: reader.remaining(),
        })
    }

    /// Serializes the packet in the server's layout.
    ///
    /// Sync entries are written with exactly the fields they carry, so a
    /// frame only decodes back to the same value when the decoding context
    /// agrees about which entities are new and which one is local.
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(64);
        writer.write_u8(self.kind().tag());

        match self {
            InboundPacket::Setup(setup) => {
                writer
                    .write_cstring(&setup.version)
                    .write_u32_le(setup.syncer)
                    .write_u8(setup.mode.wire_value())
                    .write_u32_le(setup.current_player_id)
                    .write_vec2_le(setup.dimensions)
                    .write_vec2_le(setup.target_dimensions);
            }
            InboundPacket::Killed => {}
            InboundPacket::Kill(kill) => {
                writer
                    .write_u32_le(kill.timestamp)
                    .write_u32_le(kill.killed_id)
                    .write_vec2_le(kill.death_position)
                    .write_u32_le(kill.killer_id)
                    .write_u32_le(kill.point_orb_count);
            }
            InboundPacket::Remove(remove) => {
                writer
                    .write_u32_le(remove.timestamp)
                    .write_u32_le(remove.player_id);
            }
            InboundPacket::Sync(sync) => {
                writer
                    .write_u32_le(sync.timestamp)
                    .write_u32_le(sync.removals.len() as u32);
                for id in &sync.removals {
                    writer.write_u32_le(*id);
                }
                writer.write_u32_le(sync.entries.len() as u32);
                for entry in &sync.entries {
                    writer.write_u32_le(entry.player_id);
                    if let Some(intro) = &entry.introduction {
                        if let Some(name) = &intro.name {
                            writer.write_cstring(name);
                        }
                        writer
                            .write_f32_le(intro.shield)
                            .write_u8(intro.team_or_skin);
                    }
                    writer
                        .write_physical_state_le(entry.player_state)
                        .write_physical_state_le(entry.mace_state)
                        .write_f32_le(entry.mace_radius);
                }
            }
            InboundPacket::ClubCollision(hit) => {
                writer
                    .write_u32_le(hit.timestamp)
                    .write_vec2_le(hit.point)
                    .write_f32_le(hit.intensity)
                    .write_u32_le(hit.first_id)
                    .write_physical_state_le(hit.first_state)
                    .write_u32_le(hit.second_id)
                    .write_physical_state_le(hit.second_state);
            }
            InboundPacket::WallCollision(hit) => {
                writer
                    .write_u32_le(hit.timestamp)
                    .write_vec2_le(hit.point)
                    .write_f32_le(hit.intensity)
                    .write_u32_le(hit.player_id)
                    .write_physical_state_le(hit.player_state)
                    .write_f32_le(hit.mace_radius);
            }
            InboundPacket::SetLeaderboard(board) => board.encode(&mut writer),
            InboundPacket::SetTargetDim { target_dimensions } => {
                writer.write_vec2_le(*target_dimensions);
            }
        }

        writer.into_bytes()
    }
}

fn decode_setup(reader: &mut ByteReader<'_>) -> Result<Setup, DecodeError> {
    let version = reader.read_cstring()?;
    let syncer = reader.read_u32_le()?;
    let mode_byte = reader.read_u8()?;
    let mode = GameMode::from_wire(mode_byte).ok_or(DecodeError::InvalidGameMode(mode_byte))?;
    Ok(Setup {
        version,
        syncer,
        mode,
        current_player_id: reader.read_u32_le()?,
        dimensions: reader.read_vec2_le()?,
        target_dimensions: reader.read_vec2_le()?,
    })
}

fn decode_sync<C: DecodeContext + ?Sized>(
    reader: &mut ByteReader<'_>,
    ctx: &C,
) -> Result<SyncUpdate, DecodeError> {
    let timestamp = reader.read_u32_le()?;

    // Counts come off the wire; never reserve more than the frame could hold
    let remove_count = reader.read_u32_le()? as usize;
    let mut removals = Vec::with_capacity(remove_count.min(reader.remaining() / 4));
    for _ in 0..remove_count {
        removals.push(reader.read_u32_le()?);
    }

    let sync_count = reader.read_u32_le()? as usize;
    let capacity = sync_count.min(reader.remaining() / MIN_SYNC_ENTRY_LEN);
    let mut entries = Vec::with_capacity(capacity);
    // The local player is introduced at most once per frame
    let mut current_introduced = false;
    for _ in 0..sync_count {
        entries.push(decode_sync_entry(reader, ctx, &mut current_introduced)?);
    }

    Ok(SyncUpdate {
        timestamp,
        removals,
        entries,
    })
}

/// id + two physical states + mace radius
const MIN_SYNC_ENTRY_LEN: usize = 4 + 16 + 16 + 4;

fn decode_sync_entry<C: DecodeContext + ?Sized>(
    reader: &mut ByteReader<'_>,
    ctx: &C,
    current_introduced: &mut bool,
) -> Result<SyncEntry, DecodeError> {
    let player_id = reader.read_u32_le()?;
    let is_current = ctx.is_current_entity(player_id);

    let is_new = if is_current {
        let is_new = !*current_introduced && ctx.is_new_entity(player_id);
        *current_introduced |= is_new;
        is_new
    } else {
        ctx.is_new_entity(player_id)
    };

    let introduction = if is_new {
        let name = if is_current {
            None
        } else {
            Some(reader.read_cstring()?)
        };
        Some(Introduction {
            name,
            shield: reader.read_f32_le()?,
            team_or_skin: reader.read_u8()?,
        })
    } else {
        None
    };

    Ok(SyncEntry {
        player_id,
        introduction,
        player_state: reader.read_physical_state_le()?,
        mace_state: reader.read_physical_state_le()?,
        mace_radius: reader.read_f32_le()?,
    })
}

/// Movement axes for the reserved move/stop-move commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heading {
    Up,
    Down,
    Left,
    Right,
}

/// Tags of client-to-server packets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutboundKind {
    Play = 0,
    Direction = 1,
    MoveUp = 2,
    MoveDown = 3,
    MoveLeft = 4,
    MoveRight = 5,
    StopMoveUp = 6,
    StopMoveDown = 7,
    StopMoveLeft = 8,
    StopMoveRight = 9,
}

impl OutboundKind {
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            OutboundKind::Play => "play",
            OutboundKind::Direction => "direction",
            OutboundKind::MoveUp => "move_up",
            OutboundKind::MoveDown => "move_down",
            OutboundKind::MoveLeft => "move_left",
            OutboundKind::MoveRight => "move_right",
            OutboundKind::StopMoveUp => "stop_move_up",
            OutboundKind::StopMoveDown => "stop_move_down",
            OutboundKind::StopMoveLeft => "stop_move_left",
            OutboundKind::StopMoveRight => "stop_move_right",
        }
    }
}

impl fmt::Display for OutboundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A client-to-server packet.
///
/// Only `Play` has a known layout. The steering commands exist on the wire
/// but their payloads are undocumented, so encoding them is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundPacket {
    Play,
    Direction,
    Move(Heading),
    StopMove(Heading),
}

impl OutboundPacket {
    pub fn kind(&self) -> OutboundKind {
        match self {
            OutboundPacket::Play => OutboundKind::Play,
            OutboundPacket::Direction => OutboundKind::Direction,
            OutboundPacket::Move(Heading::Up) => OutboundKind::MoveUp,
            OutboundPacket::Move(Heading::Down) => OutboundKind::MoveDown,
            OutboundPacket::Move(Heading::Left) => OutboundKind::MoveLeft,
            OutboundPacket::Move(Heading::Right) => OutboundKind::MoveRight,
            OutboundPacket::StopMove(Heading::Up) => OutboundKind::StopMoveUp,
            OutboundPacket::StopMove(Heading::Down) => OutboundKind::StopMoveDown,
            OutboundPacket::StopMove(Heading::Left) => OutboundKind::StopMoveLeft,
            OutboundPacket::StopMove(Heading::Right) => OutboundKind::StopMoveRight,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        match self {
            OutboundPacket::Play => {
                let mut writer = ByteWriter::with_capacity(1);
                writer.write_u8(OutboundKind::Play.tag());
                Ok(writer.into_bytes())
            }
            other => Err(EncodeError::Unsupported(other.kind())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::collections::HashSet;

    /// Context with independently controllable answers
    struct FakeContext {
        mode: GameMode,
        new_ids: HashSet<u32>,
        current_id: Option<u32>,
    }

    impl FakeContext {
        fn new(new_ids: &[u32], current_id: Option<u32>) -> Self {
            Self {
                mode: GameMode::FreeForAll,
                new_ids: new_ids.iter().copied().collect(),
                current_id,
            }
        }
    }

    impl DecodeContext for FakeContext {
        fn game_mode(&self) -> GameMode {
            self.mode
        }

        fn is_new_entity(&self, player_id: u32) -> bool {
            self.new_ids.contains(&player_id)
        }

        fn is_current_entity(&self, player_id: u32) -> bool {
            self.current_id == Some(player_id)
        }
    }

    fn state(px: f32, py: f32, vx: f32, vy: f32) -> PhysicalState {
        PhysicalState {
            position: Vector2::new(px, py),
            velocity: Vector2::new(vx, vy),
        }
    }

    fn write_entry_tail(writer: &mut ByteWriter) {
        writer
            .write_physical_state_le(state(1.0, 2.0, 3.0, 4.0))
            .write_physical_state_le(state(5.0, 6.0, 0.0, 0.0))
            .write_f32_le(9.5);
    }

    #[test]
    fn test_decode_setup() {
        let mut writer = ByteWriter::new();
        writer
            .write_u8(0)
            .write_cstring("32")
            .write_u32_le(77)
            .write_u8(1)
            .write_u32_le(7)
            .write_vec2_le(Vector2::new(1000.0, 800.0))
            .write_vec2_le(Vector2::new(1200.0, 900.0));

        let ctx = FakeContext::new(&[], None);
        let decoded = InboundPacket::decode(&writer.into_bytes(), &ctx).unwrap();
        assert!(decoded.is_exact());
        match decoded.packet {
            InboundPacket::Setup(setup) => {
                assert_eq!(setup.version, "32");
                assert_eq!(setup.syncer, 77);
                assert_eq!(setup.mode, GameMode::TeamDeathmatch);
                assert_eq!(setup.current_player_id, 7);
                assert_approx_eq!(setup.dimensions.y, 800.0);
                assert_approx_eq!(setup.target_dimensions.x, 1200.0);
            }
            other => panic!("Unexpected packet {:?}", other),
        }
    }

    #[test]
    fn test_setup_with_unknown_mode() {
        let mut writer = ByteWriter::new();
        writer.write_u8(0).write_cstring("32").write_u32_le(0).write_u8(5);

        let result = InboundPacket::decode(&writer.into_bytes(), &FakeContext::new(&[], None));
        assert_eq!(result, Err(DecodeError::InvalidGameMode(5)));
    }

    #[test]
    fn test_decode_killed_has_no_payload() {
        let decoded = InboundPacket::decode(&[1], &FakeContext::new(&[], None)).unwrap();
        assert_eq!(decoded.packet, InboundPacket::Killed);
        assert!(decoded.is_exact());
    }

    #[test]
    fn test_decode_kill() {
        let mut writer = ByteWriter::new();
        writer
            .write_u8(2)
            .write_u32_le(1000)
            .write_u32_le(4)
            .write_vec2_le(Vector2::new(50.0, 60.0))
            .write_u32_le(9)
            .write_u32_le(12);

        let ctx = FakeContext::new(&[], None);
        let decoded = InboundPacket::decode(&writer.into_bytes(), &ctx).unwrap();
        match decoded.packet {
            InboundPacket::Kill(kill) => {
                assert_eq!(kill.killed_id, 4);
                assert_eq!(kill.killer_id, 9);
                assert_eq!(kill.point_orb_count, 12);
                assert_approx_eq!(kill.death_position.x, 50.0);
            }
            other => panic!("Unexpected packet {:?}", other),
        }
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let result = InboundPacket::decode(&[9, 0, 0], &FakeContext::new(&[], None));
        assert_eq!(result, Err(DecodeError::UnknownTag(9)));
    }

    #[test]
    fn test_empty_frame_is_truncated() {
        let result = InboundPacket::decode(&[], &FakeContext::new(&[], None));
        assert!(matches!(result, Err(DecodeError::Truncated { .. })));
    }

    #[test]
    fn test_sync_entry_width_depends_on_context() {
        // id 3 is new and foreign (name present), id 7 is new and local
        // (no name), id 8 is already known (no introduction block)
        let mut writer = ByteWriter::new();
        writer.write_u8(4).write_u32_le(500);
        writer.write_u32_le(1).write_u32_le(11);
        writer.write_u32_le(3);

        writer.write_u32_le(3).write_cstring("rival").write_f32_le(2.0).write_u8(1);
        write_entry_tail(&mut writer);
        writer.write_u32_le(7).write_f32_le(0.0).write_u8(0);
        write_entry_tail(&mut writer);
        writer.write_u32_le(8);
        write_entry_tail(&mut writer);

        let ctx = FakeContext::new(&[3, 7], Some(7));
        let decoded = InboundPacket::decode(&writer.into_bytes(), &ctx).unwrap();
        assert!(decoded.is_exact());

        let InboundPacket::Sync(sync) = decoded.packet else {
            panic!("Expected sync packet");
        };
        assert_eq!(sync.timestamp, 500);
        assert_eq!(sync.removals, vec![11]);
        assert_eq!(sync.entries.len(), 3);

        let rival = sync.entries[0].introduction.as_ref().unwrap();
        assert_eq!(rival.name.as_deref(), Some("rival"));
        assert_eq!(rival.team_or_skin, 1);

        let local = sync.entries[1].introduction.as_ref().unwrap();
        assert_eq!(local.name, None);

        assert!(!sync.entries[2].is_new());
        assert_approx_eq!(sync.entries[2].player_state.velocity.y, 4.0);
        assert_approx_eq!(sync.entries[2].mace_radius, 9.5);
    }

    #[test]
    fn test_local_player_is_new_once_per_frame() {
        // id 7 is local and not yet introduced, then mentioned again
        let mut writer = ByteWriter::new();
        writer.write_u8(4).write_u32_le(1).write_u32_le(0).write_u32_le(2);
        writer.write_u32_le(7).write_f32_le(0.0).write_u8(0);
        write_entry_tail(&mut writer);
        writer.write_u32_le(7);
        write_entry_tail(&mut writer);

        let ctx = FakeContext::new(&[7], Some(7));
        let decoded = InboundPacket::decode(&writer.into_bytes(), &ctx).unwrap();
        assert!(decoded.is_exact());

        let InboundPacket::Sync(sync) = decoded.packet else {
            panic!("Expected sync packet");
        };
        assert!(sync.entries[0].is_new());
        assert!(!sync.entries[1].is_new());
        assert_approx_eq!(sync.entries[1].mace_radius, 9.5);
    }

    #[test]
    fn test_foreign_player_stays_new_within_a_frame() {
        let mut writer = ByteWriter::new();
        writer.write_u8(4).write_u32_le(1).write_u32_le(0).write_u32_le(2);
        for _ in 0..2 {
            writer.write_u32_le(3).write_cstring("rival").write_f32_le(0.0).write_u8(0);
            write_entry_tail(&mut writer);
        }

        let ctx = FakeContext::new(&[3], Some(7));
        let decoded = InboundPacket::decode(&writer.into_bytes(), &ctx).unwrap();
        assert!(decoded.is_exact());
    }

    #[test]
    fn test_sync_with_wrong_context_misreads() {
        // Same bytes as a known entry, but the context claims it is new
        let mut writer = ByteWriter::new();
        writer.write_u8(4).write_u32_le(0).write_u32_le(0).write_u32_le(1);
        writer.write_u32_le(8);
        write_entry_tail(&mut writer);
        let bytes = writer.into_bytes();

        let known = InboundPacket::decode(&bytes, &FakeContext::new(&[], None)).unwrap();
        assert!(known.is_exact());

        let misread = InboundPacket::decode(&bytes, &FakeContext::new(&[8], None));
        assert!(misread.map(|d| !d.is_exact()).unwrap_or(true));
    }

    #[test]
    fn test_huge_sync_count_does_not_preallocate() {
        let mut writer = ByteWriter::new();
        writer.write_u8(4).write_u32_le(0).write_u32_le(u32::MAX);

        let result = InboundPacket::decode(&writer.into_bytes(), &FakeContext::new(&[], None));
        assert!(matches!(result, Err(DecodeError::Truncated { .. })));
    }

    #[test]
    fn test_trailing_bytes_are_reported() {
        let ctx = FakeContext::new(&[], None);
        let decoded = InboundPacket::decode(&[1, 0xaa, 0xbb], &ctx).unwrap();

        assert_eq!(decoded.packet, InboundPacket::Killed);
        assert_eq!(decoded.trailing_bytes, 2);
        assert_eq!(
            decoded.trailing_error(),
            Some(DecodeError::TrailingBytes {
                tag: InboundKind::Killed,
                count: 2
            })
        );
        assert!(decoded.into_strict().is_err());
    }

    #[test]
    fn test_leaderboard_follows_context_mode() {
        let mut writer = ByteWriter::new();
        writer.write_u8(7).write_u32_le(3).write_u32_le(0);
        for id in 0..3u8 {
            writer.write_u8(id).write_u32_le(10).write_u32_le(1);
        }
        let bytes = writer.into_bytes();

        let mut ctx = FakeContext::new(&[], None);
        ctx.mode = GameMode::TeamDeathmatch;
        let decoded = InboundPacket::decode(&bytes, &ctx).unwrap();
        assert!(decoded.is_exact());
        assert!(matches!(decoded.packet, InboundPacket::SetLeaderboard(_)));
    }

    #[test]
    fn test_play_frame_is_bare_tag() {
        let frame = OutboundPacket::Play.encode().unwrap();
        let (tag, payload) = split_frame(&frame).unwrap();

        assert_eq!(tag, 0);
        assert!(payload.is_empty());
    }

    #[test]
    fn test_steering_packets_are_unsupported() {
        let reserved = [
            OutboundPacket::Direction,
            OutboundPacket::Move(Heading::Up),
            OutboundPacket::StopMove(Heading::Right),
        ];
        for packet in reserved {
            assert_eq!(packet.encode(), Err(EncodeError::Unsupported(packet.kind())));
        }
        assert_eq!(OutboundPacket::Move(Heading::Left).kind().tag(), 4);
        assert_eq!(OutboundPacket::StopMove(Heading::Right).kind().tag(), 9);
    }

    #[test]
    fn test_server_layout_encoding_decodes_back() {
        let packet = InboundPacket::Sync(SyncUpdate {
            timestamp: 3,
            removals: vec![1, 2],
            entries: vec![SyncEntry {
                player_id: 5,
                introduction: Some(Introduction {
                    name: Some("new".to_string()),
                    shield: 1.0,
                    team_or_skin: 2,
                }),
                player_state: state(1.0, 1.0, 0.0, 0.0),
                mace_state: state(2.0, 2.0, 0.0, 0.0),
                mace_radius: 4.0,
            }],
        });

        let ctx = FakeContext::new(&[5], None);
        let decoded = InboundPacket::decode(&packet.encode(), &ctx).unwrap();
        assert!(decoded.is_exact());
        assert_eq!(decoded.packet, packet);
    }
}
