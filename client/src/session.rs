//! Session state machine
//!
//! A session consumes decoded packets strictly in arrival order and keeps the
//! arena in line with the server. It is also the [`DecodeContext`] for its
//! own frames, since sync entries can only be sized by asking which players
//! the session already knows about.
//!
//! Every packet is validated before the arena is touched, so a packet that
//! fails leaves no partial update behind. Any failure terminates the session.

use crate::game::{Arena, Player, Removal};
use log::{debug, info, warn};
use shared::packet::{Kill, Setup, SyncUpdate};
use shared::{
    DecodeContext, DecodeError, Decoded, GameMode, InboundKind, InboundPacket, Leaderboard,
    OutboundPacket, ProtocolError, CLIENT_VERSION,
};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingSetup,
    Active,
    Terminated,
}

impl SessionState {
    pub fn name(self) -> &'static str {
        match self {
            SessionState::AwaitingSetup => "awaiting setup",
            SessionState::Active => "active",
            SessionState::Terminated => "terminated",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub packets_applied: u64,
    /// Frames that decoded with bytes left over
    pub trailing_frames: u64,
    pub deaths: u64,
    pub kills: u64,
    pub collisions: u64,
}

pub struct Session {
    mode: GameMode,
    state: SessionState,
    arena: Option<Arena>,
    leaderboard: Option<Leaderboard>,
    stats: SessionStats,
}

impl Session {
    pub fn new(mode: GameMode) -> Self {
        Self {
            mode,
            state: SessionState::AwaitingSetup,
            arena: None,
            leaderboard: None,
            stats: SessionStats::default(),
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state == SessionState::Terminated
    }

    /// The arena, available once setup has been applied
    pub fn arena(&self) -> Option<&Arena> {
        self.arena.as_ref()
    }

    pub fn leaderboard(&self) -> Option<&Leaderboard> {
        self.leaderboard.as_ref()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Decodes a frame against the session's current knowledge
    pub fn decode(&self, frame: &[u8]) -> Result<Decoded, DecodeError> {
        InboundPacket::decode(frame, self)
    }

    pub fn record_trailing_bytes(&mut self) {
        self.stats.trailing_frames += 1;
    }

    pub fn terminate(&mut self) {
        if self.state != SessionState::Terminated {
            debug!("Session terminated after {} packet(s)", self.stats.packets_applied);
        }
        self.state = SessionState::Terminated;
    }

    /// Applies one packet, returning the reply the client should send, if any
    pub fn apply(
        &mut self,
        packet: InboundPacket,
    ) -> Result<Option<OutboundPacket>, ProtocolError> {
        let result = self.apply_inner(packet);
        match result {
            Ok(_) => self.stats.packets_applied += 1,
            Err(_) => self.terminate(),
        }
        result
    }

    fn unexpected(&self, kind: InboundKind) -> ProtocolError {
        ProtocolError::UnexpectedPacket {
            kind,
            state: self.state.name(),
        }
    }

    fn apply_inner(
        &mut self,
        packet: InboundPacket,
    ) -> Result<Option<OutboundPacket>, ProtocolError> {
        let kind = packet.kind();

        if let InboundPacket::Setup(setup) = packet {
            if self.state != SessionState::AwaitingSetup {
                return Err(self.unexpected(kind));
            }
            self.apply_setup(setup)?;
            return Ok(None);
        }

        if self.state != SessionState::Active {
            return Err(self.unexpected(kind));
        }
        let Some(arena) = self.arena.as_mut() else {
            return Err(self.unexpected(kind));
        };

        match packet {
            InboundPacket::Setup(_) => return Err(self.unexpected(kind)),
            InboundPacket::Killed => {
                info!("Player {} was killed, requesting respawn", arena.current_player_id());
                arena.mark_current_dead();
                self.stats.deaths += 1;
                return Ok(Some(OutboundPacket::Play));
            }
            InboundPacket::Kill(kill) => {
                apply_kill(arena, &kill);
                self.stats.kills += 1;
            }
            InboundPacket::Remove(remove) => {
                debug!("remove {}", remove.player_id);
                remove_player(arena, remove.player_id);
            }
            InboundPacket::Sync(sync) => apply_sync(arena, sync)?,
            InboundPacket::ClubCollision(hit) => {
                debug!("club_collision - first {} second {}", hit.first_id, hit.second_id);
                self.stats.collisions += 1;
            }
            InboundPacket::WallCollision(hit) => {
                debug!("wall_collision - {}", hit.player_id);
                self.stats.collisions += 1;
            }
            InboundPacket::SetLeaderboard(board) => {
                debug!("set_leaderboard - {} player(s)", board.player_count);
                self.leaderboard = Some(board);
            }
            InboundPacket::SetTargetDim { target_dimensions } => {
                debug!("set_target_dim - {:?}", target_dimensions);
                arena.target_dimensions = target_dimensions;
            }
        }

        Ok(None)
    }

    fn apply_setup(&mut self, setup: Setup) -> Result<(), ProtocolError> {
        if setup.version != CLIENT_VERSION {
            return Err(ProtocolError::VersionMismatch {
                expected: CLIENT_VERSION.to_string(),
                received: setup.version,
            });
        }
        if setup.mode != self.mode {
            return Err(ProtocolError::ModeMismatch {
                expected: self.mode,
                received: setup.mode,
            });
        }

        info!(
            "Setup: playing as {} in a {}x{} {} arena",
            setup.current_player_id, setup.dimensions.x, setup.dimensions.y, setup.mode
        );
        self.arena = Some(Arena::new(
            setup.current_player_id,
            setup.dimensions,
            setup.target_dimensions,
        ));
        self.state = SessionState::Active;
        Ok(())
    }
}

impl DecodeContext for Session {
    fn game_mode(&self) -> GameMode {
        self.mode
    }

    fn is_new_entity(&self, player_id: u32) -> bool {
        self.arena
            .as_ref()
            .map_or(true, |arena| arena.is_new_entity(player_id))
    }

    fn is_current_entity(&self, player_id: u32) -> bool {
        self.arena
            .as_ref()
            .is_some_and(|arena| arena.is_current(player_id))
    }
}

fn remove_player(arena: &mut Arena, player_id: u32) {
    match arena.remove(player_id) {
        Removal::Removed => {}
        Removal::Absent => debug!("Player {} already gone", player_id),
        Removal::Protected => warn!("Ignoring removal of the local player {}", player_id),
    }
}

fn apply_kill(arena: &mut Arena, kill: &Kill) {
    debug!("kill - killed {} killer {}", kill.killed_id, kill.killer_id);
    if arena.is_current(kill.killed_id) {
        arena.mark_current_dead();
    } else {
        remove_player(arena, kill.killed_id);
    }
}

fn apply_sync(arena: &mut Arena, sync: SyncUpdate) -> Result<(), ProtocolError> {
    // Check every update resolves before mutating anything
    let removed: HashSet<u32> = sync
        .removals
        .iter()
        .copied()
        .filter(|id| !arena.is_current(*id))
        .collect();
    let mut introduced = HashSet::new();
    for entry in &sync.entries {
        if entry.is_new() {
            introduced.insert(entry.player_id);
        } else if !introduced.contains(&entry.player_id)
            && (removed.contains(&entry.player_id) || !arena.contains(entry.player_id))
        {
            return Err(ProtocolError::UnknownEntity(entry.player_id));
        }
    }

    for player_id in &sync.removals {
        remove_player(arena, *player_id);
    }

    for entry in &sync.entries {
        if entry.is_new() {
            arena.introduce(Player::from_sync_entry(entry));
        } else if let Some(player) = arena.player_mut(entry.player_id) {
            player.apply_sync_entry(entry);
        }
    }

    Ok(())
}
