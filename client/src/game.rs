//! Local mirror of the server's arena

use log::debug;
use shared::packet::SyncEntry;
use shared::{PhysicalState, Vector2};
use std::collections::HashMap;

/// The club a player swings; owned by value by its player
#[derive(Debug, Clone, PartialEq)]
pub struct Mace {
    pub state: PhysicalState,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: u32,
    pub state: PhysicalState,
    pub mace: Mace,
    pub dead: bool,
    /// Unknown until the server introduces the player with a name
    pub name: Option<String>,
    pub shield: f32,
    pub team_or_skin: u8,
}

impl Player {
    /// A player at rest at the origin, used for the local player before the
    /// first sync arrives
    pub fn new(id: u32) -> Self {
        Self {
            id,
            state: PhysicalState::AT_REST,
            mace: Mace {
                state: PhysicalState::AT_REST,
                radius: 0.0,
            },
            dead: false,
            name: None,
            shield: 0.0,
            team_or_skin: 0,
        }
    }

    pub fn from_sync_entry(entry: &SyncEntry) -> Self {
        let mut player = Self::new(entry.player_id);
        player.apply_sync_entry(entry);
        if let Some(intro) = &entry.introduction {
            player.name = intro.name.clone();
            player.shield = intro.shield;
            player.team_or_skin = intro.team_or_skin;
        }
        player
    }

    /// Overwrites body and mace state; updates are absolute, never deltas
    pub fn apply_sync_entry(&mut self, entry: &SyncEntry) {
        self.state = entry.player_state;
        self.mace.state = entry.mace_state;
        self.mace.radius = entry.mace_radius;
    }

    pub fn position(&self) -> Vector2 {
        self.state.position
    }
}

/// What a removal request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    Absent,
    /// The local player is never evicted by generic removals
    Protected,
}

/// Players and dimensions as last reported by the server.
///
/// The local player is held outside the map of other players so that no
/// removal path can evict it; lookups treat both as one mapping.
#[derive(Debug, Clone)]
pub struct Arena {
    current: Player,
    others: HashMap<u32, Player>,
    /// Whether the local player's introduction entry has been seen since
    /// setup or the last death
    current_introduced: bool,
    pub dimensions: Vector2,
    /// Stored for a resize transition the client does not perform
    pub target_dimensions: Vector2,
}

impl Arena {
    pub fn new(current_player_id: u32, dimensions: Vector2, target_dimensions: Vector2) -> Self {
        Self {
            current: Player::new(current_player_id),
            others: HashMap::new(),
            current_introduced: false,
            dimensions,
            target_dimensions,
        }
    }

    pub fn current_player_id(&self) -> u32 {
        self.current.id
    }

    pub fn current_player(&self) -> &Player {
        &self.current
    }

    pub fn is_current(&self, player_id: u32) -> bool {
        player_id == self.current.id
    }

    /// True when the next sync entry for `player_id` carries an introduction.
    ///
    /// For the local player that is the first entry after setup or death;
    /// for anyone else it is whenever the id is not in the arena.
    pub fn is_new_entity(&self, player_id: u32) -> bool {
        if self.is_current(player_id) {
            !self.current_introduced
        } else {
            !self.others.contains_key(&player_id)
        }
    }

    pub fn contains(&self, player_id: u32) -> bool {
        self.is_current(player_id) || self.others.contains_key(&player_id)
    }

    pub fn player(&self, player_id: u32) -> Option<&Player> {
        if self.is_current(player_id) {
            Some(&self.current)
        } else {
            self.others.get(&player_id)
        }
    }

    pub fn player_mut(&mut self, player_id: u32) -> Option<&mut Player> {
        if self.is_current(player_id) {
            Some(&mut self.current)
        } else {
            self.others.get_mut(&player_id)
        }
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        std::iter::once(&self.current).chain(self.others.values())
    }

    /// Ids of every player, sorted
    pub fn player_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.players().map(|p| p.id).collect();
        ids.sort_unstable();
        ids
    }

    /// Players in the arena, the local player included
    pub fn player_count(&self) -> usize {
        self.others.len() + 1
    }

    /// Registers a freshly introduced player, replacing any stale entry.
    ///
    /// An introduction of the local player is its respawn.
    pub fn introduce(&mut self, player: Player) {
        if self.is_current(player.id) {
            debug!("Local player {} (re)spawned", player.id);
            self.current = player;
            self.current_introduced = true;
        } else {
            self.others.insert(player.id, player);
        }
    }

    pub fn remove(&mut self, player_id: u32) -> Removal {
        if self.is_current(player_id) {
            Removal::Protected
        } else if self.others.remove(&player_id).is_some() {
            Removal::Removed
        } else {
            Removal::Absent
        }
    }

    /// Marks the local player dead and forgets its introduction so the
    /// respawn entry is read with the introduction block
    pub fn mark_current_dead(&mut self) {
        self.current.dead = true;
        self.current.name = None;
        self.current_introduced = false;
    }
}
