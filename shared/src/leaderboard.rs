//! Leaderboard payloads
//!
//! The layout of a leaderboard update depends on the game mode the session
//! was configured for; nothing in the frame itself says which one follows.

use crate::cursor::{ByteReader, ByteWriter};
use crate::error::DecodeError;
use crate::GameMode;

/// A named score line, used both for ranked entries and the king
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamEntry {
    pub id: u8,
    pub score: u32,
    pub count: u32,
}

/// Mode-specific part of a leaderboard update
#[derive(Debug, Clone, PartialEq)]
pub enum Standings {
    FreeForAll {
        first_entry_id: u32,
        entries: Vec<ScoreEntry>,
        king: ScoreEntry,
        /// Rank of the local player
        place: u32,
        /// Score of the local player
        score: u32,
    },
    TeamDeathmatch {
        teams: [TeamEntry; 3],
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Leaderboard {
    pub player_count: u32,
    pub total: u32,
    pub standings: Standings,
}

impl Leaderboard {
    /// The king line, only present in free-for-all
    pub fn king(&self) -> Option<&ScoreEntry> {
        match &self.standings {
            Standings::FreeForAll { king, .. } => Some(king),
            Standings::TeamDeathmatch { .. } => None,
        }
    }

    pub(crate) fn decode(reader: &mut ByteReader<'_>, mode: GameMode) -> Result<Self, DecodeError> {
        let player_count = reader.read_u32_le()?;
        let total = reader.read_u32_le()?;

        let standings = match mode {
            GameMode::FreeForAll => {
                let count = reader.read_u8()?;
                let first_entry_id = reader.read_u32_le()?;
                let mut entries = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    entries.push(read_score_entry(reader)?);
                }
                let king = read_score_entry(reader)?;
                let place = reader.read_u32_le()?;
                let score = reader.read_u32_le()?;
                Standings::FreeForAll {
                    first_entry_id,
                    entries,
                    king,
                    place,
                    score,
                }
            }
            GameMode::TeamDeathmatch => {
                let mut teams = [TeamEntry {
                    id: 0,
                    score: 0,
                    count: 0,
                }; 3];
                for team in teams.iter_mut() {
                    team.id = reader.read_u8()?;
                    team.score = reader.read_u32_le()?;
                    team.count = reader.read_u32_le()?;
                }
                Standings::TeamDeathmatch { teams }
            }
        };

        Ok(Self {
            player_count,
            total,
            standings,
        })
    }

    pub(crate) fn encode(&self, writer: &mut ByteWriter) {
        writer
            .write_u32_le(self.player_count)
            .write_u32_le(self.total);

        match &self.standings {
            Standings::FreeForAll {
                first_entry_id,
                entries,
                king,
                place,
                score,
            } => {
                writer
                    .write_u8(entries.len().min(u8::MAX as usize) as u8)
                    .write_u32_le(*first_entry_id);
                for entry in entries.iter().take(u8::MAX as usize) {
                    writer.write_cstring(&entry.name).write_u32_le(entry.score);
                }
                writer
                    .write_cstring(&king.name)
                    .write_u32_le(king.score)
                    .write_u32_le(*place)
                    .write_u32_le(*score);
            }
            Standings::TeamDeathmatch { teams } => {
                for team in teams {
                    writer
                        .write_u8(team.id)
                        .write_u32_le(team.score)
                        .write_u32_le(team.count);
                }
            }
        }
    }
}

fn read_score_entry(reader: &mut ByteReader<'_>) -> Result<ScoreEntry, DecodeError> {
    let name = reader.read_cstring()?;
    let score = reader.read_u32_le()?;
    Ok(ScoreEntry { name, score })
}
