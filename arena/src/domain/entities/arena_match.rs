//! Arena match domain entity
//!
//! A challenge between two participants of the same event. A match is
//! scheduled until its outcome is written; the outcome is immutable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::arena_event::ArenaEventId;
use super::arena_participant::ArenaParticipantId;

/// Unique identifier for an arena match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArenaMatchId(pub Uuid);

impl ArenaMatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ArenaMatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ArenaMatchId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ArenaMatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArenaMatchStatus {
    Scheduled,
    Completed,
}

impl std::fmt::Display for ArenaMatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArenaMatchStatus::Scheduled => write!(f, "scheduled"),
            ArenaMatchStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for ArenaMatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scheduled" => Ok(ArenaMatchStatus::Scheduled),
            "completed" => Ok(ArenaMatchStatus::Completed),
            _ => Err(format!("Unknown arena match status: {}", s)),
        }
    }
}

/// One side's state captured when the match result was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SideSnapshot {
    /// Rank before this match's delta was applied
    pub rank_at_match: Option<i32>,
    /// Points before this match's delta was applied
    pub points_at_match: i32,
    pub points_change: i32,
}

/// Final result of a completed match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchOutcome {
    pub challenger_score: i32,
    pub opponent_score: i32,
    /// Winner rank minus loser rank
    pub rank_diff: i32,
    pub challenger: SideSnapshot,
    pub opponent: SideSnapshot,
    pub completed_at: DateTime<Utc>,
}

impl MatchOutcome {
    pub fn challenger_won(&self) -> bool {
        self.challenger_score > self.opponent_score
    }
}

/// A challenge between two participants
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArenaMatch {
    pub id: ArenaMatchId,
    pub event_id: ArenaEventId,
    pub challenger_id: ArenaParticipantId,
    pub opponent_id: ArenaParticipantId,
    /// Set once the match is completed, never rewritten
    pub outcome: Option<MatchOutcome>,
    pub created_at: DateTime<Utc>,
}

impl ArenaMatch {
    pub fn status(&self) -> ArenaMatchStatus {
        if self.outcome.is_some() {
            ArenaMatchStatus::Completed
        } else {
            ArenaMatchStatus::Scheduled
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.outcome.is_none()
    }

    /// Whether the participant plays on either side of this match
    pub fn involves(&self, participant_id: &ArenaParticipantId) -> bool {
        self.challenger_id == *participant_id || self.opponent_id == *participant_id
    }
}

/// Data needed to create a new match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArenaMatch {
    pub event_id: ArenaEventId,
    pub challenger_id: ArenaParticipantId,
    pub opponent_id: ArenaParticipantId,
    /// Present for direct submissions, absent when only scheduling
    pub outcome: Option<MatchOutcome>,
}
