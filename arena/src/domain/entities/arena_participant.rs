//! Arena participant domain entity
//!
//! One member's standing within one arena event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::arena_event::ArenaEventId;
use super::member::MemberId;

/// Unique identifier for an arena participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArenaParticipantId(pub Uuid);

impl ArenaParticipantId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ArenaParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ArenaParticipantId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ArenaParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A member's standing in one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArenaParticipant {
    pub id: ArenaParticipantId,
    pub event_id: ArenaEventId,
    pub member_id: MemberId,
    pub points: i32,
    /// 1-based ladder position, unset until the first recalculation
    pub rank: Option<i32>,
    pub challenges_remaining: i32,
    pub wins: i32,
    pub losses: i32,
    pub score_for: i32,
    pub score_against: i32,
    /// Sessions attended in the event's month, snapshotted at seeding
    pub monthly_participation_count: i32,
    /// Sessions attended in the event's year, snapshotted at seeding
    pub yearly_participation_count: i32,
    pub created_at: DateTime<Utc>,
}

impl ArenaParticipant {
    /// Wins minus losses
    pub fn match_diff(&self) -> i32 {
        self.wins - self.losses
    }

    /// Game points scored minus conceded
    pub fn score_diff(&self) -> i32 {
        self.score_for - self.score_against
    }

    /// Rank used for challenge and points arithmetic; unset ranks count as 0
    pub fn effective_rank(&self) -> i32 {
        self.rank.unwrap_or(0)
    }

    pub fn has_challenges_remaining(&self) -> bool {
        self.challenges_remaining > 0
    }

    /// Fold one finished game into the running totals
    pub fn record_game(&mut self, points_change: i32, won: bool, scored: i32, conceded: i32) {
        self.points += points_change;
        if won {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        self.score_for += scored;
        self.score_against += conceded;
    }
}

/// Data needed to seed a participant into an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArenaParticipant {
    pub event_id: ArenaEventId,
    pub member_id: MemberId,
    pub points: i32,
    pub challenges_remaining: i32,
    pub monthly_participation_count: i32,
    pub yearly_participation_count: i32,
}

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub participant_id: ArenaParticipantId,
    pub member_id: MemberId,
    pub rank: Option<i32>,
    pub points: i32,
    pub challenges_remaining: i32,
    pub wins: i32,
    pub losses: i32,
}

impl From<&ArenaParticipant> for LeaderboardEntry {
    fn from(p: &ArenaParticipant) -> Self {
        Self {
            participant_id: p.id,
            member_id: p.member_id,
            rank: p.rank,
            points: p.points,
            challenges_remaining: p.challenges_remaining,
            wins: p.wins,
            losses: p.losses,
        }
    }
}

/// An opponent a participant may currently challenge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllowedOpponent {
    pub participant_id: ArenaParticipantId,
    pub member_id: MemberId,
    pub rank: Option<i32>,
}
