//! Domain entities
//!
//! Pure domain models for the arena ladder.
//! These are separate from the SeaORM entities in the `entity` module.

pub mod actor;
pub mod arena_event;
pub mod arena_match;
pub mod arena_participant;
pub mod historical_ranking;
pub mod member;

pub use actor::Actor;
pub use arena_event::{
    event_month_year, ArenaCategory, ArenaEvent, ArenaEventId, ArenaEventStatus, NewArenaEvent,
};
pub use arena_match::{
    ArenaMatch, ArenaMatchId, ArenaMatchStatus, MatchOutcome, NewArenaMatch, SideSnapshot,
};
pub use arena_participant::{
    AllowedOpponent, ArenaParticipant, ArenaParticipantId, LeaderboardEntry, NewArenaParticipant,
};
pub use historical_ranking::{HistoricalIndex, HistoricalRankCounts, HistoricalRanking};
pub use member::{
    AttendanceRecord, AttendanceStatus, Gender, MemberId, MemberStatus, RosterMember,
};
