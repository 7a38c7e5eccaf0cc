//! Repository port traits
//!
//! These traits define the interface for arena persistence. They are all
//! implemented by one unit-of-work type, an `ArenaTransaction`, so a core
//! operation reads and writes through a single transactional context.
//! Implementations are provided by adapters (e.g., PostgreSQL).

use async_trait::async_trait;

use crate::domain::entities::{
    ArenaCategory, ArenaEvent, ArenaEventId, ArenaEventStatus, ArenaMatch, ArenaMatchId,
    ArenaParticipant, ArenaParticipantId, HistoricalRanking, MemberId, NewArenaEvent,
    NewArenaMatch, NewArenaParticipant,
};
use crate::error::DomainError;

/// Repository for ArenaEvent entities
#[async_trait]
pub trait ArenaEventRepository: Send {
    /// Find an event by ID
    async fn find_event(&mut self, id: &ArenaEventId) -> Result<Option<ArenaEvent>, DomainError>;

    /// Find an event by ID and hold a write lock on it until the transaction ends.
    /// Every mutation of an event's ladder starts here, which serialises
    /// concurrent mutations of the same event.
    async fn lock_event(&mut self, id: &ArenaEventId) -> Result<Option<ArenaEvent>, DomainError>;

    /// List events, newest first, optionally for one category
    async fn list_events(
        &mut self,
        category: Option<ArenaCategory>,
    ) -> Result<Vec<ArenaEvent>, DomainError>;

    /// Create a new event
    async fn insert_event(&mut self, event: &NewArenaEvent) -> Result<ArenaEvent, DomainError>;

    /// Update event status
    async fn update_event_status(
        &mut self,
        id: &ArenaEventId,
        status: ArenaEventStatus,
    ) -> Result<(), DomainError>;

    /// Delete an event together with its participants and matches
    async fn delete_event(&mut self, id: &ArenaEventId) -> Result<(), DomainError>;
}

/// Repository for ArenaParticipant entities
#[async_trait]
pub trait ArenaParticipantRepository: Send {
    /// Find a participant by ID
    async fn find_participant(
        &mut self,
        id: &ArenaParticipantId,
    ) -> Result<Option<ArenaParticipant>, DomainError>;

    /// Find the participant row of a member in an event
    async fn find_participant_by_member(
        &mut self,
        event_id: &ArenaEventId,
        member_id: &MemberId,
    ) -> Result<Option<ArenaParticipant>, DomainError>;

    /// All participants of an event, in insertion order
    async fn list_participants(
        &mut self,
        event_id: &ArenaEventId,
    ) -> Result<Vec<ArenaParticipant>, DomainError>;

    /// Seed participants into an event
    async fn insert_participants(
        &mut self,
        participants: &[NewArenaParticipant],
    ) -> Result<Vec<ArenaParticipant>, DomainError>;

    /// Persist a participant's running stats (points, counters, challenge budget)
    async fn update_participant_stats(
        &mut self,
        participant: &ArenaParticipant,
    ) -> Result<(), DomainError>;

    /// Persist rank positions
    async fn update_ranks(&mut self, ranks: &[(ArenaParticipantId, i32)])
        -> Result<(), DomainError>;
}

/// Repository for ArenaMatch entities
#[async_trait]
pub trait ArenaMatchRepository: Send {
    /// Find a match by ID
    async fn find_match(&mut self, id: &ArenaMatchId) -> Result<Option<ArenaMatch>, DomainError>;

    /// Find the match of an ordered (challenger, opponent) pair
    async fn find_match_by_pair(
        &mut self,
        challenger_id: &ArenaParticipantId,
        opponent_id: &ArenaParticipantId,
    ) -> Result<Option<ArenaMatch>, DomainError>;

    /// All matches of an event
    async fn list_matches(&mut self, event_id: &ArenaEventId)
        -> Result<Vec<ArenaMatch>, DomainError>;

    /// Create a new match
    async fn insert_match(&mut self, new_match: &NewArenaMatch) -> Result<ArenaMatch, DomainError>;

    /// Write the outcome of a scheduled match
    async fn complete_match(&mut self, arena_match: &ArenaMatch) -> Result<(), DomainError>;

    /// Delete a match
    async fn delete_match(&mut self, id: &ArenaMatchId) -> Result<(), DomainError>;
}

/// Repository for the historical ranking ledger
#[async_trait]
pub trait HistoricalRankingRepository: Send {
    /// Ledger rows for exactly these members
    async fn find_historical_rankings(
        &mut self,
        member_ids: &[MemberId],
    ) -> Result<Vec<HistoricalRanking>, DomainError>;

    /// Add one finish at `rank`, creating the row if needed
    async fn increment_historical_ranking(
        &mut self,
        member_id: &MemberId,
        rank: i32,
    ) -> Result<(), DomainError>;

    /// Remove one finish at `rank`; the row disappears when its count reaches zero
    async fn decrement_historical_ranking(
        &mut self,
        member_id: &MemberId,
        rank: i32,
    ) -> Result<(), DomainError>;
}

/// A unit of work over arena state
///
/// Dropping a transaction without committing discards its writes.
#[async_trait]
pub trait ArenaTransaction:
    ArenaEventRepository
    + ArenaParticipantRepository
    + ArenaMatchRepository
    + HistoricalRankingRepository
    + Send
    + Sized
{
    async fn commit(self) -> Result<(), DomainError>;

    async fn rollback(self) -> Result<(), DomainError>;
}

/// Source of arena transactions
#[async_trait]
pub trait ArenaStore: Send + Sync {
    type Transaction: ArenaTransaction;

    /// Open a transaction with at least read-committed isolation
    async fn begin(&self) -> Result<Self::Transaction, DomainError>;
}
