//! Event lifecycle
//!
//! Creation with seeded participants, the forward-only status transitions,
//! and the historical ledger writes that go with completing or deleting a
//! completed event.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::arena_config::{CHALLENGES_RANGE, MAX_RANK_DIFF_RANGE};
use crate::app::eligibility::ParticipationCounts;
use crate::app::matches::lock_existing_event;
use crate::app::ranking::recalculate_ranks;
use crate::config::ArenaSettings;
use crate::domain::entities::{
    event_month_year, ArenaCategory, ArenaEvent, ArenaEventId, ArenaEventStatus,
    ArenaParticipantId, MemberId, NewArenaEvent, NewArenaParticipant,
};
use crate::domain::ports::ArenaTransaction;
use crate::error::DomainError;

/// Request to create an event. Unset knobs fall back to `ArenaSettings`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateArenaEvent {
    pub date: DateTime<Utc>,
    pub category: ArenaCategory,
    pub min_sessions_required: i32,
    pub challenges_per_participant: Option<i32>,
    pub max_rank_diff: Option<i32>,
    pub status: Option<ArenaEventStatus>,
}

impl CreateArenaEvent {
    /// Validate the request and fill in defaults
    pub fn into_new_event(self, settings: &ArenaSettings) -> Result<NewArenaEvent, DomainError> {
        if self.min_sessions_required < 0 {
            return Err(DomainError::Validation(
                "Minimum sessions required cannot be negative.".to_string(),
            ));
        }

        let challenges_per_participant = self
            .challenges_per_participant
            .unwrap_or(settings.default_challenges_per_participant);
        if !CHALLENGES_RANGE.contains(&challenges_per_participant) {
            return Err(DomainError::Validation(format!(
                "Challenges per participant must be between {} and {}.",
                CHALLENGES_RANGE.start(),
                CHALLENGES_RANGE.end()
            )));
        }

        let max_rank_diff = self.max_rank_diff.unwrap_or(settings.default_max_rank_diff);
        if !MAX_RANK_DIFF_RANGE.contains(&max_rank_diff) {
            return Err(DomainError::Validation(format!(
                "Max rank difference must be between {} and {}.",
                MAX_RANK_DIFF_RANGE.start(),
                MAX_RANK_DIFF_RANGE.end()
            )));
        }

        // Completed events must go through completion so the ledger is written
        let status = self.status.unwrap_or(ArenaEventStatus::Scheduled);
        if status == ArenaEventStatus::Completed {
            return Err(DomainError::Validation(
                "Events start as scheduled or active.".to_string(),
            ));
        }

        let (month, year) = event_month_year(self.date);
        Ok(NewArenaEvent {
            date: self.date,
            month,
            year,
            category: self.category,
            min_sessions_required: self.min_sessions_required,
            max_rank_diff,
            challenges_per_participant,
            status,
        })
    }
}

/// An eligible member about to be seeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entrant {
    pub member_id: MemberId,
    pub participation: ParticipationCounts,
}

/// Result of creating an event. Zero participants is a valid outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedArenaEvent {
    pub event: ArenaEvent,
    pub participant_count: usize,
}

/// Insert the event, seed every entrant at the starting points with a full
/// budget, then assign initial ranks
pub async fn create_event<T>(
    tx: &mut T,
    new_event: &NewArenaEvent,
    entrants: &[Entrant],
    initial_points: i32,
) -> Result<CreatedArenaEvent, DomainError>
where
    T: ArenaTransaction,
{
    let event = tx.insert_event(new_event).await?;

    let seeds: Vec<NewArenaParticipant> = entrants
        .iter()
        .map(|e| NewArenaParticipant {
            event_id: event.id,
            member_id: e.member_id,
            points: initial_points,
            challenges_remaining: event.challenges_per_participant,
            monthly_participation_count: e.participation.monthly,
            yearly_participation_count: e.participation.yearly,
        })
        .collect();

    let participant_count = if seeds.is_empty() {
        0
    } else {
        tx.insert_participants(&seeds).await?.len()
    };
    recalculate_ranks(tx, &event.id).await?;

    Ok(CreatedArenaEvent {
        event,
        participant_count,
    })
}

/// Scheduled -> Active
pub async fn start_event<T>(tx: &mut T, event_id: &ArenaEventId) -> Result<ArenaEvent, DomainError>
where
    T: ArenaTransaction,
{
    let mut event = lock_existing_event(tx, event_id).await?;
    event.status = event.status.transition_to(ArenaEventStatus::Active)?;
    tx.update_event_status(event_id, event.status).await?;
    Ok(event)
}

/// Active -> Completed: final re-rank, then one ledger finish per participant
pub async fn complete_event<T>(
    tx: &mut T,
    event_id: &ArenaEventId,
) -> Result<ArenaEvent, DomainError>
where
    T: ArenaTransaction,
{
    let mut event = lock_existing_event(tx, event_id).await?;
    let next = event.status.transition_to(ArenaEventStatus::Completed)?;

    recalculate_ranks(tx, event_id).await?;
    tx.update_event_status(event_id, next).await?;
    event.status = next;

    for participant in tx.list_participants(event_id).await? {
        if let Some(rank) = participant.rank {
            tx.increment_historical_ranking(&participant.member_id, rank)
                .await?;
        }
    }

    Ok(event)
}

/// Delete an event with its participants and matches. A completed event
/// first takes back the ledger finishes it recorded.
pub async fn delete_event<T>(tx: &mut T, event_id: &ArenaEventId) -> Result<ArenaEvent, DomainError>
where
    T: ArenaTransaction,
{
    let event = lock_existing_event(tx, event_id).await?;

    if event.is_completed() {
        for participant in tx.list_participants(event_id).await? {
            if let Some(rank) = participant.rank {
                tx.decrement_historical_ranking(&participant.member_id, rank)
                    .await?;
            }
        }
    }

    tx.delete_event(event_id).await?;
    Ok(event)
}

/// Re-rank an event on demand. Completed events keep the ranks their
/// ledger entries were recorded with.
pub async fn rerank_event<T>(
    tx: &mut T,
    event_id: &ArenaEventId,
) -> Result<Vec<(ArenaParticipantId, i32)>, DomainError>
where
    T: ArenaTransaction,
{
    let event = lock_existing_event(tx, event_id).await?;
    if event.is_completed() {
        return Err(DomainError::Rejected(
            "Completed events keep their final ranks.".to_string(),
        ));
    }
    recalculate_ranks(tx, event_id).await
}
