//! Arena service
//!
//! Entry point for every arena operation. Owns transaction boundaries,
//! actor checks and logging; the ladder rules live in the sibling modules
//! and run against whatever `ArenaTransaction` this service opens.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::app::challenge;
use crate::app::eligibility::{EligibilityCriteria, EligibilityResolver};
use crate::app::events::{self, CreateArenaEvent, CreatedArenaEvent, Entrant};
use crate::app::matches::{self, GameScore};
use crate::config::ArenaSettings;
use crate::domain::entities::{
    Actor, AllowedOpponent, ArenaCategory, ArenaEvent, ArenaEventId, ArenaMatch, ArenaMatchId,
    ArenaParticipant, ArenaParticipantId, LeaderboardEntry,
};
use crate::domain::ports::{
    ArenaEventRepository, ArenaMatchRepository, ArenaParticipantRepository, ArenaStore,
    ArenaTransaction, AttendanceLog, MemberRoster,
};
use crate::error::DomainError;

/// An event with its ladder and matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArenaEventDetail {
    pub event: ArenaEvent,
    /// Ordered by rank, unranked participants last
    pub participants: Vec<ArenaParticipant>,
    pub matches: Vec<ArenaMatch>,
}

/// Ladder order for display: rank ascending, unset ranks last
fn sort_by_rank(participants: &mut [ArenaParticipant]) {
    participants.sort_by_key(|p| (p.rank.is_none(), p.rank, p.member_id));
}

async fn find_existing_event<T>(tx: &mut T, event_id: &ArenaEventId) -> Result<ArenaEvent, DomainError>
where
    T: ArenaTransaction,
{
    tx.find_event(event_id)
        .await?
        .ok_or_else(|| DomainError::NotFound("Event not found.".to_string()))
}

/// Service for running arena ladders
pub struct ArenaService<S, R, A>
where
    S: ArenaStore,
    R: MemberRoster,
    A: AttendanceLog,
{
    store: Arc<S>,
    eligibility: EligibilityResolver<R, A>,
    settings: ArenaSettings,
}

impl<S, R, A> ArenaService<S, R, A>
where
    S: ArenaStore,
    R: MemberRoster,
    A: AttendanceLog,
{
    pub fn new(store: Arc<S>, roster: Arc<R>, attendance: Arc<A>, settings: ArenaSettings) -> Self {
        Self {
            store,
            eligibility: EligibilityResolver::new(roster, attendance),
            settings,
        }
    }

    pub fn settings(&self) -> &ArenaSettings {
        &self.settings
    }

    /// Run `op` in a fresh transaction, committing on success.
    ///
    /// A retryable failure (a conflict) reruns `op` once from scratch in a new
    /// transaction. Any failure rolls the transaction back before returning.
    async fn in_transaction<Out, F>(&self, operation: &'static str, op: F) -> Result<Out, DomainError>
    where
        Out: Send,
        F: for<'t> Fn(&'t mut S::Transaction) -> BoxFuture<'t, Result<Out, DomainError>>,
    {
        let mut attempt = 1;
        loop {
            let mut tx = self.store.begin().await?;
            let result = match op(&mut tx).await {
                Ok(value) => tx.commit().await.map(|_| value),
                Err(err) => {
                    if let Err(rollback_err) = tx.rollback().await {
                        warn!(operation, error = %rollback_err, "Rollback failed");
                    }
                    Err(err)
                }
            };

            match result {
                Err(err) if err.is_retryable() && attempt == 1 => {
                    warn!(operation, error = %err, "Transaction conflict, retrying once");
                    attempt += 1;
                }
                Err(err) => {
                    match &err {
                        DomainError::Database(_) | DomainError::Internal(_) => {
                            error!(operation, error = %err, "Arena operation failed");
                        }
                        DomainError::Conflict(_) => {
                            warn!(operation, error = %err, "Arena operation conflicted after retry");
                        }
                        _ => debug!(operation, reason = err.reason(), "Arena operation rejected"),
                    }
                    return Err(err);
                }
                Ok(value) => return Ok(value),
            }
        }
    }

    // ========================================================================
    // Event lifecycle
    // ========================================================================

    /// Create an event and seed every eligible member.
    ///
    /// Eligibility and participation counts are read first, outside the
    /// transaction. If anything fails after the event row is written, the
    /// whole creation is rolled back.
    pub async fn create_event(
        &self,
        actor: &Actor,
        request: CreateArenaEvent,
    ) -> Result<CreatedArenaEvent, DomainError> {
        actor.require_privileged("create arena events")?;
        let new_event = request.into_new_event(&self.settings)?;

        let criteria = EligibilityCriteria {
            month: new_event.month,
            year: new_event.year,
            category: new_event.category,
            min_sessions_required: new_event.min_sessions_required,
        };
        let eligible = self.eligibility.eligible_members(&criteria).await?;
        let mut counts = self
            .eligibility
            .participation_counts(&eligible, new_event.month, new_event.year)
            .await?;
        let entrants: Vec<Entrant> = eligible
            .iter()
            .map(|member_id| Entrant {
                member_id: *member_id,
                participation: counts.remove(member_id).unwrap_or_default(),
            })
            .collect();

        let initial_points = self.settings.initial_points;
        let created = self
            .in_transaction("create_event", |tx| {
                let new_event = new_event.clone();
                let entrants = entrants.clone();
                Box::pin(async move {
                    events::create_event(tx, &new_event, &entrants, initial_points).await
                })
            })
            .await?;

        info!(
            event_id = %created.event.id,
            category = %created.event.category,
            month = created.event.month,
            year = created.event.year,
            participants = created.participant_count,
            "Arena event created"
        );
        Ok(created)
    }

    pub async fn start_event(
        &self,
        actor: &Actor,
        event_id: ArenaEventId,
    ) -> Result<ArenaEvent, DomainError> {
        actor.require_privileged("start events")?;
        let event = self
            .in_transaction("start_event", |tx| {
                Box::pin(async move { events::start_event(tx, &event_id).await })
            })
            .await?;

        info!(event_id = %event_id, "Arena event started");
        Ok(event)
    }

    pub async fn complete_event(
        &self,
        actor: &Actor,
        event_id: ArenaEventId,
    ) -> Result<ArenaEvent, DomainError> {
        actor.require_privileged("complete events")?;
        let event = self
            .in_transaction("complete_event", |tx| {
                Box::pin(async move { events::complete_event(tx, &event_id).await })
            })
            .await?;

        info!(event_id = %event_id, "Arena event completed, final ranks recorded");
        Ok(event)
    }

    pub async fn delete_event(
        &self,
        actor: &Actor,
        event_id: ArenaEventId,
    ) -> Result<ArenaEvent, DomainError> {
        actor.require_privileged("delete arena events")?;
        let event = self
            .in_transaction("delete_event", |tx| {
                Box::pin(async move { events::delete_event(tx, &event_id).await })
            })
            .await?;

        info!(
            event_id = %event_id,
            ledger_reverted = event.is_completed(),
            "Arena event deleted"
        );
        Ok(event)
    }

    /// Re-sort an event's ladder and persist the ranks
    pub async fn recalculate_ranks(
        &self,
        actor: &Actor,
        event_id: ArenaEventId,
    ) -> Result<Vec<(ArenaParticipantId, i32)>, DomainError> {
        actor.require_privileged("recalculate ranks")?;
        let ranks = self
            .in_transaction("recalculate_ranks", |tx| {
                Box::pin(async move { events::rerank_event(tx, &event_id).await })
            })
            .await?;

        info!(event_id = %event_id, participants = ranks.len(), "Arena ranks recalculated");
        Ok(ranks)
    }

    // ========================================================================
    // Matches
    // ========================================================================

    pub async fn schedule_match(
        &self,
        actor: &Actor,
        event_id: ArenaEventId,
        challenger_id: ArenaParticipantId,
        opponent_id: ArenaParticipantId,
    ) -> Result<ArenaMatch, DomainError> {
        actor.require_privileged("schedule matches")?;
        let scheduled = self
            .in_transaction("schedule_match", |tx| {
                Box::pin(async move {
                    matches::schedule_match(tx, &event_id, &challenger_id, &opponent_id).await
                })
            })
            .await?;

        info!(
            event_id = %event_id,
            match_id = %scheduled.id,
            challenger_id = %challenger_id,
            opponent_id = %opponent_id,
            "Arena match scheduled"
        );
        Ok(scheduled)
    }

    /// The acting member challenges `opponent_id`
    pub async fn challenge_opponent(
        &self,
        actor: &Actor,
        event_id: ArenaEventId,
        opponent_id: ArenaParticipantId,
    ) -> Result<ArenaMatch, DomainError> {
        let member_id = actor.require_member()?;
        let scheduled = self
            .in_transaction("challenge_opponent", |tx| {
                Box::pin(async move {
                    matches::challenge_opponent(tx, &event_id, &member_id, &opponent_id).await
                })
            })
            .await?;

        info!(
            event_id = %event_id,
            match_id = %scheduled.id,
            member_id = %member_id,
            opponent_id = %opponent_id,
            "Arena challenge created"
        );
        Ok(scheduled)
    }

    /// Record a played game that was never scheduled
    pub async fn submit_match(
        &self,
        actor: &Actor,
        event_id: ArenaEventId,
        challenger_id: ArenaParticipantId,
        opponent_id: ArenaParticipantId,
        score: GameScore,
    ) -> Result<ArenaMatch, DomainError> {
        actor.require_privileged("submit matches")?;
        let min_points = self.settings.min_points;
        let played = self
            .in_transaction("submit_match", |tx| {
                Box::pin(async move {
                    matches::submit_match(tx, &event_id, &challenger_id, &opponent_id, score, min_points)
                        .await
                })
            })
            .await?;

        log_result(&played);
        Ok(played)
    }

    /// Enter the result of a scheduled match
    pub async fn complete_match(
        &self,
        actor: &Actor,
        match_id: ArenaMatchId,
        score: GameScore,
    ) -> Result<ArenaMatch, DomainError> {
        actor.require_privileged("complete matches")?;
        let min_points = self.settings.min_points;
        let played = self
            .in_transaction("complete_match", |tx| {
                Box::pin(async move { matches::complete_match(tx, &match_id, score, min_points).await })
            })
            .await?;

        log_result(&played);
        Ok(played)
    }

    pub async fn delete_scheduled_match(
        &self,
        actor: &Actor,
        match_id: ArenaMatchId,
    ) -> Result<ArenaMatch, DomainError> {
        actor.require_privileged("delete scheduled matches")?;
        let deleted = self
            .in_transaction("delete_scheduled_match", |tx| {
                Box::pin(async move { matches::delete_scheduled_match(tx, &match_id).await })
            })
            .await?;

        info!(event_id = %deleted.event_id, match_id = %match_id, "Scheduled arena match deleted");
        Ok(deleted)
    }

    pub async fn set_challenges_remaining(
        &self,
        actor: &Actor,
        participant_id: ArenaParticipantId,
        challenges_remaining: i32,
    ) -> Result<ArenaParticipant, DomainError> {
        actor.require_privileged("set challenges")?;
        let participant = self
            .in_transaction("set_challenges_remaining", |tx| {
                Box::pin(async move {
                    matches::set_challenges_remaining(tx, &participant_id, challenges_remaining).await
                })
            })
            .await?;

        info!(
            event_id = %participant.event_id,
            participant_id = %participant_id,
            challenges_remaining,
            "Challenge budget updated"
        );
        Ok(participant)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Whether `challenger_id` may challenge `opponent_id` right now
    pub async fn validate_challenge(
        &self,
        event_id: ArenaEventId,
        challenger_id: ArenaParticipantId,
        opponent_id: ArenaParticipantId,
    ) -> Result<(), DomainError> {
        self.in_transaction("validate_challenge", |tx| {
            Box::pin(async move {
                let event = find_existing_event(tx, &event_id).await?;
                challenge::validate_challenge(tx, &event, &challenger_id, &opponent_id).await?;
                Ok(())
            })
        })
        .await
    }

    pub async fn get_event(&self, event_id: ArenaEventId) -> Result<ArenaEventDetail, DomainError> {
        self.in_transaction("get_event", |tx| {
            Box::pin(async move {
                let event = find_existing_event(tx, &event_id).await?;
                let mut participants = tx.list_participants(&event_id).await?;
                sort_by_rank(&mut participants);
                let matches = tx.list_matches(&event_id).await?;
                Ok(ArenaEventDetail {
                    event,
                    participants,
                    matches,
                })
            })
        })
        .await
    }

    /// Events newest first
    pub async fn list_events(
        &self,
        category: Option<ArenaCategory>,
    ) -> Result<Vec<ArenaEvent>, DomainError> {
        self.in_transaction("list_events", |tx| {
            Box::pin(async move { tx.list_events(category).await })
        })
        .await
    }

    /// Participants sorted by their persisted rank
    pub async fn leaderboard(
        &self,
        event_id: ArenaEventId,
    ) -> Result<Vec<LeaderboardEntry>, DomainError> {
        self.in_transaction("leaderboard", |tx| {
            Box::pin(async move {
                find_existing_event(tx, &event_id).await?;
                let mut participants = tx.list_participants(&event_id).await?;
                sort_by_rank(&mut participants);
                Ok(participants.iter().map(LeaderboardEntry::from).collect())
            })
        })
        .await
    }

    pub async fn allowed_opponents(
        &self,
        event_id: ArenaEventId,
        participant_id: ArenaParticipantId,
    ) -> Result<Vec<AllowedOpponent>, DomainError> {
        self.in_transaction("allowed_opponents", |tx| {
            Box::pin(async move {
                let event = find_existing_event(tx, &event_id).await?;
                challenge::allowed_opponents(tx, &event, &participant_id).await
            })
        })
        .await
    }
}

fn log_result(played: &ArenaMatch) {
    if let Some(outcome) = &played.outcome {
        info!(
            event_id = %played.event_id,
            match_id = %played.id,
            challenger_score = outcome.challenger_score,
            opponent_score = outcome.opponent_score,
            rank_diff = outcome.rank_diff,
            challenger_points_change = outcome.challenger.points_change,
            opponent_points_change = outcome.opponent.points_change,
            "Arena match result recorded"
        );
    }
}
