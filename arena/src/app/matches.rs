//! Match scheduling and completion
//!
//! Every function here runs inside one `ArenaTransaction` and starts by
//! locking the owning event, so two writers of the same ladder never
//! interleave. Applying a result is read current ranks, compute the points
//! swing, write the outcome and stats, then re-rank the whole event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::arena_config::CHALLENGES_RANGE;
use crate::app::challenge::validate_challenge;
use crate::app::points::calculate_points_change;
use crate::app::ranking::recalculate_ranks;
use crate::app::scoring::validate_game_score;
use crate::domain::entities::{
    ArenaEvent, ArenaEventId, ArenaMatch, ArenaMatchId, ArenaParticipant, ArenaParticipantId,
    MatchOutcome, MemberId, NewArenaMatch, SideSnapshot,
};
use crate::domain::ports::ArenaTransaction;
use crate::error::{ChallengeRejection, DomainError};

/// Reported score of a single game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameScore {
    pub challenger: i32,
    pub opponent: i32,
}

impl GameScore {
    pub fn new(challenger: i32, opponent: i32) -> Self {
        Self {
            challenger,
            opponent,
        }
    }

    pub fn challenger_won(&self) -> bool {
        self.challenger > self.opponent
    }
}

// ============================================================================
// Pure result arithmetic
// ============================================================================

/// Work out the immutable outcome of a game from both sides' current standing
pub fn resolve_outcome(
    challenger: &ArenaParticipant,
    opponent: &ArenaParticipant,
    score: GameScore,
    max_rank_diff: i32,
    min_points: i32,
    completed_at: DateTime<Utc>,
) -> MatchOutcome {
    let challenger_won = score.challenger_won();
    let (winner, loser) = if challenger_won {
        (challenger, opponent)
    } else {
        (opponent, challenger)
    };

    let winner_rank = winner.effective_rank();
    let loser_rank = loser.effective_rank();
    let change = calculate_points_change(winner_rank, loser_rank, max_rank_diff, min_points);

    let (challenger_change, opponent_change) = if challenger_won {
        (change.winner_delta, change.loser_delta)
    } else {
        (change.loser_delta, change.winner_delta)
    };

    MatchOutcome {
        challenger_score: score.challenger,
        opponent_score: score.opponent,
        rank_diff: winner_rank - loser_rank,
        challenger: SideSnapshot {
            rank_at_match: challenger.rank,
            points_at_match: challenger.points,
            points_change: challenger_change,
        },
        opponent: SideSnapshot {
            rank_at_match: opponent.rank,
            points_at_match: opponent.points,
            points_change: opponent_change,
        },
        completed_at,
    }
}

/// Fold an outcome into both participants. Only the challenger pays a
/// challenge from their budget.
pub fn apply_outcome(
    challenger: &mut ArenaParticipant,
    opponent: &mut ArenaParticipant,
    outcome: &MatchOutcome,
) {
    let challenger_won = outcome.challenger_won();
    challenger.record_game(
        outcome.challenger.points_change,
        challenger_won,
        outcome.challenger_score,
        outcome.opponent_score,
    );
    opponent.record_game(
        outcome.opponent.points_change,
        !challenger_won,
        outcome.opponent_score,
        outcome.challenger_score,
    );
    challenger.challenges_remaining -= 1;
}

// ============================================================================
// Shared steps
// ============================================================================

/// Lock an event for the rest of the transaction
pub async fn lock_existing_event<T>(
    tx: &mut T,
    event_id: &ArenaEventId,
) -> Result<ArenaEvent, DomainError>
where
    T: ArenaTransaction,
{
    tx.lock_event(event_id)
        .await?
        .ok_or_else(|| DomainError::NotFound("Event not found.".to_string()))
}

fn require_active(event: &ArenaEvent, reason: &str) -> Result<(), DomainError> {
    if event.is_active() {
        Ok(())
    } else {
        Err(DomainError::Rejected(reason.to_string()))
    }
}

/// Find a match, lock its event, then re-read the match under the lock
async fn lock_match<T>(
    tx: &mut T,
    match_id: &ArenaMatchId,
) -> Result<(ArenaEvent, ArenaMatch), DomainError>
where
    T: ArenaTransaction,
{
    let not_found = || DomainError::NotFound("Match not found.".to_string());

    let unlocked = tx.find_match(match_id).await?.ok_or_else(not_found)?;
    let event = lock_existing_event(tx, &unlocked.event_id).await?;
    let arena_match = tx.find_match(match_id).await?.ok_or_else(not_found)?;
    Ok((event, arena_match))
}

/// Resolve a result for a pair and persist both sides' new totals
async fn record_result<T>(
    tx: &mut T,
    event: &ArenaEvent,
    mut challenger: ArenaParticipant,
    mut opponent: ArenaParticipant,
    score: GameScore,
    min_points: i32,
) -> Result<MatchOutcome, DomainError>
where
    T: ArenaTransaction,
{
    let outcome = resolve_outcome(
        &challenger,
        &opponent,
        score,
        event.max_rank_diff,
        min_points,
        Utc::now(),
    );
    apply_outcome(&mut challenger, &mut opponent, &outcome);

    tx.update_participant_stats(&challenger).await?;
    tx.update_participant_stats(&opponent).await?;

    Ok(outcome)
}

// ============================================================================
// Operations
// ============================================================================

async fn schedule_in_event<T>(
    tx: &mut T,
    event: &ArenaEvent,
    challenger_id: &ArenaParticipantId,
    opponent_id: &ArenaParticipantId,
) -> Result<ArenaMatch, DomainError>
where
    T: ArenaTransaction,
{
    require_active(event, "Start the event before scheduling matches.")?;
    validate_challenge(tx, event, challenger_id, opponent_id).await?;

    tx.insert_match(&NewArenaMatch {
        event_id: event.id,
        challenger_id: *challenger_id,
        opponent_id: *opponent_id,
        outcome: None,
    })
    .await
}

/// Create a match without a result. No budget is consumed yet.
pub async fn schedule_match<T>(
    tx: &mut T,
    event_id: &ArenaEventId,
    challenger_id: &ArenaParticipantId,
    opponent_id: &ArenaParticipantId,
) -> Result<ArenaMatch, DomainError>
where
    T: ArenaTransaction,
{
    let event = lock_existing_event(tx, event_id).await?;
    schedule_in_event(tx, &event, challenger_id, opponent_id).await
}

/// A member challenges an opponent from their own participant slot.
///
/// Members play one match at a time: anyone with a scheduled match in the
/// event, on either side, has to wait for its result first.
pub async fn challenge_opponent<T>(
    tx: &mut T,
    event_id: &ArenaEventId,
    member_id: &MemberId,
    opponent_id: &ArenaParticipantId,
) -> Result<ArenaMatch, DomainError>
where
    T: ArenaTransaction,
{
    let event = lock_existing_event(tx, event_id).await?;

    let mine = tx
        .find_participant_by_member(event_id, member_id)
        .await?
        .ok_or_else(|| {
            DomainError::Rejected("You are not a participant in this event.".to_string())
        })?;

    let matches = tx.list_matches(event_id).await?;
    if matches.iter().any(|m| m.is_scheduled() && m.involves(&mine.id)) {
        return Err(DomainError::Rejected(
            "You already have a scheduled match. Play it and wait for the result to be recorded before challenging again."
                .to_string(),
        ));
    }

    schedule_in_event(tx, &event, &mine.id, opponent_id).await
}

/// Create and complete a match in one step
pub async fn submit_match<T>(
    tx: &mut T,
    event_id: &ArenaEventId,
    challenger_id: &ArenaParticipantId,
    opponent_id: &ArenaParticipantId,
    score: GameScore,
    min_points: i32,
) -> Result<ArenaMatch, DomainError>
where
    T: ArenaTransaction,
{
    let event = lock_existing_event(tx, event_id).await?;
    require_active(&event, "Event must be active to record results.")?;

    let pair = validate_challenge(tx, &event, challenger_id, opponent_id).await?;
    validate_game_score(score.challenger, score.opponent)?;

    let outcome = record_result(tx, &event, pair.challenger, pair.opponent, score, min_points).await?;
    let arena_match = tx
        .insert_match(&NewArenaMatch {
            event_id: event.id,
            challenger_id: *challenger_id,
            opponent_id: *opponent_id,
            outcome: Some(outcome),
        })
        .await?;

    recalculate_ranks(tx, &event.id).await?;
    Ok(arena_match)
}

/// Enter the result of a scheduled match
pub async fn complete_match<T>(
    tx: &mut T,
    match_id: &ArenaMatchId,
    score: GameScore,
    min_points: i32,
) -> Result<ArenaMatch, DomainError>
where
    T: ArenaTransaction,
{
    let (event, mut arena_match) = lock_match(tx, match_id).await?;
    if !arena_match.is_scheduled() {
        return Err(DomainError::Rejected("Match already completed.".to_string()));
    }
    require_active(&event, "Event must be active to record results.")?;
    validate_game_score(score.challenger, score.opponent)?;

    let vanished = || DomainError::Conflict("Match participant disappeared.".to_string());
    let challenger = tx
        .find_participant(&arena_match.challenger_id)
        .await?
        .ok_or_else(vanished)?;
    let opponent = tx
        .find_participant(&arena_match.opponent_id)
        .await?
        .ok_or_else(vanished)?;
    if !challenger.has_challenges_remaining() {
        return Err(ChallengeRejection::NoChallengesRemaining.into());
    }

    let outcome = record_result(tx, &event, challenger, opponent, score, min_points).await?;
    arena_match.outcome = Some(outcome);
    tx.complete_match(&arena_match).await?;

    recalculate_ranks(tx, &event.id).await?;
    Ok(arena_match)
}

/// Remove a match that has not been played. Budgets are untouched.
pub async fn delete_scheduled_match<T>(
    tx: &mut T,
    match_id: &ArenaMatchId,
) -> Result<ArenaMatch, DomainError>
where
    T: ArenaTransaction,
{
    let (_, arena_match) = lock_match(tx, match_id).await?;
    if !arena_match.is_scheduled() {
        return Err(DomainError::Rejected(
            "Only scheduled matches can be deleted.".to_string(),
        ));
    }
    tx.delete_match(match_id).await?;
    Ok(arena_match)
}

/// Overwrite a participant's challenge budget
pub async fn set_challenges_remaining<T>(
    tx: &mut T,
    participant_id: &ArenaParticipantId,
    challenges_remaining: i32,
) -> Result<ArenaParticipant, DomainError>
where
    T: ArenaTransaction,
{
    if !CHALLENGES_RANGE.contains(&challenges_remaining) {
        return Err(DomainError::Validation(format!(
            "Challenges remaining must be between {} and {}.",
            CHALLENGES_RANGE.start(),
            CHALLENGES_RANGE.end()
        )));
    }

    let not_found = || DomainError::NotFound("Participant not found.".to_string());
    let unlocked = tx.find_participant(participant_id).await?.ok_or_else(not_found)?;
    lock_existing_event(tx, &unlocked.event_id).await?;
    let mut participant = tx.find_participant(participant_id).await?.ok_or_else(not_found)?;

    participant.challenges_remaining = challenges_remaining;
    tx.update_participant_stats(&participant).await?;
    Ok(participant)
}
