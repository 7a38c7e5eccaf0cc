//! Challenge validation
//!
//! Who may challenge whom within one event. Checks run in a fixed order and
//! stop at the first failure.

use crate::domain::entities::{AllowedOpponent, ArenaEvent, ArenaParticipant, ArenaParticipantId};
use crate::domain::ports::ArenaTransaction;
use crate::error::{ChallengeRejection, DomainError};

/// Both sides of a challenge that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengePair {
    pub challenger: ArenaParticipant,
    pub opponent: ArenaParticipant,
}

/// Absolute rank distance, unset ranks counting as 0
pub fn rank_distance(a: &ArenaParticipant, b: &ArenaParticipant) -> i32 {
    (a.effective_rank() - b.effective_rank()).abs()
}

/// Run the challenge checks against current state.
///
/// The outer `Result` carries storage failures, the inner one the first
/// rule the challenge breaks.
pub async fn check_challenge<T>(
    tx: &mut T,
    event: &ArenaEvent,
    challenger_id: &ArenaParticipantId,
    opponent_id: &ArenaParticipantId,
) -> Result<Result<ChallengePair, ChallengeRejection>, DomainError>
where
    T: ArenaTransaction,
{
    if challenger_id == opponent_id {
        return Ok(Err(ChallengeRejection::SameParticipant));
    }

    let challenger = tx.find_participant(challenger_id).await?;
    let opponent = tx.find_participant(opponent_id).await?;
    let (challenger, opponent) = match (challenger, opponent) {
        (Some(c), Some(o)) => (c, o),
        _ => return Ok(Err(ChallengeRejection::ParticipantNotFound)),
    };
    if challenger.event_id != event.id || opponent.event_id != event.id {
        return Ok(Err(ChallengeRejection::EventMismatch));
    }

    if !challenger.has_challenges_remaining() {
        return Ok(Err(ChallengeRejection::NoChallengesRemaining));
    }

    if rank_distance(&challenger, &opponent) > event.max_rank_diff {
        return Ok(Err(ChallengeRejection::RankDifferenceTooLarge {
            max_rank_diff: event.max_rank_diff,
        }));
    }

    if tx.find_match_by_pair(challenger_id, opponent_id).await?.is_some() {
        return Ok(Err(ChallengeRejection::AlreadyChallenged));
    }

    Ok(Ok(ChallengePair {
        challenger,
        opponent,
    }))
}

/// [`check_challenge`] with rejections folded into `DomainError`
pub async fn validate_challenge<T>(
    tx: &mut T,
    event: &ArenaEvent,
    challenger_id: &ArenaParticipantId,
    opponent_id: &ArenaParticipantId,
) -> Result<ChallengePair, DomainError>
where
    T: ArenaTransaction,
{
    let pair = check_challenge(tx, event, challenger_id, opponent_id).await??;
    Ok(pair)
}

/// Participants `participant_id` may challenge right now, best rank first.
///
/// Empty when the participant has no budget left. Otherwise every other
/// participant at rank distance 1..=max_rank_diff that has not been
/// challenged by them yet.
pub async fn allowed_opponents<T>(
    tx: &mut T,
    event: &ArenaEvent,
    participant_id: &ArenaParticipantId,
) -> Result<Vec<AllowedOpponent>, DomainError>
where
    T: ArenaTransaction,
{
    let challenger = tx
        .find_participant(participant_id)
        .await?
        .ok_or(ChallengeRejection::ParticipantNotFound)?;
    if challenger.event_id != event.id {
        return Err(ChallengeRejection::EventMismatch.into());
    }

    if !challenger.has_challenges_remaining() {
        return Ok(Vec::new());
    }
    let matches = tx.list_matches(&event.id).await?;

    let mut participants = tx.list_participants(&event.id).await?;
    participants.sort_by_key(|p| (p.rank.is_none(), p.rank, p.member_id));

    Ok(participants
        .iter()
        .filter(|p| p.id != challenger.id)
        .filter(|p| {
            !matches
                .iter()
                .any(|m| m.challenger_id == challenger.id && m.opponent_id == p.id)
        })
        .filter(|p| {
            let distance = rank_distance(&challenger, p);
            distance >= 1 && distance <= event.max_rank_diff
        })
        .map(|p| AllowedOpponent {
            participant_id: p.id,
            member_id: p.member_id,
            rank: p.rank,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ArenaEventStatus, ArenaParticipantId};
    use crate::domain::ports::ArenaStore;
    use crate::test_utils::{
        test_completed_match, test_event, test_ranked_participant, test_scheduled_match,
        InMemoryArenaStore,
    };

    struct Ladder {
        store: InMemoryArenaStore,
        event: ArenaEvent,
        ranks: Vec<ArenaParticipant>,
    }

    /// Active event, max rank diff 2, participants ranked 1..=n with a budget of 2
    fn ladder(n: i32) -> Ladder {
        let event = test_event(ArenaEventStatus::Active);
        let ranks: Vec<_> = (1..=n).map(|r| test_ranked_participant(&event, r)).collect();
        let mut store = InMemoryArenaStore::new().with_event(event.clone());
        for p in &ranks {
            store = store.with_participant(p.clone());
        }
        Ladder { store, event, ranks }
    }

    async fn check(l: &Ladder, challenger: usize, opponent: usize) -> Result<ChallengePair, ChallengeRejection> {
        let mut tx = l.store.begin().await.unwrap();
        check_challenge(&mut tx, &l.event, &l.ranks[challenger].id, &l.ranks[opponent].id)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn within_window_is_allowed() {
        let l = ladder(4);
        let pair = check(&l, 2, 0).await.unwrap();
        assert_eq!(pair.challenger.rank, Some(3));
        assert_eq!(pair.opponent.rank, Some(1));
    }

    #[tokio::test]
    async fn same_participant_is_rejected_first() {
        let l = ladder(2);
        assert_eq!(check(&l, 0, 0).await.unwrap_err(), ChallengeRejection::SameParticipant);
    }

    #[tokio::test]
    async fn unknown_participant_is_rejected() {
        let l = ladder(2);
        let mut tx = l.store.begin().await.unwrap();
        let result = check_challenge(&mut tx, &l.event, &l.ranks[0].id, &ArenaParticipantId::new())
            .await
            .unwrap();
        assert_eq!(result.unwrap_err(), ChallengeRejection::ParticipantNotFound);
    }

    #[tokio::test]
    async fn participant_of_another_event_is_rejected() {
        let l = ladder(2);
        let other_event = test_event(ArenaEventStatus::Active);
        let stranger = test_ranked_participant(&other_event, 2);
        let store = l.store.with_event(other_event).with_participant(stranger.clone());

        let mut tx = store.begin().await.unwrap();
        let result = check_challenge(&mut tx, &l.event, &l.ranks[0].id, &stranger.id)
            .await
            .unwrap();
        assert_eq!(result.unwrap_err(), ChallengeRejection::EventMismatch);
    }

    #[tokio::test]
    async fn exhausted_budget_is_rejected_before_rank_window() {
        let event = test_event(ArenaEventStatus::Active);
        let mut broke = test_ranked_participant(&event, 5);
        broke.challenges_remaining = 0;
        let top = test_ranked_participant(&event, 1);
        let store = InMemoryArenaStore::new()
            .with_event(event.clone())
            .with_participant(broke.clone())
            .with_participant(top.clone());

        let mut tx = store.begin().await.unwrap();
        let result = check_challenge(&mut tx, &event, &broke.id, &top.id).await.unwrap();
        assert_eq!(result.unwrap_err(), ChallengeRejection::NoChallengesRemaining);
    }

    #[tokio::test]
    async fn scheduled_match_does_not_spend_budget() {
        let l = ladder(3);
        let mut last_slot = l.ranks[1].clone();
        last_slot.challenges_remaining = 1;
        let store = InMemoryArenaStore::new()
            .with_event(l.event.clone())
            .with_participant(l.ranks[0].clone())
            .with_participant(last_slot.clone())
            .with_participant(l.ranks[2].clone())
            .with_match(test_scheduled_match(&last_slot, &l.ranks[0]));

        let mut tx = store.begin().await.unwrap();
        let pair = check_challenge(&mut tx, &l.event, &last_slot.id, &l.ranks[2].id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pair.opponent.rank, Some(3));

        let opponents = allowed_opponents(&mut tx, &l.event, &last_slot.id).await.unwrap();
        let ranks: Vec<_> = opponents.iter().map(|o| o.rank).collect();
        assert_eq!(ranks, vec![Some(3)]);
    }

    #[tokio::test]
    async fn rank_window_is_inclusive() {
        let l = ladder(5);
        assert!(check(&l, 3, 1).await.is_ok());
        assert_eq!(
            check(&l, 3, 0).await.unwrap_err(),
            ChallengeRejection::RankDifferenceTooLarge { max_rank_diff: 2 }
        );
    }

    #[tokio::test]
    async fn duplicate_ordered_pair_is_rejected() {
        let l = ladder(3);
        let store = l
            .store
            .with_match(test_completed_match(&l.ranks[1], &l.ranks[0], 21, 10));

        let mut tx = store.begin().await.unwrap();
        let again = check_challenge(&mut tx, &l.event, &l.ranks[1].id, &l.ranks[0].id)
            .await
            .unwrap();
        assert_eq!(again.unwrap_err(), ChallengeRejection::AlreadyChallenged);

        let reversed = check_challenge(&mut tx, &l.event, &l.ranks[0].id, &l.ranks[1].id)
            .await
            .unwrap();
        assert!(reversed.is_ok());
    }

    #[tokio::test]
    async fn validate_challenge_maps_to_domain_errors() {
        let l = ladder(2);
        let mut tx = l.store.begin().await.unwrap();
        let err = validate_challenge(&mut tx, &l.event, &l.ranks[0].id, &l.ranks[0].id)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::Validation("Challenger and opponent must be different.".into())
        );
    }

    // ==========================================================================
    // Allowed opponents
    // ==========================================================================

    #[tokio::test]
    async fn allowed_opponents_stay_inside_window() {
        let l = ladder(6);
        let mut tx = l.store.begin().await.unwrap();
        let allowed = allowed_opponents(&mut tx, &l.event, &l.ranks[3].id).await.unwrap();
        let ranks: Vec<_> = allowed.iter().map(|o| o.rank).collect();
        assert_eq!(ranks, vec![Some(2), Some(3), Some(5), Some(6)]);
    }

    #[tokio::test]
    async fn allowed_opponents_skip_already_challenged() {
        let l = ladder(4);
        let store = l
            .store
            .with_match(test_completed_match(&l.ranks[2], &l.ranks[0], 21, 15));
        let mut tx = store.begin().await.unwrap();
        let allowed = allowed_opponents(&mut tx, &l.event, &l.ranks[2].id).await.unwrap();
        let ids: Vec<_> = allowed.iter().map(|o| o.participant_id).collect();
        assert_eq!(ids, vec![l.ranks[1].id, l.ranks[3].id]);
    }

    #[tokio::test]
    async fn allowed_opponents_empty_without_budget() {
        let event = test_event(ArenaEventStatus::Active);
        let mut broke = test_ranked_participant(&event, 2);
        broke.challenges_remaining = 0;
        let store = InMemoryArenaStore::new()
            .with_event(event.clone())
            .with_participant(broke.clone())
            .with_participant(test_ranked_participant(&event, 1));

        let mut tx = store.begin().await.unwrap();
        assert!(allowed_opponents(&mut tx, &event, &broke.id).await.unwrap().is_empty());
    }
}
