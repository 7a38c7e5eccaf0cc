//! Ladder ranking
//!
//! A strict total order over the participants of one event, and the
//! recalculation that persists it as rank positions 1..N.

use std::cmp::Ordering;

use crate::domain::entities::{
    ArenaEventId, ArenaParticipant, ArenaParticipantId, HistoricalIndex, HistoricalRankCounts,
    MemberId,
};
use crate::domain::ports::ArenaTransaction;
use crate::error::DomainError;

/// Compare two members' historical finishes, best placement first.
///
/// Walks ranks 1, 2, 3, ... and at the first rank where the counts differ the
/// side with more finishes there orders first. One 1st place therefore beats
/// any number of 2nd places. Equal (or both empty) histories compare equal.
pub fn compare_historical_rank_counts(
    a: &HistoricalRankCounts,
    b: &HistoricalRankCounts,
) -> Ordering {
    let max_rank = a
        .keys()
        .chain(b.keys())
        .copied()
        .max()
        .unwrap_or(0);

    for rank in 1..=max_rank {
        let count_a = a.get(&rank).copied().unwrap_or(0);
        let count_b = b.get(&rank).copied().unwrap_or(0);
        if count_a != count_b {
            return count_b.cmp(&count_a);
        }
    }
    Ordering::Equal
}

/// Ladder order: `Less` means `a` ranks above `b`.
///
/// Keys, all descending except the last: points, wins - losses,
/// score for - against, historical finishes, monthly participation,
/// yearly participation, then member id ascending.
pub fn compare_participants(
    a: &ArenaParticipant,
    b: &ArenaParticipant,
    history: &HistoricalIndex,
) -> Ordering {
    let empty = HistoricalRankCounts::new();
    let hist_a = history.counts_for(&a.member_id).unwrap_or(&empty);
    let hist_b = history.counts_for(&b.member_id).unwrap_or(&empty);

    b.points
        .cmp(&a.points)
        .then_with(|| b.match_diff().cmp(&a.match_diff()))
        .then_with(|| b.score_diff().cmp(&a.score_diff()))
        .then_with(|| compare_historical_rank_counts(hist_a, hist_b))
        .then_with(|| {
            b.monthly_participation_count
                .cmp(&a.monthly_participation_count)
        })
        .then_with(|| b.yearly_participation_count.cmp(&a.yearly_participation_count))
        .then_with(|| a.member_id.cmp(&b.member_id))
}

/// Sort participants into ladder order and pair each with its 1-based rank
pub fn assign_ranks(
    participants: &[ArenaParticipant],
    history: &HistoricalIndex,
) -> Vec<(ArenaParticipantId, i32)> {
    let mut sorted: Vec<&ArenaParticipant> = participants.iter().collect();
    sorted.sort_by(|a, b| compare_participants(a, b, history));

    sorted
        .into_iter()
        .enumerate()
        .map(|(index, p)| (p.id, index as i32 + 1))
        .collect()
}

/// Load the ledger rows for exactly these members
pub async fn load_history<T>(
    tx: &mut T,
    member_ids: &[MemberId],
) -> Result<HistoricalIndex, DomainError>
where
    T: ArenaTransaction,
{
    if member_ids.is_empty() {
        return Ok(HistoricalIndex::new());
    }
    let rows = tx.find_historical_rankings(member_ids).await?;
    Ok(HistoricalIndex::from_rows(rows))
}

/// Re-sort every participant of an event and persist `rank = position`.
///
/// Idempotent, and a no-op for an event without participants. Returns the
/// ranks written.
pub async fn recalculate_ranks<T>(
    tx: &mut T,
    event_id: &ArenaEventId,
) -> Result<Vec<(ArenaParticipantId, i32)>, DomainError>
where
    T: ArenaTransaction,
{
    let participants = tx.list_participants(event_id).await?;
    if participants.is_empty() {
        return Ok(Vec::new());
    }

    let member_ids: Vec<MemberId> = participants.iter().map(|p| p.member_id).collect();
    let history = load_history(tx, &member_ids).await?;

    let ranks = assign_ranks(&participants, &history);
    tx.update_ranks(&ranks).await?;

    tracing::debug!(event_id = %event_id, participants = ranks.len(), "Ranks recalculated");

    Ok(ranks)
}
