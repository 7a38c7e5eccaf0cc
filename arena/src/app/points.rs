//! Points formula
//!
//! Turns a match result into a symmetric points swing scaled by how far
//! apart the two players stood on the ladder. Rank 1 is best.

/// Points swing of one match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointsChange {
    pub winner_delta: i32,
    pub loser_delta: i32,
}

/// Compute the points swing for a match.
///
/// `rank_diff = winner_rank - loser_rank`. A positive diff is an upset (the
/// winner stood lower on the ladder) and pays `min_points * (max_rank_diff + rank_diff)`;
/// otherwise the swing is `min_points * (max_rank_diff + rank_diff + 1)`.
/// The swing never drops below zero, so a win never costs points.
///
/// With `max_rank_diff = 3`: #5 beats #2 swings 30, #2 beats #5 swings 5.
pub fn calculate_points_change(
    winner_rank: i32,
    loser_rank: i32,
    max_rank_diff: i32,
    min_points: i32,
) -> PointsChange {
    let rank_diff = winner_rank - loser_rank;
    let raw = if rank_diff > 0 {
        min_points * (max_rank_diff + rank_diff)
    } else {
        min_points * (max_rank_diff + rank_diff + 1)
    };
    let magnitude = raw.max(0);

    PointsChange {
        winner_delta: magnitude,
        loser_delta: -magnitude,
    }
}
