//! Arena configuration constants
//!
//! Defaults for new events and the points formula.

/// Points every participant starts an event with
pub const INITIAL_POINTS: i32 = 1000;

/// Smallest non-zero points swing for a match
pub const MIN_POINTS: i32 = 5;

/// Max rank distance for a challenge when an event does not set one
pub const DEFAULT_MAX_RANK_DIFF: i32 = 2;

/// Challenge budget per participant when an event does not set one
pub const DEFAULT_CHALLENGES_PER_PARTICIPANT: i32 = 2;

/// Bounds accepted for an event's max rank distance
pub const MAX_RANK_DIFF_RANGE: std::ops::RangeInclusive<i32> = 1..=10;

/// Bounds accepted for a challenge budget
pub const CHALLENGES_RANGE: std::ops::RangeInclusive<i32> = 0..=99;

/// Bounds accepted for a single side's game score
pub const GAME_SCORE_RANGE: std::ops::RangeInclusive<i32> = 0..=30;
