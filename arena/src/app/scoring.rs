//! Single-game badminton scoring
//!
//! First to 21 wins; from 20-20 a side must lead by two; at 29-29 the next
//! point wins, so 30-29 is the highest possible score.

use crate::app::arena_config::GAME_SCORE_RANGE;
use crate::error::DomainError;

const INVALID_SCORE: &str =
    "Invalid score. Single game: first to 21 (or 2 clear from 20-20); max 30-29.";

/// Whether `high`-`low` is a finished single game, `high` being the winner's score
pub fn is_valid_single_game_score(high: i32, low: i32) -> bool {
    if !(21..=30).contains(&high) {
        return false;
    }
    match high {
        21 => low <= 19,
        30 => low == 29,
        _ => high - low == 2,
    }
}

/// Validate a reported score pair in either order
pub fn validate_game_score(challenger_score: i32, opponent_score: i32) -> Result<(), DomainError> {
    if !GAME_SCORE_RANGE.contains(&challenger_score) || !GAME_SCORE_RANGE.contains(&opponent_score)
    {
        return Err(DomainError::Validation(format!(
            "Scores must be between {} and {}.",
            GAME_SCORE_RANGE.start(),
            GAME_SCORE_RANGE.end()
        )));
    }

    let high = challenger_score.max(opponent_score);
    let low = challenger_score.min(opponent_score);
    if is_valid_single_game_score(high, low) {
        Ok(())
    } else {
        Err(DomainError::Validation(INVALID_SCORE.to_string()))
    }
}
