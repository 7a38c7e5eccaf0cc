//! Application layer
//!
//! Ladder rules and service orchestration.
//! Pure algorithms (points, scoring, ranking) sit beside the transactional
//! operations that apply them; `ArenaService` opens the transactions.

pub mod arena_config;
pub mod arena_service;
pub mod challenge;
pub mod eligibility;
pub mod events;
pub mod matches;
pub mod points;
pub mod ranking;
pub mod scoring;

pub use arena_service::{ArenaEventDetail, ArenaService};
pub use challenge::ChallengePair;
pub use eligibility::{EligibilityCriteria, EligibilityResolver, ParticipationCounts};
pub use events::{CreateArenaEvent, CreatedArenaEvent, Entrant};
pub use matches::GameScore;
pub use points::{calculate_points_change, PointsChange};
pub use ranking::{compare_historical_rank_counts, compare_participants};
pub use scoring::validate_game_score;
// Re-export arena defaults for public API
#[allow(unused_imports)]
pub use arena_config::*;
