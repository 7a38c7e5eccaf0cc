use std::env;

use crate::app::arena_config::{
    DEFAULT_CHALLENGES_PER_PARTICIPANT, DEFAULT_MAX_RANK_DIFF, INITIAL_POINTS, MIN_POINTS,
};
use crate::error::ConfigError;

/// Tunable arena defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaSettings {
    /// Points every participant starts an event with
    pub initial_points: i32,
    /// Max rank distance for challenges when an event does not set one
    pub default_max_rank_diff: i32,
    /// Challenge budget when an event does not set one
    pub default_challenges_per_participant: i32,
    /// Smallest non-zero points swing
    pub min_points: i32,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            initial_points: INITIAL_POINTS,
            default_max_rank_diff: DEFAULT_MAX_RANK_DIFF,
            default_challenges_per_participant: DEFAULT_CHALLENGES_PER_PARTICIPANT,
            min_points: MIN_POINTS,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub arena: ArenaSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let defaults = ArenaSettings::default();

        Ok(Self {
            database_url,
            arena: ArenaSettings {
                initial_points: int_var("ARENA_INITIAL_POINTS", defaults.initial_points)?,
                default_max_rank_diff: int_var("ARENA_MAX_RANK_DIFF", defaults.default_max_rank_diff)?,
                default_challenges_per_participant: int_var(
                    "ARENA_CHALLENGES_PER_PARTICIPANT",
                    defaults.default_challenges_per_participant,
                )?,
                min_points: int_var("ARENA_MIN_POINTS", defaults.min_points)?,
            },
        })
    }
}

fn int_var(name: &'static str, default: i32) -> Result<i32, ConfigError> {
    match env::var(name) {
        Ok(raw) => parse_int(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_int(name: &'static str, raw: &str) -> Result<i32, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
    })
}
