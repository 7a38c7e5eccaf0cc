//! Arena event domain entity
//!
//! One monthly ladder competition for a single category.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::member::Gender;
use crate::error::DomainError;

/// Unique identifier for an arena event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArenaEventId(pub Uuid);

impl ArenaEventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ArenaEventId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ArenaEventId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ArenaEventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Division an event is run for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArenaCategory {
    Men,
    Women,
    /// Nobody is excluded
    Open,
}

impl ArenaCategory {
    /// Whether a member with the given gender may be seeded into this category.
    /// Members without a recorded gender are admitted everywhere.
    pub fn admits(&self, gender: Option<Gender>) -> bool {
        match (self, gender) {
            (ArenaCategory::Open, _) | (_, None) => true,
            (ArenaCategory::Men, Some(g)) => g == Gender::Male,
            (ArenaCategory::Women, Some(g)) => g == Gender::Female,
        }
    }
}

impl std::fmt::Display for ArenaCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArenaCategory::Men => write!(f, "men"),
            ArenaCategory::Women => write!(f, "women"),
            ArenaCategory::Open => write!(f, "open"),
        }
    }
}

impl std::str::FromStr for ArenaCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "men" => Ok(ArenaCategory::Men),
            "women" => Ok(ArenaCategory::Women),
            "open" => Ok(ArenaCategory::Open),
            _ => Err(format!("Unknown arena category: {}", s)),
        }
    }
}

/// Event lifecycle status. Moves strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArenaEventStatus {
    Scheduled,
    Active,
    Completed,
}

/// Every transition an event may take
const ALLOWED_TRANSITIONS: &[(ArenaEventStatus, ArenaEventStatus)] = &[
    (ArenaEventStatus::Scheduled, ArenaEventStatus::Active),
    (ArenaEventStatus::Active, ArenaEventStatus::Completed),
];

impl ArenaEventStatus {
    pub fn can_transition_to(self, next: ArenaEventStatus) -> bool {
        ALLOWED_TRANSITIONS.contains(&(self, next))
    }

    /// Move to `next`, or explain why that is not allowed
    pub fn transition_to(self, next: ArenaEventStatus) -> Result<ArenaEventStatus, DomainError> {
        if self.can_transition_to(next) {
            return Ok(next);
        }
        let reason = match next {
            ArenaEventStatus::Active => "Event must be scheduled to start.".to_string(),
            ArenaEventStatus::Completed => "Event must be active to complete.".to_string(),
            ArenaEventStatus::Scheduled => {
                format!("Event cannot move from {} back to scheduled.", self)
            }
        };
        Err(DomainError::Rejected(reason))
    }
}

impl std::fmt::Display for ArenaEventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArenaEventStatus::Scheduled => write!(f, "scheduled"),
            ArenaEventStatus::Active => write!(f, "active"),
            ArenaEventStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for ArenaEventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scheduled" => Ok(ArenaEventStatus::Scheduled),
            "active" => Ok(ArenaEventStatus::Active),
            "completed" => Ok(ArenaEventStatus::Completed),
            _ => Err(format!("Unknown arena event status: {}", s)),
        }
    }
}

/// A monthly arena competition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArenaEvent {
    pub id: ArenaEventId,
    pub date: DateTime<Utc>,
    /// Calendar month of `date` in UTC (1-12)
    pub month: u32,
    /// Calendar year of `date` in UTC
    pub year: i32,
    pub category: ArenaCategory,
    pub min_sessions_required: i32,
    pub max_rank_diff: i32,
    pub challenges_per_participant: i32,
    pub status: ArenaEventStatus,
    pub created_at: DateTime<Utc>,
}

impl ArenaEvent {
    pub fn is_active(&self) -> bool {
        self.status == ArenaEventStatus::Active
    }

    pub fn is_completed(&self) -> bool {
        self.status == ArenaEventStatus::Completed
    }
}

/// Data needed to create a new arena event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArenaEvent {
    pub date: DateTime<Utc>,
    pub month: u32,
    pub year: i32,
    pub category: ArenaCategory,
    pub min_sessions_required: i32,
    pub max_rank_diff: i32,
    pub challenges_per_participant: i32,
    pub status: ArenaEventStatus,
}

/// Month and year an event date falls in, always in UTC
pub fn event_month_year(date: DateTime<Utc>) -> (u32, i32) {
    (date.month(), date.year())
}
