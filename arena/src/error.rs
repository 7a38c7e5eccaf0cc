//! Error types for the arena engine
//!
//! - `DomainError`: every failure an arena operation can report
//! - `ChallengeRejection`: typed reason a challenge is not allowed
//! - `ConfigError`: configuration loading failures

use thiserror::Error;

/// Domain layer errors
///
/// Each variant carries one concrete, human-readable reason. Callers decide
/// how to present it; the engine never swallows a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Bad input shape (same challenger/opponent, invalid score, out of range values)
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Business-rule rejection (rank window, budget, duplicate challenge, wrong status)
    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Consistency fault: transaction conflict or a row vanished mid-transaction
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage unavailable or otherwise failing
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Whether the failed operation may be retried from scratch
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Conflict(_))
    }

    /// The bare reason string, without the variant prefix
    pub fn reason(&self) -> &str {
        match self {
            DomainError::Validation(msg)
            | DomainError::NotFound(msg)
            | DomainError::Rejected(msg)
            | DomainError::Forbidden(msg)
            | DomainError::Conflict(msg)
            | DomainError::Database(msg)
            | DomainError::Internal(msg) => msg,
        }
    }
}

/// Why a challenge between two participants is not allowed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChallengeRejection {
    #[error("Challenger and opponent must be different.")]
    SameParticipant,

    #[error("Participant not found.")]
    ParticipantNotFound,

    #[error("Participants must belong to the same event.")]
    EventMismatch,

    #[error("No challenges remaining.")]
    NoChallengesRemaining,

    #[error("Rank difference must be at most {max_rank_diff}.")]
    RankDifferenceTooLarge { max_rank_diff: i32 },

    #[error("Already challenged this opponent.")]
    AlreadyChallenged,
}

impl From<ChallengeRejection> for DomainError {
    fn from(rejection: ChallengeRejection) -> Self {
        let reason = rejection.to_string();
        match rejection {
            ChallengeRejection::SameParticipant => DomainError::Validation(reason),
            ChallengeRejection::ParticipantNotFound => DomainError::NotFound(reason),
            ChallengeRejection::EventMismatch
            | ChallengeRejection::NoChallengesRemaining
            | ChallengeRejection::RankDifferenceTooLarge { .. }
            | ChallengeRejection::AlreadyChallenged => DomainError::Rejected(reason),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_conflicts_are_retryable() {
        assert!(DomainError::Conflict("x".into()).is_retryable());
        assert!(!DomainError::Database("x".into()).is_retryable());
        assert!(!DomainError::Rejected("x".into()).is_retryable());
        assert!(!DomainError::Validation("x".into()).is_retryable());
    }

    #[test]
    fn reason_strips_prefix() {
        let err = DomainError::Rejected("No challenges remaining.".into());
        assert_eq!(err.reason(), "No challenges remaining.");
        assert_eq!(err.to_string(), "Rejected: No challenges remaining.");
    }

    #[test]
    fn challenge_rejection_maps_to_taxonomy() {
        assert!(matches!(
            DomainError::from(ChallengeRejection::SameParticipant),
            DomainError::Validation(_)
        ));
        assert!(matches!(
            DomainError::from(ChallengeRejection::ParticipantNotFound),
            DomainError::NotFound(_)
        ));
        let err = DomainError::from(ChallengeRejection::RankDifferenceTooLarge { max_rank_diff: 2 });
        assert_eq!(err, DomainError::Rejected("Rank difference must be at most 2.".into()));
    }
}
