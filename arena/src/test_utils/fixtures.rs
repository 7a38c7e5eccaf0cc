//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Each fixture function creates a valid entity that can be customized.

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::entities::{
    ArenaCategory, ArenaEvent, ArenaEventId, ArenaEventStatus, ArenaMatch, ArenaMatchId,
    ArenaParticipant, ArenaParticipantId, AttendanceRecord, AttendanceStatus, Gender, MatchOutcome,
    MemberId, MemberStatus, RosterMember, SideSnapshot,
};

/// An open-category event on 2026-03-14 with max rank diff 2 and a budget of 2
pub fn test_event(status: ArenaEventStatus) -> ArenaEvent {
    let date = Utc.with_ymd_and_hms(2026, 3, 14, 18, 0, 0).unwrap();
    ArenaEvent {
        id: ArenaEventId::new(),
        date,
        month: 3,
        year: 2026,
        category: ArenaCategory::Open,
        min_sessions_required: 0,
        max_rank_diff: 2,
        challenges_per_participant: 2,
        status,
        created_at: Utc::now(),
    }
}

/// Unranked participant with starting points and no games played
pub fn test_participant(event_id: ArenaEventId, member_id: MemberId) -> ArenaParticipant {
    ArenaParticipant {
        id: ArenaParticipantId::new(),
        event_id,
        member_id,
        points: 1000,
        rank: None,
        challenges_remaining: 2,
        wins: 0,
        losses: 0,
        score_for: 0,
        score_against: 0,
        monthly_participation_count: 0,
        yearly_participation_count: 0,
        created_at: Utc::now(),
    }
}

/// Participant of `event` at `rank` with the event's full challenge budget
pub fn test_ranked_participant(event: &ArenaEvent, rank: i32) -> ArenaParticipant {
    ArenaParticipant {
        rank: Some(rank),
        challenges_remaining: event.challenges_per_participant,
        ..test_participant(event.id, MemberId::new())
    }
}

pub fn test_scheduled_match(challenger: &ArenaParticipant, opponent: &ArenaParticipant) -> ArenaMatch {
    ArenaMatch {
        id: ArenaMatchId::new(),
        event_id: challenger.event_id,
        challenger_id: challenger.id,
        opponent_id: opponent.id,
        outcome: None,
        created_at: Utc::now(),
    }
}

/// Completed match carrying the given score; the snapshot holds zero deltas
pub fn test_completed_match(
    challenger: &ArenaParticipant,
    opponent: &ArenaParticipant,
    challenger_score: i32,
    opponent_score: i32,
) -> ArenaMatch {
    ArenaMatch {
        outcome: Some(MatchOutcome {
            challenger_score,
            opponent_score,
            rank_diff: 0,
            challenger: SideSnapshot {
                rank_at_match: challenger.rank,
                points_at_match: challenger.points,
                points_change: 0,
            },
            opponent: SideSnapshot {
                rank_at_match: opponent.rank,
                points_at_match: opponent.points,
                points_change: 0,
            },
            completed_at: Utc::now(),
        }),
        ..test_scheduled_match(challenger, opponent)
    }
}

/// Active member with the given gender
pub fn test_roster_member(gender: Option<Gender>) -> RosterMember {
    RosterMember {
        id: MemberId::new(),
        status: MemberStatus::Active,
        gender,
    }
}

pub fn test_attendance(
    member_id: MemberId,
    session_date: DateTime<Utc>,
    status: AttendanceStatus,
) -> AttendanceRecord {
    AttendanceRecord {
        member_id,
        session_date,
        status,
    }
}
