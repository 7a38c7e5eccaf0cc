//! Eligibility resolver
//!
//! Decides which members may be seeded into a new event and snapshots their
//! participation counts. Runs against the collaborator ports, outside any
//! arena transaction.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::entities::{ArenaCategory, AttendanceRecord, MemberId};
use crate::domain::ports::{AttendanceLog, MemberRoster};
use crate::error::DomainError;

/// Who may enter an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibilityCriteria {
    pub month: u32,
    pub year: i32,
    pub category: ArenaCategory,
    /// Attended sessions needed in the month; 0 admits every category match
    pub min_sessions_required: i32,
}

/// Attended-session counts snapshotted onto a participant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParticipationCounts {
    pub monthly: i32,
    pub yearly: i32,
}

/// `[start, end)` of a calendar month in UTC
pub fn month_bounds(month: u32, year: i32) -> Result<(DateTime<Utc>, DateTime<Utc>), DomainError> {
    let (next_month, next_year) = if month == 12 { (1, year + 1) } else { (month + 1, year) };
    Ok((utc_midnight(year, month, 1)?, utc_midnight(next_year, next_month, 1)?))
}

/// `[start, end)` of a calendar year in UTC
pub fn year_bounds(year: i32) -> Result<(DateTime<Utc>, DateTime<Utc>), DomainError> {
    Ok((utc_midnight(year, 1, 1)?, utc_midnight(year + 1, 1, 1)?))
}

fn utc_midnight(year: i32, month: u32, day: u32) -> Result<DateTime<Utc>, DomainError> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .ok_or_else(|| DomainError::Validation(format!("Invalid calendar month {}-{:02}.", year, month)))
}

/// Attended sessions per member within `[from, until)`
pub fn count_attended(
    records: &[AttendanceRecord],
    from: DateTime<Utc>,
    until: DateTime<Utc>,
) -> HashMap<MemberId, i32> {
    let mut counts = HashMap::new();
    for record in records {
        if record.status.counts_as_attended()
            && record.session_date >= from
            && record.session_date < until
        {
            *counts.entry(record.member_id).or_insert(0) += 1;
        }
    }
    counts
}

/// Resolves eligibility and participation from the roster and attendance log
pub struct EligibilityResolver<R, A>
where
    R: MemberRoster,
    A: AttendanceLog,
{
    roster: Arc<R>,
    attendance: Arc<A>,
}

impl<R, A> EligibilityResolver<R, A>
where
    R: MemberRoster,
    A: AttendanceLog,
{
    pub fn new(roster: Arc<R>, attendance: Arc<A>) -> Self {
        Self { roster, attendance }
    }

    /// Active members in the category with enough attended sessions in the
    /// event month, sorted by member id
    pub async fn eligible_members(
        &self,
        criteria: &EligibilityCriteria,
    ) -> Result<Vec<MemberId>, DomainError> {
        let mut candidates: Vec<MemberId> = self
            .roster
            .list_members()
            .await?
            .into_iter()
            .filter(|m| m.is_active() && criteria.category.admits(m.gender))
            .map(|m| m.id)
            .collect();
        candidates.sort();

        if criteria.min_sessions_required <= 0 || candidates.is_empty() {
            return Ok(candidates);
        }

        let (from, until) = month_bounds(criteria.month, criteria.year)?;
        let records = self
            .attendance
            .find_attendance(&candidates, from, until)
            .await?;
        let attended = count_attended(&records, from, until);

        Ok(candidates
            .into_iter()
            .filter(|id| attended.get(id).copied().unwrap_or(0) >= criteria.min_sessions_required)
            .collect())
    }

    /// Monthly and yearly attended-session counts for each member
    pub async fn participation_counts(
        &self,
        member_ids: &[MemberId],
        month: u32,
        year: i32,
    ) -> Result<HashMap<MemberId, ParticipationCounts>, DomainError> {
        if member_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let (year_start, year_end) = year_bounds(year)?;
        let (month_start, month_end) = month_bounds(month, year)?;
        let records = self
            .attendance
            .find_attendance(member_ids, year_start, year_end)
            .await?;

        let yearly = count_attended(&records, year_start, year_end);
        let monthly = count_attended(&records, month_start, month_end);

        Ok(member_ids
            .iter()
            .map(|id| {
                let counts = ParticipationCounts {
                    monthly: monthly.get(id).copied().unwrap_or(0),
                    yearly: yearly.get(id).copied().unwrap_or(0),
                };
                (*id, counts)
            })
            .collect())
    }
}
