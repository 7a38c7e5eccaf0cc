//! Collaborator ports
//!
//! Data owned by the member directory and session tracking, consumed by
//! eligibility resolution. Both are read outside any arena transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{AttendanceRecord, MemberId, RosterMember};
use crate::error::DomainError;

/// Member directory
#[async_trait]
pub trait MemberRoster: Send + Sync {
    /// All members with their status and category-relevant attributes
    async fn list_members(&self) -> Result<Vec<RosterMember>, DomainError>;
}

/// Session attendance history
#[async_trait]
pub trait AttendanceLog: Send + Sync {
    /// Attendance records of these members for sessions dated in `[from, until)`
    async fn find_attendance(
        &self,
        member_ids: &[MemberId],
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>, DomainError>;
}
