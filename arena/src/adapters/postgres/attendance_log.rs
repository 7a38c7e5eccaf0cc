//! PostgreSQL adapter for AttendanceLog

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::domain::entities::{AttendanceRecord, MemberId};
use crate::domain::ports::AttendanceLog;
use crate::entity::{session_attendances, sessions};
use crate::error::DomainError;

use super::map_db_err;

/// Reads `session_attendances` joined with their `sessions`
#[derive(Clone)]
pub struct PostgresAttendanceLog {
    db: DatabaseConnection,
}

impl PostgresAttendanceLog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AttendanceLog for PostgresAttendanceLog {
    async fn find_attendance(
        &self,
        member_ids: &[MemberId],
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>, DomainError> {
        if member_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = session_attendances::Entity::find()
            .find_also_related(sessions::Entity)
            .filter(session_attendances::Column::MemberId.is_in(member_ids.iter().map(|id| id.0)))
            .filter(sessions::Column::Date.gte(from.fixed_offset()))
            .filter(sessions::Column::Date.lt(until.fixed_offset()))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let mut records = Vec::with_capacity(rows.len());
        for (attendance, session) in rows {
            let Some(session) = session else {
                continue;
            };
            let status = match attendance.status.parse() {
                Ok(status) => status,
                Err(e) => {
                    tracing::warn!(attendance_id = %attendance.id, error = %e, "Skipping attendance row");
                    continue;
                }
            };
            records.push(AttendanceRecord {
                member_id: MemberId(attendance.member_id),
                session_date: session.date.with_timezone(&Utc),
                status,
            });
        }

        Ok(records)
    }
}
