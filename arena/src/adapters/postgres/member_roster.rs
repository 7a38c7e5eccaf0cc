//! PostgreSQL adapter for MemberRoster

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};

use crate::domain::entities::{MemberId, RosterMember};
use crate::domain::ports::MemberRoster;
use crate::entity::members;
use crate::error::DomainError;

use super::map_db_err;

/// Reads the shared `members` table
#[derive(Clone)]
pub struct PostgresMemberRoster {
    db: DatabaseConnection,
}

impl PostgresMemberRoster {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MemberRoster for PostgresMemberRoster {
    async fn list_members(&self) -> Result<Vec<RosterMember>, DomainError> {
        let results = members::Entity::find()
            .order_by_asc(members::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        results.into_iter().map(RosterMember::try_from).collect()
    }
}

impl TryFrom<members::Model> for RosterMember {
    type Error = DomainError;

    fn try_from(model: members::Model) -> Result<Self, Self::Error> {
        Ok(RosterMember {
            id: MemberId(model.id),
            status: model.status.parse().map_err(DomainError::Internal)?,
            // Unrecognised values are treated like an unset gender
            gender: model.gender.and_then(|g| g.parse().ok()),
        })
    }
}
