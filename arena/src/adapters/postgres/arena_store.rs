//! PostgreSQL adapter for ArenaStore
//!
//! Every `PostgresArenaTransaction` wraps one READ COMMITTED database
//! transaction. `lock_event` takes `SELECT ... FOR UPDATE` on the event row,
//! which serialises writers of the same ladder.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbBackend, EntityTrait, IsolationLevel, QueryFilter, QueryOrder, QuerySelect, Set, Statement,
    TransactionTrait,
};

use crate::domain::entities::{
    ArenaCategory, ArenaEvent, ArenaEventId, ArenaEventStatus, ArenaMatch, ArenaMatchId,
    ArenaMatchStatus, ArenaParticipant, ArenaParticipantId, HistoricalRanking, MatchOutcome,
    MemberId, NewArenaEvent, NewArenaMatch, NewArenaParticipant, SideSnapshot,
};
use crate::domain::ports::{
    ArenaEventRepository, ArenaMatchRepository, ArenaParticipantRepository, ArenaStore,
    ArenaTransaction, HistoricalRankingRepository,
};
use crate::entity::{arena_events, arena_historical_rankings, arena_matches, arena_participants};
use crate::error::DomainError;

use super::map_db_err;

const INCREMENT_HISTORICAL_RANKING: &str = r#"
INSERT INTO arena_historical_rankings (member_id, "rank", "count")
VALUES ($1, $2, 1)
ON CONFLICT (member_id, "rank")
DO UPDATE SET "count" = arena_historical_rankings."count" + 1
"#;

/// PostgreSQL implementation of ArenaStore
#[derive(Clone)]
pub struct PostgresArenaStore {
    db: DatabaseConnection,
}

impl PostgresArenaStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ArenaStore for PostgresArenaStore {
    type Transaction = PostgresArenaTransaction;

    async fn begin(&self) -> Result<PostgresArenaTransaction, DomainError> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::ReadCommitted), None)
            .await
            .map_err(map_db_err)?;

        Ok(PostgresArenaTransaction { txn })
    }
}

/// One arena unit of work
pub struct PostgresArenaTransaction {
    txn: DatabaseTransaction,
}

#[async_trait]
impl ArenaTransaction for PostgresArenaTransaction {
    async fn commit(self) -> Result<(), DomainError> {
        self.txn.commit().await.map_err(map_db_err)
    }

    async fn rollback(self) -> Result<(), DomainError> {
        self.txn.rollback().await.map_err(map_db_err)
    }
}

// ============================================================================
// Events
// ============================================================================

#[async_trait]
impl ArenaEventRepository for PostgresArenaTransaction {
    async fn find_event(&mut self, id: &ArenaEventId) -> Result<Option<ArenaEvent>, DomainError> {
        let result = arena_events::Entity::find_by_id(id.0)
            .one(&self.txn)
            .await
            .map_err(map_db_err)?;

        result.map(ArenaEvent::try_from).transpose()
    }

    async fn lock_event(&mut self, id: &ArenaEventId) -> Result<Option<ArenaEvent>, DomainError> {
        let result = arena_events::Entity::find_by_id(id.0)
            .lock_exclusive()
            .one(&self.txn)
            .await
            .map_err(map_db_err)?;

        result.map(ArenaEvent::try_from).transpose()
    }

    async fn list_events(
        &mut self,
        category: Option<ArenaCategory>,
    ) -> Result<Vec<ArenaEvent>, DomainError> {
        let mut query = arena_events::Entity::find();
        if let Some(category) = category {
            query = query.filter(arena_events::Column::Category.eq(category.to_string()));
        }

        let results = query
            .order_by_desc(arena_events::Column::Date)
            .order_by_desc(arena_events::Column::CreatedAt)
            .all(&self.txn)
            .await
            .map_err(map_db_err)?;

        results.into_iter().map(ArenaEvent::try_from).collect()
    }

    async fn insert_event(&mut self, event: &NewArenaEvent) -> Result<ArenaEvent, DomainError> {
        let model = arena_events::ActiveModel {
            id: Set(ArenaEventId::new().0),
            date: Set(event.date.fixed_offset()),
            month: Set(event.month as i32),
            year: Set(event.year),
            category: Set(event.category.to_string()),
            min_sessions_required: Set(event.min_sessions_required),
            max_rank_diff: Set(event.max_rank_diff),
            challenges_per_participant: Set(event.challenges_per_participant),
            status: Set(event.status.to_string()),
            created_at: Set(Utc::now().fixed_offset()),
        };

        let result = model.insert(&self.txn).await.map_err(map_db_err)?;
        ArenaEvent::try_from(result)
    }

    async fn update_event_status(
        &mut self,
        id: &ArenaEventId,
        status: ArenaEventStatus,
    ) -> Result<(), DomainError> {
        arena_events::ActiveModel {
            id: Set(id.0),
            status: Set(status.to_string()),
            ..Default::default()
        }
        .update(&self.txn)
        .await
        .map_err(map_db_err)?;

        Ok(())
    }

    async fn delete_event(&mut self, id: &ArenaEventId) -> Result<(), DomainError> {
        // Participants and matches go with it through ON DELETE CASCADE
        let result = arena_events::Entity::delete_by_id(id.0)
            .exec(&self.txn)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::Conflict(format!("Event {} vanished", id)));
        }
        Ok(())
    }
}

// ============================================================================
// Participants
// ============================================================================

#[async_trait]
impl ArenaParticipantRepository for PostgresArenaTransaction {
    async fn find_participant(
        &mut self,
        id: &ArenaParticipantId,
    ) -> Result<Option<ArenaParticipant>, DomainError> {
        let result = arena_participants::Entity::find_by_id(id.0)
            .one(&self.txn)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_participant_by_member(
        &mut self,
        event_id: &ArenaEventId,
        member_id: &MemberId,
    ) -> Result<Option<ArenaParticipant>, DomainError> {
        let result = arena_participants::Entity::find()
            .filter(arena_participants::Column::ArenaEventId.eq(event_id.0))
            .filter(arena_participants::Column::MemberId.eq(member_id.0))
            .one(&self.txn)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(|m| m.into()))
    }

    async fn list_participants(
        &mut self,
        event_id: &ArenaEventId,
    ) -> Result<Vec<ArenaParticipant>, DomainError> {
        let results = arena_participants::Entity::find()
            .filter(arena_participants::Column::ArenaEventId.eq(event_id.0))
            .order_by_asc(arena_participants::Column::CreatedAt)
            .order_by_asc(arena_participants::Column::Id)
            .all(&self.txn)
            .await
            .map_err(map_db_err)?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn insert_participants(
        &mut self,
        participants: &[NewArenaParticipant],
    ) -> Result<Vec<ArenaParticipant>, DomainError> {
        if participants.is_empty() {
            return Ok(Vec::new());
        }

        let now = Utc::now();
        let created: Vec<ArenaParticipant> = participants
            .iter()
            .map(|p| ArenaParticipant {
                id: ArenaParticipantId::new(),
                event_id: p.event_id,
                member_id: p.member_id,
                points: p.points,
                rank: None,
                challenges_remaining: p.challenges_remaining,
                wins: 0,
                losses: 0,
                score_for: 0,
                score_against: 0,
                monthly_participation_count: p.monthly_participation_count,
                yearly_participation_count: p.yearly_participation_count,
                created_at: now,
            })
            .collect();

        let models = created.iter().map(|p| arena_participants::ActiveModel {
            id: Set(p.id.0),
            arena_event_id: Set(p.event_id.0),
            member_id: Set(p.member_id.0),
            points: Set(p.points),
            rank: Set(None),
            challenges_remaining: Set(p.challenges_remaining),
            wins: Set(0),
            losses: Set(0),
            score_for: Set(0),
            score_against: Set(0),
            monthly_participation_count: Set(p.monthly_participation_count),
            yearly_participation_count: Set(p.yearly_participation_count),
            created_at: Set(now.fixed_offset()),
        });

        arena_participants::Entity::insert_many(models)
            .exec(&self.txn)
            .await
            .map_err(map_db_err)?;

        Ok(created)
    }

    async fn update_participant_stats(
        &mut self,
        participant: &ArenaParticipant,
    ) -> Result<(), DomainError> {
        arena_participants::ActiveModel {
            id: Set(participant.id.0),
            points: Set(participant.points),
            challenges_remaining: Set(participant.challenges_remaining),
            wins: Set(participant.wins),
            losses: Set(participant.losses),
            score_for: Set(participant.score_for),
            score_against: Set(participant.score_against),
            ..Default::default()
        }
        .update(&self.txn)
        .await
        .map_err(map_db_err)?;

        Ok(())
    }

    async fn update_ranks(
        &mut self,
        ranks: &[(ArenaParticipantId, i32)],
    ) -> Result<(), DomainError> {
        for (id, rank) in ranks {
            arena_participants::ActiveModel {
                id: Set(id.0),
                rank: Set(Some(*rank)),
                ..Default::default()
            }
            .update(&self.txn)
            .await
            .map_err(map_db_err)?;
        }
        Ok(())
    }
}

// ============================================================================
// Matches
// ============================================================================

#[async_trait]
impl ArenaMatchRepository for PostgresArenaTransaction {
    async fn find_match(&mut self, id: &ArenaMatchId) -> Result<Option<ArenaMatch>, DomainError> {
        let result = arena_matches::Entity::find_by_id(id.0)
            .one(&self.txn)
            .await
            .map_err(map_db_err)?;

        result.map(ArenaMatch::try_from).transpose()
    }

    async fn find_match_by_pair(
        &mut self,
        challenger_id: &ArenaParticipantId,
        opponent_id: &ArenaParticipantId,
    ) -> Result<Option<ArenaMatch>, DomainError> {
        let result = arena_matches::Entity::find()
            .filter(arena_matches::Column::ChallengerId.eq(challenger_id.0))
            .filter(arena_matches::Column::OpponentId.eq(opponent_id.0))
            .one(&self.txn)
            .await
            .map_err(map_db_err)?;

        result.map(ArenaMatch::try_from).transpose()
    }

    async fn list_matches(
        &mut self,
        event_id: &ArenaEventId,
    ) -> Result<Vec<ArenaMatch>, DomainError> {
        let results = arena_matches::Entity::find()
            .filter(arena_matches::Column::ArenaEventId.eq(event_id.0))
            .order_by_asc(arena_matches::Column::CreatedAt)
            .all(&self.txn)
            .await
            .map_err(map_db_err)?;

        results.into_iter().map(ArenaMatch::try_from).collect()
    }

    async fn insert_match(&mut self, new_match: &NewArenaMatch) -> Result<ArenaMatch, DomainError> {
        let arena_match = ArenaMatch {
            id: ArenaMatchId::new(),
            event_id: new_match.event_id,
            challenger_id: new_match.challenger_id,
            opponent_id: new_match.opponent_id,
            outcome: new_match.outcome.clone(),
            created_at: Utc::now(),
        };

        let mut model = outcome_model(&arena_match);
        model.arena_event_id = Set(arena_match.event_id.0);
        model.challenger_id = Set(arena_match.challenger_id.0);
        model.opponent_id = Set(arena_match.opponent_id.0);
        model.created_at = Set(arena_match.created_at.fixed_offset());

        model.insert(&self.txn).await.map_err(map_db_err)?;
        Ok(arena_match)
    }

    async fn complete_match(&mut self, arena_match: &ArenaMatch) -> Result<(), DomainError> {
        // Only a still-scheduled row may take an outcome
        let result = arena_matches::Entity::update_many()
            .set(outcome_model(arena_match))
            .filter(arena_matches::Column::Id.eq(arena_match.id.0))
            .filter(arena_matches::Column::Status.eq(ArenaMatchStatus::Scheduled.to_string()))
            .exec(&self.txn)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::Conflict(format!(
                "Match {} is no longer scheduled",
                arena_match.id
            )));
        }
        Ok(())
    }

    async fn delete_match(&mut self, id: &ArenaMatchId) -> Result<(), DomainError> {
        let result = arena_matches::Entity::delete_by_id(id.0)
            .exec(&self.txn)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::Conflict(format!("Match {} vanished", id)));
        }
        Ok(())
    }
}

/// Status and outcome columns of a match
fn outcome_model(arena_match: &ArenaMatch) -> arena_matches::ActiveModel {
    let outcome = arena_match.outcome.as_ref();
    arena_matches::ActiveModel {
        id: Set(arena_match.id.0),
        status: Set(arena_match.status().to_string()),
        challenger_score: Set(outcome.map(|o| o.challenger_score)),
        opponent_score: Set(outcome.map(|o| o.opponent_score)),
        rank_diff: Set(outcome.map(|o| o.rank_diff)),
        challenger_rank_at_match: Set(outcome.and_then(|o| o.challenger.rank_at_match)),
        opponent_rank_at_match: Set(outcome.and_then(|o| o.opponent.rank_at_match)),
        challenger_points_at_match: Set(outcome.map(|o| o.challenger.points_at_match)),
        opponent_points_at_match: Set(outcome.map(|o| o.opponent.points_at_match)),
        challenger_points_change: Set(outcome.map(|o| o.challenger.points_change)),
        opponent_points_change: Set(outcome.map(|o| o.opponent.points_change)),
        completed_at: Set(outcome.map(|o| o.completed_at.fixed_offset())),
        ..Default::default()
    }
}

// ============================================================================
// Historical ledger
// ============================================================================

#[async_trait]
impl HistoricalRankingRepository for PostgresArenaTransaction {
    async fn find_historical_rankings(
        &mut self,
        member_ids: &[MemberId],
    ) -> Result<Vec<HistoricalRanking>, DomainError> {
        if member_ids.is_empty() {
            return Ok(Vec::new());
        }

        let results = arena_historical_rankings::Entity::find()
            .filter(
                arena_historical_rankings::Column::MemberId
                    .is_in(member_ids.iter().map(|id| id.0)),
            )
            .all(&self.txn)
            .await
            .map_err(map_db_err)?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn increment_historical_ranking(
        &mut self,
        member_id: &MemberId,
        rank: i32,
    ) -> Result<(), DomainError> {
        self.txn
            .execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                INCREMENT_HISTORICAL_RANKING,
                [member_id.0.into(), rank.into()],
            ))
            .await
            .map_err(map_db_err)?;

        Ok(())
    }

    async fn decrement_historical_ranking(
        &mut self,
        member_id: &MemberId,
        rank: i32,
    ) -> Result<(), DomainError> {
        let row = arena_historical_rankings::Entity::find_by_id((member_id.0, rank))
            .lock_exclusive()
            .one(&self.txn)
            .await
            .map_err(map_db_err)?;

        let Some(row) = row else {
            tracing::warn!(member_id = %member_id, rank, "No historical ranking row to revert");
            return Ok(());
        };

        if row.count <= 1 {
            arena_historical_rankings::Entity::delete_by_id((member_id.0, rank))
                .exec(&self.txn)
                .await
                .map_err(map_db_err)?;
        } else {
            arena_historical_rankings::ActiveModel {
                member_id: Set(member_id.0),
                rank: Set(rank),
                count: Set(row.count - 1),
            }
            .update(&self.txn)
            .await
            .map_err(map_db_err)?;
        }
        Ok(())
    }
}

// ============================================================================
// Model conversions
// ============================================================================

impl TryFrom<arena_events::Model> for ArenaEvent {
    type Error = DomainError;

    fn try_from(model: arena_events::Model) -> Result<Self, Self::Error> {
        Ok(ArenaEvent {
            id: ArenaEventId(model.id),
            date: model.date.with_timezone(&Utc),
            month: model.month as u32,
            year: model.year,
            category: model.category.parse().map_err(DomainError::Internal)?,
            min_sessions_required: model.min_sessions_required,
            max_rank_diff: model.max_rank_diff,
            challenges_per_participant: model.challenges_per_participant,
            status: model.status.parse().map_err(DomainError::Internal)?,
            created_at: model.created_at.with_timezone(&Utc),
        })
    }
}

/// Convert SeaORM model to domain entity
impl From<arena_participants::Model> for ArenaParticipant {
    fn from(model: arena_participants::Model) -> Self {
        ArenaParticipant {
            id: ArenaParticipantId(model.id),
            event_id: ArenaEventId(model.arena_event_id),
            member_id: MemberId(model.member_id),
            points: model.points,
            rank: model.rank,
            challenges_remaining: model.challenges_remaining,
            wins: model.wins,
            losses: model.losses,
            score_for: model.score_for,
            score_against: model.score_against,
            monthly_participation_count: model.monthly_participation_count,
            yearly_participation_count: model.yearly_participation_count,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl TryFrom<arena_matches::Model> for ArenaMatch {
    type Error = DomainError;

    fn try_from(model: arena_matches::Model) -> Result<Self, Self::Error> {
        let status: ArenaMatchStatus = model.status.parse().map_err(DomainError::Internal)?;

        let outcome = match status {
            ArenaMatchStatus::Scheduled => None,
            ArenaMatchStatus::Completed => {
                let missing =
                    || DomainError::Internal(format!("Completed match {} has no result", model.id));
                Some(MatchOutcome {
                    challenger_score: model.challenger_score.ok_or_else(missing)?,
                    opponent_score: model.opponent_score.ok_or_else(missing)?,
                    rank_diff: model.rank_diff.unwrap_or(0),
                    challenger: SideSnapshot {
                        rank_at_match: model.challenger_rank_at_match,
                        points_at_match: model.challenger_points_at_match.unwrap_or(0),
                        points_change: model.challenger_points_change.unwrap_or(0),
                    },
                    opponent: SideSnapshot {
                        rank_at_match: model.opponent_rank_at_match,
                        points_at_match: model.opponent_points_at_match.unwrap_or(0),
                        points_change: model.opponent_points_change.unwrap_or(0),
                    },
                    completed_at: model
                        .completed_at
                        .map(|dt| dt.with_timezone(&Utc))
                        .unwrap_or_else(|| model.created_at.with_timezone(&Utc)),
                })
            }
        };

        Ok(ArenaMatch {
            id: ArenaMatchId(model.id),
            event_id: ArenaEventId(model.arena_event_id),
            challenger_id: ArenaParticipantId(model.challenger_id),
            opponent_id: ArenaParticipantId(model.opponent_id),
            outcome,
            created_at: model.created_at.with_timezone(&Utc),
        })
    }
}

impl From<arena_historical_rankings::Model> for HistoricalRanking {
    fn from(model: arena_historical_rankings::Model) -> Self {
        HistoricalRanking {
            member_id: MemberId(model.member_id),
            rank: model.rank,
            count: model.count,
        }
    }
}
