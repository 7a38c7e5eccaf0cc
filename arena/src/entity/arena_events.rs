use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "arena_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub date: DateTimeWithTimeZone,
    pub month: i32,
    pub year: i32,
    pub category: String,
    pub min_sessions_required: i32,
    pub max_rank_diff: i32,
    pub challenges_per_participant: i32,
    #[sea_orm(indexed)]
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::arena_participants::Entity")]
    ArenaParticipants,
    #[sea_orm(has_many = "super::arena_matches::Entity")]
    ArenaMatches,
}

impl Related<super::arena_participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ArenaParticipants.def()
    }
}

impl Related<super::arena_matches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ArenaMatches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
