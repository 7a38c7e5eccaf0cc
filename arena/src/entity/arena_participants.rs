use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "arena_participants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub arena_event_id: Uuid,
    #[sea_orm(indexed)]
    pub member_id: Uuid,
    pub points: i32,
    pub rank: Option<i32>,
    pub challenges_remaining: i32,
    pub wins: i32,
    pub losses: i32,
    pub score_for: i32,
    pub score_against: i32,
    pub monthly_participation_count: i32,
    pub yearly_participation_count: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::arena_events::Entity",
        from = "Column::ArenaEventId",
        to = "super::arena_events::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    ArenaEvents,
    #[sea_orm(
        belongs_to = "super::members::Entity",
        from = "Column::MemberId",
        to = "super::members::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Members,
}

impl Related<super::arena_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ArenaEvents.def()
    }
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
