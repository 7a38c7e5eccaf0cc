use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "arena_matches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub arena_event_id: Uuid,
    pub challenger_id: Uuid,
    pub opponent_id: Uuid,
    pub status: String,
    pub challenger_score: Option<i32>,
    pub opponent_score: Option<i32>,
    pub rank_diff: Option<i32>,
    pub challenger_rank_at_match: Option<i32>,
    pub opponent_rank_at_match: Option<i32>,
    pub challenger_points_at_match: Option<i32>,
    pub opponent_points_at_match: Option<i32>,
    pub challenger_points_change: Option<i32>,
    pub opponent_points_change: Option<i32>,
    pub completed_at: Option<DateTimeWithTimeZone>,
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
        belongs_to = "super::arena_participants::Entity",
        from = "Column::ChallengerId",
        to = "super::arena_participants::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Challenger,
    #[sea_orm(
        belongs_to = "super::arena_participants::Entity",
        from = "Column::OpponentId",
        to = "super::arena_participants::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Opponent,
}

impl Related<super::arena_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ArenaEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
