use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub date: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::session_attendances::Entity")]
    SessionAttendances,
}

impl Related<super::session_attendances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SessionAttendances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
