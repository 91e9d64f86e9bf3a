use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Materialized per-contestant standing. Fully rebuildable from the
/// submission log; one row per (contest, contestant).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "leaderboard")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub contest_id: i32,
    pub contestant_id: i32,
    pub total_points: i32,
    pub penalty_minutes: i64,
    /// standard competition rank; 0 until the first ranking pass
    pub rank: i32,
    pub update_at: chrono::NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contest::Entity",
        from = "Column::ContestId",
        to = "super::contest::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Contest,
    #[sea_orm(
        belongs_to = "super::contestant::Entity",
        from = "Column::ContestantId",
        to = "super::contestant::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Contestant,
}

impl Related<super::contest::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contest.def()
    }
}

impl Related<super::contestant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contestant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
