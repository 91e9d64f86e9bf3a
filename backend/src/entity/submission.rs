use sea_orm::entity::prelude::*;
use serde::Serialize;

/// One graded upload. Rows are append-only: the aggregates are always
/// re-derived from the full history, never patched in place.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "submission")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub contestant_id: i32,
    pub problem_id: i32,
    pub upload_at: chrono::NaiveDateTime,
    pub total_points: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contestant::Entity",
        from = "Column::ContestantId",
        to = "super::contestant::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Contestant,
    #[sea_orm(
        belongs_to = "super::problem::Entity",
        from = "Column::ProblemId",
        to = "super::problem::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Problem,
    #[sea_orm(has_many = "super::subtask_score::Entity")]
    SubtaskScore,
}

impl Related<super::contestant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contestant.def()
    }
}

impl Related<super::problem::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Problem.def()
    }
}

impl Related<super::subtask_score::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubtaskScore.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
