//! problem and subtask management

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use serde::Deserialize;
use tracing::instrument;

use crate::entity::{contest, problem, subtask};
use crate::server::Server;
use crate::util::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubtask {
    pub label: String,
    pub points: i32,
    pub test_count: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProblem {
    pub title: String,
    pub max_points: i32,
    pub order: i32,
    pub subtasks: Vec<CreateSubtask>,
}

/// the invariant checked at creation: subtask points are positive and
/// sum exactly to the problem's max
fn check_point_split(create: &CreateProblem) -> Result<()> {
    if create.subtasks.iter().any(|subtask| subtask.points <= 0) {
        return Err(Error::BadArgument("subtasks.points"));
    }
    let sum: i32 = create.subtasks.iter().map(|subtask| subtask.points).sum();
    if sum != create.max_points {
        return Err(Error::BadArgument("max_points"));
    }
    Ok(())
}

impl Server {
    /// Create a problem together with its subtasks. Subtasks are
    /// treated as immutable once submissions reference them.
    #[instrument(skip(self, create))]
    pub async fn create_problem(
        &self,
        contest_id: i32,
        create: CreateProblem,
    ) -> Result<(problem::Model, Vec<subtask::Model>)> {
        check_point_split(&create)?;

        let txn = self.db.begin().await?;

        contest::Entity::find_by_id(contest_id)
            .one(&txn)
            .await
            .map_err(Into::<Error>::into)?
            .ok_or(Error::NotInDB("contest"))?;

        let model = problem::ActiveModel {
            contest_id: ActiveValue::Set(contest_id),
            title: ActiveValue::Set(create.title),
            max_points: ActiveValue::Set(create.max_points),
            order: ActiveValue::Set(create.order),
            create_at: ActiveValue::Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(Into::<Error>::into)?;

        let mut subtasks = Vec::with_capacity(create.subtasks.len());
        for (position, create) in create.subtasks.into_iter().enumerate() {
            let subtask = subtask::ActiveModel {
                problem_id: ActiveValue::Set(model.id),
                label: ActiveValue::Set(create.label),
                points: ActiveValue::Set(create.points),
                test_count: ActiveValue::Set(create.test_count),
                order: ActiveValue::Set(position as i32),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(Into::<Error>::into)?;
            subtasks.push(subtask);
        }

        txn.commit().await.map_err(Into::<Error>::into)?;
        Ok((model, subtasks))
    }

    /// Problems of a contest with their subtasks, in contest order.
    #[instrument(skip(self))]
    pub async fn list_problems(
        &self,
        contest_id: i32,
    ) -> Result<Vec<(problem::Model, Vec<subtask::Model>)>> {
        contest::Entity::find_by_id(contest_id)
            .one(&self.db)
            .await
            .map_err(Into::<Error>::into)?
            .ok_or(Error::NotInDB("contest"))?;

        problem::Entity::find()
            .filter(problem::Column::ContestId.eq(contest_id))
            .order_by_asc(problem::Column::Order)
            .order_by_asc(problem::Column::Id)
            .find_with_related(subtask::Entity)
            .order_by_asc(subtask::Column::Order)
            .all(&self.db)
            .await
            .map_err(Into::<Error>::into)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn split(points: &[i32], max_points: i32) -> CreateProblem {
        CreateProblem {
            title: "A".to_owned(),
            max_points,
            order: 0,
            subtasks: points
                .iter()
                .map(|&points| CreateSubtask {
                    label: String::new(),
                    points,
                    test_count: 1,
                })
                .collect(),
        }
    }

    #[test]
    fn split_must_sum_to_max() {
        assert!(check_point_split(&split(&[20, 30, 50], 100)).is_ok());
        assert!(check_point_split(&split(&[20, 30], 100)).is_err());
    }

    #[test]
    fn split_rejects_non_positive_subtasks() {
        assert!(check_point_split(&split(&[100, 0], 100)).is_err());
        assert!(check_point_split(&split(&[110, -10], 100)).is_err());
    }
}
