//! per-submission scoring
//!
//! Converts a list of pass/fail verdicts into an immutable submission
//! with per-subtask scores, then refreshes the submitting contestant's
//! leaderboard row. Best score and penalty are always re-derived from
//! the full submission history, so the refresh is idempotent and safe
//! to re-run.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, TransactionTrait,
};
use tracing::instrument;

use crate::entity::{contest, contestant, leaderboard, problem, submission, subtask, subtask_score};
use crate::server::Server;
use crate::util::error::{Error, Result};
use crate::util::time::elapsed_minutes;

/// caller-supplied verdict for one subtask
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SubtaskResult {
    pub subtask_id: i32,
    pub passed: bool,
}

/// best points ever awarded to one subtask across all submissions
#[derive(Debug, PartialEq, Eq, FromQueryResult)]
pub struct BestSubtaskScore {
    pub subtask_id: i32,
    pub best_points: i32,
}

/// submission stream row consumed by the penalty walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromQueryResult)]
pub struct PenaltyRow {
    pub problem_id: i32,
    pub upload_at: chrono::NaiveDateTime,
    pub total_points: i32,
}

struct ScoredSubtask {
    subtask_id: i32,
    passed: bool,
    points_awarded: i32,
}

/// Award full points for each passed subtask, zero otherwise, and sum
/// the submission total. Rejects verdicts naming a subtask outside the
/// problem.
fn score_results(
    subtasks: &[subtask::Model],
    results: &[SubtaskResult],
) -> Result<(Vec<ScoredSubtask>, i32)> {
    let points_by_id: HashMap<i32, i32> = subtasks.iter().map(|s| (s.id, s.points)).collect();

    let mut scored = Vec::with_capacity(results.len());
    let mut total = 0;
    for result in results {
        let points = *points_by_id
            .get(&result.subtask_id)
            .ok_or(Error::BadArgument("subtask_id"))?;
        let points_awarded = match result.passed {
            true => points,
            false => 0,
        };
        total += points_awarded;
        scored.push(ScoredSubtask {
            subtask_id: result.subtask_id,
            passed: result.passed,
            points_awarded,
        });
    }
    Ok((scored, total))
}

fn sum_best(rows: &[BestSubtaskScore]) -> i32 {
    rows.iter().map(|row| row.best_points).sum()
}

/// Walk submissions ordered by problem then upload time, charging
/// elapsed minutes only when a submission strictly improves its
/// problem's running best total. Recorded order is the penalty clock.
fn penalty_walk(begin: chrono::NaiveDateTime, rows: &[PenaltyRow]) -> i64 {
    let mut best_by_problem: HashMap<i32, i32> = HashMap::new();
    let mut penalty = 0;
    for row in rows {
        let best = best_by_problem.entry(row.problem_id).or_insert(0);
        if row.total_points > *best {
            *best = row.total_points;
            penalty += elapsed_minutes(begin, row.upload_at);
        }
    }
    penalty
}

/// `MAX(points_awarded)` per subtask over every submission of the
/// contestant for the problem
async fn best_subtask_scores<C: ConnectionTrait>(
    db: &C,
    contestant_id: i32,
    problem_id: i32,
) -> Result<Vec<BestSubtaskScore>> {
    subtask_score::Entity::find()
        .join(JoinType::InnerJoin, subtask_score::Relation::Submission.def())
        .filter(submission::Column::ContestantId.eq(contestant_id))
        .filter(submission::Column::ProblemId.eq(problem_id))
        .select_only()
        .column(subtask_score::Column::SubtaskId)
        .column_as(subtask_score::Column::PointsAwarded.max(), "best_points")
        .group_by(subtask_score::Column::SubtaskId)
        .into_model::<BestSubtaskScore>()
        .all(db)
        .await
        .map_err(Into::<Error>::into)
}

/// A contestant's best score for one problem: per-subtask maxima summed.
/// No submissions is simply 0.
pub(crate) async fn best_score<C: ConnectionTrait>(
    db: &C,
    contestant_id: i32,
    problem_id: i32,
) -> Result<i32> {
    Ok(sum_best(
        &best_subtask_scores(db, contestant_id, problem_id).await?,
    ))
}

async fn contest_begin<C: ConnectionTrait>(
    db: &C,
    contest_id: i32,
) -> Result<Option<chrono::NaiveDateTime>> {
    Ok(contest::Entity::find_by_id(contest_id)
        .one(db)
        .await
        .map_err(Into::<Error>::into)?
        .and_then(|contest| contest.begin))
}

/// Cumulative penalty for one contestant over the whole contest.
///
/// A missing contest start is degraded to zero penalty instead of an
/// error so the leaderboard keeps rendering.
pub(crate) async fn penalty_minutes<C: ConnectionTrait>(
    db: &C,
    contestant: &contestant::Model,
) -> Result<i64> {
    let begin = match contest_begin(db, contestant.contest_id).await? {
        Some(x) => x,
        None => {
            tracing::warn!(contest_id = contestant.contest_id, "contest_start_missing");
            return Ok(0);
        }
    };

    let rows = submission::Entity::find()
        .filter(submission::Column::ContestantId.eq(contestant.id))
        .select_only()
        .column(submission::Column::ProblemId)
        .column(submission::Column::UploadAt)
        .column(submission::Column::TotalPoints)
        .order_by_asc(submission::Column::ProblemId)
        .order_by_asc(submission::Column::UploadAt)
        .order_by_asc(submission::Column::Id)
        .into_model::<PenaltyRow>()
        .all(db)
        .await
        .map_err(Into::<Error>::into)?;

    Ok(penalty_walk(begin, &rows))
}

/// Recompute and upsert one contestant's leaderboard row from the
/// submission log. Rank is left untouched; a full ranking pass owns it.
pub(crate) async fn refresh_cache<C: ConnectionTrait>(
    db: &C,
    contestant: &contestant::Model,
) -> Result<()> {
    let problems = problem::Entity::find()
        .filter(problem::Column::ContestId.eq(contestant.contest_id))
        .all(db)
        .await
        .map_err(Into::<Error>::into)?;

    let mut total_points = 0;
    for problem in &problems {
        total_points += best_score(db, contestant.id, problem.id).await?;
    }

    let penalty_minutes = penalty_minutes(db, contestant).await?;

    leaderboard::Entity::insert(leaderboard::ActiveModel {
        contest_id: ActiveValue::Set(contestant.contest_id),
        contestant_id: ActiveValue::Set(contestant.id),
        total_points: ActiveValue::Set(total_points),
        penalty_minutes: ActiveValue::Set(penalty_minutes),
        update_at: ActiveValue::Set(Utc::now().naive_utc()),
        ..Default::default()
    })
    .on_conflict(
        OnConflict::columns([
            leaderboard::Column::ContestId,
            leaderboard::Column::ContestantId,
        ])
        .update_columns([
            leaderboard::Column::TotalPoints,
            leaderboard::Column::PenaltyMinutes,
            leaderboard::Column::UpdateAt,
        ])
        .to_owned(),
    )
    .exec(db)
    .await
    .map_err(Into::<Error>::into)?;

    Ok(())
}

impl Server {
    /// Grade one upload for the contestant identified by registration
    /// number.
    ///
    /// Inserts the submission with its subtask scores and refreshes the
    /// contestant's cached standing in one transaction; ranks stay as
    /// they were until the next full recalculation.
    #[instrument(skip(self, results))]
    pub async fn submit_result(
        &self,
        reg_number: &str,
        problem_id: i32,
        results: &[SubtaskResult],
    ) -> Result<submission::Model> {
        let txn = self.db.begin().await?;

        let contestant = contestant::Entity::find()
            .filter(contestant::Column::RegNumber.eq(reg_number))
            .one(&txn)
            .await
            .map_err(Into::<Error>::into)?
            .ok_or(Error::NotInDB("contestant"))?;

        let problem = problem::Entity::find_by_id(problem_id)
            .one(&txn)
            .await
            .map_err(Into::<Error>::into)?
            .ok_or(Error::NotInDB("problem"))?;

        if problem.contest_id != contestant.contest_id {
            return Err(Error::BadArgument("problem_id"));
        }

        let subtasks = subtask::Entity::find()
            .filter(subtask::Column::ProblemId.eq(problem.id))
            .all(&txn)
            .await
            .map_err(Into::<Error>::into)?;

        let (scored, total_points) = score_results(&subtasks, results)?;

        let submission = submission::ActiveModel {
            contestant_id: ActiveValue::Set(contestant.id),
            problem_id: ActiveValue::Set(problem.id),
            upload_at: ActiveValue::Set(Utc::now().naive_utc()),
            total_points: ActiveValue::Set(total_points),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(Into::<Error>::into)?;

        for score in scored {
            subtask_score::Entity::insert(subtask_score::ActiveModel {
                submission_id: ActiveValue::Set(submission.id),
                subtask_id: ActiveValue::Set(score.subtask_id),
                passed: ActiveValue::Set(score.passed),
                points_awarded: ActiveValue::Set(score.points_awarded),
                ..Default::default()
            })
            .exec(&txn)
            .await
            .map_err(Into::<Error>::into)?;
        }

        refresh_cache(&txn, &contestant).await?;

        txn.commit().await.map_err(Into::<Error>::into)?;

        tracing::debug!(
            submission = submission.id,
            total_points,
            "submission_recorded"
        );
        Ok(submission)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    fn subtask(id: i32, points: i32) -> subtask::Model {
        subtask::Model {
            id,
            problem_id: 7,
            label: format!("S{id}"),
            points,
            test_count: 10,
            order: id,
        }
    }

    fn verdict(subtask_id: i32, passed: bool) -> SubtaskResult {
        SubtaskResult { subtask_id, passed }
    }

    fn minute(offset: i64) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
            + chrono::Duration::minutes(offset)
    }

    #[test]
    fn all_passed_scores_max_points() {
        let subtasks = [subtask(1, 20), subtask(2, 30), subtask(3, 50)];
        let results = [verdict(1, true), verdict(2, true), verdict(3, true)];
        let (_, total) = score_results(&subtasks, &results).unwrap();
        assert_eq!(total, 100);
    }

    #[test]
    fn all_failed_scores_zero() {
        let subtasks = [subtask(1, 20), subtask(2, 30), subtask(3, 50)];
        let results = [verdict(1, false), verdict(2, false), verdict(3, false)];
        let (scored, total) = score_results(&subtasks, &results).unwrap();
        assert_eq!(total, 0);
        assert!(scored.iter().all(|s| s.points_awarded == 0));
    }

    #[test]
    fn partial_pass_sums_passed_subtasks() {
        let subtasks = [subtask(1, 20), subtask(2, 30), subtask(3, 50)];
        let results = [verdict(1, true), verdict(2, true), verdict(3, false)];
        let (_, total) = score_results(&subtasks, &results).unwrap();
        assert_eq!(total, 50);
    }

    #[test]
    fn foreign_subtask_is_rejected() {
        let subtasks = [subtask(1, 20)];
        let results = [verdict(99, true)];
        assert!(matches!(
            score_results(&subtasks, &results),
            Err(Error::BadArgument("subtask_id"))
        ));
    }

    #[test]
    fn best_of_empty_history_is_zero() {
        assert_eq!(sum_best(&[]), 0);
    }

    #[test]
    fn best_sums_per_subtask_maxima() {
        let rows = [
            BestSubtaskScore {
                subtask_id: 1,
                best_points: 20,
            },
            BestSubtaskScore {
                subtask_id: 2,
                best_points: 30,
            },
            BestSubtaskScore {
                subtask_id: 3,
                best_points: 50,
            },
        ];
        assert_eq!(sum_best(&rows), 100);
    }

    fn row(problem_id: i32, offset: i64, total_points: i32) -> PenaltyRow {
        PenaltyRow {
            problem_id,
            upload_at: minute(offset),
            total_points,
        }
    }

    #[test]
    fn penalty_charges_only_improvements() {
        // +60min: 50 points, +90min: improved submission total
        let rows = [row(7, 60, 50), row(7, 90, 70)];
        assert_eq!(penalty_walk(minute(0), &rows), 150);
    }

    #[test]
    fn penalty_skips_non_improving_resubmission() {
        let rows = [row(7, 60, 50), row(7, 90, 50), row(7, 120, 30)];
        assert_eq!(penalty_walk(minute(0), &rows), 60);
    }

    #[test]
    fn penalty_accrues_per_problem() {
        let rows = [row(1, 10, 20), row(2, 30, 50), row(2, 45, 60)];
        assert_eq!(penalty_walk(minute(0), &rows), 10 + 30 + 45);
    }

    #[test]
    fn penalty_clamps_pre_start_uploads() {
        let rows = [row(1, -5, 20)];
        assert_eq!(penalty_walk(minute(0), &rows), 0);
    }

    #[tokio::test]
    async fn best_score_sums_aggregate_rows() {
        use sea_orm::{DatabaseBackend, MockDatabase};
        use std::collections::BTreeMap;

        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![
                BTreeMap::from([
                    ("subtask_id", sea_orm::Value::from(1)),
                    ("best_points", sea_orm::Value::from(20)),
                ]),
                BTreeMap::from([
                    ("subtask_id", sea_orm::Value::from(2)),
                    ("best_points", sea_orm::Value::from(30)),
                ]),
                BTreeMap::from([
                    ("subtask_id", sea_orm::Value::from(3)),
                    ("best_points", sea_orm::Value::from(50)),
                ]),
            ]])
            .into_connection();

        assert_eq!(best_score(&db, 1, 7).await.unwrap(), 100);
    }

    #[tokio::test]
    async fn best_score_without_submissions_is_zero() {
        use sea_orm::{DatabaseBackend, MockDatabase};
        use std::collections::BTreeMap;

        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([Vec::<BTreeMap<&str, sea_orm::Value>>::new()])
            .into_connection();

        assert_eq!(best_score(&db, 1, 7).await.unwrap(), 0);
    }
}
