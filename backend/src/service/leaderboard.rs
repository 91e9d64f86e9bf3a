//! leaderboard recalculation and read side
//!
//! `recalculate_contest` rebuilds every cached row then runs one
//! ranking pass, all inside a single transaction: a failure anywhere
//! leaves the previous ranks intact. The read side never recomputes,
//! it only pages over the cache.

use std::collections::HashMap;

use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, TransactionTrait,
};
use serde::Serialize;
use tracing::instrument;

use super::{page_window, scoring, ListQuery};
use crate::entity::{contest, contestant, leaderboard, problem, submission, subtask_score};
use crate::server::Server;
use crate::util::error::{Error, Result};

/// one row of the ranked leaderboard, joined with contestant identity
#[derive(Debug, FromQueryResult, Serialize)]
pub struct LeaderboardRow {
    pub rank: i32,
    pub reg_number: String,
    pub first_name: String,
    pub last_name: String,
    pub organization: String,
    pub category: contestant::Category,
    pub total_points: i32,
    pub penalty_minutes: i64,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardPage {
    pub entries: Vec<LeaderboardRow>,
    /// matching rows before pagination, for the pager UI
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct ProblemStatistic {
    pub problem_id: i32,
    pub title: String,
    pub max_points: i32,
    /// contestants whose best score equals `max_points`
    pub solved_count: u64,
    /// rounded mean best score over contestants with submissions
    pub avg_points: i32,
}

#[derive(Debug, FromQueryResult)]
struct BestPerContestantRow {
    contestant_id: i32,
    best_points: i32,
}

/// Standard competition ranking over `(id, total_points,
/// penalty_minutes)`: higher points first, lower penalty breaks ties,
/// tied pairs share a rank and the following rank skips past them.
fn rank_entries(mut standings: Vec<(i32, i32, i64)>) -> Vec<(i32, i32)> {
    standings.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    let mut ranked = Vec::with_capacity(standings.len());
    let mut last: Option<(i32, i64)> = None;
    let mut rank = 0;
    for (position, (id, points, penalty)) in standings.into_iter().enumerate() {
        if last != Some((points, penalty)) {
            rank = position as i32 + 1;
            last = Some((points, penalty));
        }
        ranked.push((id, rank));
    }
    ranked
}

/// One ranking pass over every cached row of the contest.
async fn assign_ranks<C: ConnectionTrait>(db: &C, contest_id: i32) -> Result<()> {
    let entries = leaderboard::Entity::find()
        .filter(leaderboard::Column::ContestId.eq(contest_id))
        .all(db)
        .await
        .map_err(Into::<Error>::into)?;

    let standings = entries
        .iter()
        .map(|entry| (entry.id, entry.total_points, entry.penalty_minutes))
        .collect();

    for (id, rank) in rank_entries(standings) {
        leaderboard::Entity::update_many()
            .col_expr(leaderboard::Column::Rank, Expr::value(rank))
            .filter(leaderboard::Column::Id.eq(id))
            .exec(db)
            .await
            .map_err(Into::<Error>::into)?;
    }
    Ok(())
}

fn summarize_best(rows: &[BestPerContestantRow], max_points: i32) -> (u64, i32) {
    let mut best_by_contestant: HashMap<i32, i32> = HashMap::new();
    for row in rows {
        *best_by_contestant.entry(row.contestant_id).or_insert(0) += row.best_points;
    }

    let attempted = best_by_contestant.len();
    let solved_count = best_by_contestant
        .values()
        .filter(|&&total| total == max_points)
        .count() as u64;
    let avg_points = match attempted {
        0 => 0,
        n => {
            (best_by_contestant.values().map(|&v| v as f64).sum::<f64>() / n as f64).round() as i32
        }
    };
    (solved_count, avg_points)
}

impl Server {
    /// Rebuild the whole contest: refresh every contestant's cached
    /// totals, then assign ranks in one pass. Idempotent; all-or-nothing.
    #[instrument(skip(self))]
    pub async fn recalculate_contest(&self, contest_id: i32) -> Result<()> {
        let txn = self.db.begin().await?;

        contest::Entity::find_by_id(contest_id)
            .one(&txn)
            .await
            .map_err(Into::<Error>::into)?
            .ok_or(Error::NotInDB("contest"))?;

        let contestants = contestant::Entity::find()
            .filter(contestant::Column::ContestId.eq(contest_id))
            .all(&txn)
            .await
            .map_err(Into::<Error>::into)?;

        for contestant in &contestants {
            scoring::refresh_cache(&txn, contestant).await?;
        }

        assign_ranks(&txn, contest_id).await?;

        txn.commit().await.map_err(Into::<Error>::into)?;

        tracing::info!(contestants = contestants.len(), "leaderboard_recalculated");
        Ok(())
    }

    /// Page over the cached leaderboard. May serve standings computed
    /// at the previous recalculation; never triggers a recompute.
    #[instrument(skip(self))]
    pub async fn get_leaderboard(
        &self,
        contest_id: i32,
        query: ListQuery,
    ) -> Result<LeaderboardPage> {
        contest::Entity::find_by_id(contest_id)
            .one(&self.db)
            .await
            .map_err(Into::<Error>::into)?
            .ok_or(Error::NotInDB("contest"))?;

        let mut select = leaderboard::Entity::find()
            .join(JoinType::InnerJoin, leaderboard::Relation::Contestant.def())
            .filter(leaderboard::Column::ContestId.eq(contest_id));

        if let Some(category) = query.category {
            select = select.filter(contestant::Column::Category.eq(category));
        }
        if let Some(search) = &query.search {
            select = select.filter(
                Condition::any()
                    .add(contestant::Column::FirstName.contains(search.as_str()))
                    .add(contestant::Column::LastName.contains(search.as_str()))
                    .add(contestant::Column::RegNumber.contains(search.as_str()))
                    .add(contestant::Column::Organization.contains(search.as_str())),
            );
        }

        let total = select
            .clone()
            .count(&self.db)
            .await
            .map_err(Into::<Error>::into)?;

        let (limit, offset) = page_window(query.page, query.limit);
        let entries = select
            .select_only()
            .column(leaderboard::Column::Rank)
            .column(contestant::Column::RegNumber)
            .column(contestant::Column::FirstName)
            .column(contestant::Column::LastName)
            .column(contestant::Column::Organization)
            .column(contestant::Column::Category)
            .column(leaderboard::Column::TotalPoints)
            .column(leaderboard::Column::PenaltyMinutes)
            .order_by_desc(leaderboard::Column::TotalPoints)
            .order_by_asc(leaderboard::Column::PenaltyMinutes)
            .limit(limit)
            .offset(offset)
            .into_model::<LeaderboardRow>()
            .all(&self.db)
            .await
            .map_err(Into::<Error>::into)?;

        Ok(LeaderboardPage { entries, total })
    }

    /// Solve counts and average best score per problem, in contest
    /// order.
    #[instrument(skip(self))]
    pub async fn problem_statistics(&self, contest_id: i32) -> Result<Vec<ProblemStatistic>> {
        contest::Entity::find_by_id(contest_id)
            .one(&self.db)
            .await
            .map_err(Into::<Error>::into)?
            .ok_or(Error::NotInDB("contest"))?;

        let problems = problem::Entity::find()
            .filter(problem::Column::ContestId.eq(contest_id))
            .order_by_asc(problem::Column::Order)
            .all(&self.db)
            .await
            .map_err(Into::<Error>::into)?;

        let mut statistics = Vec::with_capacity(problems.len());
        for problem in problems {
            let rows = subtask_score::Entity::find()
                .join(JoinType::InnerJoin, subtask_score::Relation::Submission.def())
                .filter(submission::Column::ProblemId.eq(problem.id))
                .select_only()
                .column(submission::Column::ContestantId)
                .column_as(subtask_score::Column::PointsAwarded.max(), "best_points")
                .group_by(submission::Column::ContestantId)
                .group_by(subtask_score::Column::SubtaskId)
                .into_model::<BestPerContestantRow>()
                .all(&self.db)
                .await
                .map_err(Into::<Error>::into)?;

            let (solved_count, avg_points) = summarize_best(&rows, problem.max_points);
            statistics.push(ProblemStatistic {
                problem_id: problem.id,
                title: problem.title,
                max_points: problem.max_points,
                solved_count,
                avg_points,
            });
        }
        Ok(statistics)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ranks_order_by_points_then_penalty() {
        let ranked = rank_entries(vec![(1, 50, 120), (2, 100, 90), (3, 50, 60)]);
        assert_eq!(ranked, vec![(2, 1), (3, 2), (1, 3)]);
    }

    #[test]
    fn tied_entries_share_rank_and_next_skips() {
        let ranked = rank_entries(vec![(1, 100, 30), (2, 100, 30), (3, 80, 10), (4, 80, 10)]);
        assert_eq!(ranked, vec![(1, 1), (2, 1), (3, 3), (4, 3)]);
    }

    #[test]
    fn equal_points_break_tie_on_penalty() {
        let ranked = rank_entries(vec![(1, 100, 90), (2, 100, 30)]);
        assert_eq!(ranked, vec![(2, 1), (1, 2)]);
    }

    #[test]
    fn ranking_is_idempotent() {
        let standings = vec![(1, 70, 10), (2, 70, 10), (3, 10, 0)];
        assert_eq!(
            rank_entries(standings.clone()),
            rank_entries(standings)
        );
    }

    #[test]
    fn empty_contest_ranks_nobody() {
        assert!(rank_entries(Vec::new()).is_empty());
    }

    fn best(contestant_id: i32, best_points: i32) -> BestPerContestantRow {
        BestPerContestantRow {
            contestant_id,
            best_points,
        }
    }

    #[test]
    fn solved_counts_full_scores_only() {
        // per-(contestant, subtask) maxima; contestant 1 reaches 100
        let rows = [best(1, 20), best(1, 30), best(1, 50), best(2, 20)];
        let (solved, avg) = summarize_best(&rows, 100);
        assert_eq!(solved, 1);
        assert_eq!(avg, 60);
    }

    #[test]
    fn statistics_of_untouched_problem_are_zero() {
        let (solved, avg) = summarize_best(&[], 100);
        assert_eq!(solved, 0);
        assert_eq!(avg, 0);
    }
}
