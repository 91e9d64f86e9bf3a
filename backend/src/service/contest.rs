//! administrative contest management
//!
//! Status is only ever mutated here; the scoring core treats it as
//! read-only.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, EntityTrait, IntoActiveModel, QueryOrder};
use serde::Deserialize;
use tracing::instrument;

use crate::entity::contest;
use crate::server::Server;
use crate::util::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateContest {
    pub name: String,
    pub description: String,
    pub begin: Option<chrono::NaiveDateTime>,
    pub end: Option<chrono::NaiveDateTime>,
    #[serde(default = "default_status")]
    pub status: contest::Status,
}

fn default_status() -> contest::Status {
    contest::Status::Draft
}

/// partial update; absent fields keep their current value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub begin: Option<chrono::NaiveDateTime>,
    pub end: Option<chrono::NaiveDateTime>,
    pub status: Option<contest::Status>,
}

impl Server {
    #[instrument(skip(self))]
    pub async fn list_contests(&self) -> Result<Vec<contest::Model>> {
        contest::Entity::find()
            .order_by_desc(contest::Column::CreateAt)
            .all(&self.db)
            .await
            .map_err(Into::<Error>::into)
    }

    #[instrument(skip(self))]
    pub async fn get_contest(&self, contest_id: i32) -> Result<contest::Model> {
        contest::Entity::find_by_id(contest_id)
            .one(&self.db)
            .await
            .map_err(Into::<Error>::into)?
            .ok_or(Error::NotInDB("contest"))
    }

    #[instrument(skip(self, create))]
    pub async fn create_contest(&self, create: CreateContest) -> Result<contest::Model> {
        let now = Utc::now().naive_utc();
        contest::ActiveModel {
            name: ActiveValue::Set(create.name),
            description: ActiveValue::Set(create.description),
            begin: ActiveValue::Set(create.begin),
            end: ActiveValue::Set(create.end),
            status: ActiveValue::Set(create.status),
            create_at: ActiveValue::Set(now),
            update_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(Into::<Error>::into)
    }

    #[instrument(skip(self, update))]
    pub async fn update_contest(
        &self,
        contest_id: i32,
        update: UpdateContest,
    ) -> Result<contest::Model> {
        let model = contest::Entity::find_by_id(contest_id)
            .one(&self.db)
            .await
            .map_err(Into::<Error>::into)?
            .ok_or(Error::NotInDB("contest"))?;

        let mut model = model.into_active_model();
        if let Some(x) = update.name {
            model.name = ActiveValue::Set(x);
        }
        if let Some(x) = update.description {
            model.description = ActiveValue::Set(x);
        }
        if let Some(x) = update.begin {
            model.begin = ActiveValue::Set(Some(x));
        }
        if let Some(x) = update.end {
            model.end = ActiveValue::Set(Some(x));
        }
        if let Some(x) = update.status {
            model.status = ActiveValue::Set(x);
        }
        model.update_at = ActiveValue::Set(Utc::now().naive_utc());

        model.update(&self.db).await.map_err(Into::<Error>::into)
    }
}
