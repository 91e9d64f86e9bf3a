//! contestant registration and lookup

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use serde::Deserialize;
use tracing::instrument;

use super::{page_window, ListQuery};
use crate::entity::{contest, contestant};
use crate::server::Server;
use crate::util::code::generate_reg_number;
use crate::util::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub organization: String,
    pub category: contestant::Category,
}

#[derive(Debug)]
pub struct ContestantPage {
    pub rows: Vec<contestant::Model>,
    pub total: u64,
}

impl Server {
    /// Register a contestant and hand out their registration number.
    ///
    /// Only accepted while the contest status is `registration`; one
    /// registration per (contest, email). The sequence behind the
    /// registration number is the contestant count at insert time, so
    /// the duplicate check and insert share one transaction.
    #[instrument(skip(self, form))]
    pub async fn register(
        &self,
        contest_id: i32,
        form: RegistrationForm,
    ) -> Result<contestant::Model> {
        let txn = self.db.begin().await?;

        let contest = contest::Entity::find_by_id(contest_id)
            .one(&txn)
            .await
            .map_err(Into::<Error>::into)?
            .ok_or(Error::NotInDB("contest"))?;

        if contest.status != contest::Status::Registration {
            return Err(Error::RegistrationClosed);
        }

        let duplicate = contestant::Entity::find()
            .filter(contestant::Column::ContestId.eq(contest_id))
            .filter(contestant::Column::Email.eq(form.email.as_str()))
            .one(&txn)
            .await
            .map_err(Into::<Error>::into)?;
        if duplicate.is_some() {
            return Err(Error::AlreadyExist("email"));
        }

        let sequence = contestant::Entity::find()
            .filter(contestant::Column::ContestId.eq(contest_id))
            .count(&txn)
            .await
            .map_err(Into::<Error>::into)? as u32
            + 1;
        let reg_number = generate_reg_number(sequence)?;

        let model = contestant::ActiveModel {
            contest_id: ActiveValue::Set(contest_id),
            reg_number: ActiveValue::Set(reg_number),
            first_name: ActiveValue::Set(form.first_name),
            last_name: ActiveValue::Set(form.last_name),
            email: ActiveValue::Set(form.email),
            phone: ActiveValue::Set(form.phone),
            organization: ActiveValue::Set(form.organization),
            category: ActiveValue::Set(form.category),
            create_at: ActiveValue::Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(Into::<Error>::into)?;

        txn.commit().await.map_err(Into::<Error>::into)?;

        tracing::info!(contestant = model.id, reg_number = %model.reg_number, "registered");
        Ok(model)
    }

    /// Find a contestant by registration number.
    #[instrument(skip(self))]
    pub async fn lookup_contestant(&self, reg_number: &str) -> Result<contestant::Model> {
        contestant::Entity::find()
            .filter(contestant::Column::RegNumber.eq(reg_number))
            .one(&self.db)
            .await
            .map_err(Into::<Error>::into)?
            .ok_or(Error::NotInDB("contestant"))
    }

    /// List a contest's contestants, newest first, with the usual
    /// category/search/pagination criteria.
    #[instrument(skip(self))]
    pub async fn list_contestants(
        &self,
        contest_id: i32,
        query: ListQuery,
    ) -> Result<ContestantPage> {
        let mut select = contestant::Entity::find()
            .filter(contestant::Column::ContestId.eq(contest_id));

        if let Some(category) = query.category {
            select = select.filter(contestant::Column::Category.eq(category));
        }
        if let Some(search) = &query.search {
            select = select.filter(
                Condition::any()
                    .add(contestant::Column::FirstName.contains(search.as_str()))
                    .add(contestant::Column::LastName.contains(search.as_str()))
                    .add(contestant::Column::RegNumber.contains(search.as_str())),
            );
        }

        let total = select
            .clone()
            .count(&self.db)
            .await
            .map_err(Into::<Error>::into)?;

        let (limit, offset) = page_window(query.page, query.limit);
        let rows = select
            .order_by_desc(contestant::Column::CreateAt)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await
            .map_err(Into::<Error>::into)?;

        Ok(ContestantPage { rows, total })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn contest_with_status(status: contest::Status) -> contest::Model {
        let at = chrono::NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        contest::Model {
            id: 1,
            name: "Qualifier".to_owned(),
            description: String::new(),
            begin: Some(at),
            end: None,
            status,
            create_at: at,
            update_at: at,
        }
    }

    fn form() -> RegistrationForm {
        RegistrationForm {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            phone: "555-0100".to_owned(),
            organization: "Analytical Engine".to_owned(),
            category: contestant::Category::High,
        }
    }

    fn contestant_row(id: i32, email: &str) -> contestant::Model {
        let at = chrono::NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        contestant::Model {
            id,
            contest_id: 1,
            reg_number: format!("CX4-{:04}", id),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: email.to_owned(),
            phone: "555-0100".to_owned(),
            organization: "Analytical Engine".to_owned(),
            category: contestant::Category::High,
            create_at: at,
        }
    }

    #[tokio::test]
    async fn closed_contest_rejects_registration() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![contest_with_status(contest::Status::Draft)]])
            .into_connection();
        let server = Server::with_db(db);

        assert!(matches!(
            server.register(1, form()).await,
            Err(Error::RegistrationClosed)
        ));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![contest_with_status(contest::Status::Registration)]])
            .append_query_results([vec![contestant_row(3, "ada@example.com")]])
            .into_connection();
        let server = Server::with_db(db);

        assert!(matches!(
            server.register(1, form()).await,
            Err(Error::AlreadyExist("email"))
        ));
    }

    #[tokio::test]
    async fn registration_assigns_next_reg_number() {
        use std::collections::BTreeMap;

        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            // contest gate
            .append_query_results([vec![contest_with_status(contest::Status::Registration)]])
            // no duplicate
            .append_query_results([Vec::<contestant::Model>::new()])
            // two earlier registrations
            .append_query_results([vec![BTreeMap::from([(
                "num_items",
                sea_orm::Value::from(2i32),
            )])]])
            .append_exec_results([MockExecResult {
                last_insert_id: 3,
                rows_affected: 1,
            }])
            // row read back after insert
            .append_query_results([vec![contestant_row(3, "ada@example.com")]])
            .into_connection();
        let server = Server::with_db(db);

        let model = server.register(1, form()).await.unwrap();
        assert_eq!(model.reg_number, "CX4-0003");
    }
}
