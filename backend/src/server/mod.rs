pub mod db;
pub mod error;
pub mod logger;

pub use error::InitError;
pub type Result<T> = std::result::Result<T, InitError>;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::{self, CONFIG};

/// A wrapper holding the engine's stateful components.
///
/// Every exposed operation lives in an `impl Server` block under
/// `service/`; the transport layer is expected to keep one [`Server`]
/// for the process lifetime.
pub struct Server {
    pub db: DatabaseConnection,
}

impl Server {
    /// Create a new server
    ///
    /// It will initialize stateful components in following order:
    /// 1. Config
    /// 2. Logger
    /// 3. Database
    pub async fn new() -> Result<Arc<Self>> {
        config::init().await?;
        logger::init();

        let db = db::init(&CONFIG.get().unwrap().database).await?;

        Ok(Arc::new(Server { db }))
    }

    /// Wrap an already-established connection, skipping config and
    /// logger setup. Used by tests and embedded deployments.
    pub fn with_db(db: DatabaseConnection) -> Arc<Self> {
        Arc::new(Server { db })
    }
}
