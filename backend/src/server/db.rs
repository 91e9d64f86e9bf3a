use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use tracing::instrument;

use super::InitError;
use crate::config;

/// initialize the database and connection
///
/// 1. Connect to database.
/// 2. Check and run migration.(skip when not(feature="standalone"))
/// 3. return DatabaseConnection
#[instrument(skip_all, name = "construct_db")]
pub async fn init(config: &config::Database) -> super::Result<DatabaseConnection> {
    if let Some(parent) = std::path::Path::new(&config.path).parent() {
        std::fs::create_dir_all(parent).map_err(InitError::DbDir)?;
    }

    let uri = format!("sqlite://{}?mode=rwc&cache=private", config.path.clone());

    let mut opt = ConnectOptions::new(uri);
    opt.sqlx_logging_level(log::LevelFilter::Trace);

    let db = Database::connect(opt).await.map_err(InitError::InitConn)?;

    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        "PRAGMA cache_size = -65536;PRAGMA optimize;", // 64MiB cache
    ))
    .await
    .map_err(InitError::OptimizeDB)?;

    #[cfg(feature = "standalone")]
    if config.migrate == Some(true) {
        migrate(&db).await?;
    }

    Ok(db)
}

/// Run migration
#[cfg(feature = "standalone")]
async fn migrate(db: &DatabaseConnection) -> super::Result<()> {
    use sea_orm_migration::MigratorTrait;

    migration::Migrator::up(db, None)
        .await
        .map_err(InitError::AutoMigrate)?;
    Ok(())
}
