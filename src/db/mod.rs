//! Database module providing connection management, migrations, and queries.

pub mod accounts;
pub mod repositories;
pub mod store;

use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::migration::Migrator;

pub use store::SeaOrmStore;

/// Database connection pool wrapper.
/// `DatabaseConnection` is internally pooled and cheap to clone.
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Connect to PostgreSQL using the configured pool bounds.
    pub async fn new(config: &Config) -> AppResult<Self> {
        let settings = &config.database;
        if !settings.url.starts_with("postgres://") && !settings.url.starts_with("postgresql://") {
            return Err(AppError::Database(
                "Invalid DATABASE_URL format. Expected 'postgres://...'".to_string(),
            ));
        }

        let mut options = ConnectOptions::new(settings.url.clone());
        options
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(config.is_development());

        let conn = Database::connect(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))?;

        Ok(DbPool { conn })
    }

    /// Get access to the connection for executing queries.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Apply all pending migrations.
    pub async fn run_migrations(&self) -> AppResult<()> {
        Migrator::up(&self.conn, None).await?;
        info!("Database migrations complete");
        Ok(())
    }

    /// Cheap round-trip used by the readiness probe.
    pub async fn ping(&self) -> AppResult<()> {
        self.conn.execute_unprepared("SELECT 1").await?;
        Ok(())
    }
}
