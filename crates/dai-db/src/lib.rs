//! # dai-db
//!
//! PostgreSQL database layer for the digital asset archive.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for the `dai-core` collaborator traits
//! - API key storage for bearer authentication
//!
//! ## Example
//!
//! ```rust,ignore
//! use dai_db::{ArchiveRepository, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/dai").await?;
//!     let records = db.archives.list_by_classification_date().await?;
//!     println!("{} archived assets", records.len());
//!     Ok(())
//! }
//! ```

pub mod api_keys;
pub mod archives;
pub mod notes;
pub mod pool;
pub mod users;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use dai_core::*;

pub use api_keys::{CreatedApiKey, PgApiKeyRepository};
pub use archives::PgArchiveRepository;
pub use notes::PgArchiveNoteRepository;
pub use pool::{
    create_pool, create_pool_with_config, log_pool_metrics, spawn_pool_monitor, PoolConfig,
    PoolHealth,
};
pub use users::PgIdentityLookup;

use std::sync::Arc;

/// Combined database context with all repositories.
///
/// Repositories are `Arc`ed so they can be handed to the engine as trait
/// objects while staying reachable for writes.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Archived asset records and live usage.
    pub archives: Arc<PgArchiveRepository>,
    /// Append-only archive notes.
    pub notes: Arc<PgArchiveNoteRepository>,
    /// User display names.
    pub users: Arc<PgIdentityLookup>,
    /// Bearer API keys.
    pub api_keys: Arc<PgApiKeyRepository>,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            archives: Arc::new(PgArchiveRepository::new(pool.clone())),
            notes: Arc::new(PgArchiveNoteRepository::new(pool.clone())),
            users: Arc::new(PgIdentityLookup::new(pool.clone())),
            api_keys: Arc::new(PgApiKeyRepository::new(pool.clone())),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    /// Archive engine wired to these repositories.
    pub fn archive_service(&self, file_urls: Arc<dyn FileUrlResolver>) -> ArchiveService {
        ArchiveService::new(
            self.archives.clone(),
            self.notes.clone(),
            self.users.clone(),
            file_urls,
        )
    }
}
