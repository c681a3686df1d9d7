//! User display-name lookup.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use dai_core::{new_v7, Error, IdentityLookup, Result};

/// PostgreSQL implementation of IdentityLookup over `app_user`.
pub struct PgIdentityLookup {
    pool: Pool<Postgres>,
}

impl PgIdentityLookup {
    /// Create a new PgIdentityLookup with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Create a user and return its id.
    pub async fn create_user(&self, display_name: &str) -> Result<Uuid> {
        let id = new_v7();
        sqlx::query("INSERT INTO app_user (id, display_name, created_at) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(display_name)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(id)
    }
}

#[async_trait]
impl IdentityLookup for PgIdentityLookup {
    async fn display_name(&self, user_id: Uuid) -> Result<Option<String>> {
        sqlx::query_scalar("SELECT display_name FROM app_user WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)
    }
}
