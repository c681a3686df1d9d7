//! API key repository implementation.
//!
//! Keys are `dai_key_<random>` tokens; only their SHA-256 hash is stored.

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use dai_core::defaults::API_KEY_PREFIX;
use dai_core::{new_v7, ApiKey, ApiKeyRepository, Error, Permission, Result};

/// Length of the random part of a generated key.
const KEY_SECRET_LENGTH: usize = 32;

/// A freshly created key. The plaintext token is only available here.
#[derive(Debug, Clone)]
pub struct CreatedApiKey {
    pub key: ApiKey,
    pub token: String,
}

/// PostgreSQL implementation of ApiKeyRepository.
pub struct PgApiKeyRepository {
    pool: Pool<Postgres>,
}

impl PgApiKeyRepository {
    /// Create a new PgApiKeyRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Generate a cryptographically secure random string.
    fn generate_secret(length: usize) -> String {
        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        let mut rng = rand::thread_rng();
        (0..length)
            .map(|_| {
                let idx = rng.gen_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }

    /// Hash a token using SHA256.
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Create a key with the given permission scope.
    pub async fn create_api_key(
        &self,
        name: &str,
        permission: Permission,
        user_id: Option<Uuid>,
    ) -> Result<CreatedApiKey> {
        let now = Utc::now();
        let id = new_v7();

        let token = format!("{}{}", API_KEY_PREFIX, Self::generate_secret(KEY_SECRET_LENGTH));
        let key_prefix = token.chars().take(12).collect::<String>();
        let key_hash = Self::hash_token(&token);

        sqlx::query(
            r#"INSERT INTO api_key (
                id, key_hash, key_prefix, name, scope, user_id,
                is_active, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, true, $7, $7)"#,
        )
        .bind(id)
        .bind(&key_hash)
        .bind(&key_prefix)
        .bind(name)
        .bind(permission.scope())
        .bind(user_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(CreatedApiKey {
            key: ApiKey {
                id,
                user_id,
                name: name.to_string(),
                scope: permission.scope().to_string(),
                created_at: now,
                revoked: false,
            },
            token,
        })
    }

    /// Revoke a key. Returns false when no such key exists.
    pub async fn revoke_api_key(&self, id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("UPDATE api_key SET is_active = false, updated_at = $1 WHERE id = $2")
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ApiKeyRepository for PgApiKeyRepository {
    async fn validate_api_key(&self, token: &str) -> Result<Option<ApiKey>> {
        if !token.starts_with(API_KEY_PREFIX) {
            return Ok(None);
        }
        let hash = Self::hash_token(token);
        let now = Utc::now();

        let row = sqlx::query(
            r#"UPDATE api_key SET last_used_at = $2
            WHERE key_hash = $1 AND is_active = true
            RETURNING id, user_id, name, scope, created_at, is_active"#,
        )
        .bind(&hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| ApiKey {
            id: r.get("id"),
            user_id: r.get("user_id"),
            name: r.get("name"),
            scope: r.get("scope"),
            created_at: r.get("created_at"),
            revoked: !r.get::<bool, _>("is_active"),
        }))
    }
}
