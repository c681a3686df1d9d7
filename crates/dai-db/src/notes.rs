//! Archive note repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use dai_core::{new_v7, ArchiveNote, ArchiveNoteRepository, CreateArchiveNoteRequest, Error, Result};

/// PostgreSQL implementation of ArchiveNoteRepository.
pub struct PgArchiveNoteRepository {
    pool: Pool<Postgres>,
}

impl PgArchiveNoteRepository {
    /// Create a new PgArchiveNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArchiveNoteRepository for PgArchiveNoteRepository {
    async fn insert(&self, req: CreateArchiveNoteRequest) -> Result<ArchiveNote> {
        let id = new_v7();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO archive_note (id, archive_id, note_text, author, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(req.archive_id)
        .bind(&req.text)
        .bind(req.author)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(ArchiveNote {
            id,
            archive_id: req.archive_id,
            text: req.text,
            created_at: now,
            author: req.author,
        })
    }

    async fn list_for_archive(
        &self,
        archive_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ArchiveNote>> {
        // id breaks created_at ties so pages stay stable under concurrent inserts
        let rows = sqlx::query(
            r#"
            SELECT id, archive_id, note_text, author, created_at
            FROM archive_note
            WHERE archive_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(archive_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| ArchiveNote {
                id: r.get("id"),
                archive_id: r.get("archive_id"),
                text: r.get("note_text"),
                created_at: r.get("created_at"),
                author: r.get("author"),
            })
            .collect())
    }

    async fn count_for_archive(&self, archive_id: Uuid) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM archive_note WHERE archive_id = $1")
                .bind(archive_id)
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Database)?;

        Ok(count)
    }
}
