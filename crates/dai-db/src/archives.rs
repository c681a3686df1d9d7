//! Archived asset repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use dai_core::{
    new_v7, ArchiveFlags, ArchiveReason, ArchiveRecord, ArchiveRepository, ArchiveStatus,
    AssetType, Error, Result,
};

const ARCHIVE_COLUMNS: &str = r#"
    id, file_name, status, asset_type,
    flag_missing, flag_integrity, flag_usage, flag_modified, flag_prior_void, flag_late_archive,
    is_private, archive_reason, archive_reason_other, public_description,
    created_at, archive_classification_date, deleted_date, archived_by, deleted_by,
    filesize, file_checksum, usage_count_at_archive, original_path, archive_path
"#;

/// PostgreSQL implementation of ArchiveRepository.
pub struct PgArchiveRepository {
    pool: Pool<Postgres>,
}

impl PgArchiveRepository {
    /// Create a new PgArchiveRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert or fully replace a record.
    pub async fn upsert(&self, record: &ArchiveRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO archived_asset (
                id, file_name, status, asset_type,
                flag_missing, flag_integrity, flag_usage, flag_modified, flag_prior_void, flag_late_archive,
                is_private, archive_reason, archive_reason_other, public_description,
                created_at, archive_classification_date, deleted_date, archived_by, deleted_by,
                filesize, file_checksum, usage_count_at_archive, original_path, archive_path
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24
            )
            ON CONFLICT (id) DO UPDATE SET
                file_name = EXCLUDED.file_name,
                status = EXCLUDED.status,
                asset_type = EXCLUDED.asset_type,
                flag_missing = EXCLUDED.flag_missing,
                flag_integrity = EXCLUDED.flag_integrity,
                flag_usage = EXCLUDED.flag_usage,
                flag_modified = EXCLUDED.flag_modified,
                flag_prior_void = EXCLUDED.flag_prior_void,
                flag_late_archive = EXCLUDED.flag_late_archive,
                is_private = EXCLUDED.is_private,
                archive_reason = EXCLUDED.archive_reason,
                archive_reason_other = EXCLUDED.archive_reason_other,
                public_description = EXCLUDED.public_description,
                archive_classification_date = EXCLUDED.archive_classification_date,
                deleted_date = EXCLUDED.deleted_date,
                archived_by = EXCLUDED.archived_by,
                deleted_by = EXCLUDED.deleted_by,
                filesize = EXCLUDED.filesize,
                file_checksum = EXCLUDED.file_checksum,
                usage_count_at_archive = EXCLUDED.usage_count_at_archive,
                original_path = EXCLUDED.original_path,
                archive_path = EXCLUDED.archive_path
            "#,
        )
        .bind(record.id)
        .bind(&record.file_name)
        .bind(record.status.as_str())
        .bind(record.asset_type.as_str())
        .bind(record.flags.missing)
        .bind(record.flags.integrity)
        .bind(record.flags.usage)
        .bind(record.flags.modified)
        .bind(record.flags.prior_void)
        .bind(record.flags.late_archive)
        .bind(record.is_private)
        .bind(record.archive_reason.as_str())
        .bind(&record.archive_reason_other)
        .bind(&record.public_description)
        .bind(record.created_at)
        .bind(record.archive_classification_date)
        .bind(record.deleted_date)
        .bind(record.archived_by)
        .bind(record.deleted_by)
        .bind(record.filesize)
        .bind(&record.file_checksum)
        .bind(record.usage_count_at_archive)
        .bind(&record.original_path)
        .bind(&record.archive_path)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    /// Register an active reference from `source_path` to an archived asset.
    pub async fn record_usage(&self, archive_id: Uuid, source_path: &str) -> Result<Uuid> {
        let id = new_v7();
        sqlx::query(
            "INSERT INTO asset_usage (id, archive_id, source_path, is_active, created_at) VALUES ($1, $2, $3, true, $4)",
        )
        .bind(id)
        .bind(archive_id)
        .bind(source_path)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(id)
    }
}

fn row_to_record(r: &sqlx::postgres::PgRow) -> ArchiveRecord {
    ArchiveRecord {
        id: r.get("id"),
        file_name: r.get("file_name"),
        status: ArchiveStatus::parse(r.get::<&str, _>("status")),
        asset_type: AssetType::parse(r.get::<&str, _>("asset_type")),
        flags: ArchiveFlags {
            missing: r.get("flag_missing"),
            integrity: r.get("flag_integrity"),
            usage: r.get("flag_usage"),
            modified: r.get("flag_modified"),
            prior_void: r.get("flag_prior_void"),
            late_archive: r.get("flag_late_archive"),
        },
        is_private: r.get("is_private"),
        archive_reason: ArchiveReason::parse(r.get::<&str, _>("archive_reason")),
        archive_reason_other: r.get("archive_reason_other"),
        public_description: r.get("public_description"),
        created_at: r.get("created_at"),
        archive_classification_date: r.get("archive_classification_date"),
        deleted_date: r.get("deleted_date"),
        archived_by: r.get("archived_by"),
        deleted_by: r.get("deleted_by"),
        filesize: r.get("filesize"),
        file_checksum: r.get("file_checksum"),
        usage_count_at_archive: r.get("usage_count_at_archive"),
        original_path: r.get("original_path"),
        archive_path: r.get("archive_path"),
    }
}

#[async_trait]
impl ArchiveRepository for PgArchiveRepository {
    async fn fetch(&self, id: Uuid) -> Result<Option<ArchiveRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM archived_asset WHERE id = $1",
            ARCHIVE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(row_to_record))
    }

    async fn list_by_classification_date(&self) -> Result<Vec<ArchiveRecord>> {
        // One statement, so the export reads a single snapshot.
        let rows = sqlx::query(&format!(
            "SELECT {} FROM archived_asset ORDER BY archive_classification_date DESC NULLS LAST, id DESC",
            ARCHIVE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(row_to_record).collect())
    }

    async fn live_usage_count(&self, id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM asset_usage WHERE archive_id = $1 AND is_active",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(count)
    }
}
