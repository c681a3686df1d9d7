//! Collaborator traits for the archive engine.
//!
//! Storage, identity, file-URL and permission concerns live behind these
//! interfaces so the engine never reaches for global services.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// RECORD STORE
// =============================================================================

/// Read access to archive records.
#[async_trait]
pub trait ArchiveRepository: Send + Sync {
    /// Load one record by id.
    async fn fetch(&self, id: Uuid) -> Result<Option<ArchiveRecord>>;

    /// All records, newest classification first; queued records last.
    ///
    /// Read with a single query so an export sees one snapshot.
    async fn list_by_classification_date(&self) -> Result<Vec<ArchiveRecord>>;

    /// Live count of active content references to the record's asset.
    async fn live_usage_count(&self, id: Uuid) -> Result<i64>;
}

// =============================================================================
// NOTE STORE
// =============================================================================

/// Append-only storage for archive notes.
#[async_trait]
pub trait ArchiveNoteRepository: Send + Sync {
    /// Append a note.
    async fn insert(&self, req: CreateArchiveNoteRequest) -> Result<ArchiveNote>;

    /// Notes for an archive ordered `(created_at desc, id desc)`.
    async fn list_for_archive(
        &self,
        archive_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ArchiveNote>>;

    /// Total notes for an archive.
    async fn count_for_archive(&self, archive_id: Uuid) -> Result<i64>;
}

// =============================================================================
// IDENTITY
// =============================================================================

/// Resolves user references to display names.
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    /// `Ok(None)` for a deleted or unknown user.
    async fn display_name(&self, user_id: Uuid) -> Result<Option<String>>;
}

/// Resolves bearer API keys.
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    /// `Ok(None)` for unknown or revoked keys.
    async fn validate_api_key(&self, token: &str) -> Result<Option<ApiKey>>;
}

// =============================================================================
// FILE URLS
// =============================================================================

/// Maps internal storage URIs (`public://…`, `private://…`) to absolute URLs.
pub trait FileUrlResolver: Send + Sync {
    /// `None` when the URI cannot be resolved; callers echo the input.
    fn resolve(&self, uri: &str) -> Option<String>;
}

// =============================================================================
// PERMISSIONS
// =============================================================================

/// Capability checks for the current viewer.
pub trait PermissionCheck: Send + Sync {
    fn is_authenticated(&self) -> bool;

    fn has_permission(&self, permission: Permission) -> bool;

    fn user_id(&self) -> Option<Uuid>;
}

impl PermissionCheck for Viewer {
    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// `ManageArchives` implies `ViewArchives`.
    fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.iter().any(|held| {
            *held == permission
                || (*held == Permission::ManageArchives && permission == Permission::ViewArchives)
        })
    }

    fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }
}
