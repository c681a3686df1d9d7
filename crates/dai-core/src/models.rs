//! Core data models for the digital asset archive.
//!
//! These types are shared across all crates. Every other component reads
//! archive state through the predicates on [`ArchiveRecord`] rather than
//! inspecting raw status or flag values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// ARCHIVE STATUS
// =============================================================================

/// Lifecycle status of an archive record.
///
/// Stored as a text code. Codes this build does not know are kept verbatim
/// in [`ArchiveStatus::Unknown`] so they survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ArchiveStatus {
    /// Flagged for archiving, not yet classified.
    Queued,
    /// Archived and listed for any viewer.
    ArchivedPublic,
    /// Archived; full disclosure only for permitted viewers.
    ArchivedAdmin,
    /// Archived, then the underlying asset was deleted.
    ArchivedDeleted,
    /// Legacy archive whose compliance exemption was invalidated.
    ExemptionVoid,
    /// Unrecognised stored code.
    Unknown(String),
}

impl ArchiveStatus {
    /// Parse a stored status code.
    pub fn parse(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "queued" => Self::Queued,
            "archived_public" => Self::ArchivedPublic,
            "archived_admin" => Self::ArchivedAdmin,
            "archived_deleted" => Self::ArchivedDeleted,
            "exemption_void" => Self::ExemptionVoid,
            _ => Self::Unknown(code.to_string()),
        }
    }

    /// The stored code for this status.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::ArchivedPublic => "archived_public",
            Self::ArchivedAdmin => "archived_admin",
            Self::ArchivedDeleted => "archived_deleted",
            Self::ExemptionVoid => "exemption_void",
            Self::Unknown(code) => code,
        }
    }
}

impl From<String> for ArchiveStatus {
    fn from(code: String) -> Self {
        Self::parse(&code)
    }
}

impl From<ArchiveStatus> for String {
    fn from(status: ArchiveStatus) -> Self {
        status.as_str().to_string()
    }
}

// =============================================================================
// ASSET TYPE
// =============================================================================

/// Kind of asset an archive record tracks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssetType {
    Pdf,
    Word,
    Excel,
    PowerPoint,
    /// Internal CMS page (manual entry, no stored file).
    Page,
    /// External link (manual entry, no stored file).
    External,
    Text,
    Csv,
    Image,
    Video,
    Audio,
    Compressed,
    /// Any other file kind, raw code preserved.
    Other(String),
}

impl AssetType {
    /// Parse a stored asset-type code.
    pub fn parse(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "word" => Self::Word,
            "excel" => Self::Excel,
            "powerpoint" => Self::PowerPoint,
            "page" => Self::Page,
            "external" => Self::External,
            "text" => Self::Text,
            "csv" => Self::Csv,
            "image" => Self::Image,
            "video" => Self::Video,
            "audio" => Self::Audio,
            "compressed" => Self::Compressed,
            _ => Self::Other(code.to_string()),
        }
    }

    /// The stored code for this asset type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pdf => "pdf",
            Self::Word => "word",
            Self::Excel => "excel",
            Self::PowerPoint => "powerpoint",
            Self::Page => "page",
            Self::External => "external",
            Self::Text => "text",
            Self::Csv => "csv",
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Compressed => "compressed",
            Self::Other(code) => code,
        }
    }

    /// Pages and external links are entered by hand and have no stored file.
    pub fn is_manual_entry(&self) -> bool {
        matches!(self, Self::Page | Self::External)
    }
}

impl From<String> for AssetType {
    fn from(code: String) -> Self {
        Self::parse(&code)
    }
}

impl From<AssetType> for String {
    fn from(asset_type: AssetType) -> Self {
        asset_type.as_str().to_string()
    }
}

// =============================================================================
// ARCHIVE REASON
// =============================================================================

/// Why an asset was archived.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ArchiveReason {
    Reference,
    Research,
    Recordkeeping,
    /// Free-text reason stored in `archive_reason_other`.
    Other,
    /// Unrecognised stored code.
    Unknown(String),
}

impl ArchiveReason {
    /// Parse a stored reason code.
    pub fn parse(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "reference" => Self::Reference,
            "research" => Self::Research,
            "recordkeeping" => Self::Recordkeeping,
            "other" => Self::Other,
            _ => Self::Unknown(code.to_string()),
        }
    }

    /// The stored code for this reason.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Reference => "reference",
            Self::Research => "research",
            Self::Recordkeeping => "recordkeeping",
            Self::Other => "other",
            Self::Unknown(code) => code,
        }
    }
}

impl From<String> for ArchiveReason {
    fn from(code: String) -> Self {
        Self::parse(&code)
    }
}

impl From<ArchiveReason> for String {
    fn from(reason: ArchiveReason) -> Self {
        reason.as_str().to_string()
    }
}

// =============================================================================
// FLAGS AND DERIVED CLASSIFICATIONS
// =============================================================================

/// Independent condition flags on an archive record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveFlags {
    /// File is absent from storage.
    pub missing: bool,
    /// Stored checksum no longer matches the file.
    pub integrity: bool,
    /// Active content still references the asset.
    pub usage: bool,
    /// Manual-entry content changed after archiving.
    pub modified: bool,
    /// Forced into the general archive by a previously voided exemption.
    pub prior_void: bool,
    /// Classified after the compliance deadline.
    pub late_archive: bool,
}

/// Archive type derived from the `late_archive` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveType {
    /// Classified before the compliance deadline (`late_archive == false`).
    Legacy,
    /// Classified after the compliance deadline (`late_archive == true`).
    General,
}

impl ArchiveType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Legacy => "Legacy Archive",
            Self::General => "General Archive",
        }
    }
}

/// Whether a record stands for a stored file or a hand-entered page/link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Manual,
}

// =============================================================================
// ARCHIVE RECORD
// =============================================================================

/// One tracked asset in the archive registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveRecord {
    pub id: Uuid,
    pub file_name: String,
    pub status: ArchiveStatus,
    pub asset_type: AssetType,
    pub flags: ArchiveFlags,
    pub is_private: bool,
    pub archive_reason: ArchiveReason,
    pub archive_reason_other: Option<String>,
    pub public_description: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Null while queued.
    pub archive_classification_date: Option<DateTime<Utc>>,
    pub deleted_date: Option<DateTime<Utc>>,
    pub archived_by: Option<Uuid>,
    pub deleted_by: Option<Uuid>,
    pub filesize: Option<i64>,
    pub file_checksum: Option<String>,
    /// Usage snapshot taken at classification time.
    pub usage_count_at_archive: i64,
    pub original_path: String,
    pub archive_path: Option<String>,
}

impl ArchiveRecord {
    pub fn is_queued(&self) -> bool {
        self.status == ArchiveStatus::Queued
    }

    pub fn is_archived_public(&self) -> bool {
        self.status == ArchiveStatus::ArchivedPublic
    }

    pub fn is_archived_admin(&self) -> bool {
        self.status == ArchiveStatus::ArchivedAdmin
    }

    pub fn is_archived_deleted(&self) -> bool {
        self.status == ArchiveStatus::ArchivedDeleted
    }

    pub fn is_exemption_void(&self) -> bool {
        self.status == ArchiveStatus::ExemptionVoid
    }

    /// Queued or currently archived (public or admin-only).
    pub fn is_active(&self) -> bool {
        self.is_queued() || self.is_archived_public() || self.is_archived_admin()
    }

    pub fn is_manual_entry(&self) -> bool {
        self.asset_type.is_manual_entry()
    }

    pub fn entry_kind(&self) -> EntryKind {
        if self.is_manual_entry() {
            EntryKind::Manual
        } else {
            EntryKind::File
        }
    }

    /// Historical snapshot; independent of the current `usage` flag.
    pub fn was_archived_while_in_use(&self) -> bool {
        self.usage_count_at_archive > 0
    }

    /// `late_archive` is the only input; status is never consulted.
    pub fn archive_type(&self) -> ArchiveType {
        if self.flags.late_archive {
            ArchiveType::General
        } else {
            ArchiveType::Legacy
        }
    }

    /// Whether the archive's legal basis was invalidated.
    ///
    /// Legacy archives record this in their status; general archives in the
    /// `modified` flag (manual entries) or the `integrity` flag (files).
    pub fn is_voided(&self) -> bool {
        match (self.archive_type(), self.entry_kind()) {
            (ArchiveType::Legacy, _) => self.is_exemption_void(),
            (ArchiveType::General, EntryKind::Manual) => self.flags.modified,
            (ArchiveType::General, EntryKind::File) => self.flags.integrity,
        }
    }

    /// Whether the file is gone, by flag or by a recorded deletion.
    pub fn is_file_missing(&self) -> bool {
        self.flags.missing || self.deleted_date.is_some()
    }
}

// =============================================================================
// ARCHIVE NOTES
// =============================================================================

/// Append-only annotation on an archive record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveNote {
    pub id: Uuid,
    pub archive_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author: Option<Uuid>,
}

/// Request for appending a note.
#[derive(Debug, Clone)]
pub struct CreateArchiveNoteRequest {
    pub archive_id: Uuid,
    pub text: String,
    pub author: Option<Uuid>,
}

// =============================================================================
// VIEWERS AND PERMISSIONS
// =============================================================================

/// Capabilities a viewer may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Full archive management (implies `ViewArchives`).
    ManageArchives,
    /// View archives, including admin-only detail.
    ViewArchives,
}

impl Permission {
    /// Scope string carried by API keys.
    pub fn scope(self) -> &'static str {
        match self {
            Self::ManageArchives => "archive:manage",
            Self::ViewArchives => "archive:view",
        }
    }

    /// Parse a single scope token.
    pub fn from_scope(scope: &str) -> Option<Self> {
        match scope.trim() {
            "archive:manage" => Some(Self::ManageArchives),
            "archive:view" => Some(Self::ViewArchives),
            _ => None,
        }
    }
}

/// The party making a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: Option<Uuid>,
    pub authenticated: bool,
    pub permissions: Vec<Permission>,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user_id: Option<Uuid>, permissions: Vec<Permission>) -> Self {
        Self {
            user_id,
            authenticated: true,
            permissions,
        }
    }

    /// Build an authenticated viewer from a space-separated scope string.
    pub fn from_scope(user_id: Option<Uuid>, scope: &str) -> Self {
        let permissions = scope
            .split_whitespace()
            .filter_map(Permission::from_scope)
            .collect();
        Self::authenticated(user_id, permissions)
    }
}

/// API key as stored for bearer authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub scope: String,
    pub created_at: DateTime<Utc>,
    pub revoked: bool,
}
