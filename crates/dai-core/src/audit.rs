//! Audit export rows and CSV encoding.
//!
//! Every record, whatever its status, becomes one 24-column row. Building a
//! row never fails: absent data renders as an empty string. Values that
//! need a collaborator (resolved URLs, user names, live usage) are computed
//! beforehand and passed in through [`AuditInputs`].

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::catalog::{asset_type_label, record_reason_label, status_label};
use crate::defaults::{ARCHIVE_REGISTRY_PATH, AUDIT_EXPORT_FILENAME_PREFIX};
use crate::models::{ArchiveRecord, ArchiveType, AssetType, EntryKind};
use crate::traits::FileUrlResolver;

/// Fixed header row. Archive Type is "General Archive" when the record was
/// classified after the compliance deadline, "Legacy Archive" otherwise.
pub const AUDIT_COLUMNS: [&str; 24] = [
    "Archive ID",
    "File Name",
    "Asset Type",
    "Archive Type",
    "Status",
    "Archive Reason",
    "Public Description",
    "Original URL",
    "Archive Reference Path",
    "File Size (bytes)",
    "Checksum (SHA-256)",
    "Integrity Issue",
    "File Missing",
    "File Access",
    "Archive Classification Date",
    "Archived By",
    "Created Date",
    "Deleted Date",
    "Deleted By",
    "Active Usage Detected",
    "Archived While In Use",
    "Usage Count at Archive",
    "Exemption Voided / Modified",
    "Forced General (Prior Void)",
];

/// A single audit row in column order.
pub type AuditRow = [String; 24];

pub const NA_FILE_ONLY: &str = "N/A (File-only)";
pub const NA_NOT_YET_ARCHIVED: &str = "N/A (Not yet archived)";

/// Collaborator-derived values for one row.
#[derive(Debug, Clone, Default)]
pub struct AuditInputs {
    /// Original location after storage-URI resolution.
    pub original_url: String,
    /// Scheme and host the reference path hangs off; empty for relative.
    pub site_base: String,
    pub archived_by_name: String,
    pub deleted_by_name: String,
    /// Live usage count, fetched only for deleted records.
    pub live_usage_count: Option<i64>,
}

/// Finished CSV export.
#[derive(Debug, Clone)]
pub struct AuditExport {
    pub filename: String,
    pub body: String,
    pub row_count: usize,
}

// =============================================================================
// ROW BUILDING
// =============================================================================

/// Build the 24 ordered fields for one record.
pub fn build_row(record: &ArchiveRecord, inputs: &AuditInputs) -> AuditRow {
    [
        record.id.to_string(),
        record.file_name.clone(),
        asset_type_label(&record.asset_type),
        record.archive_type().label().to_string(),
        status_label(&record.status),
        record_reason_label(record),
        record.public_description.clone().unwrap_or_default(),
        inputs.original_url.clone(),
        reference_path(&inputs.site_base, record.id),
        record.filesize.map(|n| n.to_string()).unwrap_or_default(),
        file_field(record, || record.file_checksum.clone().unwrap_or_default()),
        file_field(record, || yes_no(record.flags.integrity)),
        file_field(record, || yes_no(record.is_file_missing())),
        file_field(record, || {
            let access = if record.is_private { "Private" } else { "Public" };
            access.to_string()
        }),
        format_timestamp(record.archive_classification_date),
        inputs.archived_by_name.clone(),
        format_timestamp(Some(record.created_at)),
        format_timestamp(record.deleted_date),
        inputs.deleted_by_name.clone(),
        yes_no(active_usage_detected(record, inputs.live_usage_count)),
        yes_no(record.was_archived_while_in_use()),
        if record.was_archived_while_in_use() {
            record.usage_count_at_archive.to_string()
        } else {
            String::new()
        },
        exemption_voided_text(record).to_string(),
        yes_no(record.flags.prior_void),
    ]
}

/// File-specific fields: manual entries first, then queued, then the value.
fn file_field(record: &ArchiveRecord, value: impl FnOnce() -> String) -> String {
    if record.is_manual_entry() {
        NA_FILE_ONLY.to_string()
    } else if record.is_queued() {
        NA_NOT_YET_ARCHIVED.to_string()
    } else {
        value()
    }
}

/// Usage flag, or for deleted records a positive live count.
///
/// Flags can be stale once the asset is deleted, so the live count is
/// consulted independently.
pub fn active_usage_detected(record: &ArchiveRecord, live_usage_count: Option<i64>) -> bool {
    record.flags.usage
        || (record.is_archived_deleted() && live_usage_count.is_some_and(|n| n > 0))
}

/// Text for the "Exemption Voided / Modified" column.
///
/// Legacy archives void through their status; general archives through the
/// `modified` flag (manual entries) or the `integrity` flag (files).
pub fn exemption_voided_text(record: &ArchiveRecord) -> &'static str {
    match (record.archive_type(), record.entry_kind(), record.is_voided()) {
        (ArchiveType::Legacy, EntryKind::Manual, true) => {
            "Yes - Content modified after archive; legacy exemption voided"
        }
        (ArchiveType::Legacy, EntryKind::File, true) => {
            "Yes - File modified after archive; legacy exemption voided"
        }
        (ArchiveType::Legacy, EntryKind::Manual, false) => {
            "No - Legacy exemption intact (content unchanged)"
        }
        (ArchiveType::Legacy, EntryKind::File, false) => {
            "No - Legacy exemption intact (file unchanged)"
        }
        (ArchiveType::General, EntryKind::Manual, true) => {
            "Yes - Content modified after archive; removed from public view"
        }
        (ArchiveType::General, EntryKind::File, true) => {
            "Yes - File checksum mismatch after archive; removed from public view"
        }
        (ArchiveType::General, EntryKind::Manual, false) => "No - Content unchanged since archive",
        (ArchiveType::General, EntryKind::File, false) => "No - File checksum verified",
    }
}

fn yes_no(value: bool) -> String {
    let text = if value { "Yes" } else { "No" };
    text.to_string()
}

/// ISO-8601 UTC with second precision; empty when absent.
pub fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

// =============================================================================
// PATHS AND URLS
// =============================================================================

static STORAGE_URI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("valid storage URI regex"));

static HOST_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(https?://[^/?#]+)").expect("valid host prefix regex"));

/// How a stored path is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// `http://` or `https://`.
    AbsoluteUrl,
    /// `public://`, `private://` or another storage scheme.
    StorageUri,
    /// Already a web path such as `/node/12`.
    PublicPath,
}

pub fn classify_path(path: &str) -> PathKind {
    let trimmed = path.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        PathKind::AbsoluteUrl
    } else if STORAGE_URI.is_match(trimmed) {
        PathKind::StorageUri
    } else {
        PathKind::PublicPath
    }
}

/// Original URL for a stored path; unresolvable storage URIs are echoed.
pub fn resolve_original_url(path: &str, resolver: &dyn FileUrlResolver) -> String {
    let trimmed = path.trim();
    match classify_path(trimmed) {
        PathKind::StorageUri => resolver
            .resolve(trimmed)
            .unwrap_or_else(|| trimmed.to_string()),
        PathKind::AbsoluteUrl | PathKind::PublicPath => trimmed.to_string(),
    }
}

/// `scheme://host[:port]` prefix of an absolute URL, or empty.
pub fn site_base(url: &str) -> String {
    HOST_PREFIX
        .captures(url.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// `{base}/archive-registry/{id}`; a bare relative path when base is empty.
pub fn reference_path(base: &str, id: Uuid) -> String {
    format!(
        "{}{}/{}",
        base.trim_end_matches('/'),
        ARCHIVE_REGISTRY_PATH,
        id
    )
}

/// Original URL and site base for a record.
///
/// External links point off-site, so their host is never used as the base.
pub fn locate(record: &ArchiveRecord, resolver: &dyn FileUrlResolver) -> (String, String) {
    let original_url = resolve_original_url(&record.original_path, resolver);
    let base = if record.asset_type == AssetType::External {
        String::new()
    } else {
        site_base(&original_url)
    };
    (original_url, base)
}

// =============================================================================
// CSV ENCODING
// =============================================================================

/// Quote a field containing a comma, quote or line break; double quotes.
///
/// Carriage returns are normalised to LF so the body stays CR-free.
pub fn encode_field(value: &str) -> String {
    let value = value.replace("\r\n", "\n").replace('\r', "\n");
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value
    }
}

pub fn encode_line<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| encode_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Header plus one line per row, LF-joined. Zero rows yields the header.
pub fn render_csv(rows: &[AuditRow]) -> String {
    std::iter::once(encode_line(&AUDIT_COLUMNS))
        .chain(rows.iter().map(|row| encode_line(row)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn export_filename(date: NaiveDate) -> String {
    format!(
        "{}-{}.csv",
        AUDIT_EXPORT_FILENAME_PREFIX,
        date.format("%Y-%m-%d")
    )
}
