//! Centralized default constants for the digital asset archive.
//!
//! Organized by domain area. Crates reference these constants instead of
//! defining their own magic numbers.

// =============================================================================
// ROUTES
// =============================================================================

/// Public route prefix for archive detail pages.
pub const ARCHIVE_REGISTRY_PATH: &str = "/archive-registry";

/// Login route offered to anonymous viewers of private files.
pub const LOGIN_PATH: &str = "/user/login";

// =============================================================================
// NOTES
// =============================================================================

/// Maximum characters in a single archive note.
pub const NOTE_MAX_CHARS: usize = 500;

/// Default page size for the notes page.
pub const NOTES_PAGE_LIMIT: i64 = 25;

/// Largest page size a caller may request for the notes page.
pub const NOTES_PAGE_LIMIT_MAX: i64 = 100;

/// Display name used when a note author cannot be resolved.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

// =============================================================================
// FILE URLS
// =============================================================================

/// Web path that serves `public://` storage.
pub const PUBLIC_FILES_PATH: &str = "/sites/default/files";

/// Web path that serves `private://` storage (access-checked).
pub const PRIVATE_FILES_PATH: &str = "/system/files";

// =============================================================================
// AUDIT EXPORT
// =============================================================================

/// Content type of the audit export.
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Cache-Control header of the audit export.
pub const CSV_CACHE_CONTROL: &str = "no-cache, no-store, must-revalidate";

/// Filename prefix of the audit export; the date and `.csv` are appended.
pub const AUDIT_EXPORT_FILENAME_PREFIX: &str = "archive-audit-export";

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Default rate limit: max requests per period.
pub const RATE_LIMIT_REQUESTS: u64 = 100;

/// Default rate limit: period in seconds.
pub const RATE_LIMIT_PERIOD_SECS: u64 = 60;

/// Default CORS max-age in seconds (1 hour).
pub const CORS_MAX_AGE_SECS: u64 = 3600;

/// Maximum request body size in bytes. Only note submissions carry a body.
pub const MAX_BODY_SIZE_BYTES: usize = 64 * 1024;

/// Prefix of API key bearer tokens.
pub const API_KEY_PREFIX: &str = "dai_key_";
