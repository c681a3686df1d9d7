//! Data contracts for the detail, registry and notes pages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults::{ARCHIVE_REGISTRY_PATH, LOGIN_PATH};
use crate::models::{ArchiveRecord, AssetType};
use crate::visibility::{Disclosure, DisclosureLevel};

/// Link to the archived source, labelled by asset type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SourceLink {
    pub label: String,
    pub tooltip: String,
    pub url: String,
}

/// Detail page for one archive record.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ArchiveDetail {
    pub id: Uuid,
    pub file_name: String,
    pub asset_type: String,
    pub archive_type: String,
    pub status: String,
    pub archive_reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_description: Option<String>,
    pub archived_on: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filesize: Option<i64>,
    pub is_manual_entry: bool,
    pub disclosure: DisclosureLevel,
    pub login_required: bool,
    /// Admin-only record whose file is absent from storage.
    pub file_missing: bool,
    /// Present only with full disclosure of an available, accessible file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_link: Option<SourceLink>,
    pub archived_while_in_use: bool,
}

/// One line of the public archive registry.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RegistryEntry {
    pub id: Uuid,
    pub file_name: String,
    pub asset_type: String,
    pub archive_type: String,
    pub archive_reason: String,
    pub archived_on: Option<DateTime<Utc>>,
    pub disclosure: DisclosureLevel,
    pub detail_path: String,
}

/// Summary block shown above the notes list.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ArchiveSummary {
    pub id: Uuid,
    pub file_name: String,
    pub asset_type: String,
    pub archive_type: String,
    pub status: String,
    pub archive_reason: String,
    pub archived_on: Option<DateTime<Utc>>,
    pub archived_by: String,
}

/// A note with its author resolved for display.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct NoteView {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author_name: String,
}

/// Pagination metadata for the notes list. `page` is zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct NotesPagination {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub has_more: bool,
}

/// Notes page for one archive record.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ArchiveNotesPage {
    pub archive: ArchiveSummary,
    pub notes: Vec<NoteView>,
    pub pagination: NotesPagination,
    pub can_add_note: bool,
}

/// Path of a record's detail page, relative to the site root.
pub fn detail_path(id: Uuid) -> String {
    format!("{}/{}", ARCHIVE_REGISTRY_PATH, id)
}

/// Source link for a visible record.
///
/// `file_url` is the resolved archived file, used for file-backed records.
/// Limited disclosure never gets a link.
pub fn source_link(
    record: &ArchiveRecord,
    disclosure: &Disclosure,
    file_url: Option<&str>,
) -> Option<SourceLink> {
    if disclosure.level == DisclosureLevel::Limited {
        return None;
    }

    match record.asset_type {
        AssetType::External => Some(SourceLink {
            label: "Visit Link".to_string(),
            tooltip: "Open the external resource in a new window".to_string(),
            url: record.original_path.clone(),
        }),
        AssetType::Page => Some(SourceLink {
            label: "View Page".to_string(),
            tooltip: "View the archived page".to_string(),
            url: record.original_path.clone(),
        }),
        _ if disclosure.missing_notice => None,
        _ if disclosure.login_required => Some(SourceLink {
            label: "Download (Login Required)".to_string(),
            tooltip: "Log in to download this file".to_string(),
            url: format!("{}?destination={}", LOGIN_PATH, detail_path(record.id)),
        }),
        _ => file_url.map(|url| SourceLink {
            label: "Download".to_string(),
            tooltip: format!("Download {}", record.file_name),
            url: url.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArchiveFlags, ArchiveReason, ArchiveStatus};

    fn record(asset_type: AssetType, original_path: &str) -> ArchiveRecord {
        ArchiveRecord {
            id: Uuid::nil(),
            file_name: "parks-plan.pdf".to_string(),
            status: ArchiveStatus::ArchivedPublic,
            asset_type,
            flags: ArchiveFlags::default(),
            is_private: false,
            archive_reason: ArchiveReason::Reference,
            archive_reason_other: None,
            public_description: None,
            created_at: Utc::now(),
            archive_classification_date: Some(Utc::now()),
            deleted_date: None,
            archived_by: None,
            deleted_by: None,
            filesize: None,
            file_checksum: None,
            usage_count_at_archive: 0,
            original_path: original_path.to_string(),
            archive_path: None,
        }
    }

    fn full() -> Disclosure {
        Disclosure {
            level: DisclosureLevel::Full,
            login_required: false,
            missing_notice: false,
        }
    }

    #[test]
    fn test_external_link_label() {
        let r = record(AssetType::External, "https://partner.org/doc");
        let link = source_link(&r, &full(), None).unwrap();
        assert_eq!(link.label, "Visit Link");
        assert_eq!(link.url, "https://partner.org/doc");
    }

    #[test]
    fn test_page_link_label() {
        let r = record(AssetType::Page, "/node/17");
        assert_eq!(source_link(&r, &full(), None).unwrap().label, "View Page");
    }

    #[test]
    fn test_file_download_label() {
        let r = record(AssetType::Pdf, "public://parks-plan.pdf");
        let link = source_link(&r, &full(), Some("https://a.gov/f/parks-plan.pdf")).unwrap();
        assert_eq!(link.label, "Download");
        assert_eq!(link.url, "https://a.gov/f/parks-plan.pdf");
    }

    #[test]
    fn test_login_required_label() {
        let r = record(AssetType::Pdf, "private://parks-plan.pdf");
        let disclosure = Disclosure {
            login_required: true,
            ..full()
        };
        let link = source_link(&r, &disclosure, None).unwrap();
        assert_eq!(link.label, "Download (Login Required)");
        assert!(link.url.starts_with("/user/login?destination=/archive-registry/"));
    }

    #[test]
    fn test_limited_disclosure_has_no_link() {
        let r = record(AssetType::External, "https://partner.org/doc");
        let disclosure = Disclosure {
            level: DisclosureLevel::Limited,
            ..full()
        };
        assert!(source_link(&r, &disclosure, Some("x")).is_none());
    }

    #[test]
    fn test_missing_file_has_no_link() {
        let r = record(AssetType::Pdf, "public://parks-plan.pdf");
        let disclosure = Disclosure {
            missing_notice: true,
            ..full()
        };
        assert!(source_link(&r, &disclosure, Some("x")).is_none());
    }
}
