//! Reason, status and asset-type labels.
//!
//! Unknown codes fall back to the raw code (upper-cased for asset types)
//! instead of being dropped.

use crate::models::{ArchiveReason, ArchiveRecord, ArchiveStatus, AssetType};

/// Label used for the `other` reason when no free text was entered.
pub const OTHER_REASON_LABEL: &str = "Other";

/// Human-readable description of an archive reason.
///
/// `other` defers to the free-text `other_text`, falling back to
/// [`OTHER_REASON_LABEL`] when that text is empty.
pub fn reason_label(reason: &ArchiveReason, other_text: Option<&str>) -> String {
    match reason {
        ArchiveReason::Reference => "Reference: retained for reference purposes".to_string(),
        ArchiveReason::Research => "Research: retained for research or study".to_string(),
        ArchiveReason::Recordkeeping => {
            "Recordkeeping: retained to meet recordkeeping requirements".to_string()
        }
        ArchiveReason::Other => other_text
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .unwrap_or(OTHER_REASON_LABEL)
            .to_string(),
        ArchiveReason::Unknown(code) => code.clone(),
    }
}

/// Reason label for a record, applying its `archive_reason_other` text.
pub fn record_reason_label(record: &ArchiveRecord) -> String {
    reason_label(
        &record.archive_reason,
        record.archive_reason_other.as_deref(),
    )
}

/// Human-readable status.
pub fn status_label(status: &ArchiveStatus) -> String {
    let label = match status {
        ArchiveStatus::Queued => "Queued for Archive",
        ArchiveStatus::ArchivedPublic => "Archived (Public)",
        ArchiveStatus::ArchivedAdmin => "Archived (Admin Only)",
        ArchiveStatus::ArchivedDeleted => "Archived (Deleted)",
        ArchiveStatus::ExemptionVoid => "Exemption Void",
        ArchiveStatus::Unknown(code) => return code.clone(),
    };
    label.to_string()
}

/// Human-readable asset type.
pub fn asset_type_label(asset_type: &AssetType) -> String {
    let label = match asset_type {
        AssetType::Pdf => "PDF",
        AssetType::Word => "Word Document",
        AssetType::Excel => "Excel Spreadsheet",
        AssetType::PowerPoint => "PowerPoint Presentation",
        AssetType::Page => "Web Page",
        AssetType::External => "External Resource",
        AssetType::Text => "Text File",
        AssetType::Csv => "CSV File",
        AssetType::Image => "Image",
        AssetType::Video => "Video",
        AssetType::Audio => "Audio",
        AssetType::Compressed => "Compressed Archive",
        AssetType::Other(code) => return code.to_uppercase(),
    };
    label.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_reason_labels_are_distinct() {
        let labels = [
            reason_label(&ArchiveReason::Reference, None),
            reason_label(&ArchiveReason::Research, None),
            reason_label(&ArchiveReason::Recordkeeping, None),
        ];
        assert_ne!(labels[0], labels[1]);
        assert_ne!(labels[1], labels[2]);
        assert!(labels[0].starts_with("Reference"));
    }

    #[test]
    fn test_other_reason_uses_free_text() {
        assert_eq!(
            reason_label(&ArchiveReason::Other, Some("  Board minutes  ")),
            "Board minutes"
        );
    }

    #[test]
    fn test_other_reason_falls_back_when_empty() {
        assert_eq!(reason_label(&ArchiveReason::Other, None), "Other");
        assert_eq!(reason_label(&ArchiveReason::Other, Some("   ")), "Other");
    }

    #[test]
    fn test_free_text_ignored_for_static_reasons() {
        assert_eq!(
            reason_label(&ArchiveReason::Research, Some("ignored")),
            reason_label(&ArchiveReason::Research, None)
        );
    }

    #[test]
    fn test_unknown_reason_returns_raw_code() {
        assert_eq!(
            reason_label(&ArchiveReason::Unknown("legal_hold".to_string()), None),
            "legal_hold"
        );
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(status_label(&ArchiveStatus::ArchivedAdmin), "Archived (Admin Only)");
        assert_eq!(
            status_label(&ArchiveStatus::Unknown("retired".to_string())),
            "retired"
        );
    }

    #[test]
    fn test_asset_type_unknown_is_uppercased() {
        assert_eq!(asset_type_label(&AssetType::Other("odt".to_string())), "ODT");
        assert_eq!(asset_type_label(&AssetType::PowerPoint), "PowerPoint Presentation");
    }
}
