//! Property tests for visibility, archive typing and audit CSV output.
//!
//! Each test sweeps the relevant flag space rather than picking a single
//! sample record.

use chrono::{TimeZone, Utc};
use dai_core::audit::{self, build_row, encode_field, render_csv, AuditRow};
use dai_core::{
    resolve, ArchiveFlags, ArchiveReason, ArchiveRecord, ArchiveStatus, AssetType, AuditInputs,
    DisclosureLevel, Visibility, AUDIT_COLUMNS,
};
use uuid::Uuid;

const FILE_MISSING_COL: usize = 12;
const CHECKSUM_COL: usize = 10;
const INTEGRITY_COL: usize = 11;
const ACCESS_COL: usize = 13;
const ARCHIVE_TYPE_COL: usize = 3;
const EXEMPTION_COL: usize = 22;

fn record(status: ArchiveStatus, asset_type: AssetType, flags: ArchiveFlags) -> ArchiveRecord {
    ArchiveRecord {
        id: Uuid::from_u128(0x1d),
        file_name: "budget-2019.pdf".to_string(),
        status,
        asset_type,
        flags,
        is_private: false,
        archive_reason: ArchiveReason::Recordkeeping,
        archive_reason_other: None,
        public_description: Some("FY2019 adopted budget".to_string()),
        created_at: Utc.with_ymd_and_hms(2019, 6, 30, 12, 0, 0).unwrap(),
        archive_classification_date: Some(Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap()),
        deleted_date: None,
        archived_by: None,
        deleted_by: None,
        filesize: Some(48_213),
        file_checksum: Some("9f86d081884c7d65".to_string()),
        usage_count_at_archive: 0,
        original_path: "public://budget-2019.pdf".to_string(),
        archive_path: None,
    }
}

/// All 64 combinations of the six condition flags.
fn all_flags() -> Vec<ArchiveFlags> {
    (0u8..64)
        .map(|bits| ArchiveFlags {
            missing: bits & 1 != 0,
            integrity: bits & 2 != 0,
            usage: bits & 4 != 0,
            modified: bits & 8 != 0,
            prior_void: bits & 16 != 0,
            late_archive: bits & 32 != 0,
        })
        .collect()
}

fn all_statuses() -> Vec<ArchiveStatus> {
    vec![
        ArchiveStatus::Queued,
        ArchiveStatus::ArchivedPublic,
        ArchiveStatus::ArchivedAdmin,
        ArchiveStatus::ArchivedDeleted,
        ArchiveStatus::ExemptionVoid,
    ]
}

fn row(record: &ArchiveRecord) -> AuditRow {
    build_row(record, &AuditInputs::default())
}

/// Minimal RFC 4180 reader for one record, used to check the encoder.
fn decode_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut quoted = false;

    while let Some(c) = chars.next() {
        match (quoted, c) {
            (true, '"') if chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            (true, '"') => quoted = false,
            (true, c) => field.push(c),
            (false, '"') if field.is_empty() => quoted = true,
            (false, ',') => fields.push(std::mem::take(&mut field)),
            (false, c) => field.push(c),
        }
    }
    fields.push(field);
    fields
}

#[test]
fn test_deleted_and_void_never_visible() {
    for status in [ArchiveStatus::ArchivedDeleted, ArchiveStatus::ExemptionVoid] {
        for flags in all_flags() {
            for private in [false, true] {
                let mut r = record(status.clone(), AssetType::Pdf, flags);
                r.is_private = private;
                for (auth, perm) in [(false, false), (true, false), (true, true)] {
                    assert_eq!(
                        resolve(&r, auth, perm),
                        Visibility::NotFound,
                        "{:?} {:?} auth={} perm={}",
                        status,
                        flags,
                        auth,
                        perm
                    );
                }
            }
        }
    }
}

#[test]
fn test_missing_file_hides_public_but_not_admin() {
    for mut flags in all_flags() {
        flags.missing = true;
        let public = record(ArchiveStatus::ArchivedPublic, AssetType::Pdf, flags);
        let admin = record(ArchiveStatus::ArchivedAdmin, AssetType::Pdf, flags);
        for (auth, perm) in [(false, false), (true, true)] {
            assert_eq!(resolve(&public, auth, perm), Visibility::NotFound);
            let visibility = resolve(&admin, auth, perm);
            assert!(visibility.is_visible());
            assert!(visibility.disclosure().unwrap().missing_notice);
        }
    }
}

#[test]
fn test_limited_disclosure_iff_admin_without_permission() {
    for status in all_statuses() {
        for flags in all_flags() {
            let r = record(status.clone(), AssetType::Word, flags);
            for (auth, perm) in [(false, false), (true, false), (true, true)] {
                let Some(disclosure) = resolve(&r, auth, perm).disclosure() else {
                    continue;
                };
                let expected = if status == ArchiveStatus::ArchivedAdmin && !perm {
                    DisclosureLevel::Limited
                } else {
                    DisclosureLevel::Full
                };
                assert_eq!(disclosure.level, expected, "{:?} perm={}", status, perm);
            }
        }
    }
}

#[test]
fn test_login_required_for_private_anonymous_only() {
    let mut r = record(ArchiveStatus::ArchivedPublic, AssetType::Pdf, ArchiveFlags::default());
    r.is_private = true;
    assert!(resolve(&r, false, false).disclosure().unwrap().login_required);
    assert!(!resolve(&r, true, false).disclosure().unwrap().login_required);
}

#[test]
fn test_archive_type_label_follows_late_archive() {
    for status in all_statuses() {
        for flags in all_flags() {
            let r = record(status.clone(), AssetType::Excel, flags);
            let expected = if flags.late_archive {
                "General Archive"
            } else {
                "Legacy Archive"
            };
            assert_eq!(row(&r)[ARCHIVE_TYPE_COL], expected);
        }
    }
}

#[test]
fn test_empty_export_is_header_only() {
    let body = render_csv(&[]);
    assert_eq!(body.lines().count(), 1);
    assert!(!body.ends_with('\n'));
    assert_eq!(decode_line(&body), AUDIT_COLUMNS.to_vec());
}

#[test]
fn test_field_encoding_round_trips() {
    let original = "a,\"b\"\nc";
    let encoded = encode_field(original);
    assert_eq!(encoded, "\"a,\"\"b\"\"\nc\"");
    assert_eq!(decode_line(&encoded), vec![original.to_string()]);
}

/// Exact round trip holds for LF-only values. CR and CRLF come back as LF
/// so the export body never carries a carriage return.
#[test]
fn test_carriage_returns_decode_as_line_feeds() {
    for original in ["a,\"b\"\r\nc", "a\rb", "x\r\n\r\ny"] {
        let encoded = encode_field(original);
        assert!(!encoded.contains('\r'));

        let decoded = decode_line(&encoded);
        assert_ne!(decoded, vec![original.to_string()]);
        assert_eq!(decoded, vec![original.replace("\r\n", "\n").replace('\r', "\n")]);
    }
}

#[test]
fn test_rows_decode_to_24_fields() {
    let mut r = record(ArchiveStatus::ArchivedPublic, AssetType::Pdf, ArchiveFlags::default());
    r.public_description = Some("Adopted, then \"amended\"".to_string());
    let line = audit::encode_line(&row(&r));
    let fields = decode_line(&line);
    assert_eq!(fields.len(), 24);
    assert_eq!(fields[6], "Adopted, then \"amended\"");
}

#[test]
fn test_exemption_voided_four_scenarios() {
    let legacy_page = record(ArchiveStatus::ExemptionVoid, AssetType::Page, ArchiveFlags::default());
    let legacy_file = record(ArchiveStatus::ExemptionVoid, AssetType::Pdf, ArchiveFlags::default());
    let general_page = record(
        ArchiveStatus::ArchivedPublic,
        AssetType::Page,
        ArchiveFlags {
            late_archive: true,
            modified: true,
            ..ArchiveFlags::default()
        },
    );
    let general_file = record(
        ArchiveStatus::ArchivedPublic,
        AssetType::Pdf,
        ArchiveFlags {
            late_archive: true,
            integrity: true,
            ..ArchiveFlags::default()
        },
    );

    let texts: Vec<String> = [&legacy_page, &legacy_file, &general_page, &general_file]
        .iter()
        .map(|r| row(r)[EXEMPTION_COL].clone())
        .collect();

    assert!(texts[0].starts_with("Yes - Content modified"));
    assert!(texts[0].contains("legacy exemption voided"));
    assert!(texts[1].starts_with("Yes - File modified"));
    assert!(texts[2].contains("removed from public view"));
    assert!(texts[3].starts_with("Yes - File checksum mismatch"));
    for i in 0..texts.len() {
        for j in (i + 1)..texts.len() {
            assert_ne!(texts[i], texts[j]);
        }
    }
}

#[test]
fn test_general_archive_voiding_ignores_the_other_flag() {
    // A general manual entry reads `modified` only, a file reads `integrity` only.
    let page = record(
        ArchiveStatus::ArchivedPublic,
        AssetType::External,
        ArchiveFlags {
            late_archive: true,
            integrity: true,
            ..ArchiveFlags::default()
        },
    );
    assert_eq!(row(&page)[EXEMPTION_COL], "No - Content unchanged since archive");

    let file = record(
        ArchiveStatus::ArchivedPublic,
        AssetType::Pdf,
        ArchiveFlags {
            late_archive: true,
            modified: true,
            ..ArchiveFlags::default()
        },
    );
    assert_eq!(row(&file)[EXEMPTION_COL], "No - File checksum verified");
}

#[test]
fn test_queued_file_fields_not_yet_archived() {
    for flags in all_flags() {
        let mut r = record(ArchiveStatus::Queued, AssetType::Pdf, flags);
        r.is_private = flags.usage;
        r.deleted_date = flags.prior_void.then(Utc::now);
        let fields = row(&r);
        for col in [CHECKSUM_COL, INTEGRITY_COL, FILE_MISSING_COL, ACCESS_COL] {
            assert_eq!(fields[col], audit::NA_NOT_YET_ARCHIVED, "{:?}", flags);
        }
    }
}

#[test]
fn test_manual_entry_precedes_queued() {
    let r = record(ArchiveStatus::Queued, AssetType::External, ArchiveFlags::default());
    let fields = row(&r);
    for col in [CHECKSUM_COL, INTEGRITY_COL, FILE_MISSING_COL, ACCESS_COL] {
        assert_eq!(fields[col], audit::NA_FILE_ONLY);
    }
}

#[test]
fn test_file_missing_ors_flag_and_deleted_date() {
    let mut r = record(ArchiveStatus::ArchivedDeleted, AssetType::Pdf, ArchiveFlags::default());
    assert_eq!(row(&r)[FILE_MISSING_COL], "No");
    r.deleted_date = Some(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
    assert_eq!(row(&r)[FILE_MISSING_COL], "Yes");
}
