//! Archive lifecycle and disclosure engine.
//!
//! [`ArchiveService`] ties the visibility resolver, audit row builder and
//! label catalog to the collaborator traits. Detail and notes requests pass
//! the resolver first; the audit export deliberately bypasses it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::audit::{self, AuditExport, AuditInputs, AuditRow};
use crate::catalog::{asset_type_label, record_reason_label, status_label};
use crate::defaults::{NOTES_PAGE_LIMIT, NOTES_PAGE_LIMIT_MAX, NOTE_MAX_CHARS, UNKNOWN_AUTHOR};
use crate::error::{Error, Result};
use crate::models::{ArchiveNote, ArchiveRecord, CreateArchiveNoteRequest, Permission};
use crate::pages::{
    detail_path, source_link, ArchiveDetail, ArchiveNotesPage, ArchiveSummary, NoteView,
    NotesPagination, RegistryEntry,
};
use crate::traits::{
    ArchiveNoteRepository, ArchiveRepository, FileUrlResolver, IdentityLookup, PermissionCheck,
};
use crate::visibility::{resolve_for, Disclosure, DisclosureLevel};

/// Memoises display names for the duration of one request.
type NameCache = HashMap<Uuid, Option<String>>;

/// Archive engine with injected collaborators.
#[derive(Clone)]
pub struct ArchiveService {
    archives: Arc<dyn ArchiveRepository>,
    notes: Arc<dyn ArchiveNoteRepository>,
    identities: Arc<dyn IdentityLookup>,
    file_urls: Arc<dyn FileUrlResolver>,
    notes_page_limit: i64,
}

impl ArchiveService {
    pub fn new(
        archives: Arc<dyn ArchiveRepository>,
        notes: Arc<dyn ArchiveNoteRepository>,
        identities: Arc<dyn IdentityLookup>,
        file_urls: Arc<dyn FileUrlResolver>,
    ) -> Self {
        Self {
            archives,
            notes,
            identities,
            file_urls,
            notes_page_limit: NOTES_PAGE_LIMIT,
        }
    }

    /// Default notes page size, clamped to `1..=NOTES_PAGE_LIMIT_MAX`.
    pub fn with_notes_page_limit(mut self, limit: i64) -> Self {
        self.notes_page_limit = limit.clamp(1, NOTES_PAGE_LIMIT_MAX);
        self
    }

    // =========================================================================
    // DETAIL AND REGISTRY
    // =========================================================================

    /// Detail page for a record.
    ///
    /// Hidden records are reported exactly like absent ones.
    pub async fn detail(&self, id: Uuid, viewer: &dyn PermissionCheck) -> Result<ArchiveDetail> {
        let record = self
            .archives
            .fetch(id)
            .await?
            .ok_or(Error::ArchiveNotFound(id))?;

        let Some(disclosure) = resolve_for(&record, viewer).disclosure() else {
            debug!(
                subsystem = "engine",
                component = "visibility",
                op = "detail",
                archive_id = %id,
                status = record.status.as_str(),
                "Archive hidden from viewer"
            );
            return Err(Error::ArchiveNotFound(id));
        };

        Ok(self.build_detail(&record, &disclosure))
    }

    /// Every record the viewer may open, newest classification first.
    pub async fn registry(&self, viewer: &dyn PermissionCheck) -> Result<Vec<RegistryEntry>> {
        let records = self.archives.list_by_classification_date().await?;
        let entries: Vec<RegistryEntry> = records
            .iter()
            .filter_map(|record| {
                resolve_for(record, viewer)
                    .disclosure()
                    .map(|d| RegistryEntry {
                        id: record.id,
                        file_name: record.file_name.clone(),
                        asset_type: asset_type_label(&record.asset_type),
                        archive_type: record.archive_type().label().to_string(),
                        archive_reason: record_reason_label(record),
                        archived_on: record.archive_classification_date,
                        disclosure: d.level,
                        detail_path: detail_path(record.id),
                    })
            })
            .collect();

        debug!(
            subsystem = "engine",
            component = "visibility",
            op = "registry",
            result_count = entries.len(),
            "Archive registry resolved"
        );
        Ok(entries)
    }

    fn build_detail(&self, record: &ArchiveRecord, disclosure: &Disclosure) -> ArchiveDetail {
        let full = disclosure.level == DisclosureLevel::Full;
        let file_url = if full
            && !record.is_manual_entry()
            && !disclosure.missing_notice
            && !disclosure.login_required
        {
            let stored = record
                .archive_path
                .as_deref()
                .unwrap_or(&record.original_path);
            Some(audit::resolve_original_url(stored, self.file_urls.as_ref()))
        } else {
            None
        };

        ArchiveDetail {
            id: record.id,
            file_name: record.file_name.clone(),
            asset_type: asset_type_label(&record.asset_type),
            archive_type: record.archive_type().label().to_string(),
            status: status_label(&record.status),
            archive_reason: record_reason_label(record),
            public_description: record.public_description.clone(),
            archived_on: record.archive_classification_date,
            filesize: record.filesize,
            is_manual_entry: record.is_manual_entry(),
            disclosure: disclosure.level,
            login_required: disclosure.login_required,
            file_missing: disclosure.missing_notice,
            source_link: source_link(record, disclosure, file_url.as_deref()),
            file_url,
            archived_while_in_use: record.was_archived_while_in_use(),
        }
    }

    // =========================================================================
    // NOTES
    // =========================================================================

    /// Notes page. Existence is revealed to any viewer of a reachable
    /// record; entry needs the view permission.
    pub async fn notes_page(
        &self,
        id: Uuid,
        viewer: &dyn PermissionCheck,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<ArchiveNotesPage> {
        let record = self.reachable_record(id).await?;

        if !viewer.has_permission(Permission::ViewArchives) {
            return Err(Error::AccessDenied(
                "Viewing archive notes requires archive permission".to_string(),
            ));
        }

        let limit = limit
            .unwrap_or(self.notes_page_limit)
            .clamp(1, NOTES_PAGE_LIMIT_MAX);
        let page = page.unwrap_or(0).max(0);
        let offset = page.saturating_mul(limit);

        let total = self.notes.count_for_archive(id).await?;
        let notes = self.notes.list_for_archive(id, limit, offset).await?;

        let mut names = NameCache::new();
        let mut views = Vec::with_capacity(notes.len());
        for note in notes {
            let author_name = self
                .display_name(note.author, &mut names)
                .await
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
            views.push(NoteView {
                id: note.id,
                text: note.text,
                created_at: note.created_at,
                author_name,
            });
        }

        let archived_by = self
            .display_name(record.archived_by, &mut names)
            .await
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

        debug!(
            subsystem = "engine",
            component = "notes",
            op = "notes_page",
            archive_id = %id,
            page,
            limit,
            result_count = views.len(),
            "Notes page loaded"
        );

        Ok(ArchiveNotesPage {
            archive: ArchiveSummary {
                id: record.id,
                file_name: record.file_name.clone(),
                asset_type: asset_type_label(&record.asset_type),
                archive_type: record.archive_type().label().to_string(),
                status: status_label(&record.status),
                archive_reason: record_reason_label(&record),
                archived_on: record.archive_classification_date,
                archived_by,
            },
            pagination: NotesPagination {
                total,
                page,
                limit,
                has_more: offset + (views.len() as i64) < total,
            },
            notes: views,
            can_add_note: viewer.has_permission(Permission::ManageArchives),
        })
    }

    /// Append a note. Requires archive management permission.
    pub async fn add_note(
        &self,
        id: Uuid,
        viewer: &dyn PermissionCheck,
        text: &str,
    ) -> Result<ArchiveNote> {
        self.reachable_record(id).await?;

        if !viewer.has_permission(Permission::ManageArchives) {
            return Err(Error::AccessDenied(
                "Adding archive notes requires archive management permission".to_string(),
            ));
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InvalidInput("Note text cannot be empty".to_string()));
        }
        if text.chars().count() > NOTE_MAX_CHARS {
            return Err(Error::InvalidInput(format!(
                "Note text exceeds {} characters",
                NOTE_MAX_CHARS
            )));
        }

        let note = self
            .notes
            .insert(CreateArchiveNoteRequest {
                archive_id: id,
                text: text.to_string(),
                author: viewer.user_id(),
            })
            .await?;

        info!(
            subsystem = "engine",
            component = "notes",
            op = "add_note",
            archive_id = %id,
            note_id = %note.id,
            "Archive note added"
        );
        Ok(note)
    }

    /// Record for the notes surfaces; deleted and voided records are 404.
    async fn reachable_record(&self, id: Uuid) -> Result<ArchiveRecord> {
        let record = self
            .archives
            .fetch(id)
            .await?
            .ok_or(Error::ArchiveNotFound(id))?;
        if record.is_archived_deleted() || record.is_exemption_void() {
            return Err(Error::ArchiveNotFound(id));
        }
        Ok(record)
    }

    // =========================================================================
    // AUDIT EXPORT
    // =========================================================================

    /// Audit rows for every record, in classification-date order.
    ///
    /// Collaborator failures on a single row degrade that row's fields
    /// instead of failing the export.
    pub async fn audit_rows(&self) -> Result<Vec<AuditRow>> {
        let records = self.archives.list_by_classification_date().await?;
        let mut names = NameCache::new();
        let mut rows = Vec::with_capacity(records.len());

        for record in &records {
            let (original_url, site_base) = audit::locate(record, self.file_urls.as_ref());

            let live_usage_count = if record.is_archived_deleted() {
                match self.archives.live_usage_count(record.id).await {
                    Ok(count) => Some(count),
                    Err(e) => {
                        warn!(
                            subsystem = "engine",
                            component = "audit_export",
                            archive_id = %record.id,
                            error = %e,
                            "Live usage count unavailable, using stored flag"
                        );
                        None
                    }
                }
            } else {
                None
            };

            let inputs = AuditInputs {
                original_url,
                site_base,
                archived_by_name: self
                    .display_name(record.archived_by, &mut names)
                    .await
                    .unwrap_or_default(),
                deleted_by_name: self
                    .display_name(record.deleted_by, &mut names)
                    .await
                    .unwrap_or_default(),
                live_usage_count,
            };
            rows.push(audit::build_row(record, &inputs));
        }

        Ok(rows)
    }

    /// CSV export named for today's date.
    pub async fn audit_export(&self) -> Result<AuditExport> {
        self.audit_export_on(Utc::now().date_naive()).await
    }

    /// CSV export named for `date`.
    pub async fn audit_export_on(&self, date: NaiveDate) -> Result<AuditExport> {
        let start = Instant::now();
        let rows = self.audit_rows().await?;
        let export = AuditExport {
            filename: audit::export_filename(date),
            body: audit::render_csv(&rows),
            row_count: rows.len(),
        };

        info!(
            subsystem = "engine",
            component = "audit_export",
            op = "export",
            result_count = export.row_count,
            duration_ms = start.elapsed().as_millis() as u64,
            "Audit export built"
        );
        Ok(export)
    }

    // =========================================================================
    // IDENTITIES
    // =========================================================================

    /// Display name for an optional user; `None` when absent or unresolvable.
    async fn display_name(&self, user_id: Option<Uuid>, cache: &mut NameCache) -> Option<String> {
        let user_id = user_id?;
        if let Some(cached) = cache.get(&user_id) {
            return cached.clone();
        }

        let name = match self.identities.display_name(user_id).await {
            Ok(name) => name,
            Err(e) => {
                warn!(
                    subsystem = "engine",
                    component = "identity",
                    user_id = %user_id,
                    error = %e,
                    "Identity lookup failed, rendering as unknown"
                );
                None
            }
        };
        cache.insert(user_id, name.clone());
        name
    }
}
