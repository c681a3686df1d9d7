//! Visibility resolution for archive detail pages.
//!
//! Decides whether a record's detail page exists for a viewer and, if so,
//! how much of it is disclosed. Admin-only status controls what is rendered,
//! never where the file is stored or how it is permissioned.

use serde::{Deserialize, Serialize};

use crate::models::{ArchiveRecord, ArchiveStatus, Permission};
use crate::traits::PermissionCheck;

/// How much of a visible record is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DisclosureLevel {
    /// Metadata plus file URL and download affordance.
    Full,
    /// Metadata only.
    Limited,
}

/// Rendering instructions for a visible record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disclosure {
    pub level: DisclosureLevel,
    /// Private file and anonymous viewer: offer login instead of a link.
    pub login_required: bool,
    /// Admin-only record whose file is missing: show the notice.
    pub missing_notice: bool,
}

/// Outcome of resolving a record for a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    NotFound,
    Visible(Disclosure),
}

impl Visibility {
    pub fn is_visible(&self) -> bool {
        matches!(self, Visibility::Visible(_))
    }

    pub fn disclosure(&self) -> Option<Disclosure> {
        match self {
            Visibility::Visible(d) => Some(*d),
            Visibility::NotFound => None,
        }
    }
}

/// Resolve a record's detail-page visibility.
///
/// Deleted, voided, queued and unknown statuses are never individually
/// viewable; the audit export is the only way to see them.
pub fn resolve(
    record: &ArchiveRecord,
    viewer_is_authenticated: bool,
    viewer_has_permission: bool,
) -> Visibility {
    let level = match &record.status {
        ArchiveStatus::ArchivedPublic => {
            if record.flags.missing {
                return Visibility::NotFound;
            }
            DisclosureLevel::Full
        }
        ArchiveStatus::ArchivedAdmin => {
            if viewer_has_permission {
                DisclosureLevel::Full
            } else {
                DisclosureLevel::Limited
            }
        }
        _ => return Visibility::NotFound,
    };

    Visibility::Visible(Disclosure {
        level,
        login_required: record.is_private && !viewer_is_authenticated,
        missing_notice: record.is_archived_admin()
            && !record.is_manual_entry()
            && record.flags.missing,
    })
}

/// Resolve for a viewer, using the archive view permission.
pub fn resolve_for(record: &ArchiveRecord, viewer: &dyn PermissionCheck) -> Visibility {
    resolve(
        record,
        viewer.is_authenticated(),
        viewer.has_permission(Permission::ViewArchives),
    )
}
