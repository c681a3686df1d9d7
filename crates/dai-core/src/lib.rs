//! # dai-core
//!
//! Core types, traits, and rules for the digital asset archive.
//!
//! This crate holds the archive lifecycle and disclosure engine: the
//! status/flag model, the visibility resolver, the audit row builder, and
//! the reason/label catalog. Storage, identity, file-URL and permission
//! concerns are reached only through the traits in [`traits`].

pub mod audit;
pub mod catalog;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod logging;
pub mod memory;
pub mod models;
pub mod pages;
pub mod traits;
pub mod uuid_utils;
pub mod visibility;

// Re-export commonly used types at crate root
pub use audit::{AuditExport, AuditInputs, AUDIT_COLUMNS};
pub use engine::ArchiveService;
pub use error::{Error, Result};
pub use memory::InMemoryStore;
pub use models::*;
pub use pages::*;
pub use traits::*;
pub use uuid_utils::{is_v7, new_v7};
pub use visibility::{resolve, Disclosure, DisclosureLevel, Visibility};
