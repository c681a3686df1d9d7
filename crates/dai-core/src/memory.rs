//! In-memory implementations of the collaborator traits.
//!
//! Used by tests and local demos; ordering matches the PostgreSQL
//! repositories.

use std::cmp::Reverse;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;
use crate::traits::*;
use crate::uuid_utils::new_v7;

/// Archive records, notes, users, usage counts and API keys held in memory.
#[derive(Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<ArchiveRecord>>,
    notes: RwLock<Vec<ArchiveNote>>,
    users: RwLock<HashMap<Uuid, String>>,
    usage: RwLock<HashMap<Uuid, i64>>,
    api_keys: RwLock<HashMap<String, ApiKey>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record.
    pub async fn put_record(&self, record: ArchiveRecord) {
        let mut records = self.records.write().await;
        records.retain(|r| r.id != record.id);
        records.push(record);
    }

    pub async fn put_user(&self, user_id: Uuid, display_name: &str) {
        self.users
            .write()
            .await
            .insert(user_id, display_name.to_string());
    }

    pub async fn set_live_usage(&self, archive_id: Uuid, count: i64) {
        self.usage.write().await.insert(archive_id, count);
    }

    /// Register a note with a fixed id and timestamp.
    pub async fn put_note(&self, note: ArchiveNote) {
        self.notes.write().await.push(note);
    }

    pub async fn put_api_key(&self, token: &str, key: ApiKey) {
        self.api_keys.write().await.insert(token.to_string(), key);
    }
}

#[async_trait]
impl ArchiveRepository for InMemoryStore {
    async fn fetch(&self, id: Uuid) -> Result<Option<ArchiveRecord>> {
        Ok(self.records.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn list_by_classification_date(&self) -> Result<Vec<ArchiveRecord>> {
        let mut records = self.records.read().await.clone();
        // DESC NULLS LAST, then id DESC
        records.sort_by_key(|r| {
            (
                r.archive_classification_date.is_none(),
                Reverse(r.archive_classification_date),
                Reverse(r.id),
            )
        });
        Ok(records)
    }

    async fn live_usage_count(&self, id: Uuid) -> Result<i64> {
        Ok(self.usage.read().await.get(&id).copied().unwrap_or(0))
    }
}

#[async_trait]
impl ArchiveNoteRepository for InMemoryStore {
    async fn insert(&self, req: CreateArchiveNoteRequest) -> Result<ArchiveNote> {
        let note = ArchiveNote {
            id: new_v7(),
            archive_id: req.archive_id,
            text: req.text,
            created_at: Utc::now(),
            author: req.author,
        };
        self.notes.write().await.push(note.clone());
        Ok(note)
    }

    async fn list_for_archive(
        &self,
        archive_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ArchiveNote>> {
        let mut notes: Vec<ArchiveNote> = self
            .notes
            .read()
            .await
            .iter()
            .filter(|n| n.archive_id == archive_id)
            .cloned()
            .collect();
        notes.sort_by_key(|n| Reverse((n.created_at, n.id)));
        Ok(notes
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_for_archive(&self, archive_id: Uuid) -> Result<i64> {
        Ok(self
            .notes
            .read()
            .await
            .iter()
            .filter(|n| n.archive_id == archive_id)
            .count() as i64)
    }
}

#[async_trait]
impl IdentityLookup for InMemoryStore {
    async fn display_name(&self, user_id: Uuid) -> Result<Option<String>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryStore {
    async fn validate_api_key(&self, token: &str) -> Result<Option<ApiKey>> {
        Ok(self
            .api_keys
            .read()
            .await
            .get(token)
            .filter(|k| !k.revoked)
            .cloned())
    }
}
