//! Save/list/get/delete for signed documents with quota recovery.
//!
//! The save path runs a fixed sequence: estimate usage, evict proactively
//! when space is low, compress the signature payload, truncate oversized
//! content, assign an id, prepend and persist. A quota error on persist
//! triggers one aggressive eviction (keep the 5 most recently signed) and
//! exactly one retry; only a second failure surfaces to the caller.

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::compress::compress_signature_payload;
use crate::constants::{
    AGGRESSIVE_KEEP, LOW_SPACE_WATERMARK, MAX_CONTENT_CHARS, MAX_DOCUMENTS, QUOTA_CEILING,
    STORAGE_KEY, TRUNCATION_MARKER,
};
use crate::kv::{KeyValueStore, StorageError};
use crate::record::{DocumentDraft, SignedDocument};

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Both the normal and aggressive-retry persist attempts failed.
    #[error("Failed to save document, storage may be full")]
    StorageFull,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Failed to encode record list: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// How a save reached success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveRecovery {
    /// Persisted on the first attempt
    Direct,
    /// Persisted after a quota error forced an aggressive eviction
    AfterAggressiveEviction,
}

/// A successful save: the finalized record plus how it got there.
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    /// The record as persisted (possibly compressed/truncated fields)
    pub record: SignedDocument,
    pub recovery: SaveRecovery,
    /// Whether the signature payload was actually recompressed
    pub signature_compressed: bool,
    pub content_truncated: bool,
}

/// Quota-bounded signed-document store over an injectable key-value backend.
pub struct DocumentStore<S: KeyValueStore> {
    kv: S,
    quota_ceiling: u64,
    low_watermark: u64,
}

impl<S: KeyValueStore> DocumentStore<S> {
    /// Create a store with the standard 5MB ceiling.
    pub fn new(kv: S) -> Self {
        Self::with_limits(kv, QUOTA_CEILING, LOW_SPACE_WATERMARK)
    }

    /// Create a store with explicit limits (mainly for tests).
    pub fn with_limits(kv: S, quota_ceiling: u64, low_watermark: u64) -> Self {
        Self {
            kv,
            quota_ceiling,
            low_watermark,
        }
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    pub fn kv_mut(&mut self) -> &mut S {
        &mut self.kv
    }

    /// All stored records, newest first.
    ///
    /// An unreadable or corrupt store reads as empty; listing never fails.
    pub fn list(&self) -> Vec<SignedDocument> {
        let raw = match self.kv.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("store unreadable, treating as empty: {e}");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!("stored record list is corrupt, treating as empty: {e}");
                Vec::new()
            }
        }
    }

    /// The record with the given id, if present.
    pub fn get(&self, id: &str) -> Option<SignedDocument> {
        self.list().into_iter().find(|doc| doc.id == id)
    }

    /// Remove the record with the given id. Removing a missing id is a no-op.
    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let mut records = self.list();
        let before = records.len();
        records.retain(|doc| doc.id != id);
        if records.len() == before {
            return Ok(());
        }
        debug!(id, "deleting signed document");
        self.persist(&records)
    }

    /// Save a document, applying compression, truncation and eviction.
    pub fn save(&mut self, draft: DocumentDraft) -> Result<SaveOutcome, StoreError> {
        let usage = self.kv.estimate_usage();
        let remaining = self.quota_ceiling.saturating_sub(usage);
        if remaining < self.low_watermark {
            debug!(usage, remaining, "low on space, evicting before save");
            self.evict_to(MAX_DOCUMENTS)?;
        }

        let compression = compress_signature_payload(&draft.signature);
        let signature_compressed = compression.was_compressed();

        let (content, content_truncated) = truncate_content(draft.content);

        let existing = self.list();
        let record = SignedDocument {
            id: next_id(&existing),
            title: draft.title,
            content,
            signed_by: draft.signed_by,
            signed_at: draft.signed_at,
            signature: compression.into_value(),
            signing_date: draft.signing_date,
            template_name: draft.template_name,
        };

        // Prepend, then cap at the maximum count (most recently signed win).
        let mut records = Vec::with_capacity(existing.len() + 1);
        records.push(record.clone());
        records.extend(existing.iter().cloned());
        sort_newest_first(&mut records);
        records.truncate(MAX_DOCUMENTS);

        match self.persist(&records) {
            Ok(()) => Ok(SaveOutcome {
                record,
                recovery: SaveRecovery::Direct,
                signature_compressed,
                content_truncated,
            }),
            Err(StoreError::Storage(StorageError::QuotaExceeded)) => {
                warn!("quota exceeded on save, retrying after aggressive eviction");
                let mut trimmed = existing;
                sort_newest_first(&mut trimmed);
                trimmed.truncate(AGGRESSIVE_KEEP);
                trimmed.insert(0, record.clone());

                match self.persist(&trimmed) {
                    Ok(()) => Ok(SaveOutcome {
                        record,
                        recovery: SaveRecovery::AfterAggressiveEviction,
                        signature_compressed,
                        content_truncated,
                    }),
                    Err(StoreError::Storage(StorageError::QuotaExceeded)) => {
                        Err(StoreError::StorageFull)
                    }
                    Err(other) => Err(other),
                }
            }
            Err(other) => Err(other),
        }
    }

    /// Keep only the `keep` most recently signed records.
    ///
    /// Silent by design: dropped records are logged, not reported.
    fn evict_to(&mut self, keep: usize) -> Result<(), StoreError> {
        let mut records = self.list();
        if records.len() <= keep {
            return Ok(());
        }
        sort_newest_first(&mut records);
        let dropped = records.len() - keep;
        records.truncate(keep);
        debug!(dropped, keep, "evicted oldest signed documents");
        self.persist(&records)
    }

    fn persist(&mut self, records: &[SignedDocument]) -> Result<(), StoreError> {
        let json = serde_json::to_string(records)?;
        self.kv.set(STORAGE_KEY, &json)?;
        Ok(())
    }
}

/// Sort by `signedAt` descending, most recently signed first.
fn sort_newest_first(records: &mut [SignedDocument]) {
    records.sort_by(|a, b| b.signed_at.cmp(&a.signed_at));
}

/// Time-based id, disambiguated against existing ids so uniqueness holds
/// even for several saves within one millisecond.
fn next_id(existing: &[SignedDocument]) -> String {
    let base = Utc::now().timestamp_millis().to_string();
    if !existing.iter().any(|doc| doc.id == base) {
        return base;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{base}-{n}");
        if !existing.iter().any(|doc| doc.id == candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Cap content at [`MAX_CONTENT_CHARS`] characters, marker included.
fn truncate_content(content: String) -> (String, bool) {
    let char_count = content.chars().count();
    if char_count <= MAX_CONTENT_CHARS {
        return (content, false);
    }
    let marker_chars = TRUNCATION_MARKER.chars().count();
    let keep = MAX_CONTENT_CHARS - marker_chars;
    let mut truncated: String = content.chars().take(keep).collect();
    truncated.push_str(TRUNCATION_MARKER);
    (truncated, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn draft(title: &str, minute: u32) -> DocumentDraft {
        DocumentDraft {
            title: title.to_string(),
            content: format!("Lease agreement for {title}"),
            signed_by: "Ana G.".to_string(),
            signed_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, minute, 0).unwrap(),
            signature: "Signed on paper".to_string(),
            signing_date: "2026-03-01".to_string(),
            template_name: None,
        }
    }

    fn new_store() -> DocumentStore<MemoryStore> {
        DocumentStore::new(MemoryStore::new())
    }

    #[test]
    fn test_save_get_round_trip() {
        let mut store = new_store();
        let input = draft("Unit 4B", 0);
        let outcome = store.save(input.clone()).unwrap();

        assert_eq!(outcome.recovery, SaveRecovery::Direct);
        assert!(!outcome.content_truncated);

        let fetched = store.get(&outcome.record.id).unwrap();
        assert_eq!(fetched.title, input.title);
        assert_eq!(fetched.content, input.content);
        assert_eq!(fetched.signed_by, input.signed_by);
        assert_eq!(fetched.signed_at, input.signed_at);
        assert_eq!(fetched.signature, input.signature);
        assert_eq!(fetched.signing_date, input.signing_date);
    }

    #[test]
    fn test_get_missing_id_is_none() {
        let mut store = new_store();
        store.save(draft("Unit 1A", 0)).unwrap();
        assert!(store.get("nonexistent-id").is_none());
    }

    #[test]
    fn test_list_is_newest_first() {
        let mut store = new_store();
        store.save(draft("first", 0)).unwrap();
        store.save(draft("second", 1)).unwrap();
        store.save(draft("third", 2)).unwrap();

        let titles: Vec<_> = store.list().into_iter().map(|d| d.title).collect();
        assert_eq!(titles, ["third", "second", "first"]);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut store = new_store();
        let mut ids: Vec<_> = (0..5)
            .map(|i| store.save(draft("doc", i)).unwrap().record.id)
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_truncation_law() {
        let mut store = new_store();
        let mut input = draft("long", 0);
        input.content = "x".repeat(60_000);
        let outcome = store.save(input).unwrap();

        assert!(outcome.content_truncated);
        let stored = store.get(&outcome.record.id).unwrap();
        assert_eq!(stored.content.chars().count(), MAX_CONTENT_CHARS);
        assert!(stored.content.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_content_at_limit_is_untouched() {
        let mut store = new_store();
        let mut input = draft("exact", 0);
        input.content = "y".repeat(MAX_CONTENT_CHARS);
        let outcome = store.save(input.clone()).unwrap();

        assert!(!outcome.content_truncated);
        assert_eq!(store.get(&outcome.record.id).unwrap().content, input.content);
    }

    #[test]
    fn test_malformed_signature_persists_unchanged() {
        let mut store = new_store();
        let mut input = draft("bad-sig", 0);
        input.signature = "{broken json".to_string();
        let outcome = store.save(input).unwrap();

        assert!(!outcome.signature_compressed);
        assert_eq!(
            store.get(&outcome.record.id).unwrap().signature,
            "{broken json"
        );
    }

    #[test]
    fn test_eleven_saves_keep_ten_most_recent() {
        let mut store = new_store();
        for i in 0..11 {
            store.save(draft(&format!("doc-{i}"), i)).unwrap();
        }

        let records = store.list();
        assert_eq!(records.len(), MAX_DOCUMENTS);
        // The earliest-signed document is the one evicted.
        assert!(records.iter().all(|d| d.title != "doc-0"));
        assert!(records.iter().any(|d| d.title == "doc-10"));
    }

    #[test]
    fn test_quota_error_triggers_aggressive_eviction() {
        let mut store = new_store();
        for i in 0..7 {
            store.save(draft(&format!("doc-{i}"), i)).unwrap();
        }

        // Cap the backend just above current usage so the next full-list
        // persist fails but the aggressively trimmed list fits.
        let usage = store.kv().estimate_usage();
        store.kv_mut().set_capacity(Some(usage + 20));

        let outcome = store.save(draft("doc-7", 7)).unwrap();
        assert_eq!(outcome.recovery, SaveRecovery::AfterAggressiveEviction);

        let records = store.list();
        assert_eq!(records.len(), AGGRESSIVE_KEEP + 1);
        // The new record plus the five most recent priors survived.
        let titles: Vec<_> = records.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(
            titles,
            ["doc-7", "doc-6", "doc-5", "doc-4", "doc-3", "doc-2"]
        );
    }

    #[test]
    fn test_unrecoverable_quota_surfaces_as_storage_full() {
        let mut store = DocumentStore::new(MemoryStore::with_capacity(10));
        let err = store.save(draft("doc", 0)).unwrap_err();
        assert!(matches!(err, StoreError::StorageFull));
        assert_eq!(
            err.to_string(),
            "Failed to save document, storage may be full"
        );
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut store = new_store();
        let id = store.save(draft("doc", 0)).unwrap().record.id;
        store.save(draft("other", 1)).unwrap();

        store.delete(&id).unwrap();
        assert!(store.get(&id).is_none());
        assert_eq!(store.list().len(), 1);

        // Deleting again, or deleting garbage, changes nothing.
        store.delete(&id).unwrap();
        store.delete("no-such-id").unwrap();
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_corrupt_store_reads_as_empty() {
        let mut store = new_store();
        store
            .kv_mut()
            .set(STORAGE_KEY, "this is not json")
            .unwrap();
        assert!(store.list().is_empty());
        assert!(store.get("anything").is_none());
    }

    #[test]
    fn test_save_recovers_from_corrupt_store() {
        let mut store = new_store();
        store.kv_mut().set(STORAGE_KEY, "[[[").unwrap();
        let outcome = store.save(draft("fresh", 0)).unwrap();
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.list()[0].id, outcome.record.id);
    }

    #[test]
    fn test_low_space_evicts_before_save() {
        let kv = MemoryStore::new();
        // Tiny ceiling: any usage at all puts us under the watermark.
        let mut store = DocumentStore::with_limits(kv, 2_000, 1_900);
        for i in 0..12 {
            store.save(draft(&format!("doc-{i}"), i)).unwrap();
            assert!(store.list().len() <= MAX_DOCUMENTS);
        }
    }

    #[test]
    fn test_survivors_are_most_recently_signed_regardless_of_insert_order() {
        let mut store = new_store();
        // Signed-at values deliberately out of save order.
        let minutes = [5, 1, 9, 3, 11, 2, 8, 0, 10, 6, 7];
        for (i, minute) in minutes.iter().enumerate() {
            store.save(draft(&format!("doc-{i}"), *minute)).unwrap();
        }

        let records = store.list();
        assert_eq!(records.len(), MAX_DOCUMENTS);
        // The earliest signedAt (minute 0, "doc-7") was evicted.
        assert!(records.iter().all(|d| d.title != "doc-7"));
        // Order is signedAt descending.
        let mut sorted = records.clone();
        sort_newest_first(&mut sorted);
        assert_eq!(records, sorted);
    }
}
