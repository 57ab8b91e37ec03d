use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};
use tracing::{debug, info, warn};

use super::{
    default_document, ChangeChannel, ChangeNotice, DocumentSchema, StorageBackend, StoreError,
    StudioDocument, STUDIO_DOCUMENT_SCHEMA,
};

/// Storage key of the studio document.
pub const STORAGE_KEY: &str = "photo-studio-data";

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle of a `DocumentStore`.
///
/// `Uninitialized → Loaded` on `load`; `Loaded → Mutated` on `set`;
/// `Mutated → Loaded` once the store observes its own change notice or
/// adopts / reloads a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Uninitialized,
    Loaded,
    Mutated,
}

/// Where the document adopted by `load` came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The persisted document passed validation.
    Persisted,
    /// Nothing was persisted; the bundled default was written.
    Defaulted,
    /// The persisted document was discarded and the default written.
    ReplacedInvalid { reason: String },
}

/// Result of handling one change notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Adopted,
    /// The notice carried the document this store already holds.
    Unchanged,
    /// The notice was this store's own write.
    Own,
    /// The notice was for another key.
    Ignored,
    Rejected { reason: String },
}

/// Explicit get/set/subscribe access to the persisted studio document.
pub struct DocumentStore {
    backend: Arc<dyn StorageBackend>,
    channel: ChangeChannel,
    key: String,
    schema: DocumentSchema,
    instance_id: u64,
    state: StoreState,
    document: Option<Arc<StudioDocument>>,
    raw: Option<Arc<str>>,
}

impl DocumentStore {
    pub fn new(backend: Arc<dyn StorageBackend>, channel: ChangeChannel) -> Self {
        Self::with_key(backend, channel, STORAGE_KEY)
    }

    pub fn with_key(backend: Arc<dyn StorageBackend>, channel: ChangeChannel, key: &str) -> Self {
        Self {
            backend,
            channel,
            key: key.to_string(),
            schema: STUDIO_DOCUMENT_SCHEMA,
            instance_id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
            state: StoreState::Uninitialized,
            document: None,
            raw: None,
        }
    }

    pub fn state(&self) -> StoreState {
        self.state
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Parse, validate and normalize a serialized document.
    ///
    /// Only malformed JSON or a failed schema check rejects the document.
    /// Individual records that do not decode are dropped.
    fn parse_validated(&self, raw: &str) -> Result<StudioDocument, String> {
        let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| format!("malformed JSON: {}", e))?;
        self.schema.validate(&value).into_result()?;
        let (mut document, skipped) = StudioDocument::from_value_lenient(&value);
        if skipped > 0 {
            warn!(key = %self.key, skipped, "Document had unreadable records");
        }
        document.normalize();
        Ok(document)
    }

    fn adopt(&mut self, document: StudioDocument, raw: Arc<str>) {
        self.document = Some(Arc::new(document));
        self.raw = Some(raw);
        self.state = StoreState::Loaded;
    }

    /// Validate, persist and announce a document.
    fn write(&mut self, mut document: StudioDocument) -> Result<(), StoreError> {
        document.normalize();
        let value = serde_json::to_value(&document)?;
        self.schema
            .validate(&value)
            .into_result()
            .map_err(StoreError::Invalid)?;
        let raw: Arc<str> = serde_json::to_string(&value)?.into();

        self.backend.set_item(&self.key, &raw)?;
        self.document = Some(Arc::new(document));
        self.raw = Some(Arc::clone(&raw));
        self.state = StoreState::Mutated;

        let receivers = self.channel.publish(ChangeNotice {
            key: self.key.clone(),
            raw,
            origin: self.instance_id,
        });
        debug!(key = %self.key, receivers, "Document written and announced");
        Ok(())
    }

    fn write_default(&mut self) -> Result<(), StoreError> {
        self.write(default_document())
    }

    /// Adopt the persisted document, replacing it with the bundled default
    /// when it is absent or fails validation.
    pub fn load(&mut self) -> Result<LoadOutcome, StoreError> {
        let outcome = match self.backend.get_item(&self.key)? {
            Some(raw) => match self.parse_validated(&raw) {
                Ok(document) => {
                    self.adopt(document, raw.into());
                    LoadOutcome::Persisted
                }
                Err(reason) => {
                    info!(key = %self.key, %reason, "Discarding invalid persisted document");
                    self.write_default()?;
                    LoadOutcome::ReplacedInvalid { reason }
                }
            },
            None => {
                info!(key = %self.key, "No persisted document, using bundled default");
                self.write_default()?;
                LoadOutcome::Defaulted
            }
        };
        self.state = StoreState::Loaded;
        Ok(outcome)
    }

    pub fn get(&self) -> Result<Arc<StudioDocument>, StoreError> {
        self.document.clone().ok_or(StoreError::NotLoaded)
    }

    pub fn set(&mut self, document: StudioDocument) -> Result<(), StoreError> {
        if self.state == StoreState::Uninitialized {
            return Err(StoreError::NotLoaded);
        }
        self.write(document)
    }

    /// Apply an edit to a copy of the current document and write it.
    pub fn update(&mut self, edit: impl FnOnce(&mut StudioDocument)) -> Result<(), StoreError> {
        let mut document = (*self.get()?).clone();
        edit(&mut document);
        self.set(document)
    }

    /// Overwrite the persisted document with the bundled default.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.write_default()
    }

    /// Pretty JSON of the current document, for publishing as `data.json`.
    pub fn export_pretty(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&*self.get()?)?)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeNotice> {
        self.channel.subscribe()
    }

    /// Handle a change notice. Notices are re-validated before adoption,
    /// and applying the same notice twice has no further effect.
    pub fn apply(&mut self, notice: &ChangeNotice) -> Applied {
        if notice.key != self.key {
            return Applied::Ignored;
        }
        if notice.origin == self.instance_id {
            if self.state == StoreState::Mutated {
                self.state = StoreState::Loaded;
            }
            return Applied::Own;
        }
        if self.raw.as_deref() == Some(&*notice.raw) {
            return Applied::Unchanged;
        }
        match self.parse_validated(&notice.raw) {
            Ok(document) => {
                debug!(key = %self.key, origin = notice.origin, "Adopting announced document");
                self.adopt(document, Arc::clone(&notice.raw));
                Applied::Adopted
            }
            Err(reason) => {
                info!(key = %self.key, %reason, "Ignoring invalid announced document");
                Applied::Rejected { reason }
            }
        }
    }

    /// Re-read the backend after missed notices.
    pub fn resync(&mut self) -> Applied {
        let raw = match self.backend.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                return Applied::Rejected {
                    reason: "document no longer persisted".to_string(),
                }
            }
            Err(e) => return Applied::Rejected { reason: e.to_string() },
        };
        if self.raw.as_deref() == Some(raw.as_str()) {
            self.state = StoreState::Loaded;
            return Applied::Unchanged;
        }
        match self.parse_validated(&raw) {
            Ok(document) => {
                self.adopt(document, raw.into());
                Applied::Adopted
            }
            Err(reason) => Applied::Rejected { reason },
        }
    }

    /// Catch up without waiting: apply queued notices, then re-read storage
    /// for writers in other processes, whose notices never reach `rx`.
    /// Returns `Adopted` if either step adopted a newer document.
    pub fn sync(&mut self, rx: &mut broadcast::Receiver<ChangeNotice>) -> Applied {
        let mut adopted = false;
        loop {
            match rx.try_recv() {
                Ok(notice) => adopted |= self.apply(&notice) == Applied::Adopted,
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(key = %self.key, skipped, "Missed change notices before sync");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        match self.resync() {
            Applied::Adopted => Applied::Adopted,
            _ if adopted => Applied::Adopted,
            other => other,
        }
    }

    /// Wait for the next notice on `rx` and apply it. Returns `None` once
    /// the channel is closed.
    pub async fn next_change(&mut self, rx: &mut broadcast::Receiver<ChangeNotice>) -> Option<Applied> {
        match rx.recv().await {
            Ok(notice) => Some(self.apply(&notice)),
            Err(RecvError::Lagged(skipped)) => {
                warn!(key = %self.key, skipped, "Missed change notices, re-reading storage");
                Some(self.resync())
            }
            Err(RecvError::Closed) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Occasion;
    use crate::store::{FileStorage, MemoryStorage};

    fn shared_memory() -> Arc<dyn StorageBackend> {
        Arc::new(MemoryStorage::new())
    }

    fn occasion(id: &str, name: &str) -> Occasion {
        Occasion {
            id: id.to_string(),
            name: name.to_string(),
            image: format!("https://x/{}.jpg", id),
            ..Default::default()
        }
    }

    #[test]
    fn test_get_before_load_fails() {
        let store = DocumentStore::new(shared_memory(), ChangeChannel::new());
        assert_eq!(store.state(), StoreState::Uninitialized);
        assert!(matches!(store.get(), Err(StoreError::NotLoaded)));
    }

    #[test]
    fn test_missing_occasions_key_is_replaced_by_default() {
        let backend = shared_memory();
        backend
            .set_item(STORAGE_KEY, r#"{"banners":[],"categories":[],"advertisements":[]}"#)
            .unwrap();

        let mut store = DocumentStore::new(Arc::clone(&backend), ChangeChannel::new());
        let outcome = store.load().unwrap();
        assert_eq!(
            outcome,
            LoadOutcome::ReplacedInvalid {
                reason: "missing field `occasions`".to_string()
            }
        );
        assert_eq!(*store.get().unwrap(), default_document());

        let persisted = backend.get_item(STORAGE_KEY).unwrap().expect("default written back");
        let persisted: StudioDocument = serde_json::from_str(&persisted).unwrap();
        assert_eq!(persisted, default_document());
        assert_eq!(store.state(), StoreState::Loaded);
    }

    #[test]
    fn test_bad_record_does_not_discard_document() {
        let backend = shared_memory();
        let raw = r#"{"banners":[],"categories":[{"id":"c1","name":"Albums","slug":"albums","image":"a.jpg"}],"occasions":[],"advertisements":[{"id":"ad1","title":"Side","position":"sidebar"}]}"#;
        backend.set_item(STORAGE_KEY, raw).unwrap();

        let mut store = DocumentStore::new(Arc::clone(&backend), ChangeChannel::new());
        assert_eq!(store.load().unwrap(), LoadOutcome::Persisted);
        let doc = store.get().unwrap();
        assert!(doc.category_by_slug("albums").is_some());
        assert!(doc.advertisements.is_empty());
        assert_eq!(backend.get_item(STORAGE_KEY).unwrap().as_deref(), Some(raw));
    }

    #[test]
    fn test_update_edits_a_copy_and_persists_it() {
        let backend = shared_memory();
        let mut store = DocumentStore::new(Arc::clone(&backend), ChangeChannel::new());
        store.load().unwrap();
        let before = store.get().unwrap();

        store.update(|doc| doc.occasions.push(occasion("o1", "Weddings"))).unwrap();
        assert!(before.occasions.is_empty());
        assert_eq!(store.get().unwrap().occasions.len(), 1);

        let persisted = backend.get_item(STORAGE_KEY).unwrap().expect("written");
        let persisted: StudioDocument = serde_json::from_str(&persisted).unwrap();
        assert_eq!(persisted.occasions[0].name, "Weddings");
    }

    #[test]
    fn test_absent_document_is_defaulted() {
        let backend = shared_memory();
        let mut store = DocumentStore::new(Arc::clone(&backend), ChangeChannel::new());
        assert_eq!(store.load().unwrap(), LoadOutcome::Defaulted);
        assert!(backend.get_item(STORAGE_KEY).unwrap().is_some());
    }

    #[test]
    fn test_malformed_json_is_replaced() {
        let backend = shared_memory();
        backend.set_item(STORAGE_KEY, "{not json").unwrap();
        let mut store = DocumentStore::new(backend, ChangeChannel::new());
        assert!(matches!(store.load().unwrap(), LoadOutcome::ReplacedInvalid { .. }));
    }

    #[test]
    fn test_valid_persisted_document_is_adopted_and_normalized() {
        let backend = shared_memory();
        backend
            .set_item(
                STORAGE_KEY,
                r#"{"banners":[],"categories":[{"id":"c1","title":"Albums","description":"","slug":"albums","image":"a.jpg"}],"occasions":[],"advertisements":[]}"#,
            )
            .unwrap();
        let mut store = DocumentStore::new(backend, ChangeChannel::new());
        assert_eq!(store.load().unwrap(), LoadOutcome::Persisted);

        let doc = store.get().unwrap();
        let albums = doc.category_by_slug("albums").expect("persisted category");
        assert_eq!(albums.header_image.as_deref(), Some("a.jpg"));
    }

    #[tokio::test]
    async fn test_write_is_adopted_by_other_instance() {
        let backend = shared_memory();
        let channel = ChangeChannel::new();
        let mut writer = DocumentStore::new(Arc::clone(&backend), channel.clone());
        let mut reader = DocumentStore::new(Arc::clone(&backend), channel.clone());
        writer.load().unwrap();
        reader.load().unwrap();

        let mut writer_rx = writer.subscribe();
        let mut reader_rx = reader.subscribe();

        writer
            .update(|doc| doc.occasions.push(occasion("o1", "Weddings")))
            .unwrap();
        assert_eq!(writer.state(), StoreState::Mutated);

        assert_eq!(reader.next_change(&mut reader_rx).await, Some(Applied::Adopted));
        assert_eq!(reader.get().unwrap().occasions[0].name, "Weddings");

        assert_eq!(writer.next_change(&mut writer_rx).await, Some(Applied::Own));
        assert_eq!(writer.state(), StoreState::Loaded);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let backend = shared_memory();
        let channel = ChangeChannel::new();
        let mut writer = DocumentStore::new(Arc::clone(&backend), channel.clone());
        let mut reader = DocumentStore::new(backend, channel.clone());
        writer.load().unwrap();
        reader.load().unwrap();

        let mut rx = reader.subscribe();
        writer.update(|doc| doc.banners.clear()).unwrap();
        let notice = rx.try_recv().expect("notice published");

        assert_eq!(reader.apply(&notice), Applied::Adopted);
        assert_eq!(reader.apply(&notice), Applied::Unchanged);
        assert!(reader.get().unwrap().banners.is_empty());
    }

    #[test]
    fn test_invalid_notice_is_rejected() {
        let mut store = DocumentStore::new(shared_memory(), ChangeChannel::new());
        store.load().unwrap();
        let before = store.get().unwrap();

        let notice = ChangeNotice {
            key: STORAGE_KEY.to_string(),
            raw: Arc::from(r#"{"banners":[]}"#),
            origin: u64::MAX,
        };
        assert!(matches!(store.apply(&notice), Applied::Rejected { .. }));
        assert_eq!(store.get().unwrap(), before);

        let other_key = ChangeNotice {
            key: "silamba_admin_auth".to_string(),
            ..notice
        };
        assert_eq!(store.apply(&other_key), Applied::Ignored);
    }

    #[tokio::test]
    async fn test_lagged_subscriber_resyncs_from_storage() {
        let backend = shared_memory();
        let channel = ChangeChannel::with_capacity(1);
        let mut writer = DocumentStore::new(Arc::clone(&backend), channel.clone());
        let mut reader = DocumentStore::new(backend, channel.clone());
        writer.load().unwrap();
        reader.load().unwrap();
        let mut rx = reader.subscribe();

        for name in ["Weddings", "Birthdays", "Graduations"] {
            writer
                .update(|doc| doc.occasions = vec![occasion("o1", name)])
                .unwrap();
        }

        assert_eq!(reader.next_change(&mut rx).await, Some(Applied::Adopted));
        assert_eq!(reader.get().unwrap().occasions[0].name, "Graduations");
        // The one buffered notice carries what we already adopted.
        assert_eq!(reader.next_change(&mut rx).await, Some(Applied::Unchanged));
    }

    #[test]
    fn test_last_write_wins() {
        let backend = shared_memory();
        let channel = ChangeChannel::new();
        let mut a = DocumentStore::new(Arc::clone(&backend), channel.clone());
        let mut b = DocumentStore::new(Arc::clone(&backend), channel.clone());
        a.load().unwrap();
        b.load().unwrap();

        a.update(|doc| doc.occasions.push(occasion("a", "From A"))).unwrap();
        b.update(|doc| doc.occasions.push(occasion("b", "From B"))).unwrap();

        let mut fresh = DocumentStore::new(backend, channel);
        fresh.load().unwrap();
        let names: Vec<String> = fresh.get().unwrap().occasions.iter().map(|o| o.name.clone()).collect();
        assert_eq!(names, vec!["From B".to_string()]);
    }

    #[test]
    fn test_sync_picks_up_writes_from_another_process() {
        let dir = tempfile::tempdir().unwrap();
        let open = || -> Arc<dyn StorageBackend> {
            Arc::new(FileStorage::new(dir.path().to_path_buf()).unwrap())
        };

        // Separate backends and channels, as two running programs would have.
        let mut ours = DocumentStore::new(open(), ChangeChannel::new());
        let mut theirs = DocumentStore::new(open(), ChangeChannel::new());
        ours.load().unwrap();
        theirs.load().unwrap();
        let mut rx = ours.subscribe();
        assert_eq!(ours.sync(&mut rx), Applied::Unchanged);

        theirs.update(|doc| doc.occasions.push(occasion("o1", "Weddings"))).unwrap();
        assert_eq!(ours.sync(&mut rx), Applied::Adopted);
        assert_eq!(ours.get().unwrap().occasions[0].name, "Weddings");

        theirs.reset().unwrap();
        assert_eq!(ours.sync(&mut rx), Applied::Adopted);
        assert!(ours.get().unwrap().occasions.is_empty());
    }

    #[test]
    fn test_sync_after_own_write_is_unchanged() {
        let mut store = DocumentStore::new(shared_memory(), ChangeChannel::new());
        store.load().unwrap();
        let mut rx = store.subscribe();
        store.update(|doc| doc.banners.clear()).unwrap();
        assert_eq!(store.state(), StoreState::Mutated);

        assert_eq!(store.sync(&mut rx), Applied::Unchanged);
        assert_eq!(store.state(), StoreState::Loaded);
    }

    #[test]
    fn test_file_backed_document_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let backend: Arc<dyn StorageBackend> = Arc::new(FileStorage::new(dir.path().to_path_buf()).unwrap());

        let mut first = DocumentStore::new(Arc::clone(&backend), ChangeChannel::new());
        first.load().unwrap();
        first.update(|doc| doc.occasions.push(occasion("o1", "Weddings"))).unwrap();
        let exported = first.export_pretty().unwrap();
        assert!(exported.contains("Weddings"));

        let mut second = DocumentStore::new(backend, ChangeChannel::new());
        assert_eq!(second.load().unwrap(), LoadOutcome::Persisted);
        assert_eq!(second.get().unwrap().occasions.len(), 1);
    }
}
