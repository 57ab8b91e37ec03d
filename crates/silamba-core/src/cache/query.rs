use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::models::{Record, Resource};

use super::{entry::age_display, CachedData, CollectionSource};

type FetchResult = Result<Arc<Vec<Value>>, Arc<ApiError>>;
type PendingFetch = Shared<BoxFuture<'static, FetchResult>>;

#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// The source failed and there was no earlier value to fall back on.
    #[error("{0}")]
    Source(Arc<ApiError>),

    #[error("Failed to decode {resource} records: {message}")]
    Decode { resource: Resource, message: String },

    #[error("Failed to encode {resource} record: {message}")]
    Encode { resource: Resource, message: String },
}

impl From<ApiError> for CacheError {
    fn from(err: ApiError) -> Self {
        CacheError::Source(Arc::new(err))
    }
}

/// Result of a cached read.
///
/// `error` is set when a refetch failed but an earlier copy of the
/// collection was still available; `data` then holds that earlier copy.
#[derive(Debug, Clone)]
pub struct Query<T> {
    pub data: Vec<T>,
    pub cached_at: Option<DateTime<Utc>>,
    pub error: Option<Arc<ApiError>>,
}

impl<T> Query<T> {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn age_display(&self) -> String {
        self.cached_at
            .map(age_display)
            .unwrap_or_else(|| "never".to_string())
    }
}

/// Snapshot of one cache key, for status displays.
#[derive(Debug, Clone, Default)]
pub struct EntryStatus {
    pub cached_at: Option<DateTime<Utc>>,
    pub stale: bool,
    pub loading: bool,
    pub last_error: Option<Arc<ApiError>>,
}

#[derive(Default)]
struct Entry {
    value: Option<CachedData<Arc<Vec<Value>>>>,
    stale: bool,
    /// Bumped on every invalidation; a fetch started under an older
    /// generation cannot mark the entry fresh.
    generation: u64,
    pending: Option<(u64, PendingFetch)>,
    last_error: Option<Arc<ApiError>>,
}

impl Entry {
    fn is_fresh(&self) -> bool {
        self.value.is_some() && !self.stale
    }
}

struct RawQuery {
    data: Arc<Vec<Value>>,
    cached_at: Option<DateTime<Utc>>,
    error: Option<Arc<ApiError>>,
}

/// Read-through cache keyed by `Resource`.
pub struct QueryCache<S> {
    source: Arc<S>,
    entries: Mutex<HashMap<Resource, Entry>>,
}

impl<S: CollectionSource> QueryCache<S> {
    pub fn new(source: S) -> Self {
        Self::from_shared(Arc::new(source))
    }

    pub fn from_shared(source: Arc<S>) -> Self {
        Self {
            source,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Resource, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start_fetch(&self, resource: Resource) -> PendingFetch {
        let source = Arc::clone(&self.source);
        async move {
            debug!(%resource, "Fetching collection");
            source
                .list(resource)
                .await
                .map(Arc::new)
                .map_err(Arc::new)
        }
        .boxed()
        .shared()
    }

    // ===== Reads =====

    /// Read a collection, fetching it if the key is missing or invalidated.
    pub async fn get<T: Record>(&self) -> Result<Query<T>, CacheError> {
        let resource = T::RESOURCE;
        let raw = self.fetch(resource).await?;
        let data = raw
            .data
            .iter()
            .cloned()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()
            .map_err(|e| CacheError::Decode {
                resource,
                message: e.to_string(),
            })?;
        Ok(Query {
            data,
            cached_at: raw.cached_at,
            error: raw.error,
        })
    }

    async fn fetch(&self, resource: Resource) -> Result<RawQuery, CacheError> {
        let (generation, pending) = {
            let mut entries = self.lock();
            let entry = entries.entry(resource).or_default();
            if let Some(ref cached) = entry.value {
                if !entry.stale {
                    return Ok(RawQuery {
                        data: Arc::clone(&cached.data),
                        cached_at: Some(cached.cached_at),
                        error: None,
                    });
                }
            }
            match entry.pending {
                Some((generation, ref pending)) if generation == entry.generation => {
                    debug!(%resource, "Joining in-flight fetch");
                    (generation, pending.clone())
                }
                _ => {
                    let pending = self.start_fetch(resource);
                    entry.pending = Some((entry.generation, pending.clone()));
                    (entry.generation, pending)
                }
            }
        };

        let result = pending.await;

        let mut entries = self.lock();
        let entry = entries.entry(resource).or_default();
        let owner = matches!(entry.pending, Some((g, _)) if g == generation);
        if owner {
            entry.pending = None;
        }

        match result {
            Ok(data) => {
                if owner && generation == entry.generation {
                    entry.value = Some(CachedData::new(Arc::clone(&data)));
                    entry.stale = false;
                    entry.last_error = None;
                } else if !entry.is_fresh() && generation != entry.generation {
                    // Invalidated mid-flight: keep the copy for display only.
                    entry.value = Some(CachedData::new(Arc::clone(&data)));
                    entry.stale = true;
                }
                let cached_at = entry.value.as_ref().map(|v| v.cached_at);
                Ok(RawQuery {
                    data,
                    cached_at,
                    error: None,
                })
            }
            Err(err) => {
                if owner {
                    warn!(%resource, error = %err, "Collection fetch failed");
                    entry.last_error = Some(Arc::clone(&err));
                }
                match entry.value {
                    Some(ref previous) => Ok(RawQuery {
                        data: Arc::clone(&previous.data),
                        cached_at: Some(previous.cached_at),
                        error: Some(err),
                    }),
                    None => Err(CacheError::Source(err)),
                }
            }
        }
    }

    /// Invalidate a key and read it again.
    pub async fn refresh<T: Record>(&self) -> Result<Query<T>, CacheError> {
        self.invalidate(T::RESOURCE);
        self.get::<T>().await
    }

    // ===== Invalidation =====

    /// Force the next read of `resource` to refetch.
    /// The current value stays available as a fallback for failed refetches.
    pub fn invalidate(&self, resource: Resource) {
        let mut entries = self.lock();
        let entry = entries.entry(resource).or_default();
        entry.stale = true;
        entry.generation += 1;
        entry.pending = None;
        debug!(%resource, generation = entry.generation, "Invalidated cache entry");
    }

    /// Drop every cached collection.
    ///
    /// Entries are kept so their generation keeps counting up; a fetch
    /// started before the clear can then never claim a newer pending slot.
    pub fn clear(&self) {
        info!("Clearing query cache");
        for entry in self.lock().values_mut() {
            entry.value = None;
            entry.stale = true;
            entry.generation += 1;
            entry.pending = None;
            entry.last_error = None;
        }
    }

    pub fn status(&self, resource: Resource) -> EntryStatus {
        let entries = self.lock();
        match entries.get(&resource) {
            Some(entry) => EntryStatus {
                cached_at: entry.value.as_ref().map(|v| v.cached_at),
                stale: entry.stale || entry.value.is_none(),
                loading: entry.pending.is_some(),
                last_error: entry.last_error.clone(),
            },
            None => EntryStatus {
                stale: true,
                ..Default::default()
            },
        }
    }

    // ===== Mutations =====

    fn encode<T: Record>(record: &T) -> Result<Value, CacheError> {
        serde_json::to_value(record).map_err(|e| CacheError::Encode {
            resource: T::RESOURCE,
            message: e.to_string(),
        })
    }

    fn decode<T: Record>(value: Value) -> Result<T, CacheError> {
        serde_json::from_value(value).map_err(|e| CacheError::Decode {
            resource: T::RESOURCE,
            message: e.to_string(),
        })
    }

    pub async fn create<T: Record>(&self, record: &T) -> Result<T, CacheError> {
        let created = self.create_value(T::RESOURCE, Self::encode(record)?).await?;
        Self::decode(created)
    }

    pub async fn update<T: Record>(&self, record: &T) -> Result<T, CacheError> {
        let updated = self
            .update_value(T::RESOURCE, record.id(), Self::encode(record)?)
            .await?;
        Self::decode(updated)
    }

    pub async fn delete<T: Record>(&self, id: &str) -> Result<(), CacheError> {
        self.delete_value(T::RESOURCE, id).await
    }

    /// Create through the source, then invalidate `resource`.
    pub async fn create_value(&self, resource: Resource, record: Value) -> Result<Value, CacheError> {
        let created = self.source.create(resource, record).await?;
        self.invalidate(resource);
        Ok(created)
    }

    pub async fn update_value(
        &self,
        resource: Resource,
        id: &str,
        record: Value,
    ) -> Result<Value, CacheError> {
        let updated = self.source.update(resource, id, record).await?;
        self.invalidate(resource);
        Ok(updated)
    }

    pub async fn delete_value(&self, resource: Resource, id: &str) -> Result<(), CacheError> {
        self.source.delete(resource, id).await?;
        self.invalidate(resource);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::models::{Category, Offer};
    use serde_json::json;

    /// In-memory collections that count list calls and can be told to fail.
    #[derive(Default)]
    struct FakeSource {
        collections: Mutex<HashMap<Resource, Vec<Value>>>,
        list_calls: AtomicUsize,
        fail: AtomicBool,
        delay_ms: u64,
        /// Overrides `delay_ms` for the first list call only.
        first_delay_ms: Option<u64>,
    }

    impl FakeSource {
        fn with(resource: Resource, items: Vec<Value>) -> Self {
            let source = FakeSource::default();
            source.collections.lock().unwrap().insert(resource, items);
            source
        }

        fn calls(&self) -> usize {
            self.list_calls.load(Ordering::SeqCst)
        }

        fn server_error(resource: Resource) -> ApiError {
            ApiError::from_status(resource.path(), reqwest::StatusCode::SERVICE_UNAVAILABLE, "down")
        }
    }

    impl CollectionSource for FakeSource {
        async fn list(&self, resource: Resource) -> Result<Vec<Value>, ApiError> {
            let call = self.list_calls.fetch_add(1, Ordering::SeqCst);
            // Snapshot at request start, like a server answering late.
            let items = self
                .collections
                .lock()
                .unwrap()
                .get(&resource)
                .cloned()
                .unwrap_or_default();
            let delay = match self.first_delay_ms {
                Some(first) if call == 0 => first,
                _ => self.delay_ms,
            };
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(Self::server_error(resource));
            }
            Ok(items)
        }

        async fn create(&self, resource: Resource, record: Value) -> Result<Value, ApiError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(Self::server_error(resource));
            }
            self.collections
                .lock()
                .unwrap()
                .entry(resource)
                .or_default()
                .push(record.clone());
            Ok(record)
        }

        async fn update(&self, resource: Resource, id: &str, record: Value) -> Result<Value, ApiError> {
            let mut collections = self.collections.lock().unwrap();
            let items = collections.entry(resource).or_default();
            match items.iter_mut().find(|item| item["id"] == id) {
                Some(item) => {
                    *item = record.clone();
                    Ok(record)
                }
                None => Err(ApiError::from_status(resource.path(), reqwest::StatusCode::NOT_FOUND, "")),
            }
        }

        async fn delete(&self, resource: Resource, id: &str) -> Result<(), ApiError> {
            self.collections
                .lock()
                .unwrap()
                .entry(resource)
                .or_default()
                .retain(|item| item["id"] != id);
            Ok(())
        }
    }

    fn offer_json(id: &str, title: &str) -> Value {
        json!({"id": id, "title": title, "image": "https://x/y.jpg", "isActive": true})
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let cache = QueryCache::new(FakeSource::with(
            Resource::Offers,
            vec![offer_json("1", "Summer Sale")],
        ));

        let first = cache.get::<Offer>().await.expect("first read");
        let second = cache.get::<Offer>().await.expect("second read");
        assert_eq!(first.data, second.data);
        assert_eq!(cache.source().calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_readers_share_one_fetch() {
        let source = FakeSource {
            delay_ms: 50,
            ..FakeSource::with(Resource::Offers, vec![offer_json("1", "Summer Sale")])
        };
        let cache = QueryCache::new(source);

        let (a, b, c) = tokio::join!(cache.get::<Offer>(), cache.get::<Offer>(), cache.get::<Offer>());
        assert_eq!(a.expect("a").data.len(), 1);
        assert_eq!(b.expect("b").data.len(), 1);
        assert_eq!(c.expect("c").data.len(), 1);
        assert_eq!(cache.source().calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_collection_is_empty_vec() {
        let cache = QueryCache::new(FakeSource::default());
        let categories = cache.get::<Category>().await.expect("empty read");
        assert!(categories.is_empty());
        assert!(categories.error.is_none());
    }

    #[tokio::test]
    async fn test_mutation_invalidates_only_its_resource() {
        let source = FakeSource::with(Resource::Offers, vec![offer_json("1", "Summer Sale")]);
        source.collections.lock().unwrap().insert(
            Resource::Categories,
            vec![json!({"id": "1", "name": "Photo Frames"})],
        );
        let cache = QueryCache::new(source);
        cache.get::<Offer>().await.expect("offers");
        cache.get::<Category>().await.expect("categories");
        assert_eq!(cache.source().calls(), 2);

        let offer = Offer {
            id: "2".to_string(),
            title: "Diwali Deals".to_string(),
            image: "https://x/d.jpg".to_string(),
            ..Default::default()
        };
        cache.create(&offer).await.expect("create");
        assert!(cache.status(Resource::Offers).stale);
        assert!(!cache.status(Resource::Categories).stale);

        let offers = cache.get::<Offer>().await.expect("refetch offers");
        assert_eq!(offers.data.len(), 2);
        cache.get::<Category>().await.expect("cached categories");
        assert_eq!(cache.source().calls(), 3);
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_previous_value() {
        let cache = QueryCache::new(FakeSource::with(
            Resource::Offers,
            vec![offer_json("1", "Summer Sale")],
        ));
        cache.get::<Offer>().await.expect("initial read");

        cache.source().fail.store(true, Ordering::SeqCst);
        let query = cache.refresh::<Offer>().await.expect("fallback read");
        assert_eq!(query.data.len(), 1);
        assert_eq!(query.error.as_ref().and_then(|e| e.status()), Some(503));

        // Failure is not cached: the key is still stale and refetches.
        cache.source().fail.store(false, Ordering::SeqCst);
        let calls = cache.source().calls();
        let query = cache.get::<Offer>().await.expect("recovered read");
        assert!(query.error.is_none());
        assert_eq!(cache.source().calls(), calls + 1);
    }

    #[tokio::test]
    async fn test_failed_first_fetch_is_error() {
        let source = FakeSource::default();
        source.fail.store(true, Ordering::SeqCst);
        let cache = QueryCache::new(source);
        let err = cache.get::<Offer>().await.expect_err("no fallback value");
        match err {
            CacheError::Source(api) => assert_eq!(api.resource(), "offers"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_mutation_does_not_invalidate() {
        let cache = QueryCache::new(FakeSource::with(
            Resource::Offers,
            vec![offer_json("1", "Summer Sale")],
        ));
        cache.get::<Offer>().await.expect("initial read");
        cache.source().fail.store(true, Ordering::SeqCst);

        let offer = Offer {
            title: "Broken".to_string(),
            ..Default::default()
        };
        assert!(cache.create(&offer).await.is_err());
        assert!(!cache.status(Resource::Offers).stale);
    }

    #[tokio::test]
    async fn test_delete_then_list_excludes_record() {
        let cache = QueryCache::new(FakeSource::with(
            Resource::Offers,
            vec![offer_json("1", "Summer Sale"), offer_json("2", "Diwali Deals")],
        ));
        cache.get::<Offer>().await.expect("initial read");
        cache.delete::<Offer>("1").await.expect("delete");

        let offers = cache.get::<Offer>().await.expect("after delete");
        let ids: Vec<&str> = offers.data.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[tokio::test]
    async fn test_clear_forces_refetch() {
        let cache = QueryCache::new(FakeSource::with(
            Resource::Offers,
            vec![offer_json("1", "Summer Sale")],
        ));
        cache.get::<Offer>().await.expect("read");
        cache.clear();
        assert!(cache.status(Resource::Offers).cached_at.is_none());
        cache.get::<Offer>().await.expect("read again");
        assert_eq!(cache.source().calls(), 2);
    }

    #[tokio::test]
    async fn test_fetch_started_before_clear_cannot_overwrite_newer_data() {
        let source = FakeSource {
            delay_ms: 120,
            first_delay_ms: Some(80),
            ..FakeSource::with(Resource::Offers, vec![offer_json("1", "Old")])
        };
        let cache = QueryCache::new(source);

        let early = cache.get::<Offer>();
        let after_clear = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            cache
                .source()
                .collections
                .lock()
                .unwrap()
                .insert(Resource::Offers, vec![offer_json("1", "New")]);
            cache.clear();
            cache.get::<Offer>().await
        };
        let (early, fresh) = tokio::join!(early, after_clear);
        assert_eq!(early.expect("early read").data[0].title, "Old");
        assert_eq!(fresh.expect("read after clear").data[0].title, "New");

        let cached = cache.get::<Offer>().await.expect("cached read");
        assert_eq!(cached.data[0].title, "New");
        assert!(cached.error.is_none());
        assert_eq!(cache.source().calls(), 2);
    }
}
