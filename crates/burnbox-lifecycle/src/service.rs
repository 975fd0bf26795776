use crate::settings::ServiceSettings;
use async_trait::async_trait;
use burnbox_core::{
    Clock, ConsumedPaste, KeyValueStore, NewPaste, PasteError, PasteId, PasteManager,
    PasteRecord, ReadDecision, StorageError, SystemClock,
};
use burnbox_generator::Generator;
use jiff::Timestamp;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const HEALTHCHECK_KEY: &str = "healthcheck";
const HEALTHCHECK_VALUE: &str = "ok";
const HEALTHCHECK_EXPIRY: Duration = Duration::from_secs(10);

/// A concrete implementation of the [`PasteManager`] trait.
///
/// This service wraps a [`KeyValueStore`], a [`Generator`] and a [`Clock`]:
/// - create validates input and writes the record with set-if-absent,
///   regenerating the id on collision
/// - reads decide expiry and view limits against the record's own timestamp,
///   never against the store's native expiry
/// - the view counter is advanced with compare-and-set, so concurrent readers
///   cannot exceed `max_views`
pub struct PasteService<S, G> {
    store: Arc<S>,
    generator: Arc<G>,
    clock: Arc<dyn Clock>,
    settings: ServiceSettings,
}

impl<S, G> Clone for PasteService<S, G> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            generator: Arc::clone(&self.generator),
            clock: Arc::clone(&self.clock),
            settings: self.settings.clone(),
        }
    }
}

impl<S: KeyValueStore, G: Generator> PasteService<S, G> {
    /// Creates a service on the system clock with default settings.
    pub fn new(store: S, generator: G) -> Self {
        Self {
            store: Arc::new(store),
            generator: Arc::new(generator),
            clock: Arc::new(SystemClock),
            settings: ServiceSettings::default(),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_settings(mut self, settings: ServiceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Shared handle to the backing store.
    pub fn store(&self) -> Arc<S> {
        Arc::clone(&self.store)
    }

    /// Runs one read at `now`.
    ///
    /// `Ok(None)` means absent, expired, exhausted, or still contended after
    /// the configured number of retries.
    async fn consume(
        &self,
        id: &PasteId,
        now: Timestamp,
    ) -> Result<Option<ConsumedPaste>, StorageError> {
        let key = id.storage_key();

        for attempt in 0..=self.settings.max_consume_retries {
            let Some(raw) = self.store.get(&key).await? else {
                debug!(id = %id, "paste not found");
                return Ok(None);
            };
            let record = PasteRecord::decode(&raw)?;

            match record.decide(now) {
                ReadDecision::Expired => {
                    debug!(id = %id, "paste expired, deleting");
                    self.store.del(&key).await?;
                    return Ok(None);
                }
                ReadDecision::Exhausted => {
                    debug!(id = %id, "paste view limit reached, deleting");
                    self.store.del(&key).await?;
                    return Ok(None);
                }
                ReadDecision::Readable => {}
            }

            let next = record.consumed();
            let encoded = next.encode()?;
            if self
                .store
                .compare_and_set(&key, &raw, &encoded, next.remaining_ttl(now))
                .await?
            {
                debug!(id = %id, view_count = next.view_count, "consumed paste view");
                return Ok(Some(ConsumedPaste {
                    remaining_views: next.remaining_views(),
                    expires_at: next.expires_at(),
                    content: next.content,
                }));
            }

            debug!(id = %id, attempt, "paste changed while reading, retrying");
        }

        warn!(
            id = %id,
            retries = self.settings.max_consume_retries,
            "gave up reading paste after repeated conflicts"
        );
        Ok(None)
    }

    async fn health_round_trip(&self) -> Result<bool, StorageError> {
        self.store
            .set(HEALTHCHECK_KEY, HEALTHCHECK_VALUE, Some(HEALTHCHECK_EXPIRY))
            .await?;
        let value = self.store.get(HEALTHCHECK_KEY).await?;
        Ok(value.as_deref() == Some(HEALTHCHECK_VALUE))
    }
}

#[async_trait]
impl<S: KeyValueStore, G: Generator> PasteManager for PasteService<S, G> {
    #[instrument(skip_all)]
    async fn create(&self, paste: NewPaste) -> Result<PasteId, PasteError> {
        let now = self.clock.now();
        paste.validate(self.settings.max_content_bytes, now)?;

        let expiry = paste.ttl_seconds.map(Duration::from_secs);
        let record = PasteRecord::new(paste.content, now, paste.ttl_seconds, paste.max_views);
        let value = record.encode()?;

        for attempt in 1..=self.settings.id_attempts {
            let id: PasteId = self.generator.generate().into();
            if self
                .store
                .set_if_absent(&id.storage_key(), &value, expiry)
                .await?
            {
                info!(
                    id = %id,
                    ttl_seconds = ?record.ttl_seconds,
                    max_views = ?record.max_views,
                    bytes = record.content.len(),
                    "created paste"
                );
                return Ok(id);
            }
            warn!(id = %id, attempt, "generated paste id already taken, regenerating");
        }

        Err(PasteError::IdExhausted(self.settings.id_attempts))
    }

    async fn fetch_and_consume(&self, id: &PasteId) -> Result<ConsumedPaste, PasteError> {
        self.fetch_and_consume_at(id, self.clock.now()).await
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn fetch_and_consume_at(
        &self,
        id: &PasteId,
        now: Timestamp,
    ) -> Result<ConsumedPaste, PasteError> {
        match self.consume(id, now).await {
            Ok(Some(paste)) => Ok(paste),
            Ok(None) => Err(PasteError::NotFound),
            Err(e) => {
                warn!(id = %id, error = %e, "failed to read paste, reporting not found");
                Err(PasteError::NotFound)
            }
        }
    }

    async fn health(&self) -> bool {
        match self.health_round_trip().await {
            Ok(true) => true,
            Ok(false) => {
                warn!("health check read back an unexpected value");
                false
            }
            Err(e) => {
                warn!(error = %e, "health check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burnbox_core::ManualClock;
    use burnbox_generator::SeqGenerator;
    use burnbox_storage::InMemoryStore;
    use jiff::SignedDuration;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    type TestService = PasteService<InMemoryStore, SeqGenerator>;

    fn start_time() -> Timestamp {
        Timestamp::now()
    }

    fn test_service() -> (TestService, ManualClock) {
        let clock = ManualClock::new(start_time());
        let service = PasteService::new(InMemoryStore::new(), SeqGenerator::new("bb").unwrap())
            .with_clock(clock.clone());
        (service, clock)
    }

    async fn stored_record(service: &TestService, id: &PasteId) -> Option<PasteRecord> {
        service
            .store()
            .get(&id.storage_key())
            .await
            .unwrap()
            .map(|raw| PasteRecord::decode(&raw).unwrap())
    }

    #[tokio::test]
    async fn create_then_read_returns_exact_content() {
        let (service, _clock) = test_service();
        let content = "line one\n  line two\twith tab ✓";

        let id = service.create(NewPaste::new(content)).await.unwrap();
        let paste = service.fetch_and_consume(&id).await.unwrap();

        assert_eq!(paste.content, content);
        assert_eq!(paste.remaining_views, None);
        assert_eq!(paste.expires_at, None);
    }

    #[tokio::test]
    async fn create_persists_a_fresh_record() {
        let (service, clock) = test_service();

        let id = service
            .create(NewPaste::new("hello").with_ttl_seconds(60).with_max_views(3))
            .await
            .unwrap();

        assert_eq!(id.as_str(), "bb-1");
        let record = stored_record(&service, &id).await.unwrap();
        assert_eq!(record.content, "hello");
        assert_eq!(record.created_at, clock.now().as_millisecond());
        assert_eq!(record.ttl_seconds, Some(60));
        assert_eq!(record.max_views, Some(3));
        assert_eq!(record.view_count, 0);
    }

    #[tokio::test]
    async fn unlimited_paste_survives_many_reads() {
        let (service, clock) = test_service();
        let id = service.create(NewPaste::new("forever")).await.unwrap();

        for _ in 0..50 {
            clock.advance(SignedDuration::from_hours(24 * 30));
            assert!(service.fetch_and_consume(&id).await.is_ok());
        }
        assert_eq!(stored_record(&service, &id).await.unwrap().view_count, 50);
    }

    #[tokio::test]
    async fn exactly_max_views_reads_succeed() {
        let (service, _clock) = test_service();
        let id = service
            .create(NewPaste::new("limited").with_max_views(3))
            .await
            .unwrap();

        let remaining: Vec<Option<u64>> = vec![
            service.fetch_and_consume(&id).await.unwrap().remaining_views,
            service.fetch_and_consume(&id).await.unwrap().remaining_views,
            service.fetch_and_consume(&id).await.unwrap().remaining_views,
        ];
        assert_eq!(remaining, vec![Some(2), Some(1), Some(0)]);

        let err = service.fetch_and_consume(&id).await.unwrap_err();
        assert!(matches!(err, PasteError::NotFound));
        assert!(stored_record(&service, &id).await.is_none());
    }

    #[tokio::test]
    async fn single_view_paste_is_gone_after_one_read() {
        let (service, _clock) = test_service();
        let id = service
            .create(NewPaste::new("hello").with_max_views(1))
            .await
            .unwrap();

        let paste = service.fetch_and_consume(&id).await.unwrap();
        assert_eq!(paste.content, "hello");
        assert_eq!(paste.remaining_views, Some(0));
        assert_eq!(paste.expires_at, None);

        assert!(matches!(
            service.fetch_and_consume(&id).await,
            Err(PasteError::NotFound)
        ));
    }

    #[tokio::test]
    async fn ttl_boundary_uses_logical_time() {
        let (service, clock) = test_service();
        let id = service
            .create(NewPaste::new("hi").with_ttl_seconds(2))
            .await
            .unwrap();
        let created = clock.now();

        let just_before = created
            .checked_add(SignedDuration::from_millis(1_999))
            .unwrap();
        let paste = service.fetch_and_consume_at(&id, just_before).await.unwrap();
        assert_eq!(
            paste.expires_at,
            Some(created.checked_add(SignedDuration::from_secs(2)).unwrap())
        );

        let at_expiry = created.checked_add(SignedDuration::from_secs(2)).unwrap();
        assert!(matches!(
            service.fetch_and_consume_at(&id, at_expiry).await,
            Err(PasteError::NotFound)
        ));
        assert!(stored_record(&service, &id).await.is_none());
    }

    #[tokio::test]
    async fn ttl_scenario_with_simulated_clock() {
        let (service, clock) = test_service();
        let id = service
            .create(NewPaste::new("hi").with_ttl_seconds(1))
            .await
            .unwrap();

        assert!(service.fetch_and_consume(&id).await.is_ok());

        clock.advance(SignedDuration::from_millis(1_100));
        assert!(matches!(
            service.fetch_and_consume(&id).await,
            Err(PasteError::NotFound)
        ));
    }

    #[tokio::test]
    async fn expiry_is_checked_before_view_limit() {
        let (service, clock) = test_service();
        let id = service
            .create(NewPaste::new("both").with_ttl_seconds(10).with_max_views(5))
            .await
            .unwrap();

        let paste = service.fetch_and_consume(&id).await.unwrap();
        assert_eq!(paste.remaining_views, Some(4));

        clock.advance(SignedDuration::from_secs(10));
        assert!(service.fetch_and_consume(&id).await.is_err());
    }

    #[tokio::test]
    async fn read_rewrites_record_with_incremented_count() {
        let (service, _clock) = test_service();
        let id = service
            .create(NewPaste::new("count me").with_max_views(10))
            .await
            .unwrap();

        service.fetch_and_consume(&id).await.unwrap();
        service.fetch_and_consume(&id).await.unwrap();

        let record = stored_record(&service, &id).await.unwrap();
        assert_eq!(record.view_count, 2);
        assert_eq!(record.content, "count me");
    }

    #[tokio::test]
    async fn missing_paste_is_not_found() {
        let (service, _clock) = test_service();

        let err = service
            .fetch_and_consume(&PasteId::parse("does-not-exist").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, PasteError::NotFound));
    }

    #[tokio::test]
    async fn corrupt_record_is_not_found() {
        let (service, _clock) = test_service();
        let id = PasteId::new_unchecked("corrupt");
        service
            .store()
            .set(&id.storage_key(), "{not json", None)
            .await
            .unwrap();

        assert!(matches!(
            service.fetch_and_consume(&id).await,
            Err(PasteError::NotFound)
        ));
    }

    #[tokio::test]
    async fn validation_errors_name_the_field_and_write_nothing() {
        let (service, _clock) = test_service();

        let err = service.create(NewPaste::new("")).await.unwrap_err();
        assert_eq!(err.field(), Some("content"));

        let err = service
            .create(NewPaste::new("x").with_ttl_seconds(0))
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("ttl_seconds"));

        let err = service
            .create(NewPaste::new("x").with_max_views(0))
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("max_views"));

        assert!(service.store().is_empty());
        assert_eq!(service.generator.issued(), 0);
    }

    #[tokio::test]
    async fn content_size_limit_comes_from_settings() {
        let (service, _clock) = test_service();
        let service =
            service.with_settings(ServiceSettings::builder().max_content_bytes(4).build());

        assert!(service.create(NewPaste::new("1234")).await.is_ok());
        let err = service.create(NewPaste::new("12345")).await.unwrap_err();
        assert_eq!(err.field(), Some("content"));
    }

    /// Hands out the same id a fixed number of times before switching.
    struct RepeatingGenerator {
        calls: AtomicUsize,
        repeats: usize,
    }

    impl Generator for RepeatingGenerator {
        type Output = PasteId;

        fn generate(&self) -> PasteId {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.repeats {
                PasteId::new_unchecked("taken")
            } else {
                PasteId::new_unchecked(format!("fresh{call}"))
            }
        }
    }

    #[tokio::test]
    async fn id_collision_regenerates() {
        let store = InMemoryStore::new();
        store
            .set(&PasteId::new_unchecked("taken").storage_key(), "existing", None)
            .await
            .unwrap();
        let service = PasteService::new(
            store,
            RepeatingGenerator {
                calls: AtomicUsize::new(0),
                repeats: 2,
            },
        );

        let id = service.create(NewPaste::new("new")).await.unwrap();
        assert_eq!(id.as_str(), "fresh2");

        // The existing value is untouched.
        let existing = service
            .store()
            .get(&PasteId::new_unchecked("taken").storage_key())
            .await
            .unwrap();
        assert_eq!(existing.as_deref(), Some("existing"));
    }

    #[tokio::test]
    async fn id_collision_gives_up_after_configured_attempts() {
        let store = InMemoryStore::new();
        store
            .set(&PasteId::new_unchecked("taken").storage_key(), "existing", None)
            .await
            .unwrap();
        let service = PasteService::new(
            store,
            RepeatingGenerator {
                calls: AtomicUsize::new(0),
                repeats: usize::MAX,
            },
        )
        .with_settings(ServiceSettings::builder().id_attempts(3).build());

        let err = service.create(NewPaste::new("new")).await.unwrap_err();
        assert!(matches!(err, PasteError::IdExhausted(3)));
    }

    /// A store whose backend is down.
    struct FailingStore;

    #[async_trait]
    impl KeyValueStore for FailingStore {
        async fn get(&self, _key: &str) -> burnbox_core::store::Result<Option<String>> {
            Err(StorageError::Unavailable("down".into()))
        }

        async fn set(
            &self,
            _key: &str,
            _value: &str,
            _expiry: Option<Duration>,
        ) -> burnbox_core::store::Result<()> {
            Err(StorageError::Unavailable("down".into()))
        }

        async fn set_if_absent(
            &self,
            _key: &str,
            _value: &str,
            _expiry: Option<Duration>,
        ) -> burnbox_core::store::Result<bool> {
            Err(StorageError::Unavailable("down".into()))
        }

        async fn compare_and_set(
            &self,
            _key: &str,
            _expected: &str,
            _value: &str,
            _expiry: Option<Duration>,
        ) -> burnbox_core::store::Result<bool> {
            Err(StorageError::Unavailable("down".into()))
        }

        async fn del(&self, _key: &str) -> burnbox_core::store::Result<bool> {
            Err(StorageError::Unavailable("down".into()))
        }
    }

    #[tokio::test]
    async fn storage_failure_on_create_is_a_storage_error() {
        let service = PasteService::new(FailingStore, SeqGenerator::new("bb").unwrap());

        let err = service.create(NewPaste::new("hello")).await.unwrap_err();
        assert!(matches!(err, PasteError::Storage(StorageError::Unavailable(_))));
    }

    #[tokio::test]
    async fn storage_failure_on_read_is_not_found() {
        let service = PasteService::new(FailingStore, SeqGenerator::new("bb").unwrap());

        let err = service
            .fetch_and_consume(&PasteId::new_unchecked("abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, PasteError::NotFound));
    }

    #[tokio::test]
    async fn health_reflects_store_round_trip() {
        let (service, _clock) = test_service();
        assert!(service.health().await);

        let broken = PasteService::new(FailingStore, SeqGenerator::new("bb").unwrap());
        assert!(!broken.health().await);
    }

    /// Simulates another reader consuming a view between our read and write.
    struct RacingStore {
        inner: InMemoryStore,
        interfere: AtomicBool,
    }

    #[async_trait]
    impl KeyValueStore for RacingStore {
        async fn get(&self, key: &str) -> burnbox_core::store::Result<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(
            &self,
            key: &str,
            value: &str,
            expiry: Option<Duration>,
        ) -> burnbox_core::store::Result<()> {
            self.inner.set(key, value, expiry).await
        }

        async fn set_if_absent(
            &self,
            key: &str,
            value: &str,
            expiry: Option<Duration>,
        ) -> burnbox_core::store::Result<bool> {
            self.inner.set_if_absent(key, value, expiry).await
        }

        async fn compare_and_set(
            &self,
            key: &str,
            expected: &str,
            value: &str,
            expiry: Option<Duration>,
        ) -> burnbox_core::store::Result<bool> {
            if self.interfere.swap(false, Ordering::SeqCst) {
                let raw = self.inner.get(key).await?.unwrap();
                let rival = PasteRecord::decode(&raw)?.consumed();
                self.inner.set(key, &rival.encode()?, expiry).await?;
            }
            self.inner.compare_and_set(key, expected, value, expiry).await
        }

        async fn del(&self, key: &str) -> burnbox_core::store::Result<bool> {
            self.inner.del(key).await
        }
    }

    /// Remembers the expiry passed to every compare-and-set.
    #[derive(Default)]
    struct RecordingStore {
        inner: InMemoryStore,
        swap_expiries: parking_lot::Mutex<Vec<Option<Duration>>>,
    }

    #[async_trait]
    impl KeyValueStore for RecordingStore {
        async fn get(&self, key: &str) -> burnbox_core::store::Result<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(
            &self,
            key: &str,
            value: &str,
            expiry: Option<Duration>,
        ) -> burnbox_core::store::Result<()> {
            self.inner.set(key, value, expiry).await
        }

        async fn set_if_absent(
            &self,
            key: &str,
            value: &str,
            expiry: Option<Duration>,
        ) -> burnbox_core::store::Result<bool> {
            self.inner.set_if_absent(key, value, expiry).await
        }

        async fn compare_and_set(
            &self,
            key: &str,
            expected: &str,
            value: &str,
            expiry: Option<Duration>,
        ) -> burnbox_core::store::Result<bool> {
            self.swap_expiries.lock().push(expiry);
            self.inner.compare_and_set(key, expected, value, expiry).await
        }

        async fn del(&self, key: &str) -> burnbox_core::store::Result<bool> {
            self.inner.del(key).await
        }
    }

    #[tokio::test]
    async fn read_resets_store_expiry_to_remaining_ttl() {
        let clock = ManualClock::new(start_time());
        let generator = SeqGenerator::new("bb").unwrap();
        let service =
            PasteService::new(RecordingStore::default(), generator).with_clock(clock.clone());
        let id = service
            .create(NewPaste::new("ticking").with_ttl_seconds(10))
            .await
            .unwrap();

        clock.advance(SignedDuration::from_millis(2_500));
        service.fetch_and_consume(&id).await.unwrap();
        clock.advance(SignedDuration::from_millis(7_000));
        service.fetch_and_consume(&id).await.unwrap();

        assert_eq!(
            *service.store().swap_expiries.lock(),
            [Some(Duration::from_secs(8)), Some(Duration::from_secs(1))]
        );
    }

    #[tokio::test]
    async fn read_of_untimed_paste_sets_no_store_expiry() {
        let generator = SeqGenerator::new("bb").unwrap();
        let service = PasteService::new(RecordingStore::default(), generator);
        let id = service
            .create(NewPaste::new("forever").with_max_views(3))
            .await
            .unwrap();

        service.fetch_and_consume(&id).await.unwrap();

        assert_eq!(*service.store().swap_expiries.lock(), [None]);
    }

    #[tokio::test]
    async fn losing_a_race_rechecks_the_view_limit() {
        let service = PasteService::new(
            RacingStore {
                inner: InMemoryStore::new(),
                interfere: AtomicBool::new(false),
            },
            SeqGenerator::new("bb").unwrap(),
        );
        let id = service
            .create(NewPaste::new("once").with_max_views(1))
            .await
            .unwrap();

        service.store().interfere.store(true, Ordering::SeqCst);

        // The rival took the only view, so the retry must see exhaustion.
        assert!(matches!(
            service.fetch_and_consume(&id).await,
            Err(PasteError::NotFound)
        ));
    }

    #[tokio::test]
    async fn losing_a_race_retries_and_succeeds_when_views_remain() {
        let service = PasteService::new(
            RacingStore {
                inner: InMemoryStore::new(),
                interfere: AtomicBool::new(false),
            },
            SeqGenerator::new("bb").unwrap(),
        );
        let id = service
            .create(NewPaste::new("twice").with_max_views(2))
            .await
            .unwrap();

        service.store().interfere.store(true, Ordering::SeqCst);

        let paste = service.fetch_and_consume(&id).await.unwrap();
        assert_eq!(paste.remaining_views, Some(0));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_readers_never_exceed_max_views() {
        let service = PasteService::new(InMemoryStore::new(), SeqGenerator::new("bb").unwrap())
            .with_settings(ServiceSettings::builder().max_consume_retries(64).build());
        let id = service
            .create(NewPaste::new("contended").with_max_views(3))
            .await
            .unwrap();

        let mut handles = vec![];
        for _ in 0..24 {
            let service = service.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                service.fetch_and_consume(&id).await.is_ok()
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }
        assert_eq!(successes, 3);
    }
}
