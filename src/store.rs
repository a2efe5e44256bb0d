//! Per-widget state machine
//!
//! A [`WidgetStore`] owns one widget kind's generation lifecycle. Writes go
//! through `generate`, `refresh`, `reset`, `mount` and `unmount`; readers take
//! a [`WidgetRuntimeState`] snapshot or subscribe to changes.
//!
//! Every dispatched request carries a sequence number. A completion is
//! applied only when its number is still the latest and the store is mounted,
//! so an older, slower response can never overwrite a newer one.

use crate::cache::{Artifact, ArtifactCache, CacheConfig, CacheKey};
use crate::error::{Result, WidgetError};
use crate::generator::{ArtifactProducer, DebouncedGenerator, GenerationRequest, GeneratorConfig};
use crate::hash::config_hash;
use crate::widgets::{
    SkillsConfig, StatsCardConfig, StreakConfig, TopLanguagesConfig, WaveConfig, WidgetConfig,
    WidgetKind,
};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// What a store currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetStatus {
    Idle,
    Loading,
    Ready(Artifact),
    Error(WidgetError),
}

/// Read model exposed to the UI layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WidgetRuntimeState {
    /// Last successful artifact; cleared on error and reset
    pub artifact: Option<Artifact>,
    pub loading: bool,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<WidgetError>,
    /// Hash of the config that produced `artifact` or `error`
    pub last_config_hash: Option<CacheKey>,
    pub mounted: bool,
}

fn serialize_error<S>(error: &Option<WidgetError>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

impl WidgetRuntimeState {
    pub fn status(&self) -> WidgetStatus {
        if self.loading {
            WidgetStatus::Loading
        } else if let Some(error) = &self.error {
            WidgetStatus::Error(error.clone())
        } else if let Some(artifact) = &self.artifact {
            WidgetStatus::Ready(artifact.clone())
        } else {
            WidgetStatus::Idle
        }
    }
}

/// Bookkeeping that must change atomically with the visible state
struct Control<C> {
    seq: u64,
    mounted: bool,
    inflight: Option<CacheKey>,
    current: Option<C>,
}

struct StoreInner<C> {
    generator: DebouncedGenerator<C>,
    state: watch::Sender<WidgetRuntimeState>,
    control: Mutex<Control<C>>,
}

impl<C: WidgetConfig> StoreInner<C> {
    fn lock(&self) -> MutexGuard<'_, Control<C>> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn complete(&self, seq: u64, key: CacheKey, result: Result<Artifact>) {
        let mut control = self.lock();
        if seq != control.seq || !control.mounted {
            debug!(
                "Discarding stale {} completion (seq {}, current {}, mounted {})",
                C::KIND,
                seq,
                control.seq,
                control.mounted
            );
            return;
        }
        control.inflight = None;

        match result {
            Ok(artifact) => {
                debug!("{} ready ({} bytes)", C::KIND, artifact.len());
                self.state.send_modify(|state| {
                    state.artifact = Some(artifact);
                    state.loading = false;
                    state.error = None;
                    state.last_config_hash = Some(key);
                });
            }
            Err(e) => {
                warn!("{} generation failed: {}", C::KIND, e);
                self.state.send_modify(|state| {
                    state.artifact = None;
                    state.loading = false;
                    state.error = Some(e);
                    state.last_config_hash = Some(key);
                });
            }
        }
    }
}

/// Generation lifecycle for one widget kind
///
/// Cloning is cheap and clones share state.
pub struct WidgetStore<C> {
    inner: Arc<StoreInner<C>>,
}

impl<C> Clone for WidgetStore<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: WidgetConfig> WidgetStore<C> {
    /// Create an unmounted store
    pub fn new(
        producer: Arc<dyn ArtifactProducer<C>>,
        cache: ArtifactCache,
        config: GeneratorConfig,
    ) -> Self {
        let (state, _) = watch::channel(WidgetRuntimeState::default());
        Self {
            inner: Arc::new(StoreInner {
                generator: DebouncedGenerator::new(producer, cache, config),
                state,
                control: Mutex::new(Control {
                    seq: 0,
                    mounted: false,
                    inflight: None,
                    current: None,
                }),
            }),
        }
    }

    /// Create a store with its own cache
    pub fn with_cache_config(
        producer: Arc<dyn ArtifactProducer<C>>,
        cache_config: CacheConfig,
        config: GeneratorConfig,
    ) -> Result<Self> {
        cache_config.validate()?;
        Ok(Self::new(producer, ArtifactCache::new(cache_config), config))
    }

    pub fn kind(&self) -> WidgetKind {
        C::KIND
    }

    pub fn cache(&self) -> &ArtifactCache {
        self.inner.generator.cache()
    }

    /// Retries spent on the running request
    pub fn retry_count(&self) -> u32 {
        self.inner.generator.retry_count()
    }

    /// Config of the latest accepted `generate`
    pub fn current_config(&self) -> Option<C> {
        self.inner.lock().current.clone()
    }

    pub fn snapshot(&self) -> WidgetRuntimeState {
        self.inner.state.borrow().clone()
    }

    pub fn status(&self) -> WidgetStatus {
        self.inner.state.borrow().status()
    }

    pub fn subscribe(&self) -> watch::Receiver<WidgetRuntimeState> {
        self.inner.state.subscribe()
    }

    /// Wait until no request is loading and return the resulting state
    pub async fn settled(&self) -> WidgetRuntimeState {
        let mut receiver = self.subscribe();
        let state = match receiver.wait_for(|state| !state.loading).await {
            Ok(state) => state.clone(),
            // The sender lives as long as `self`
            Err(_) => self.snapshot(),
        };
        state
    }

    pub fn mount(&self) {
        let mut control = self.inner.lock();
        control.mounted = true;
        self.inner.state.send_modify(|state| state.mounted = true);
        debug!("{} store mounted", C::KIND);
    }

    /// Cancel outstanding work and stop accepting completions
    pub fn unmount(&self) {
        let mut control = self.inner.lock();
        control.mounted = false;
        control.seq += 1;
        control.inflight = None;
        self.inner.generator.cancel();
        self.inner.state.send_modify(|state| {
            state.mounted = false;
            state.loading = false;
        });
        debug!("{} store unmounted", C::KIND);
    }

    /// Request an artifact for `config`
    ///
    /// Invalid input returns the store to idle without a request. A config
    /// whose hash matches the running request, or the settled result when
    /// nothing is running, is a no-op.
    pub fn generate(&self, config: C) {
        let mut control = self.inner.lock();
        if !control.mounted {
            debug!("Ignoring {} generate on unmounted store", C::KIND);
            return;
        }

        if let Err(e) = config.validate() {
            debug!("{} config not ready: {}", C::KIND, e);
            control.seq += 1;
            control.inflight = None;
            control.current = None;
            self.inner.generator.cancel();
            self.inner.state.send_modify(|state| {
                state.artifact = None;
                state.loading = false;
                state.error = None;
                state.last_config_hash = None;
            });
            return;
        }

        let key = config_hash(&config);
        if control.inflight.as_ref() == Some(&key) {
            debug!("{} request for {} already in flight", C::KIND, key);
            return;
        }
        if control.inflight.is_none() {
            let state = self.inner.state.borrow();
            let settled = state.artifact.is_some() || state.error.is_some();
            if settled && state.last_config_hash.as_ref() == Some(&key) {
                debug!("{} already settled for {}", C::KIND, key);
                return;
            }
        }

        control.seq += 1;
        let seq = control.seq;
        control.inflight = Some(key.clone());
        control.current = Some(config.clone());
        self.inner.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let inner = Arc::downgrade(&self.inner);
        let request = GenerationRequest {
            config,
            key: key.clone(),
        };
        self.inner
            .generator
            .schedule(request, move |result| complete(&inner, seq, key, result));
    }

    /// Regenerate the current config now, bypassing debounce and cache
    pub fn refresh(&self) {
        let mut control = self.inner.lock();
        if !control.mounted {
            return;
        }
        let Some(config) = control.current.clone() else {
            debug!("Nothing to refresh for {}", C::KIND);
            return;
        };

        let key = config_hash(&config);
        control.seq += 1;
        let seq = control.seq;
        control.inflight = Some(key.clone());
        self.inner.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        info!("Refreshing {} ({})", C::KIND, key);
        let inner = Arc::downgrade(&self.inner);
        let request = GenerationRequest {
            config,
            key: key.clone(),
        };
        self.inner
            .generator
            .refresh(request, move |result| complete(&inner, seq, key, result));
    }

    /// Drop any artifact, error and pending work
    pub fn reset(&self) {
        let mut control = self.inner.lock();
        control.seq += 1;
        control.inflight = None;
        control.current = None;
        self.inner.generator.cancel();
        let mounted = control.mounted;
        self.inner.state.send_replace(WidgetRuntimeState {
            mounted,
            ..Default::default()
        });
    }
}

fn complete<C: WidgetConfig>(
    inner: &Weak<StoreInner<C>>,
    seq: u64,
    key: CacheKey,
    result: Result<Artifact>,
) {
    if let Some(inner) = inner.upgrade() {
        inner.complete(seq, key, result);
    }
}

pub type StatsStore = WidgetStore<StatsCardConfig>;
pub type TopLanguagesStore = WidgetStore<TopLanguagesConfig>;
pub type StreakStore = WidgetStore<StreakConfig>;
pub type SkillsStore = WidgetStore<SkillsConfig>;
pub type WaveStore = WidgetStore<WaveConfig>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::MarkdownSynthesizer;
    use crate::widgets::{EndpointUrls, ImageWidget};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Records every call and answers with the requested username
    #[derive(Default)]
    struct RecordingProducer {
        calls: Mutex<Vec<String>>,
        failures: AtomicUsize,
        delay: Option<Duration>,
    }

    impl RecordingProducer {
        fn failing(failures: usize) -> Self {
            Self {
                failures: AtomicUsize::new(failures),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ArtifactProducer<StatsCardConfig> for RecordingProducer {
        async fn produce(&self, config: &StatsCardConfig) -> Result<Artifact> {
            self.calls.lock().unwrap().push(config.username.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(WidgetError::from_status(503, "unavailable"));
            }
            Ok(Artifact::Url(format!("https://cards.test/{}", config.username)))
        }
    }

    fn mounted_store(producer: Arc<RecordingProducer>) -> StatsStore {
        let store = WidgetStore::new(
            producer,
            ArtifactCache::new(CacheConfig::remote_image()),
            GeneratorConfig::default(),
        );
        store.mount();
        store
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_reaches_ready() {
        let producer = Arc::new(RecordingProducer::default());
        let store = mounted_store(Arc::clone(&producer));

        store.generate(StatsCardConfig::for_user("octocat"));
        assert_eq!(store.status(), WidgetStatus::Loading);

        let state = store.settled().await;
        assert_eq!(
            state.artifact,
            Some(Artifact::Url("https://cards.test/octocat".to_string()))
        );
        assert!(state.error.is_none());
        assert_eq!(
            state.last_config_hash,
            Some(config_hash(&StatsCardConfig::for_user("octocat")))
        );
        assert_eq!(producer.calls(), vec!["octocat"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_generate_is_single_flight() {
        let producer = Arc::new(RecordingProducer::default());
        let store = mounted_store(Arc::clone(&producer));

        store.generate(StatsCardConfig::for_user("octocat"));
        store.generate(StatsCardConfig::for_user("octocat"));
        store.settled().await;

        // settled with the same hash: no-op
        store.generate(StatsCardConfig::for_user("octocat"));
        assert!(!store.snapshot().loading);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(producer.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_uses_last_config() {
        let producer = Arc::new(RecordingProducer::default());
        let store = mounted_store(Arc::clone(&producer));

        for name in ["o", "oc", "oct", "octo", "octocat"] {
            store.generate(StatsCardConfig::for_user(name));
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        let state = store.settled().await;

        assert_eq!(producer.calls(), vec!["octocat"]);
        assert_eq!(
            state.artifact,
            Some(Artifact::Url("https://cards.test/octocat".to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_serves_within_ttl_and_expires_after() {
        let producer = Arc::new(RecordingProducer::default());
        let store = mounted_store(Arc::clone(&producer));

        store.generate(StatsCardConfig::for_user("octocat"));
        store.settled().await;
        store.reset();

        tokio::time::advance(Duration::from_secs(60)).await;
        store.generate(StatsCardConfig::for_user("octocat"));
        assert!(store.settled().await.artifact.is_some());
        assert_eq!(producer.calls().len(), 1);
        store.reset();

        tokio::time::advance(Duration::from_secs(300)).await;
        store.generate(StatsCardConfig::for_user("octocat"));
        assert!(store.settled().await.artifact.is_some());
        assert_eq!(producer.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_then_ready() {
        let producer = Arc::new(RecordingProducer::failing(2));
        let store = mounted_store(Arc::clone(&producer));

        store.generate(StatsCardConfig::for_user("octocat"));
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(store.retry_count(), 1);

        let state = store.settled().await;
        assert!(state.artifact.is_some());
        assert_eq!(producer.calls().len(), 3);
        assert_eq!(store.retry_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_surface_error() {
        let producer = Arc::new(RecordingProducer::failing(usize::MAX));
        let store = mounted_store(Arc::clone(&producer));

        store.generate(StatsCardConfig::for_user("octocat"));
        let state = store.settled().await;

        assert!(matches!(state.status(), WidgetStatus::Error(WidgetError::Network(_))));
        assert!(state.artifact.is_none());
        assert_eq!(producer.calls().len(), 3);
        assert_eq!(store.retry_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_username_is_idle_without_request() {
        let producer = Arc::new(RecordingProducer::default());
        let store = mounted_store(Arc::clone(&producer));

        store.generate(StatsCardConfig::for_user(""));
        assert_eq!(store.status(), WidgetStatus::Idle);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(producer.calls().is_empty());
        assert!(store.snapshot().error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_username_cancels_pending() {
        let producer = Arc::new(RecordingProducer::default());
        let store = mounted_store(Arc::clone(&producer));

        store.generate(StatsCardConfig::for_user("octocat"));
        store.generate(StatsCardConfig::for_user(""));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(producer.calls().is_empty());
        assert_eq!(store.status(), WidgetStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_completion_is_dropped() {
        let producer = Arc::new(RecordingProducer {
            delay: Some(Duration::from_secs(2)),
            ..Default::default()
        });
        let store = mounted_store(Arc::clone(&producer));

        store.generate(StatsCardConfig::for_user("first"));
        // past the quiet period, so "first" is already in the producer
        tokio::time::sleep(Duration::from_millis(500)).await;
        store.generate(StatsCardConfig::for_user("second"));

        let state = store.settled().await;
        assert_eq!(
            state.artifact,
            Some(Artifact::Url("https://cards.test/second".to_string()))
        );
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(
            store.snapshot().artifact,
            Some(Artifact::Url("https://cards.test/second".to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_then_remount_ignores_old_request() {
        let producer = Arc::new(RecordingProducer {
            delay: Some(Duration::from_secs(1)),
            ..Default::default()
        });
        let store = mounted_store(Arc::clone(&producer));

        store.generate(StatsCardConfig::for_user("before"));
        tokio::time::sleep(Duration::from_millis(500)).await;
        store.unmount();
        assert!(!store.snapshot().loading);

        store.mount();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(store.snapshot().artifact.is_none());

        store.generate(StatsCardConfig::for_user("after"));
        let state = store.settled().await;
        assert_eq!(
            state.artifact,
            Some(Artifact::Url("https://cards.test/after".to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmounted_store_ignores_generate() {
        let producer = Arc::new(RecordingProducer::default());
        let store = mounted_store(Arc::clone(&producer));
        store.unmount();

        store.generate(StatsCardConfig::for_user("octocat"));
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(producer.calls().is_empty());
        assert_eq!(store.status(), WidgetStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_bypasses_cache() {
        let producer = Arc::new(RecordingProducer::default());
        let store = mounted_store(Arc::clone(&producer));

        store.generate(StatsCardConfig::for_user("octocat"));
        store.settled().await;
        store.refresh();
        assert!(store.snapshot().loading);
        store.settled().await;

        assert_eq!(producer.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_returns_to_idle() {
        let producer = Arc::new(RecordingProducer::default());
        let store = mounted_store(Arc::clone(&producer));

        store.generate(StatsCardConfig::for_user("octocat"));
        store.settled().await;
        store.reset();

        let state = store.snapshot();
        assert_eq!(state.status(), WidgetStatus::Idle);
        assert!(state.mounted);
        assert!(state.last_config_hash.is_none());
        assert!(store.current_config().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_transitions() {
        let producer = Arc::new(RecordingProducer::default());
        let store = mounted_store(Arc::clone(&producer));
        let mut receiver = store.subscribe();

        store.generate(StatsCardConfig::for_user("octocat"));
        receiver.changed().await.unwrap();
        assert!(receiver.borrow_and_update().loading);

        receiver.changed().await.unwrap();
        assert!(receiver.borrow_and_update().artifact.is_some());
    }

    /// Answers with the card URL the markdown would embed
    struct CardUrlProducer {
        urls: EndpointUrls,
    }

    #[async_trait]
    impl ArtifactProducer<StatsCardConfig> for CardUrlProducer {
        async fn produce(&self, config: &StatsCardConfig) -> Result<Artifact> {
            Ok(Artifact::Url(config.image_url(&self.urls)))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_username_case_edit_matches_embedded_url() {
        let store = StatsStore::new(
            Arc::new(CardUrlProducer {
                urls: EndpointUrls::default(),
            }),
            ArtifactCache::new(CacheConfig::remote_image()),
            GeneratorConfig::default(),
        );
        store.mount();
        let synthesizer = MarkdownSynthesizer::default();

        store.generate(StatsCardConfig::for_user("octocat"));
        store.settled().await;

        let edited = StatsCardConfig::for_user("OctoCat");
        store.generate(edited.clone());
        let state = store.settled().await;

        let artifact = state.artifact.unwrap();
        assert!(artifact.as_str().contains("username=OctoCat"));
        assert!(synthesizer
            .synthesize(&edited)
            .contains(&format!("({})", artifact.as_str())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_returns_immediately_when_idle() {
        let store = mounted_store(Arc::new(RecordingProducer::default()));
        let state = store.settled().await;
        assert!(!state.loading);
        assert_eq!(state.status(), WidgetStatus::Idle);
    }

    struct PanickingProducer;

    #[async_trait]
    impl ArtifactProducer<StatsCardConfig> for PanickingProducer {
        async fn produce(&self, _config: &StatsCardConfig) -> Result<Artifact> {
            panic!("card service client crashed");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_producer_panic_settles_in_error() {
        let store = StatsStore::new(
            Arc::new(PanickingProducer),
            ArtifactCache::new(CacheConfig::remote_image()),
            GeneratorConfig::default(),
        );
        store.mount();

        store.generate(StatsCardConfig::for_user("octocat"));
        let state = store.settled().await;

        assert!(!state.loading);
        assert!(state.artifact.is_none());
        assert!(matches!(state.status(), WidgetStatus::Error(_)));
    }
}
