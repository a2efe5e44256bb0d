//! Debounced, retrying artifact generation
//!
//! [`DebouncedGenerator`] coalesces bursts of configuration changes into a
//! single call to an [`ArtifactProducer`]. Every `schedule` aborts the task
//! started by the previous one, so only the last request inside the quiet
//! period runs. The widget's [`ArtifactCache`] is consulted before the
//! producer and filled after it.

use crate::cache::{Artifact, ArtifactCache, CacheKey};
use crate::error::{Result, WidgetError};
use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Turns a widget configuration into an artifact
#[async_trait]
pub trait ArtifactProducer<C>: Send + Sync {
    async fn produce(&self, config: &C) -> Result<Artifact>;
}

/// Timing policy for debounce and retries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Quiet period that must pass without a new `schedule`
    pub quiet_period: Duration,

    /// Extra attempts after the first failure
    pub max_retries: u32,

    /// Delay before the first retry, doubled for each one after it
    pub backoff_base: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            quiet_period: Duration::from_millis(300),
            max_retries: 2,
            backoff_base: Duration::from_secs(1),
        }
    }
}

impl GeneratorConfig {
    /// Delay before retry number `attempt` (0-based): `2^attempt * backoff_base`
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// One logical generation request
#[derive(Debug, Clone)]
pub struct GenerationRequest<C> {
    pub config: C,
    pub key: CacheKey,
}

/// Single-flight, debounced wrapper around an [`ArtifactProducer`]
pub struct DebouncedGenerator<C> {
    producer: Arc<dyn ArtifactProducer<C>>,
    cache: ArtifactCache,
    config: GeneratorConfig,
    pending: Mutex<Option<JoinHandle<()>>>,
    retries: Arc<AtomicU32>,
}

impl<C> DebouncedGenerator<C>
where
    C: Clone + Send + Sync + 'static,
{
    pub fn new(
        producer: Arc<dyn ArtifactProducer<C>>,
        cache: ArtifactCache,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            producer,
            cache,
            config,
            pending: Mutex::new(None),
            retries: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn cache(&self) -> &ArtifactCache {
        &self.cache
    }

    /// Retries spent on the request currently running, 0 when idle
    pub fn retry_count(&self) -> u32 {
        self.retries.load(Ordering::SeqCst)
    }

    /// Whether a debounce, retry or producer call is outstanding
    pub fn is_pending(&self) -> bool {
        self.lock_pending()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Run `request` after the quiet period, superseding any earlier request
    pub fn schedule<F>(&self, request: GenerationRequest<C>, on_complete: F)
    where
        F: FnOnce(Result<Artifact>) + Send + 'static,
    {
        self.spawn(request, Some(self.config.quiet_period), true, on_complete);
    }

    /// Run `request` now, skipping the debounce and the cache read
    pub fn refresh<F>(&self, request: GenerationRequest<C>, on_complete: F)
    where
        F: FnOnce(Result<Artifact>) + Send + 'static,
    {
        self.spawn(request, None, false, on_complete);
    }

    /// Abort the outstanding request; its completion never fires
    pub fn cancel(&self) {
        if let Some(handle) = self.lock_pending().take() {
            if !handle.is_finished() {
                debug!("Cancelling pending generation");
            }
            handle.abort();
        }
        self.retries.store(0, Ordering::SeqCst);
    }

    fn spawn<F>(
        &self,
        request: GenerationRequest<C>,
        delay: Option<Duration>,
        read_cache: bool,
        on_complete: F,
    ) where
        F: FnOnce(Result<Artifact>) + Send + 'static,
    {
        let producer = Arc::clone(&self.producer);
        let cache = self.cache.clone();
        let config = self.config.clone();
        let retries = Arc::clone(&self.retries);

        let mut pending = self.lock_pending();
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        self.retries.store(0, Ordering::SeqCst);

        *pending = Some(tokio::spawn(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            if read_cache {
                if let Some(artifact) = cache.get_artifact(&request.key).await {
                    debug!("Serving {} from cache", request.key);
                    on_complete(Ok(artifact));
                    return;
                }
            }

            let attempt = produce_with_retry(producer.as_ref(), &request.config, &config, &retries);
            let result = match AssertUnwindSafe(attempt).catch_unwind().await {
                Ok(result) => result,
                Err(panic) => {
                    retries.store(0, Ordering::SeqCst);
                    let message = panic_message(panic.as_ref());
                    warn!("Producer panicked while generating {}: {}", request.key, message);
                    Err(WidgetError::Other(format!("generation panicked: {}", message)))
                }
            };
            if let Ok(artifact) = &result {
                cache.put(request.key.clone(), artifact.clone()).await;
            }
            on_complete(result);
        }));
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C> Drop for DebouncedGenerator<C> {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

/// Call the producer, retrying retryable failures with exponential backoff
///
/// `retries` tracks the attempts spent on this request and is reset to 0
/// once the request resolves either way.
pub async fn produce_with_retry<C>(
    producer: &dyn ArtifactProducer<C>,
    input: &C,
    policy: &GeneratorConfig,
    retries: &AtomicU32,
) -> Result<Artifact> {
    let mut attempt = 0;

    loop {
        match producer.produce(input).await {
            Ok(artifact) => {
                retries.store(0, Ordering::SeqCst);
                return Ok(artifact);
            }
            Err(e) if attempt < policy.max_retries && e.is_retryable() => {
                let delay = policy.backoff_delay(attempt);
                attempt += 1;
                retries.store(attempt, Ordering::SeqCst);
                warn!(
                    "Generation failed (attempt {}/{}), retrying after {:?}: {}",
                    attempt,
                    policy.max_retries + 1,
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                retries.store(0, Ordering::SeqCst);
                return Err(e);
            }
        }
    }
}
