//! # Reference Resolver
//!
//! Turns documentation page references into public URLs.
//! A miss costs one content lookup; the result is cached for the TTL. Concurrent requests
//! for the same composite key share a single in-flight lookup instead of issuing their own.

use futures::future::{BoxFuture, FutureExt, Shared, join_all};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::application::cache::ResolutionCache;
use crate::domain::errors::ResolveError;
use crate::domain::traits::ContentApi;
use crate::domain::types::ContentRef;

/// Upper bound of references resolved together for one answer.
pub const MAX_BATCH: usize = 3;

type PendingLookup = Shared<BoxFuture<'static, Result<String, ResolveError>>>;

pub struct ReferenceResolver {
    api: Arc<dyn ContentApi>,
    public_url: String,
    cache: Arc<Mutex<ResolutionCache>>,
    in_flight: Arc<Mutex<HashMap<String, PendingLookup>>>,
}

impl ReferenceResolver {
    pub fn new(api: Arc<dyn ContentApi>, public_url: String, cache: ResolutionCache) -> Self {
        Self {
            api,
            public_url,
            cache: Arc::new(Mutex::new(cache)),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn resolve(&self, reference: &ContentRef) -> Result<String, ResolveError> {
        let key = reference.composite_key();

        let pending = {
            let mut in_flight = lock(&self.in_flight);
            // Checked under the in-flight lock: a finished lookup writes the cache
            // before it unregisters itself.
            if let Some(url) = lock(&self.cache).get(&key) {
                tracing::debug!("Returning from cache {} -> {}", key, url);
                return Ok(url);
            }
            match in_flight.get(&key) {
                Some(pending) => {
                    tracing::debug!("Joining in-flight lookup for {}", key);
                    pending.clone()
                }
                None => {
                    let pending = self.lookup(key.clone(), reference.clone()).boxed().shared();
                    in_flight.insert(key.clone(), pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    /// Resolves up to [`MAX_BATCH`] references concurrently; results keep input order.
    pub async fn resolve_many(&self, references: &[ContentRef]) -> Vec<Result<String, ResolveError>> {
        let batch = &references[..references.len().min(MAX_BATCH)];
        join_all(batch.iter().map(|r| self.resolve(r))).await
    }

    fn lookup(
        &self,
        key: String,
        reference: ContentRef,
    ) -> impl Future<Output = Result<String, ResolveError>> + Send + 'static {
        let api = self.api.clone();
        let cache = self.cache.clone();
        let in_flight = self.in_flight.clone();
        let public_url = self.public_url.clone();

        async move {
            let result = api.lookup(&reference.id).await.map(|page| {
                format!(
                    "{}{}{}",
                    public_url,
                    page.path,
                    page.anchor_for(reference.selector())
                )
            });

            match &result {
                Ok(url) => {
                    let mut cache = lock(&cache);
                    cache.put(&key, url.clone());
                    tracing::debug!(
                        "Returning from api {} -> {} ({} cached)",
                        key,
                        url,
                        cache.len()
                    );
                }
                Err(e) => tracing::warn!("Failed to resolve {}: {}", key, e),
            }

            lock(&in_flight).remove(&key);
            result
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
