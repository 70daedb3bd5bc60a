use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::{Country, CountryProvider};
use crate::translation;
use crate::upstream::ProviderError;

const RETRY_AFTER: Duration = Duration::from_secs(30);

struct Snapshot {
    fetched_at: Instant,
    countries: Arc<Vec<Country>>,
}

/// Serves country lookups from a cached copy of the full dataset.
///
/// A fresh dataset is served as is. A stale or missing one is refetched by a
/// single caller while the others wait for its outcome; when the refetch fails
/// the last good dataset is served instead. After a failure no refetch is
/// attempted for `retry_after`, so an outage costs one upstream timeout rather
/// than one per lookup. Single lookups go straight to the wrapped provider
/// only when no dataset exists at all.
pub struct CachedCountryProvider {
    inner: Arc<dyn CountryProvider>,
    ttl: Duration,
    retry_after: Duration,
    snapshot: RwLock<Option<Snapshot>>,
    last_failure: RwLock<Option<Instant>>,
    refresh: Mutex<()>,
}

impl CachedCountryProvider {
    pub fn new(inner: Arc<dyn CountryProvider>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            retry_after: RETRY_AFTER,
            snapshot: RwLock::new(None),
            last_failure: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    #[cfg(test)]
    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = retry_after;
        self
    }

    /// The cached dataset if it is still fresh.
    async fn cached(&self) -> Option<Arc<Vec<Country>>> {
        self.snapshot
            .read()
            .await
            .as_ref()
            .filter(|s| s.fetched_at.elapsed() < self.ttl)
            .map(|s| s.countries.clone())
    }

    async fn stale_or(&self, err: ProviderError) -> Result<Arc<Vec<Country>>, ProviderError> {
        match self.snapshot.read().await.as_ref() {
            Some(stale) => {
                debug!(error = %err, "serving stale country dataset");
                Ok(stale.countries.clone())
            }
            None => Err(err),
        }
    }

    async fn backing_off(&self) -> bool {
        self.last_failure
            .read()
            .await
            .is_some_and(|at| at.elapsed() < self.retry_after)
    }

    async fn dataset(&self) -> Result<Arc<Vec<Country>>, ProviderError> {
        if let Some(countries) = self.cached().await {
            return Ok(countries);
        }

        let _refreshing = self.refresh.lock().await;
        // whoever held the lock before us may have settled it either way
        if let Some(countries) = self.cached().await {
            return Ok(countries);
        }
        if self.backing_off().await {
            return self
                .stale_or(ProviderError::Unavailable(
                    "country dataset recently unavailable".to_string(),
                ))
                .await;
        }

        let fetched = match self.inner.all().await {
            Ok(list) if list.is_empty() => {
                Err(ProviderError::Unavailable("empty country dataset".to_string()))
            }
            other => other,
        };

        match fetched {
            Ok(list) => {
                let countries = Arc::new(list);
                info!(count = countries.len(), "country dataset refreshed");
                *self.snapshot.write().await = Some(Snapshot {
                    fetched_at: Instant::now(),
                    countries: countries.clone(),
                });
                *self.last_failure.write().await = None;
                Ok(countries)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    retry_after = ?self.retry_after,
                    "country dataset refresh failed"
                );
                *self.last_failure.write().await = Some(Instant::now());
                self.stale_or(e).await
            }
        }
    }
}

#[async_trait]
impl CountryProvider for CachedCountryProvider {
    async fn by_code(&self, code: &str) -> Result<Country, ProviderError> {
        match self.dataset().await {
            Ok(countries) => countries
                .iter()
                .find(|c| c.has_code(code.trim()))
                .cloned()
                .ok_or(ProviderError::NotFound),
            Err(e) => {
                debug!(error = %e, "no country dataset, asking upstream directly");
                self.inner.by_code(code).await
            }
        }
    }

    async fn search_by_name(&self, name: &str) -> Result<Vec<Country>, ProviderError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(Vec::new());
        }
        match self.dataset().await {
            Ok(countries) => {
                // cached names are localized; accept the English name too
                let localized = translation::country_name(name);
                Ok(countries
                    .iter()
                    .filter(|c| c.name_contains(name) || c.name_contains(&localized))
                    .cloned()
                    .collect())
            }
            Err(e) => {
                debug!(error = %e, "no country dataset, searching upstream directly");
                self.inner.search_by_name(name).await
            }
        }
    }

    async fn all(&self) -> Result<Vec<Country>, ProviderError> {
        Ok(self.dataset().await?.as_ref().clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures_util::future::join_all;

    use super::super::testing::{country, FakeUpstream};
    use super::*;

    fn upstream() -> Arc<FakeUpstream> {
        Arc::new(FakeUpstream::with(vec![
            country("BR", "BRA", "Brasil", "Americas"),
            country("DE", "DEU", "Alemanha", "Europe"),
            country("JP", "JPN", "Japão", "Asia"),
        ]))
    }

    #[tokio::test]
    async fn fresh_cache_avoids_refetch() {
        let up = upstream();
        let cache = CachedCountryProvider::new(up.clone(), Duration::from_secs(600));

        assert_eq!(cache.by_code("br").await.unwrap().cca2, "BR");
        assert_eq!(cache.by_code("DEU").await.unwrap().cca2, "DE");
        assert_eq!(cache.all().await.unwrap().len(), 3);

        assert_eq!(up.all_calls.load(Ordering::SeqCst), 1);
        assert_eq!(up.direct_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn stale_cache_is_served_when_refresh_fails() {
        let up = upstream();
        let cache = CachedCountryProvider::new(up.clone(), Duration::ZERO);

        assert!(cache.by_code("JP").await.is_ok());
        up.set_down(true);

        let japan = cache.by_code("JP").await.unwrap();
        assert_eq!(japan.name.common, "Japão");
        assert_eq!(up.all_calls.load(Ordering::SeqCst), 2);
        assert_eq!(up.direct_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn without_any_dataset_lookups_go_direct() {
        let up = upstream();
        up.set_down(true);
        let cache = CachedCountryProvider::new(up.clone(), Duration::from_secs(600));

        assert!(matches!(
            cache.all().await,
            Err(ProviderError::Unavailable(_))
        ));
        assert!(matches!(
            cache.by_code("BR").await,
            Err(ProviderError::Unavailable(_))
        ));
        assert_eq!(up.direct_calls.load(Ordering::SeqCst), 1);

        up.set_down(false);
        assert_eq!(cache.by_code("BR").await.unwrap().cca3, "BRA");
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let cache = CachedCountryProvider::new(upstream(), Duration::from_secs(600));
        assert!(matches!(cache.by_code("XX").await, Err(ProviderError::NotFound)));
    }

    #[tokio::test]
    async fn search_matches_localized_and_english_names() {
        let cache = CachedCountryProvider::new(upstream(), Duration::from_secs(600));

        let hits = cache.search_by_name("alem").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].cca2, "DE");

        let hits = cache.search_by_name("Germany").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].cca2, "DE");

        assert!(cache.search_by_name("Narnia").await.unwrap().is_empty());
    }

    /// Upstream that is down and takes `delay` to say so.
    struct SlowOutage {
        delay: Duration,
        all_calls: AtomicUsize,
    }

    #[async_trait]
    impl CountryProvider for SlowOutage {
        async fn by_code(&self, _code: &str) -> Result<Country, ProviderError> {
            tokio::time::sleep(self.delay).await;
            Err(ProviderError::Unavailable("timed out".into()))
        }

        async fn search_by_name(&self, _name: &str) -> Result<Vec<Country>, ProviderError> {
            tokio::time::sleep(self.delay).await;
            Err(ProviderError::Unavailable("timed out".into()))
        }

        async fn all(&self) -> Result<Vec<Country>, ProviderError> {
            self.all_calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Err(ProviderError::Unavailable("timed out".into()))
        }
    }

    #[tokio::test]
    async fn outage_costs_one_refetch_for_concurrent_lookups() {
        let delay = Duration::from_millis(200);
        let up = Arc::new(SlowOutage {
            delay,
            all_calls: AtomicUsize::new(0),
        });
        let cache = CachedCountryProvider::new(up.clone(), Duration::from_secs(600));

        let started = Instant::now();
        let results = join_all((0..8).map(|_| cache.by_code("BR"))).await;
        let elapsed = started.elapsed();

        assert!(results
            .iter()
            .all(|r| matches!(r, Err(ProviderError::Unavailable(_)))));
        assert_eq!(up.all_calls.load(Ordering::SeqCst), 1);
        // one failed refetch plus one concurrent round of direct lookups
        assert!(elapsed < delay * 4, "took {elapsed:?}");
    }

    #[tokio::test]
    async fn refetch_resumes_after_the_retry_window() {
        let up = upstream();
        up.set_down(true);
        let cache = CachedCountryProvider::new(up.clone(), Duration::from_secs(600))
            .with_retry_after(Duration::from_millis(50));

        assert!(cache.all().await.is_err());
        up.set_down(false);
        assert!(cache.all().await.is_err());
        assert_eq!(up.all_calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(cache.all().await.unwrap().len(), 3);
        assert_eq!(up.all_calls.load(Ordering::SeqCst), 2);
    }
}
