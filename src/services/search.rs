use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, OnceCell};

use crate::core::SearchEngine;
use crate::models::{GeoCenter, RankedResult, SearchQuery};
use crate::services::catalog::{load_engine, CatalogError};
use crate::services::source::DataSource;

/// Errors surfaced by the search entry point
///
/// A load failure is shared by every caller that waited on the same attempt.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("Catalog load failed: {0}")]
    LoadError(#[from] Arc<CatalogError>),

    #[error("Search timed out after {0:?}")]
    TimedOut(Duration),
}

/// Lifecycle of the shared catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadState {
    NotLoaded,
    Loading,
    Ready,
    Failed,
}

impl From<CatalogError> for SearchError {
    fn from(error: CatalogError) -> Self {
        Self::LoadError(Arc::new(error))
    }
}

impl LoadState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Loading,
            2 => Self::Ready,
            3 => Self::Failed,
            _ => Self::NotLoaded,
        }
    }
}

/// Resets `Loading` back to `NotLoaded` if a load future is dropped midway
struct LoadingGuard<'a> {
    state: &'a AtomicU8,
    finished: bool,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.state.compare_exchange(
                LoadState::Loading as u8,
                LoadState::NotLoaded as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            );
        }
    }
}

/// Search entry point with a lazily built, shared engine
///
/// The first call loads and indexes the catalog. Concurrent first calls
/// wait on the same attempt instead of starting their own, and all of them
/// get its outcome, success or failure. A failed load leaves no engine
/// behind, so the next call tries again.
pub struct SearchService<S> {
    source: S,
    engine: OnceCell<Arc<SearchEngine>>,
    state: AtomicU8,
    // Held for the duration of an attempt; keeps the last failure
    attempt: Mutex<Option<Arc<CatalogError>>>,
    // Number of attempts that ran to completion
    attempts: AtomicU64,
}

impl<S: DataSource> SearchService<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            engine: OnceCell::new(),
            state: AtomicU8::new(LoadState::NotLoaded as u8),
            attempt: Mutex::new(None),
            attempts: AtomicU64::new(0),
        }
    }

    /// Service over an already built engine, skipping the load step
    pub fn with_engine(source: S, engine: SearchEngine) -> Self {
        Self {
            source,
            engine: OnceCell::new_with(Some(Arc::new(engine))),
            state: AtomicU8::new(LoadState::Ready as u8),
            attempt: Mutex::new(None),
            attempts: AtomicU64::new(0),
        }
    }

    pub fn load_state(&self) -> LoadState {
        LoadState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// The engine, if already loaded
    pub fn engine(&self) -> Option<Arc<SearchEngine>> {
        self.engine.get().cloned()
    }

    /// Load the catalog once; later calls return the same engine
    ///
    /// Callers that arrive while an attempt is running wait for it and
    /// share its result. An attempt abandoned midway (its future dropped)
    /// produces no result, so the next waiter starts a fresh one.
    pub async fn load(&self) -> Result<Arc<SearchEngine>, SearchError> {
        if let Some(engine) = self.engine.get() {
            return Ok(Arc::clone(engine));
        }

        let seen = self.attempts.load(Ordering::Acquire);
        let mut last_failure = self.attempt.lock().await;

        if let Some(engine) = self.engine.get() {
            return Ok(Arc::clone(engine));
        }
        if self.attempts.load(Ordering::Acquire) != seen {
            if let Some(error) = last_failure.as_ref() {
                return Err(SearchError::LoadError(Arc::clone(error)));
            }
        }

        self.state.store(LoadState::Loading as u8, Ordering::Release);
        let mut guard = LoadingGuard {
            state: &self.state,
            finished: false,
        };

        tracing::info!("Loading professionals catalog");
        let result = load_engine(&self.source).await;
        guard.finished = true;

        let outcome = match result {
            Ok(engine) => {
                let engine = Arc::new(engine);
                *last_failure = None;
                // the attempt lock is held, so the cell is still empty
                let _ = self.engine.set(Arc::clone(&engine));
                self.state.store(LoadState::Ready as u8, Ordering::Release);
                Ok(engine)
            }
            Err(e) => {
                tracing::error!("Failed to load catalog: {}", e);
                let error = Arc::new(e);
                *last_failure = Some(Arc::clone(&error));
                self.state.store(LoadState::Failed as u8, Ordering::Release);
                Err(SearchError::LoadError(error))
            }
        };

        self.attempts.fetch_add(1, Ordering::AcqRel);
        outcome
    }

    /// Search by text and/or location
    ///
    /// Loads the catalog on first use. Only a load failure is an error;
    /// no matches is an empty list.
    pub async fn search(
        &self,
        query: &str,
        center: Option<GeoCenter>,
        radius_km: Option<f64>,
    ) -> Result<Vec<RankedResult>, SearchError> {
        let query = SearchQuery {
            text: query.to_string(),
            center,
            radius_km,
        };
        self.run(&query).await
    }

    /// Run a prepared query
    pub async fn run(&self, query: &SearchQuery) -> Result<Vec<RankedResult>, SearchError> {
        let engine = self.load().await?;
        let results = engine.search(query);
        tracing::debug!("Query {:?} matched {} professionals", query.text, results.len());
        Ok(results)
    }

    /// Like [`SearchService::run`], abandoned once `timeout` elapses
    ///
    /// An abandoned first call does not poison the load; the next caller
    /// picks it up.
    pub async fn run_with_timeout(
        &self,
        query: &SearchQuery,
        timeout: Duration,
    ) -> Result<Vec<RankedResult>, SearchError> {
        match tokio::time::timeout(timeout, self.run(query)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("Query {:?} abandoned after {:?}", query.text, timeout);
                Err(SearchError::TimedOut(timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::source::{SourceError, StaticSource};
    use std::sync::atomic::AtomicUsize;

    const CATALOG: &str = r#"[
        {"id": "1", "nome": "Ana", "categoria": "Pintura", "keywords": ["pintor"],
         "localizacao": {"lat": -23.5505, "lng": -46.6333}}
    ]"#;

    /// Counts catalog fetches and can be told to fail or stall
    struct CountingSource {
        fetches: AtomicUsize,
        failures: usize,
        delay: Duration,
    }

    impl CountingSource {
        fn new(fail_first: bool, delay: Duration) -> Self {
            Self::failing(if fail_first { 1 } else { 0 }, delay)
        }

        /// Fails the first `failures` fetches
        fn failing(failures: usize, delay: Duration) -> Self {
            Self {
                fetches: AtomicUsize::new(0),
                failures,
                delay,
            }
        }
    }

    impl DataSource for CountingSource {
        async fn fetch_catalog(&self) -> Result<String, SourceError> {
            let n = self.fetches.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if n < self.failures {
                return Err(SourceError::Status {
                    url: "memory://catalog".into(),
                    status: 503,
                });
            }
            Ok(CATALOG.to_string())
        }

        async fn fetch_synonyms(&self) -> Result<Option<String>, SourceError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_lazy_load_on_first_search() {
        let service = SearchService::new(StaticSource::new(CATALOG, None));
        assert_eq!(service.load_state(), LoadState::NotLoaded);
        assert!(service.engine().is_none());

        let results = service.search("pintor", None, None).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(service.load_state(), LoadState::Ready);
    }

    #[tokio::test]
    async fn test_concurrent_first_calls_share_one_load() {
        let service = SearchService::new(CountingSource::new(false, Duration::from_millis(50)));

        let (a, b, c) = tokio::join!(
            service.search("pintor", None, None),
            service.search("ana", None, None),
            service.load(),
        );

        assert_eq!(a.unwrap().len(), 1);
        assert_eq!(b.unwrap().len(), 1);
        assert!(c.is_ok());
        assert_eq!(service.source.fetches.load(Ordering::SeqCst), 1);

        service.search("pintor", None, None).await.unwrap();
        assert_eq!(service.source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let service = SearchService::new(CountingSource::new(true, Duration::ZERO));

        let first = service.search("pintor", None, None).await;
        assert!(matches!(first, Err(SearchError::LoadError(_))));
        assert_eq!(service.load_state(), LoadState::Failed);
        assert!(service.engine().is_none());

        let second = service.search("pintor", None, None).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(service.load_state(), LoadState::Ready);
        assert_eq!(service.source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_first_calls_share_one_failure() {
        let service = SearchService::new(CountingSource::failing(usize::MAX, Duration::from_millis(50)));

        let (a, b, c) = tokio::join!(
            service.search("pintor", None, None),
            service.search("ana", None, None),
            service.search("pintor", None, None),
        );

        assert!(matches!(a, Err(SearchError::LoadError(_))));
        assert!(matches!(b, Err(SearchError::LoadError(_))));
        assert!(matches!(c, Err(SearchError::LoadError(_))));
        assert_eq!(service.source.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(service.load_state(), LoadState::Failed);

        // a later call starts a new attempt
        assert!(service.search("pintor", None, None).await.is_err());
        assert_eq!(service.source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_calls_after_failure_share_the_retry() {
        let service = SearchService::new(CountingSource::failing(1, Duration::from_millis(20)));
        assert!(service.load().await.is_err());

        let (a, b) = tokio::join!(
            service.search("pintor", None, None),
            service.search("ana", None, None),
        );

        assert_eq!(a.unwrap().len(), 1);
        assert_eq!(b.unwrap().len(), 1);
        assert_eq!(service.source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_timeout_does_not_poison_load() {
        let service = SearchService::new(CountingSource::new(false, Duration::from_millis(200)));
        let query = SearchQuery::text("pintor");

        let abandoned = service.run_with_timeout(&query, Duration::from_millis(10)).await;
        assert!(matches!(abandoned, Err(SearchError::TimedOut(_))));
        assert_eq!(service.load_state(), LoadState::NotLoaded);

        let results = service.run_with_timeout(&query, Duration::from_secs(5)).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_with_engine_skips_load() {
        let engine = load_engine(&StaticSource::new(CATALOG, None)).await.unwrap();
        let service = SearchService::with_engine(CountingSource::new(false, Duration::ZERO), engine);

        assert_eq!(service.load_state(), LoadState::Ready);
        service.search("pintor", None, None).await.unwrap();
        assert_eq!(service.source.fetches.load(Ordering::SeqCst), 0);
    }
}
