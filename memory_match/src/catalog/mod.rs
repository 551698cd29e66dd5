//! Card catalog loading and caching.
//!
//! The catalog is the canonical list of [`CardTemplate`]s a deck is built
//! from. [`CatalogLoader`] fetches it once from a [`CatalogSource`], retrying
//! with exponential backoff, and caches the first successful result.
//!
//! ## Example
//!
//! ```
//! use memory_match::catalog::{CatalogLoader, StaticSource};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = CatalogLoader::new(Arc::new(StaticSource::builtin()?));
//! let templates = loader.load().await?;
//! assert!(!templates.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod models;
pub mod source;

pub use errors::{CatalogError, CatalogResult};
pub use models::CardTemplate;
pub use source::{CatalogSource, JsonFileSource, StaticSource};

use crate::game::constants::{DEFAULT_CATALOG_RETRIES, DEFAULT_CATALOG_RETRY_DELAY_MS};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Loads the card catalog once and serves the cached copy afterwards
pub struct CatalogLoader {
    source: Arc<dyn CatalogSource>,
    cache: OnceCell<Arc<[CardTemplate]>>,
    retry_attempts: u32,
    retry_base_delay: Duration,
}

impl CatalogLoader {
    /// Create a loader with the default retry policy
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            cache: OnceCell::new(),
            retry_attempts: DEFAULT_CATALOG_RETRIES,
            retry_base_delay: Duration::from_millis(DEFAULT_CATALOG_RETRY_DELAY_MS),
        }
    }

    /// Override the retry policy
    ///
    /// # Arguments
    ///
    /// * `attempts` - Extra attempts after the first failure
    /// * `base_delay` - Delay before the first retry, doubled for each one after
    #[must_use]
    pub fn with_retry(mut self, attempts: u32, base_delay: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_base_delay = base_delay;
        self
    }

    /// Load the catalog, fetching it only if no earlier call succeeded
    ///
    /// Concurrent callers share a single in-flight fetch.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unavailable`] once every attempt failed. Nothing
    /// is cached in that case, so a later call fetches again.
    pub async fn load(&self) -> CatalogResult<Arc<[CardTemplate]>> {
        self.cache
            .get_or_try_init(|| self.fetch_with_retry())
            .await
            .map(Arc::clone)
    }

    /// Cached templates, or an empty list if nothing loaded yet
    pub fn templates(&self) -> Arc<[CardTemplate]> {
        self.cache
            .get()
            .cloned()
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.initialized()
    }

    async fn fetch_with_retry(&self) -> CatalogResult<Arc<[CardTemplate]>> {
        let total_attempts = self.retry_attempts + 1;
        let mut last_error = None;

        for attempt in 1..=total_attempts {
            match self.fetch_once().await {
                Ok(templates) => {
                    log::info!(
                        "Loaded {} card templates from {}",
                        templates.len(),
                        self.source.describe()
                    );
                    return Ok(Arc::from(templates));
                }
                Err(e) => {
                    log::warn!(
                        "Catalog fetch {}/{} from {} failed: {}",
                        attempt,
                        total_attempts,
                        self.source.describe(),
                        e
                    );
                    last_error = Some(e);
                }
            }

            if attempt < total_attempts {
                let delay = self.retry_base_delay * 2u32.saturating_pow(attempt - 1);
                tokio::time::sleep(delay).await;
            }
        }

        Err(CatalogError::Unavailable {
            attempts: total_attempts,
            reason: last_error.map_or_else(|| "unknown".to_string(), |e| e.to_string()),
        })
    }

    async fn fetch_once(&self) -> CatalogResult<Vec<CardTemplate>> {
        let templates = self.source.fetch().await?;
        normalize(templates)
    }
}

/// Reject malformed templates and collapse duplicate names
///
/// A deck relies on every name appearing exactly twice, so two templates
/// sharing a name would break pairing. The first one wins.
fn normalize(templates: Vec<CardTemplate>) -> CatalogResult<Vec<CardTemplate>> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(templates.len());

    for template in templates {
        if template.id.trim().is_empty() {
            return Err(CatalogError::Malformed(format!(
                "template '{}' has an empty id",
                template.name
            )));
        }
        if template.name.trim().is_empty() {
            return Err(CatalogError::Malformed(format!(
                "template {} has an empty name",
                template.id
            )));
        }
        if seen.insert(template.name.clone()) {
            unique.push(template);
        } else {
            log::warn!(
                "Dropping template {}: name '{}' already used",
                template.id,
                template.name
            );
        }
    }

    if unique.is_empty() {
        return Err(CatalogError::Empty);
    }
    Ok(unique)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails a fixed number of times before returning its templates
    struct FlakySource {
        failures_left: AtomicU32,
        calls: AtomicU32,
        templates: Vec<CardTemplate>,
    }

    impl FlakySource {
        fn new(failures: u32, templates: Vec<CardTemplate>) -> Self {
            Self {
                failures_left: AtomicU32::new(failures),
                calls: AtomicU32::new(0),
                templates,
            }
        }
    }

    #[async_trait]
    impl CatalogSource for FlakySource {
        async fn fetch(&self) -> CatalogResult<Vec<CardTemplate>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(CatalogError::Malformed("simulated outage".to_string()));
            }
            Ok(self.templates.clone())
        }

        fn describe(&self) -> String {
            "flaky".to_string()
        }
    }

    fn sample() -> Vec<CardTemplate> {
        vec![
            CardTemplate::new("1", "Apple", "apple.png"),
            CardTemplate::new("2", "Pear", "pear.png"),
        ]
    }

    #[tokio::test]
    async fn test_load_caches_first_success() {
        let source = Arc::new(FlakySource::new(0, sample()));
        let loader = CatalogLoader::new(source.clone());

        assert!(!loader.is_loaded());
        assert!(loader.templates().is_empty());

        let first = loader.load().await.unwrap();
        let second = loader.load().await.unwrap();

        assert_eq!(first.len(), 2);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(loader.templates().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_retries_with_backoff() {
        let source = Arc::new(FlakySource::new(2, sample()));
        let loader =
            CatalogLoader::new(source.clone()).with_retry(3, Duration::from_millis(100));

        let started = tokio::time::Instant::now();
        let templates = loader.load().await.unwrap();

        assert_eq!(templates.len(), 2);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        // 100ms + 200ms of backoff
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_gives_up_and_caches_nothing() {
        let source = Arc::new(FlakySource::new(10, sample()));
        let loader =
            CatalogLoader::new(source.clone()).with_retry(1, Duration::from_millis(10));

        let result = loader.load().await;
        assert!(matches!(
            result,
            Err(CatalogError::Unavailable { attempts: 2, .. })
        ));
        assert!(!loader.is_loaded());
        assert!(loader.templates().is_empty());

        // Next call fetches again
        let _ = loader.load().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_duplicate_names_collapse() {
        let mut templates = sample();
        templates.push(CardTemplate::new("3", "Apple", "apple-2.png"));
        let loader = CatalogLoader::new(Arc::new(StaticSource::new(templates)));

        let loaded = loader.load().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].icon, "apple.png");
    }

    #[tokio::test]
    async fn test_empty_catalog_is_unavailable() {
        let loader = CatalogLoader::new(Arc::new(StaticSource::new(vec![])))
            .with_retry(0, Duration::ZERO);

        match loader.load().await {
            Err(CatalogError::Unavailable { reason, .. }) => {
                assert!(reason.contains("no card templates"));
            }
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_normalize_rejects_blank_name() {
        let result = normalize(vec![CardTemplate::new("1", "  ", "x.png")]);
        assert!(matches!(result, Err(CatalogError::Malformed(_))));
    }
}
