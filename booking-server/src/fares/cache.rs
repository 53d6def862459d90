//! TTL cache for fare-information answers.
//!
//! Fare prose changes slowly and the remote call is the expensive part,
//! so answers are cached per enquiry. Failures are never cached; a failed
//! lookup is retried on the next request.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;

use super::error::FareError;
use super::{FareQuery, FareTextProvider};

/// Configuration for the fare-text cache.
#[derive(Debug, Clone)]
pub struct FareCacheConfig {
    /// TTL for cached answers.
    pub ttl: Duration,

    /// Maximum number of cached answers.
    pub max_capacity: u64,
}

impl Default for FareCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(15 * 60),
            max_capacity: 1_000,
        }
    }
}

/// Fare-text provider with caching.
///
/// Wraps any [`FareTextProvider`] and serves repeated enquiries from
/// memory until the TTL expires.
pub struct CachedFareText {
    inner: Arc<dyn FareTextProvider>,
    answers: MokaCache<FareQuery, String>,
}

impl CachedFareText {
    /// Create a cached provider in front of `inner`.
    pub fn new(inner: Arc<dyn FareTextProvider>, config: &FareCacheConfig) -> Self {
        let answers = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, answers }
    }

    /// Number of cached answers (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.answers.entry_count()
    }

    /// Drop all cached answers.
    pub fn invalidate_all(&self) {
        self.answers.invalidate_all();
    }
}

#[async_trait]
impl FareTextProvider for CachedFareText {
    async fn fare_text(&self, query: &FareQuery) -> Result<String, FareError> {
        if let Some(cached) = self.answers.get(query).await {
            return Ok(cached);
        }

        let text = self.inner.fare_text(query).await?;
        self.answers.insert(query.clone(), text.clone()).await;

        Ok(text)
    }
}
