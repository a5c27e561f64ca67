//! Cover Art Lookup Chain
//!
//! Tries each [`CoverProvider`] in order until one returns a picture. A
//! provider that errors, finds nothing, exceeds the configured timeout or
//! returns bytes that are not an image is skipped. The first accepted
//! picture is written to the cache as the track's online cover.
//!
//! ## Usage
//!
//! ```ignore
//! use core_metadata::artwork::CoverChain;
//!
//! let chain = CoverChain::with_defaults(http_client, &config, cache.clone());
//! if let Some(path) = chain.fetch(&id, &query).await {
//!     println!("Cover cached at {}", path.display());
//! }
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::cache::{CacheIdentity, CacheStore, CoverKind};
use crate::error::Result;
use crate::providers::TrackQuery;

#[cfg(feature = "artwork-remote")]
use bridge_traits::http::HttpClient;

#[cfg(feature = "artwork-remote")]
use core_runtime::config::ResolverConfig;

/// Trait for cover art provider implementations
#[async_trait]
pub trait CoverProvider: Send + Sync {
    /// Fetch cover art for a track
    ///
    /// # Returns
    /// * `Ok(Some(bytes))` if a picture was found
    /// * `Ok(None)` if the provider has no picture for the track
    /// * `Err` on transport or protocol failure
    async fn fetch_cover(&self, query: &TrackQuery) -> Result<Option<Bytes>>;

    /// Short identifier used in logs
    fn name(&self) -> &'static str;
}

/// True when `data` starts with a known image signature
pub fn is_image(data: &[u8]) -> bool {
    image::guess_format(data).is_ok()
}

/// Ordered cover providers sharing one timeout
pub struct CoverChain {
    providers: Vec<Box<dyn CoverProvider>>,
    cache: Arc<CacheStore>,
    timeout: Duration,
}

impl CoverChain {
    pub fn new(
        providers: Vec<Box<dyn CoverProvider>>,
        cache: Arc<CacheStore>,
        timeout: Duration,
    ) -> Self {
        Self {
            providers,
            cache,
            timeout,
        }
    }

    /// The iTunes provider, wired to the configured endpoints
    #[cfg(feature = "artwork-remote")]
    pub fn with_defaults(
        http_client: Arc<dyn HttpClient>,
        config: &ResolverConfig,
        cache: Arc<CacheStore>,
    ) -> Self {
        let itunes = crate::providers::ItunesProvider::new(http_client, &config.endpoints);
        Self::new(vec![Box::new(itunes)], cache, config.provider_timeout)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Look up a cover and cache it.
    ///
    /// Returns the cache path of the stored picture, or `None` when no
    /// provider produced one or it could not be cached.
    pub async fn fetch(&self, id: &CacheIdentity, query: &TrackQuery) -> Option<PathBuf> {
        for provider in &self.providers {
            let name = provider.name();
            debug!(provider = name, title = %query.title, "Requesting cover");

            let data = match tokio::time::timeout(self.timeout, provider.fetch_cover(query)).await
            {
                Ok(Ok(Some(data))) => data,
                Ok(Ok(None)) => {
                    debug!(provider = name, "Cover not found at provider");
                    continue;
                }
                Ok(Err(e)) => {
                    warn!(provider = name, error = %e, "Cover provider failed");
                    continue;
                }
                Err(_) => {
                    warn!(provider = name, timeout = ?self.timeout, "Cover provider timed out");
                    continue;
                }
            };

            if !is_image(&data) {
                warn!(provider = name, size = data.len(), "Discarding non-image cover payload");
                continue;
            }

            return match self.cache.write_image(id, CoverKind::Online, &data).await {
                Ok(path) => {
                    info!(provider = name, id = %id, "Cached online cover");
                    Some(path)
                }
                Err(e) => {
                    warn!(error = %e, "Failed to cache online cover");
                    None
                }
            };
        }

        None
    }
}
