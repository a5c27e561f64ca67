//! # Lyrics Lookup Chain
//!
//! Fetches lyrics from external services, with support for both synced
//! (LRC format) and plain text lyrics.
//!
//! ## Features
//!
//! - Ordered provider fallback (Netease, then LRCLib)
//! - One bounded attempt per provider
//! - Write-once caching of the first result found
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_metadata::lyrics::LyricsChain;
//! use core_metadata::providers::TrackQuery;
//!
//! let chain = LyricsChain::with_defaults(http_client, &config, cache.clone());
//! let query = TrackQuery::new("Track Title", "Artist Name");
//!
//! if let Some(lyrics) = chain.fetch(&id, &query).await {
//!     println!("Found lyrics from: {}", lyrics.source);
//!     println!("Synced: {}", lyrics.is_synced);
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::cache::{CacheIdentity, CacheStore};
use crate::error::Result;
use crate::providers::TrackQuery;

#[cfg(feature = "lyrics")]
use bridge_traits::http::HttpClient;

#[cfg(feature = "lyrics")]
use core_runtime::config::ResolverConfig;

// =============================================================================
// Core Types
// =============================================================================

/// Lyrics fetch result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricsResult {
    /// Lyrics text (plain or LRC format)
    pub text: String,
    /// Whether lyrics are synced (LRC format)
    pub is_synced: bool,
    /// Source of lyrics
    pub source: LyricsSource,
}

impl LyricsResult {
    pub fn new(text: String, is_synced: bool, source: LyricsSource) -> Self {
        Self {
            text,
            is_synced,
            source,
        }
    }
}

/// Where lyrics came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LyricsSource {
    /// Netease Cloud Music
    Netease,
    /// LRCLib - Free, open-source synced lyrics
    LrcLib,
}

impl LyricsSource {
    /// Get source name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Netease => "netease",
            Self::LrcLib => "lrclib",
        }
    }

    /// Get human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Netease => "Netease",
            Self::LrcLib => "LRCLib",
        }
    }
}

impl fmt::Display for LyricsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// True when any line opens with an LRC timestamp such as `[01:23.45]`
pub fn looks_synced(text: &str) -> bool {
    text.lines().any(|line| {
        let Some(rest) = line.trim_start().strip_prefix('[') else {
            return false;
        };
        let Some((minutes, tail)) = rest.split_once(':') else {
            return false;
        };
        !minutes.is_empty()
            && minutes.bytes().all(|b| b.is_ascii_digit())
            && tail.bytes().next().is_some_and(|b| b.is_ascii_digit())
    })
}

// =============================================================================
// Provider Trait
// =============================================================================

/// Trait for lyrics provider implementations
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    /// Fetch lyrics for a track
    ///
    /// # Returns
    /// * `Ok(Some(lyrics))` if lyrics found
    /// * `Ok(None)` if lyrics not found
    /// * `Err` if API error or network failure
    async fn fetch(&self, query: &TrackQuery) -> Result<Option<LyricsResult>>;

    /// Get the source identifier
    fn source(&self) -> LyricsSource;
}

// =============================================================================
// Lyrics Chain
// =============================================================================

/// Ordered lyrics providers sharing one timeout
pub struct LyricsChain {
    providers: Vec<Box<dyn LyricsProvider>>,
    cache: Arc<CacheStore>,
    timeout: Duration,
}

impl LyricsChain {
    pub fn new(
        providers: Vec<Box<dyn LyricsProvider>>,
        cache: Arc<CacheStore>,
        timeout: Duration,
    ) -> Self {
        Self {
            providers,
            cache,
            timeout,
        }
    }

    /// Netease first, LRCLib second
    #[cfg(feature = "lyrics")]
    pub fn with_defaults(
        http_client: Arc<dyn HttpClient>,
        config: &ResolverConfig,
        cache: Arc<CacheStore>,
    ) -> Self {
        use crate::providers::{LrcLibProvider, NeteaseProvider};

        let providers: Vec<Box<dyn LyricsProvider>> = vec![
            Box::new(NeteaseProvider::new(http_client.clone(), &config.endpoints)),
            Box::new(LrcLibProvider::new(http_client, &config.endpoints)),
        ];
        Self::new(providers, cache, config.provider_timeout)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Fetch lyrics from the providers in order.
    ///
    /// The first non-blank result is written to the cache and returned;
    /// later providers are not contacted. A failed cache write is logged and
    /// does not discard the result.
    pub async fn fetch(&self, id: &CacheIdentity, query: &TrackQuery) -> Option<LyricsResult> {
        for provider in &self.providers {
            let source = provider.source();
            debug!(
                source = %source.as_str(),
                artist = %query.artist,
                track = %query.title,
                "Attempting to fetch lyrics"
            );

            match tokio::time::timeout(self.timeout, provider.fetch(query)).await {
                Ok(Ok(Some(result))) if !result.text.trim().is_empty() => {
                    info!(
                        source = %source.as_str(),
                        synced = result.is_synced,
                        "Successfully fetched lyrics"
                    );

                    if let Err(e) = self.cache.write_lyrics(id, &result.text).await {
                        warn!(error = %e, "Failed to cache lyrics");
                    }

                    return Some(result);
                }
                Ok(Ok(_)) => {
                    debug!(source = %source.as_str(), "Lyrics not found at provider");
                }
                Ok(Err(e)) => {
                    warn!(source = %source.as_str(), error = %e, "Provider fetch failed");
                }
                Err(_) => {
                    warn!(source = %source.as_str(), timeout = ?self.timeout, "Provider timed out");
                }
            }
        }

        debug!(
            artist = %query.artist,
            track = %query.title,
            "No lyrics found from any provider"
        );
        None
    }
}

// =============================================================================
// Tests
// =============================================================================
