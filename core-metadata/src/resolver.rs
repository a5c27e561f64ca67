//! Metadata Resolution Pipeline
//!
//! [`MetadataResolver`] turns a file path into a [`MetadataRecord`] by
//! combining, in decreasing order of trust:
//!
//! 1. tags embedded in the file,
//! 2. entries already in the on-disk cache,
//! 3. remote providers (only when the caller allows network access).
//!
//! Hosts typically resolve twice: once offline for an immediate answer, then
//! again with network access to fill in what was missing.
//!
//! ```ignore
//! let quick = resolver.resolve(path, false).await?;
//! render(&quick);
//!
//! let full = resolver.resolve(path, true).await?;
//! render(&full);
//! ```

use bytes::Bytes;
use bridge_traits::http::HttpClient;
use core_runtime::config::ResolverConfig;
use core_runtime::logging::strip_path;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::artwork::{CoverChain, CoverProvider};
use crate::cache::{CacheIdentity, CacheStore, CoverKind};
use crate::error::Result;
use crate::extractor::TagExtractor;
use crate::lyrics::{LyricsChain, LyricsProvider};
use crate::providers::TrackQuery;

/// Canonical metadata of one track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub title: String,
    pub artist: String,
    /// Empty when the file names no album
    pub album: String,
    pub cover_path: Option<PathBuf>,
    pub lyrics: Option<String>,
}

/// Resolves track metadata from tags, cache and providers
pub struct MetadataResolver {
    extractor: TagExtractor,
    cache: Arc<CacheStore>,
    covers: CoverChain,
    lyrics: LyricsChain,
    unknown_artist: String,
}

impl MetadataResolver {
    /// Resolver with the default providers enabled by this build's features
    #[cfg_attr(
        not(any(feature = "lyrics", feature = "artwork-remote")),
        allow(unused_variables)
    )]
    pub fn new(config: &ResolverConfig, http_client: Arc<dyn HttpClient>) -> Self {
        let cache = Arc::new(CacheStore::new(&config.cache_dir));

        #[cfg(feature = "artwork-remote")]
        let covers = CoverChain::with_defaults(http_client.clone(), config, cache.clone());
        #[cfg(not(feature = "artwork-remote"))]
        let covers = CoverChain::new(Vec::new(), cache.clone(), config.provider_timeout);

        #[cfg(feature = "lyrics")]
        let lyrics = LyricsChain::with_defaults(http_client, config, cache.clone());
        #[cfg(not(feature = "lyrics"))]
        let lyrics = LyricsChain::new(Vec::new(), cache.clone(), config.provider_timeout);

        Self::from_chains(config, cache, covers, lyrics)
    }

    /// Resolver without providers; the network phase is a no-op
    pub fn offline(config: &ResolverConfig) -> Self {
        Self::with_providers(config, Vec::new(), Vec::new())
    }

    /// Resolver with caller-supplied providers, tried in the given order
    pub fn with_providers(
        config: &ResolverConfig,
        cover_providers: Vec<Box<dyn CoverProvider>>,
        lyrics_providers: Vec<Box<dyn LyricsProvider>>,
    ) -> Self {
        let cache = Arc::new(CacheStore::new(&config.cache_dir));
        let covers = CoverChain::new(cover_providers, cache.clone(), config.provider_timeout);
        let lyrics = LyricsChain::new(lyrics_providers, cache.clone(), config.provider_timeout);
        Self::from_chains(config, cache, covers, lyrics)
    }

    fn from_chains(
        config: &ResolverConfig,
        cache: Arc<CacheStore>,
        covers: CoverChain,
        lyrics: LyricsChain,
    ) -> Self {
        Self {
            extractor: TagExtractor::new(),
            cache,
            covers,
            lyrics,
            unknown_artist: config.unknown_artist.clone(),
        }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Resolve the metadata of the file at `path`.
    ///
    /// With `allow_network == false` only the file and the cache are
    /// consulted. Provider and cache failures degrade to missing fields.
    ///
    /// # Errors
    ///
    /// Only failures to open or identify the file itself:
    /// [`FileNotFound`](crate::MetadataError::FileNotFound),
    /// [`UnsupportedFormat`](crate::MetadataError::UnsupportedFormat) and
    /// [`Io`](crate::MetadataError::Io).
    pub async fn resolve(&self, path: &Path, allow_network: bool) -> Result<MetadataRecord> {
        let shown = path.display().to_string();
        let file = strip_path(&shown);
        debug!(file = %file, allow_network, "Resolving metadata");

        let bundle = self.extractor.extract(path).await?;

        let title = bundle.title.unwrap_or_else(|| file_stem(path));
        let artist = bundle
            .artist
            .unwrap_or_else(|| self.unknown_artist.clone());
        let album = bundle.album.unwrap_or_default();

        let id = CacheIdentity::for_track(&artist, &title);
        let query = TrackQuery::new(title.as_str(), artist.as_str());

        let cover_path = self
            .resolve_cover(&id, &query, bundle.cover, allow_network)
            .await;
        let lyrics = self
            .resolve_lyrics(&id, &query, bundle.lyrics, allow_network)
            .await;

        debug!(
            file = %file,
            id = %id,
            has_cover = cover_path.is_some(),
            has_lyrics = lyrics.is_some(),
            "Resolved metadata"
        );

        Ok(MetadataRecord {
            title,
            artist,
            album,
            cover_path,
            lyrics,
        })
    }

    async fn resolve_cover(
        &self,
        id: &CacheIdentity,
        query: &TrackQuery,
        embedded: Option<Bytes>,
        allow_network: bool,
    ) -> Option<PathBuf> {
        if let Some(data) = embedded {
            return match self.cache.write_image(id, CoverKind::Embedded, &data).await {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(error = %e, "Failed to cache embedded cover");
                    None
                }
            };
        }

        if self.cache.has_image(id, CoverKind::Online).await {
            debug!(id = %id, "Using cached online cover");
            return Some(self.cache.image_path(id, CoverKind::Online));
        }

        if allow_network {
            self.covers.fetch(id, query).await
        } else {
            None
        }
    }

    async fn resolve_lyrics(
        &self,
        id: &CacheIdentity,
        query: &TrackQuery,
        embedded: Option<String>,
        allow_network: bool,
    ) -> Option<String> {
        if embedded.is_some() {
            return embedded;
        }

        if let Some(cached) = self.cache.read_lyrics(id).await {
            debug!(id = %id, "Using cached lyrics");
            return Some(cached);
        }

        if allow_network {
            self.lyrics.fetch(id, query).await.map(|result| result.text)
        } else {
            None
        }
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
