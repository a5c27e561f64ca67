//! # Resolver Configuration Module
//!
//! Provides configuration management for the metadata resolver.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! `ResolverConfig`. Every setting has a working default, so an empty builder
//! produces a usable configuration; `build()` still validates fail-fast so a
//! host cannot start with, say, a zero timeout.
//!
//! ## Usage
//!
//! ### Defaults
//!
//! ```
//! use core_runtime::config::ResolverConfig;
//!
//! let config = ResolverConfig::builder()
//!     .cache_dir("/path/to/cache")
//!     .build()
//!     .expect("Failed to build config");
//! assert_eq!(config.provider_timeout.as_secs(), 5);
//! ```
//!
//! ### Redirecting providers
//!
//! ```
//! use core_runtime::config::{ProviderEndpoints, ResolverConfig};
//! use std::time::Duration;
//!
//! let endpoints = ProviderEndpoints::default()
//!     .with_lrclib_get("http://localhost:8080/api/get");
//!
//! let config = ResolverConfig::builder()
//!     .cache_dir("/tmp/track-cache")
//!     .provider_timeout(Duration::from_secs(2))
//!     .endpoints(endpoints)
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::ResolverConfig;
//! use std::time::Duration;
//!
//! // This will panic with an actionable error message
//! let config = ResolverConfig::builder()
//!     .provider_timeout(Duration::ZERO)
//!     .build()
//!     .expect("Should fail - zero timeout");
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default cache root, relative to the working directory
pub const DEFAULT_CACHE_DIR: &str = "cache";

/// Default bound on a single provider lookup
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(5);

/// Artist used when a file carries no artist tag
pub const DEFAULT_UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Longest provider timeout accepted by validation
const MAX_PROVIDER_TIMEOUT: Duration = Duration::from_secs(120);

/// Resolver configuration.
///
/// Holds every tunable the metadata pipeline reads. Use
/// [`ResolverConfigBuilder`] to construct instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Root of the on-disk cache (`images/` and `lyrics/` live below it)
    pub cache_dir: PathBuf,

    /// Upper bound for one provider call, including every HTTP round-trip
    pub provider_timeout: Duration,

    /// Remote endpoints and request decoration
    pub endpoints: ProviderEndpoints,

    /// Artist used when the file carries no artist tag
    pub unknown_artist: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            endpoints: ProviderEndpoints::default(),
            unknown_artist: DEFAULT_UNKNOWN_ARTIST.to_string(),
        }
    }
}

/// Endpoints and fixed request values for the lookup providers.
///
/// Every field has a default, so a partial JSON or TOML document only needs
/// to name what it overrides.
///
/// # Example
///
/// ```
/// use core_runtime::config::ProviderEndpoints;
///
/// let endpoints: ProviderEndpoints =
///     serde_json::from_str(r#"{ "lrclib_get": "http://127.0.0.1:9000/api/get" }"#).unwrap();
/// assert_eq!(endpoints.lrclib_get, "http://127.0.0.1:9000/api/get");
/// assert_eq!(endpoints.artwork_high_res_token, "600x600");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderEndpoints {
    /// iTunes search API
    pub itunes_search: String,

    /// Netease web search API (POST)
    pub netease_search: String,

    /// Netease lyric API
    pub netease_lyric: String,

    /// LRCLib exact-match lookup
    pub lrclib_get: String,

    /// `Referer` sent to Netease
    pub referer: String,

    /// `User-Agent` sent to Netease
    pub user_agent: String,

    /// Size token embedded in iTunes artwork URLs
    pub artwork_size_token: String,

    /// Replacement token requesting the larger artwork
    pub artwork_high_res_token: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            itunes_search: "https://itunes.apple.com/search".to_string(),
            netease_search: "http://music.163.com/api/search/get/web".to_string(),
            netease_lyric: "http://music.163.com/api/song/lyric".to_string(),
            lrclib_get: "https://lrclib.net/api/get".to_string(),
            referer: "http://music.163.com/".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            artwork_size_token: "100x100".to_string(),
            artwork_high_res_token: "600x600".to_string(),
        }
    }
}

impl ProviderEndpoints {
    /// Sets the iTunes search endpoint
    pub fn with_itunes_search(mut self, url: impl Into<String>) -> Self {
        self.itunes_search = url.into();
        self
    }

    /// Sets both Netease endpoints
    pub fn with_netease(mut self, search: impl Into<String>, lyric: impl Into<String>) -> Self {
        self.netease_search = search.into();
        self.netease_lyric = lyric.into();
        self
    }

    /// Sets the LRCLib lookup endpoint
    pub fn with_lrclib_get(mut self, url: impl Into<String>) -> Self {
        self.lrclib_get = url.into();
        self
    }

    /// Validates the endpoints
    pub fn validate(&self) -> Result<()> {
        let urls = [
            ("itunes_search", &self.itunes_search),
            ("netease_search", &self.netease_search),
            ("netease_lyric", &self.netease_lyric),
            ("lrclib_get", &self.lrclib_get),
        ];

        for (name, url) in urls {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::Config(format!(
                    "Endpoint '{}' must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }

        if self.artwork_size_token.is_empty() || self.artwork_high_res_token.is_empty() {
            return Err(Error::Config(
                "Artwork size tokens cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl ResolverConfig {
    /// Creates a new builder for constructing a `ResolverConfig`.
    pub fn builder() -> ResolverConfigBuilder {
        ResolverConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Cache directory is not empty
    /// - Provider timeout is non-zero and at most two minutes
    /// - Endpoints are http(s) URLs
    /// - Fallback artist is not blank
    pub fn validate(&self) -> Result<()> {
        if self.cache_dir.as_os_str().is_empty() {
            return Err(Error::Config("Cache directory cannot be empty".to_string()));
        }

        if self.provider_timeout.is_zero() {
            return Err(Error::Config(
                "Provider timeout must be greater than zero".to_string(),
            ));
        }

        if self.provider_timeout > MAX_PROVIDER_TIMEOUT {
            return Err(Error::Config(format!(
                "Provider timeout exceeds maximum of {:?}",
                MAX_PROVIDER_TIMEOUT
            )));
        }

        if self.unknown_artist.trim().is_empty() {
            return Err(Error::Config(
                "Fallback artist name cannot be blank".to_string(),
            ));
        }

        self.endpoints.validate()
    }
}

/// Builder for constructing [`ResolverConfig`] instances.
#[derive(Debug, Default)]
pub struct ResolverConfigBuilder {
    cache_dir: Option<PathBuf>,
    provider_timeout: Option<Duration>,
    endpoints: Option<ProviderEndpoints>,
    unknown_artist: Option<String>,
}

impl ResolverConfigBuilder {
    /// Sets the cache directory.
    ///
    /// Default: `cache` relative to the working directory.
    pub fn cache_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.into());
        self
    }

    /// Sets the timeout applied to each provider call.
    ///
    /// Default: 5 seconds
    pub fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = Some(timeout);
        self
    }

    /// Overrides the provider endpoints.
    pub fn endpoints(mut self, endpoints: ProviderEndpoints) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    /// Overrides the artist used for untagged files.
    pub fn unknown_artist(mut self, artist: impl Into<String>) -> Self {
        self.unknown_artist = Some(artist.into());
        self
    }

    /// Builds the final configuration, validating it first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid setting.
    pub fn build(self) -> Result<ResolverConfig> {
        let defaults = ResolverConfig::default();
        let config = ResolverConfig {
            cache_dir: self.cache_dir.unwrap_or(defaults.cache_dir),
            provider_timeout: self.provider_timeout.unwrap_or(defaults.provider_timeout),
            endpoints: self.endpoints.unwrap_or(defaults.endpoints),
            unknown_artist: self.unknown_artist.unwrap_or(defaults.unknown_artist),
        };

        config.validate()?;
        Ok(config)
    }
}
