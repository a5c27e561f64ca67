//! Remote Lookup Providers
//!
//! This module contains clients for the external services queried when a
//! file carries no cover or lyrics of its own:
//! - iTunes Search - album artwork
//! - Netease Cloud Music - lyrics (usually LRC)
//! - LRCLib - synced or plain lyrics
//!
//! Each client is queried at most once per resolution; bounding the call in
//! time is the caller's job (see [`crate::artwork::CoverChain`] and
//! [`crate::lyrics::LyricsChain`]).

use serde::{Deserialize, Serialize};

#[cfg(feature = "artwork-remote")]
pub mod itunes;

#[cfg(feature = "lyrics")]
pub mod lrclib;

#[cfg(feature = "lyrics")]
pub mod netease;

#[cfg(feature = "artwork-remote")]
pub use itunes::ItunesProvider;

#[cfg(feature = "lyrics")]
pub use lrclib::LrcLibProvider;

#[cfg(feature = "lyrics")]
pub use netease::NeteaseProvider;

/// What a provider is asked to look up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackQuery {
    pub title: String,
    pub artist: String,
}

impl TrackQuery {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }

    /// `"{title} {artist}"`, the free-text search term
    pub fn search_term(&self) -> String {
        format!("{} {}", self.title, self.artist)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use bridge_traits::error::Result;
    use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
    use mockall::mock;

    mock! {
        pub Http {}

        #[async_trait]
        impl HttpClient for Http {
            async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
        }
    }
}
