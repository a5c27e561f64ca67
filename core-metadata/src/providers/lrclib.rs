//! LRCLib Lyrics Client
//!
//! LRCLib is a free, open lyrics database serving both synced (LRC) and
//! plain lyrics without an API key.
//!
//! ## API Endpoints
//!
//! - **Get**: `https://lrclib.net/api/get?artist_name={artist}&track_name={title}`

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpRequest};
use core_runtime::config::ProviderEndpoints;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{MetadataError, Result};
use crate::lyrics::{LyricsProvider, LyricsResult, LyricsSource};
use crate::providers::TrackQuery;

#[derive(Debug, Deserialize)]
struct LrcLibResponse {
    #[serde(rename = "syncedLyrics")]
    synced_lyrics: Option<String>,
    #[serde(rename = "plainLyrics")]
    plain_lyrics: Option<String>,
}

/// LRCLib provider
pub struct LrcLibProvider {
    http_client: Arc<dyn HttpClient>,
    get_url: String,
}

impl LrcLibProvider {
    pub fn new(http_client: Arc<dyn HttpClient>, endpoints: &ProviderEndpoints) -> Self {
        Self {
            http_client,
            get_url: endpoints.lrclib_get.clone(),
        }
    }
}

#[async_trait]
impl LyricsProvider for LrcLibProvider {
    async fn fetch(&self, query: &TrackQuery) -> Result<Option<LyricsResult>> {
        let url = format!(
            "{}?artist_name={}&track_name={}",
            self.get_url,
            urlencoding::encode(&query.artist),
            urlencoding::encode(&query.title)
        );

        let response = self.http_client.execute(HttpRequest::get(url)).await?;

        if response.status == 404 {
            return Ok(None);
        }

        if !response.is_success() {
            return Err(MetadataError::ProviderFailed(format!(
                "LRCLib API error: HTTP {}",
                response.status
            )));
        }

        let lrc_response: LrcLibResponse = response.json()?;

        // Prefer synced lyrics if available
        if let Some(synced) = lrc_response.synced_lyrics.filter(|t| !t.trim().is_empty()) {
            return Ok(Some(LyricsResult::new(synced, true, LyricsSource::LrcLib)));
        }

        Ok(lrc_response
            .plain_lyrics
            .filter(|t| !t.trim().is_empty())
            .map(|plain| LyricsResult::new(plain, false, LyricsSource::LrcLib)))
    }

    fn source(&self) -> LyricsSource {
        LyricsSource::LrcLib
    }
}
