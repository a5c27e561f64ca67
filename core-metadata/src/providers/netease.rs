//! Netease Cloud Music Lyrics Client
//!
//! ## API Endpoints
//!
//! - **Search** (POST): `http://music.163.com/api/search/get/web?s={title} {artist}&type=1&offset=0&total=true&limit=1`
//! - **Lyric**: `http://music.163.com/api/song/lyric?os=pc&id={song_id}&lv=-1&kv=-1&tv=-1`
//!
//! Both endpoints reject requests without a browser-like `Referer` and
//! `User-Agent`; the values come from [`ProviderEndpoints`].

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpRequest};
use core_runtime::config::ProviderEndpoints;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::error::{MetadataError, Result};
use crate::lyrics::{looks_synced, LyricsProvider, LyricsResult, LyricsSource};
use crate::providers::TrackQuery;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Option<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    songs: Vec<Song>,
}

#[derive(Debug, Deserialize)]
struct Song {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct LyricResponse {
    lrc: Option<LyricBody>,
}

#[derive(Debug, Deserialize)]
struct LyricBody {
    lyric: Option<String>,
}

/// Lyrics provider backed by the Netease web API
pub struct NeteaseProvider {
    http_client: Arc<dyn HttpClient>,
    search_url: String,
    lyric_url: String,
    referer: String,
    user_agent: String,
}

impl NeteaseProvider {
    pub fn new(http_client: Arc<dyn HttpClient>, endpoints: &ProviderEndpoints) -> Self {
        Self {
            http_client,
            search_url: endpoints.netease_search.clone(),
            lyric_url: endpoints.netease_lyric.clone(),
            referer: endpoints.referer.clone(),
            user_agent: endpoints.user_agent.clone(),
        }
    }

    fn decorate(&self, request: HttpRequest) -> HttpRequest {
        request
            .header("Referer", self.referer.as_str())
            .header("User-Agent", self.user_agent.as_str())
    }

    /// Id of the best search hit
    async fn search_song(&self, query: &TrackQuery) -> Result<Option<u64>> {
        let url = format!(
            "{}?s={}&type=1&offset=0&total=true&limit=1",
            self.search_url,
            urlencoding::encode(&query.search_term())
        );

        let response = self
            .http_client
            .execute(self.decorate(HttpRequest::post(url)))
            .await?;

        if !response.is_success() {
            return Err(MetadataError::ProviderFailed(format!(
                "Netease search returned HTTP {}",
                response.status
            )));
        }

        let search: SearchResponse = response.json()?;
        Ok(search
            .result
            .and_then(|result| result.songs.into_iter().next())
            .map(|song| song.id))
    }

    async fn fetch_lyric(&self, song_id: u64) -> Result<Option<String>> {
        let url = format!(
            "{}?os=pc&id={}&lv=-1&kv=-1&tv=-1",
            self.lyric_url, song_id
        );

        let response = self
            .http_client
            .execute(self.decorate(HttpRequest::get(url)))
            .await?;

        if !response.is_success() {
            return Err(MetadataError::ProviderFailed(format!(
                "Netease lyric returned HTTP {}",
                response.status
            )));
        }

        let lyric: LyricResponse = response.json()?;
        Ok(lyric
            .lrc
            .and_then(|body| body.lyric)
            .filter(|text| !text.trim().is_empty()))
    }
}

#[async_trait]
impl LyricsProvider for NeteaseProvider {
    async fn fetch(&self, query: &TrackQuery) -> Result<Option<LyricsResult>> {
        let Some(song_id) = self.search_song(query).await? else {
            debug!(title = %query.title, "No Netease search hit");
            return Ok(None);
        };

        debug!(song_id, "Fetching Netease lyric");
        Ok(self.fetch_lyric(song_id).await?.map(|text| {
            let is_synced = looks_synced(&text);
            LyricsResult::new(text, is_synced, LyricsSource::Netease)
        }))
    }

    fn source(&self) -> LyricsSource {
        LyricsSource::Netease
    }
}
