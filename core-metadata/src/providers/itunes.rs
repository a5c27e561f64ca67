//! iTunes Search API Client
//!
//! Looks up album artwork for a track.
//!
//! ## API Endpoints
//!
//! - **Search**: `https://itunes.apple.com/search?term={title} {artist}&media=music&entity=song&limit=1`
//!
//! The search result carries a 100x100 thumbnail URL (`artworkUrl100`).
//! Rewriting the size token in that URL yields a larger rendition from the
//! same CDN, which is then downloaded as-is.

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpRequest};
use bytes::Bytes;
use core_runtime::config::ProviderEndpoints;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::artwork::CoverProvider;
use crate::error::{MetadataError, Result};
use crate::providers::TrackQuery;

/// iTunes search response
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(rename = "artworkUrl100")]
    artwork_url_100: Option<String>,
}

/// Cover provider backed by the iTunes Search API
pub struct ItunesProvider {
    http_client: Arc<dyn HttpClient>,
    search_url: String,
    size_token: String,
    high_res_token: String,
}

impl ItunesProvider {
    pub fn new(http_client: Arc<dyn HttpClient>, endpoints: &ProviderEndpoints) -> Self {
        Self {
            http_client,
            search_url: endpoints.itunes_search.clone(),
            size_token: endpoints.artwork_size_token.clone(),
            high_res_token: endpoints.artwork_high_res_token.clone(),
        }
    }

    /// URL of the first search hit's artwork, already upsized
    async fn find_artwork_url(&self, query: &TrackQuery) -> Result<Option<String>> {
        let url = format!(
            "{}?term={}&media=music&entity=song&limit=1",
            self.search_url,
            urlencoding::encode(&query.search_term())
        );

        debug!(title = %query.title, artist = %query.artist, "Querying iTunes search");

        let response = self.http_client.execute(HttpRequest::get(url)).await?;
        if !response.is_success() {
            return Err(MetadataError::ProviderFailed(format!(
                "iTunes search returned HTTP {}",
                response.status
            )));
        }

        let search: SearchResponse = response.json()?;
        Ok(search
            .results
            .into_iter()
            .next()
            .and_then(|hit| hit.artwork_url_100)
            .filter(|url| !url.is_empty())
            .map(|url| url.replace(&self.size_token, &self.high_res_token)))
    }
}

#[async_trait]
impl CoverProvider for ItunesProvider {
    async fn fetch_cover(&self, query: &TrackQuery) -> Result<Option<Bytes>> {
        let Some(artwork_url) = self.find_artwork_url(query).await? else {
            debug!("No artwork in iTunes search result");
            return Ok(None);
        };

        debug!(url = %artwork_url, "Downloading iTunes artwork");
        let response = self.http_client.execute(HttpRequest::get(artwork_url)).await?;
        if !response.is_success() {
            return Err(MetadataError::ProviderFailed(format!(
                "iTunes artwork download returned HTTP {}",
                response.status
            )));
        }

        if response.body.is_empty() {
            Ok(None)
        } else {
            Ok(Some(response.body))
        }
    }

    fn name(&self) -> &'static str {
        "itunes"
    }
}
