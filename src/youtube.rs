//! YouTube Data API v3 search client.

use crate::config::VideoConfig;
use crate::error::{Result, SnapError};
use crate::model::{thumbnail_url, VideoRef};
use crate::providers::{build_client, error_message};
use log::debug;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

pub struct YouTubeClient {
    client: Client,
    api_key: String,
    base_url: String,
    max_results: u32,
}

impl YouTubeClient {
    /// Create a client; fails with [`SnapError::MissingApiKey`] when no key is
    /// configured and `YOUTUBE_API_KEY` is unset.
    pub fn new(config: &VideoConfig, timeout: Duration) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("YOUTUBE_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| SnapError::MissingApiKey("YOUTUBE_API_KEY".to_string()))?;

        Ok(YouTubeClient {
            client: build_client(timeout)?,
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| "https://www.googleapis.com".to_string()),
            max_results: config.max_results.max(1),
        })
    }

    /// Search embeddable videos matching `query`
    pub async fn search(&self, query: &str) -> Result<Vec<VideoRef>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SnapError::VideoSearchError("a search query is required".to_string()));
        }

        let url = format!("{}/youtube/v3/search", self.base_url.trim_end_matches('/'));
        let max_results = self.max_results.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("type", "video"),
                ("videoEmbeddable", "true"),
                ("maxResults", max_results.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SnapError::VideoSearchError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SnapError::VideoSearchError(e.to_string()))?;

        if !status.is_success() {
            return Err(SnapError::VideoSearchError(format!(
                "YouTube API returned {}: {}",
                status.as_u16(),
                error_message(&body)
            )));
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| SnapError::VideoSearchError(format!("invalid JSON from YouTube: {}", e)))?;
        let videos = parse_search_results(&value);
        debug!("YouTube returned {} video(s) for '{}'", videos.len(), query);
        Ok(videos)
    }
}

fn parse_search_results(value: &Value) -> Vec<VideoRef> {
    value["items"]
        .as_array()
        .unwrap_or(&Vec::new())
        .iter()
        .filter_map(|item| {
            let id = item["id"]["videoId"].as_str().filter(|id| !id.is_empty())?;
            let snippet = &item["snippet"];
            let thumbnails = &snippet["thumbnails"];
            let thumbnail = ["high", "medium", "default"]
                .iter()
                .find_map(|size| thumbnails[*size]["url"].as_str())
                .map(String::from)
                .unwrap_or_else(|| thumbnail_url(id));

            Some(VideoRef {
                id: id.to_string(),
                title: snippet["title"].as_str().unwrap_or_default().to_string(),
                thumbnail,
            })
        })
        .collect()
}
