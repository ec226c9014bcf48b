//! YouTube video search via SerpApi.

use crate::error::{Result, ResymeError};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// A video located by search.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoHit {
    pub title: String,
    pub channel: Option<String>,
    pub link: String,
}

/// Video lookup by free-text query.
#[async_trait]
pub trait VideoSearch: Send + Sync {
    /// Find the best-matching video for a query.
    async fn search(&self, query: &str) -> Result<VideoHit>;
}

/// SerpApi-backed YouTube search client.
pub struct SerpApiSearch {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl SerpApiSearch {
    pub fn new(endpoint: &str, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct SerpResponse {
    #[serde(default)]
    video_results: Vec<SerpVideo>,
}

#[derive(Debug, Deserialize)]
struct SerpVideo {
    title: Option<String>,
    link: Option<String>,
    channel: Option<SerpChannel>,
}

#[derive(Debug, Deserialize)]
struct SerpChannel {
    name: Option<String>,
}

#[async_trait]
impl VideoSearch for SerpApiSearch {
    async fn search(&self, query: &str) -> Result<VideoHit> {
        debug!("Searching YouTube for: {}", query);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("engine", "youtube"),
                ("search_query", query),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ResymeError::Search(format!("SerpApi request failed: {}", e)))?;

        let parsed: SerpResponse = response.json().await?;

        let video = parsed
            .video_results
            .into_iter()
            .find(|v| v.link.as_deref().is_some_and(|l| !l.is_empty()))
            .ok_or_else(|| ResymeError::NoResults(query.to_string()))?;

        Ok(VideoHit {
            title: video.title.unwrap_or_else(|| "Unknown Title".to_string()),
            channel: video.channel.and_then(|c| c.name),
            link: video.link.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serp_response() {
        let body = r#"{
            "video_results": [
                {
                    "title": "Rust in 100 Seconds",
                    "link": "https://www.youtube.com/watch?v=5C_HPTJg5ek",
                    "channel": {"name": "Fireship"}
                }
            ]
        }"#;

        let parsed: SerpResponse = serde_json::from_str(body).unwrap();
        let video = &parsed.video_results[0];
        assert_eq!(video.title.as_deref(), Some("Rust in 100 Seconds"));
        assert_eq!(
            video.channel.as_ref().and_then(|c| c.name.as_deref()),
            Some("Fireship")
        );
    }

    #[test]
    fn test_parse_empty_results() {
        let parsed: SerpResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.video_results.is_empty());
    }
}
