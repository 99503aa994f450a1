//! HTTP client for the article feed.

use std::path::PathBuf;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, info};

use crate::error::FeedError;
use crate::feed::types::{FeedResponse, RawFeedItem};

/// Fetches the newest articles from the feed endpoint.
///
/// When a cache path is configured and the file exists, the cached body
/// is parsed instead of hitting the network. This keeps local runs and
/// tests off the live API.
pub struct FeedClient {
    http: reqwest::Client,
    feed_url: String,
    cache_path: Option<PathBuf>,
}

impl FeedClient {
    pub fn new(
        feed_url: String,
        cache_path: Option<PathBuf>,
        timeout: Duration,
    ) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::Http(e.to_string()))?;
        Ok(Self {
            http,
            feed_url,
            cache_path,
        })
    }

    pub async fn fetch(&self) -> Result<Vec<RawFeedItem>, FeedError> {
        if let Some(path) = &self.cache_path {
            if path.exists() {
                debug!(path = %path.display(), "Reading feed from cache file");
                let body = tokio::fs::read_to_string(path).await?;
                let response: FeedResponse =
                    serde_json::from_str(&body).map_err(|e| FeedError::Parse(e.to_string()))?;
                info!(count = response.feed_contents.len(), "Loaded cached feed");
                return Ok(response.feed_contents);
            }
        }

        let payload = json!({
            "contentType": "ARTICLE",
            "sort": {"article": {"sortOrder": "NEWEST"}}
        });

        let response = self
            .http
            .post(&self.feed_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| FeedError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let response: FeedResponse = response
            .json()
            .await
            .map_err(|e| FeedError::Parse(e.to_string()))?;
        info!(count = response.feed_contents.len(), "Fetched feed");
        Ok(response.feed_contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cache_file_takes_priority_over_the_network() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("feed.json");
        tokio::fs::write(
            &cache,
            r#"{"feedContents": [{"contentId": "/content/a", "title": "Cached"}]}"#,
        )
        .await
        .unwrap();

        // Unroutable URL: any network attempt would fail loudly.
        let client = FeedClient::new(
            "http://127.0.0.1:1/feed".to_string(),
            Some(cache),
            Duration::from_secs(1),
        )
        .unwrap();

        let items = client.fetch().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title.as_deref(), Some("Cached"));
    }

    #[tokio::test]
    async fn malformed_cache_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("feed.json");
        tokio::fs::write(&cache, "not json").await.unwrap();

        let client = FeedClient::new(
            "http://127.0.0.1:1/feed".to_string(),
            Some(cache),
            Duration::from_secs(1),
        )
        .unwrap();

        assert!(matches!(
            client.fetch().await,
            Err(FeedError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn missing_cache_falls_through_to_the_network() {
        let dir = tempfile::tempdir().unwrap();
        let client = FeedClient::new(
            "http://127.0.0.1:1/feed".to_string(),
            Some(dir.path().join("absent.json")),
            Duration::from_secs(1),
        )
        .unwrap();

        // The unroutable endpoint turns into an HTTP error, proving the
        // client actually attempted the request.
        assert!(matches!(client.fetch().await, Err(FeedError::Http(_))));
    }
}
