//! Feed API wire types.
//!
//! Every field is optional at the serde level and items are decoded one
//! at a time, so a single malformed entry can never fail the batch.
//! Validation happens in `into_article`.

use serde::{Deserialize, Deserializer};
use tracing::warn;

use crate::pipeline::types::NewArticle;

/// Response envelope of the feed endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct FeedResponse {
    #[serde(
        default,
        rename = "feedContents",
        deserialize_with = "lenient_items"
    )]
    pub feed_contents: Vec<RawFeedItem>,
}

/// One raw feed item.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFeedItem {
    pub content_id: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<RawAuthor>,
    #[serde(default)]
    pub content_type_specific_response: Option<RawContentResponse>,
    /// Unix seconds.
    pub created_at: Option<i64>,
    /// Unix seconds.
    pub last_published_at: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAuthor {
    pub preferred_name: Option<String>,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawContentResponse {
    #[serde(default)]
    pub article: Option<RawArticleDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawArticleDetails {
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl RawFeedItem {
    /// Normalize into the article schema.
    ///
    /// Returns `None` when the item has no usable id or title. The
    /// canonical URL is the site base with the content id appended as-is.
    pub fn into_article(self, site_base_url: &str) -> Option<NewArticle> {
        let Some(content_id) = self.content_id.filter(|s| !s.is_empty()) else {
            warn!("Feed item without contentId, skipping");
            return None;
        };
        let Some(title) = self.title.filter(|s| !s.is_empty()) else {
            warn!(content_id = %content_id, "Feed item without title, skipping");
            return None;
        };

        let author = self.author.unwrap_or_default();
        let details = self
            .content_type_specific_response
            .and_then(|r| r.article)
            .unwrap_or_default();

        let tags = if details.tags.is_empty() {
            None
        } else {
            Some(details.tags.join(","))
        };

        let url = format!("{site_base_url}{content_id}");

        Some(NewArticle {
            content_id,
            title,
            author_name: author.preferred_name,
            author_alias: author.alias,
            description: details.description,
            url,
            tags,
            created_at: self.created_at,
            published_at: self.last_published_at,
        })
    }
}

/// Decode feed items one by one; an undecodable item becomes an empty
/// placeholder that fails normalization instead of sinking the batch.
fn lenient_items<'de, D>(deserializer: D) -> Result<Vec<RawFeedItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .map(|value| {
            serde_json::from_value(value).unwrap_or_else(|e| {
                warn!(error = %e, "Unparseable feed item");
                RawFeedItem::default()
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_ITEM: &str = r#"{
        "contentId": "/content/abc123",
        "title": "Building with Rust on Lambda",
        "author": {"preferredName": "Alice Example", "alias": "alice"},
        "contentTypeSpecificResponse": {
            "article": {
                "description": "A walkthrough.",
                "tags": ["rust", "aws-lambda", "serverless tips"]
            }
        },
        "createdAt": 1700000000,
        "lastPublishedAt": 1700000100
    }"#;

    #[test]
    fn parses_and_normalizes_a_full_item() {
        let raw: RawFeedItem = serde_json::from_str(SAMPLE_ITEM).unwrap();
        let article = raw.into_article("https://builder.aws.com").unwrap();

        assert_eq!(article.content_id, "/content/abc123");
        assert_eq!(article.title, "Building with Rust on Lambda");
        assert_eq!(article.author_alias.as_deref(), Some("alice"));
        assert_eq!(article.url, "https://builder.aws.com/content/abc123");
        assert_eq!(
            article.tags.as_deref(),
            Some("rust,aws-lambda,serverless tips")
        );
        assert_eq!(article.published_at, Some(1700000100));
    }

    #[test]
    fn missing_optional_fields_are_tolerated() {
        let raw: RawFeedItem =
            serde_json::from_str(r#"{"contentId": "/content/x", "title": "Bare"}"#).unwrap();
        let article = raw.into_article("https://builder.aws.com").unwrap();

        assert!(article.author_alias.is_none());
        assert!(article.tags.is_none());
        assert!(article.published_at.is_none());
    }

    #[test]
    fn items_without_id_or_title_are_invalid() {
        let no_id: RawFeedItem = serde_json::from_str(r#"{"title": "No id"}"#).unwrap();
        assert!(no_id.into_article("https://builder.aws.com").is_none());

        let no_title: RawFeedItem =
            serde_json::from_str(r#"{"contentId": "/content/x"}"#).unwrap();
        assert!(no_title.into_article("https://builder.aws.com").is_none());
    }

    #[test]
    fn one_bad_item_does_not_sink_the_batch() {
        let body = format!(
            r#"{{"feedContents": [{SAMPLE_ITEM}, {{"contentId": 42, "createdAt": "not a number"}}]}}"#
        );
        let response: FeedResponse = serde_json::from_str(&body).unwrap();

        assert_eq!(response.feed_contents.len(), 2);
        assert!(response.feed_contents[0].content_id.is_some());
        // The broken item decays to a placeholder that normalization rejects.
        assert!(
            response.feed_contents[1]
                .clone()
                .into_article("https://builder.aws.com")
                .is_none()
        );
    }

    #[test]
    fn empty_response_parses() {
        let response: FeedResponse = serde_json::from_str("{}").unwrap();
        assert!(response.feed_contents.is_empty());
    }
}
