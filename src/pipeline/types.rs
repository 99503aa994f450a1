//! Shared types for the article pipeline.

use serde::{Deserialize, Serialize};

/// Normalized article, ready for classification and storage.
///
/// The feed client converts raw API items into this struct; nothing
/// downstream sees the wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewArticle {
    /// Stable external key, unique per article.
    pub content_id: String,
    pub title: String,
    pub author_name: Option<String>,
    /// Author handle, the field author rules match by default.
    pub author_alias: Option<String>,
    pub description: Option<String>,
    /// Canonical article URL (site base + content id).
    pub url: String,
    /// Comma-joined tag list.
    pub tags: Option<String>,
    /// Source-assigned creation time, unix seconds.
    pub created_at: Option<i64>,
    /// Source-assigned publication time, unix seconds. Drives queue order.
    pub published_at: Option<i64>,
}

/// Field lookup for rule evaluation.
///
/// Implemented by both the normalized fetch shape and stored rows so
/// ingestion and the retroactive re-scan share one matcher. Unknown
/// field names read as empty.
pub trait RuleTarget {
    fn field(&self, name: &str) -> &str;
}

impl RuleTarget for NewArticle {
    fn field(&self, name: &str) -> &str {
        match name {
            "title" => &self.title,
            "author_name" => self.author_name.as_deref().unwrap_or(""),
            "author_alias" => self.author_alias.as_deref().unwrap_or(""),
            "description" => self.description.as_deref().unwrap_or(""),
            "url" => &self.url,
            "tags" => self.tags.as_deref().unwrap_or(""),
            _ => "",
        }
    }
}

impl RuleTarget for crate::store::Article {
    fn field(&self, name: &str) -> &str {
        match name {
            "title" => &self.title,
            "author_name" => self.author_name.as_deref().unwrap_or(""),
            "author_alias" => self.author_alias.as_deref().unwrap_or(""),
            "description" => self.description.as_deref().unwrap_or(""),
            "url" => &self.url,
            "tags" => self.tags.as_deref().unwrap_or(""),
            _ => "",
        }
    }
}
