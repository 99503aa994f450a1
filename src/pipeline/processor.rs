//! Article ingest — normalizes raw feed items, classifies them, and
//! queues them for posting.
//!
//! Flow:
//! 1. Normalize the raw item (drop it if it has no id or title)
//! 2. Classify against the current spam rules
//! 3. Store — spam goes in flagged so it never reaches the queue
//!
//! One bad item never aborts the batch; it is counted and the rest
//! continue.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Error;
use crate::feed::types::RawFeedItem;
use crate::pipeline::classify::Classifier;
use crate::store::ArticleStore;

/// Counters for one ingest pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Items the feed returned.
    pub fetched: usize,
    /// New rows written (spam included).
    pub added: usize,
    /// Valid items that were already known.
    pub skipped: usize,
    /// Items with no usable id or title.
    pub invalid: usize,
}

/// Ingest processor. Owns the classifier; rules are re-read from disk
/// on every classification, so rule edits apply to the next batch
/// without a restart.
pub struct Processor {
    store: Arc<ArticleStore>,
    classifier: Classifier,
    site_base_url: String,
}

impl Processor {
    pub fn new(store: Arc<ArticleStore>, classifier: Classifier, site_base_url: String) -> Self {
        Self {
            store,
            classifier,
            site_base_url,
        }
    }

    /// Run one batch of raw feed items through the pipeline.
    pub async fn process(&self, items: Vec<RawFeedItem>) -> Result<IngestReport, Error> {
        let mut report = IngestReport {
            fetched: items.len(),
            ..Default::default()
        };

        for item in items {
            let Some(article) = item.into_article(&self.site_base_url) else {
                report.invalid += 1;
                continue;
            };

            let verdict = self.classifier.classify(&article)?;
            if verdict.is_spam {
                info!(
                    content_id = %article.content_id,
                    title = %article.title,
                    rules = ?verdict.matched_rules,
                    "Spam detected"
                );
            }

            if self.store.add_article(&article, verdict.is_spam).await? {
                debug!(content_id = %article.content_id, "Stored article");
                report.added += 1;
            } else {
                report.skipped += 1;
            }
        }

        info!(
            fetched = report.fetched,
            added = report.added,
            skipped = report.skipped,
            invalid = report.invalid,
            "Ingest complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::rules::RuleStore;
    use crate::store::Database;

    const RULES: &str = r#"{"rules": [
        {"id": "webinar", "type": "keyword", "field": "title", "patterns": ["webinar"]}
    ]}"#;

    async fn test_processor(dir: &tempfile::TempDir) -> Processor {
        let base = dir.path().join("spam_rules.json");
        std::fs::write(&base, RULES).unwrap();
        let rules = RuleStore::new(base, dir.path().join("spam_rules.local.json"));

        let db = Database::new_memory().await.unwrap();
        let store = Arc::new(ArticleStore::new(Arc::new(db)));
        Processor::new(
            store,
            Classifier::new(rules),
            "https://builder.aws.com".to_string(),
        )
    }

    fn item(id: &str, title: &str) -> RawFeedItem {
        serde_json::from_value(serde_json::json!({
            "contentId": id,
            "title": title,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn counts_added_skipped_and_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let processor = test_processor(&dir).await;

        let items = vec![
            item("/content/a", "Rust on Lambda"),
            RawFeedItem::default(),
            item("/content/a", "Rust on Lambda"),
        ];
        let report = processor.process(items).await.unwrap();

        assert_eq!(
            report,
            IngestReport {
                fetched: 3,
                added: 1,
                skipped: 1,
                invalid: 1,
            }
        );
    }

    #[tokio::test]
    async fn spam_is_stored_flagged_and_kept_out_of_the_queue() {
        let dir = tempfile::tempdir().unwrap();
        let processor = test_processor(&dir).await;

        let report = processor
            .process(vec![item("/content/w", "Join our webinar next week")])
            .await
            .unwrap();
        assert_eq!(report.added, 1);

        let stats = processor.store.stats().await.unwrap();
        assert_eq!(stats.spam, 1);
        assert_eq!(stats.pending, 0);
        assert!(processor.store.next_pending().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reingest_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let processor = test_processor(&dir).await;

        let first = processor
            .process(vec![item("/content/a", "One")])
            .await
            .unwrap();
        assert_eq!(first.added, 1);

        let second = processor
            .process(vec![item("/content/a", "One")])
            .await
            .unwrap();
        assert_eq!(second.added, 0);
        assert_eq!(second.skipped, 1);
    }
}
