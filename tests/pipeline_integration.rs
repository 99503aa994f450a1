//! End-to-end pipeline tests: cached feed file through classification,
//! queueing, publishing with sink fallback, and the audit trail.
//!
//! Components are wired over a temp directory and an in-memory
//! database; no test touches the network.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use feedrelay::error::SinkError;
use feedrelay::feed::FeedClient;
use feedrelay::pipeline::{Classifier, Processor, RuleStore};
use feedrelay::publish::{Publisher, RenderedPost};
use feedrelay::sinks::{AuditLog, DeliveryMode, OutboxSink, Sink};
use feedrelay::store::{ArticleStore, Database};

/// Three items: a clean article with tags, a spam article matching the
/// webinar rule, and one undecodable entry.
const FEED_BODY: &str = r#"{
    "feedContents": [
        {
            "contentId": "/content/rust-lambda",
            "title": "Building Rust functions on Lambda",
            "author": {"preferredName": "Alice Example", "alias": "alice"},
            "contentTypeSpecificResponse": {
                "article": {"description": "Walkthrough", "tags": ["rust", "aws-lambda"]}
            },
            "createdAt": 1700000000,
            "lastPublishedAt": 1700000100
        },
        {
            "contentId": "/content/webinar",
            "title": "Join our webinar on serverless",
            "lastPublishedAt": 1700000200
        },
        {"contentId": 42, "title": true}
    ]
}"#;

const RULES_BODY: &str = r#"{"rules": [
    {"id": "webinar", "type": "keyword", "field": "title", "patterns": ["webinar"]}
]}"#;

/// Sink that always refuses delivery.
struct FailingSink;

#[async_trait]
impl Sink for FailingSink {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn mode(&self) -> DeliveryMode {
        DeliveryMode::Buffer
    }

    async fn deliver(&self, _post: &RenderedPost) -> Result<String, SinkError> {
        Err(SinkError::Delivery {
            sink: "failing".to_string(),
            reason: "service down".to_string(),
        })
    }
}

async fn wire(dir: &tempfile::TempDir) -> (FeedClient, Processor, Arc<ArticleStore>) {
    tokio::fs::write(dir.path().join("feed.json"), FEED_BODY)
        .await
        .unwrap();
    tokio::fs::write(dir.path().join("spam_rules.json"), RULES_BODY)
        .await
        .unwrap();

    // Unroutable URL: any accidental network attempt fails the test.
    let feed = FeedClient::new(
        "http://127.0.0.1:1/feed".to_string(),
        Some(dir.path().join("feed.json")),
        Duration::from_secs(1),
    )
    .unwrap();

    let db = Database::new_memory().await.unwrap();
    let store = Arc::new(ArticleStore::new(Arc::new(db)));
    let rules = RuleStore::new(
        dir.path().join("spam_rules.json"),
        dir.path().join("spam_rules.local.json"),
    );
    let processor = Processor::new(
        store.clone(),
        Classifier::new(rules),
        "https://builder.aws.com".to_string(),
    );
    (feed, processor, store)
}

#[tokio::test]
async fn ingest_classifies_counts_and_stays_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let (feed, processor, store) = wire(&dir).await;

    let items = feed.fetch().await.unwrap();
    let report = processor.process(items).await.unwrap();
    assert_eq!(report.fetched, 3);
    assert_eq!(report.added, 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.invalid, 1);

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.spam, 1);

    // Second pass over the same feed adds nothing.
    let items = feed.fetch().await.unwrap();
    let report = processor.process(items).await.unwrap();
    assert_eq!(report.added, 0);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.invalid, 1);
}

#[tokio::test]
async fn failed_sink_falls_back_and_the_audit_trail_survives() {
    let dir = tempfile::tempdir().unwrap();
    let (feed, processor, store) = wire(&dir).await;
    processor.process(feed.fetch().await.unwrap()).await.unwrap();

    let outbox_path = dir.path().join("outbox.jsonl");
    let audit_path = dir.path().join("audit_log.txt");
    let publisher = Publisher::new(
        store.clone(),
        vec![
            Box::new(FailingSink),
            Box::new(OutboxSink::new(outbox_path.clone())),
        ],
        AuditLog::new(audit_path.clone()),
    );

    let post = publisher.publish_next().await.unwrap().unwrap();
    assert_eq!(post.content_id, "/content/rust-lambda");
    assert_eq!(post.delivery, DeliveryMode::Outbox);
    assert!(post.text.contains("#rust #awslambda"));
    assert!(post.text.chars().count() <= 280);

    // Delivery landed in the outbox and left exactly one audit entry.
    let outbox = tokio::fs::read_to_string(&outbox_path).await.unwrap();
    assert_eq!(outbox.lines().count(), 1);
    let audit = tokio::fs::read_to_string(&audit_path).await.unwrap();
    assert_eq!(audit.matches("---\n\n").count(), 1);
    assert!(audit.contains(&format!("(ID: {})", post.post_id)));

    // Receipt written; the spam article never surfaces.
    let stats = store.stats().await.unwrap();
    assert_eq!(stats.posted, 1);
    assert_eq!(stats.pending, 0);
    assert!(publisher.publish_next().await.unwrap().is_none());
}
