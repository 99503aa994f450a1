//! Application wiring — builds every component from config and runs the
//! fetch and publish cycles.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{AppConfig, BufferConfig};
use crate::error::{ConfigError, Result};
use crate::feed::FeedClient;
use crate::pipeline::classify::Classifier;
use crate::pipeline::processor::{IngestReport, Processor};
use crate::pipeline::rules::RuleStore;
use crate::publish::{PostResult, Publisher};
use crate::sinks::{AuditLog, BufferSink, OutboxSink, Sink};
use crate::store::{ArticleStore, Database, QueueStats};

pub struct App {
    store: Arc<ArticleStore>,
    classifier: Classifier,
    feed: FeedClient,
    processor: Processor,
    publisher: Publisher,
}

impl App {
    /// Wire the full application from config.
    ///
    /// The Buffer sink is only ranked when its credentials are present;
    /// without them, posts go straight to the outbox.
    pub async fn new(config: &AppConfig) -> Result<Self> {
        tokio::fs::create_dir_all(&config.data_dir)
            .await
            .map_err(ConfigError::Io)?;

        let db = Arc::new(Database::new_local(&config.db_path).await?);
        let store = Arc::new(ArticleStore::new(db));

        let rules = RuleStore::new(config.base_rules_path(), config.local_rules_path());
        let classifier = Classifier::new(rules);

        let feed = FeedClient::new(
            config.feed_url.clone(),
            config.feed_cache.clone(),
            config.http_timeout,
        )?;

        let processor = Processor::new(
            store.clone(),
            classifier.clone(),
            config.site_base_url.clone(),
        );

        let mut sinks: Vec<Box<dyn Sink>> = Vec::new();
        match BufferConfig::from_env() {
            Some(buffer) => {
                sinks.push(Box::new(BufferSink::new(buffer, config.http_timeout)?));
                info!("Buffer sink enabled");
            }
            None => {
                info!("Buffer credentials not set, posts will go to the outbox");
            }
        }
        sinks.push(Box::new(OutboxSink::new(config.outbox_path.clone())));

        let publisher = Publisher::new(
            store.clone(),
            sinks,
            AuditLog::new(config.audit_log_path.clone()),
        );

        Ok(Self {
            store,
            classifier,
            feed,
            processor,
            publisher,
        })
    }

    pub fn store(&self) -> &ArticleStore {
        &self.store
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// One fetch cycle: pull the feed, classify and store every item.
    pub async fn run_fetch_cycle(&self) -> Result<IngestReport> {
        info!("Starting fetch cycle");
        let items = self.feed.fetch().await?;
        let report = self.processor.process(items).await?;
        info!(
            "Fetched: {}, Added: {}, Skipped: {}, Invalid: {}",
            report.fetched, report.added, report.skipped, report.invalid
        );

        let stats = self.store.stats().await?;
        info!(pending = stats.pending, posted = stats.posted, "Queue stats");
        Ok(report)
    }

    /// One publish cycle: post the oldest pending article, if any.
    pub async fn run_publish_cycle(&self) -> Result<Option<PostResult>> {
        info!("Starting publish cycle");
        let before = self.store.stats().await?;
        info!(pending = before.pending, posted = before.posted, "Queue before");

        let result = self.publisher.publish_next().await?;
        match &result {
            Some(post) => {
                info!(
                    title = %post.title.chars().take(50).collect::<String>(),
                    post_id = %post.post_id,
                    delivery = post.delivery.label(),
                    "Posted article"
                );
            }
            None => warn!("Queue is empty, nothing posted"),
        }

        let after = self.store.stats().await?;
        info!(pending = after.pending, posted = after.posted, "Queue after");
        Ok(result)
    }

    /// Current queue statistics.
    pub async fn stats(&self) -> Result<QueueStats> {
        Ok(self.store.stats().await?)
    }
}
