//! Publishing — dequeue, render, deliver, commit.

pub mod render;

pub use render::RenderedPost;

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::Result;
use crate::sinks::{AuditLog, DeliveryMode, Sink};
use crate::store::ArticleStore;

/// Outcome of one successful publish.
#[derive(Debug, Clone)]
pub struct PostResult {
    pub content_id: String,
    pub title: String,
    pub post_id: String,
    pub text: String,
    pub delivery: DeliveryMode,
}

/// Walks the ranked sink list for the next pending article and commits
/// the outcome.
pub struct Publisher {
    store: Arc<ArticleStore>,
    sinks: Vec<Box<dyn Sink>>,
    audit: AuditLog,
}

impl Publisher {
    pub fn new(store: Arc<ArticleStore>, sinks: Vec<Box<dyn Sink>>, audit: AuditLog) -> Self {
        Self {
            store,
            sinks,
            audit,
        }
    }

    /// Publish the next pending article, if any.
    ///
    /// Sinks are tried in rank order; a failure is logged and the next
    /// sink is tried. When every ranked sink fails, the audit log
    /// itself accepts the post as the delivery of last resort. Ranked
    /// deliveries are mirrored into the audit log afterwards, so each
    /// publish leaves exactly one audit entry. Audit I/O failures
    /// propagate; there is no deeper fallback.
    pub async fn publish_next(&self) -> Result<Option<PostResult>> {
        let Some(article) = self.store.next_pending().await? else {
            return Ok(None);
        };

        let post = render::render(&article);

        let mut delivered: Option<(String, DeliveryMode)> = None;
        for sink in &self.sinks {
            match sink.deliver(&post).await {
                Ok(post_id) => {
                    delivered = Some((post_id, sink.mode()));
                    break;
                }
                Err(e) => {
                    warn!(sink = sink.name(), error = %e, "Sink delivery failed, trying next");
                }
            }
        }

        let (post_id, delivery) = match delivered {
            Some(outcome) => outcome,
            None => {
                let post_id = self.audit.deliver(&post).await?;
                (post_id, DeliveryMode::AuditOnly)
            }
        };

        if delivery != DeliveryMode::AuditOnly {
            self.audit.append(&post_id, &post.text).await?;
        }

        if !self
            .store
            .mark_posted(&article.content_id, Some(&post_id))
            .await?
        {
            warn!(content_id = %article.content_id, "Publish commit was a no-op");
        }

        info!(
            content_id = %article.content_id,
            post_id = %post_id,
            delivery = delivery.label(),
            "Published article"
        );

        Ok(Some(PostResult {
            content_id: article.content_id,
            title: article.title,
            post_id,
            text: post.text,
            delivery,
        }))
    }
}
