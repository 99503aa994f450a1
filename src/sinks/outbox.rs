//! Outbox sink — durable local fallback queue.
//!
//! One JSON object per line, appended when no upstream sink accepted
//! the post. Entries can be replayed manually once the upstream is
//! back.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::info;
use uuid::Uuid;

use crate::error::SinkError;
use crate::publish::render::RenderedPost;
use crate::sinks::{DeliveryMode, Sink};

/// One queued line in the outbox file.
#[derive(Debug, Serialize, Deserialize)]
pub struct OutboxEntry {
    pub content_id: String,
    pub text: String,
    pub queued_at: i64,
}

pub struct OutboxSink {
    path: PathBuf,
}

impl OutboxSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl Sink for OutboxSink {
    fn name(&self) -> &'static str {
        "outbox"
    }

    fn mode(&self) -> DeliveryMode {
        DeliveryMode::Outbox
    }

    async fn deliver(&self, post: &RenderedPost) -> Result<String, SinkError> {
        let entry = OutboxEntry {
            content_id: post.content_id.clone(),
            text: post.text.clone(),
            queued_at: Utc::now().timestamp(),
        };
        let mut line = serde_json::to_string(&entry).map_err(|e| SinkError::Delivery {
            sink: "outbox".to_string(),
            reason: e.to_string(),
        })?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        let post_id = format!("queued_{}", Uuid::new_v4().simple());
        info!(content_id = %post.content_id, path = %self.path.display(), "Post queued to outbox");
        Ok(post_id)
    }
}
