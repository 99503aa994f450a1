//! Append-only audit log.
//!
//! Human-readable trail of everything the bot posted. Every successful
//! publish is mirrored here, and when no other sink accepts a post the
//! log itself acts as the last-resort sink. Its own I/O errors are
//! fatal to the publish cycle; there is nothing further to fall back to.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Local;
use tokio::io::AsyncWriteExt;
use tracing::info;
use uuid::Uuid;

use crate::error::SinkError;
use crate::publish::render::RenderedPost;
use crate::sinks::{DeliveryMode, Sink};

pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append one entry to the log.
    pub async fn append(&self, post_id: &str, text: &str) -> Result<(), SinkError> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let entry = format!("[{timestamp}] Posted (ID: {post_id}):\n{text}\n---\n\n");

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(entry.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl Sink for AuditLog {
    fn name(&self) -> &'static str {
        "audit"
    }

    fn mode(&self) -> DeliveryMode {
        DeliveryMode::AuditOnly
    }

    async fn deliver(&self, post: &RenderedPost) -> Result<String, SinkError> {
        let post_id = format!("log_{}", Uuid::new_v4().simple());
        self.append(&post_id, &post.text).await?;
        info!(content_id = %post.content_id, post_id = %post_id, "Post recorded in audit log only");
        Ok(post_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn entries_use_the_posted_format() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit_log.txt"));

        log.append("p1", "Hello\n\nhttps://example.com/x").await.unwrap();

        let body = tokio::fs::read_to_string(dir.path().join("audit_log.txt"))
            .await
            .unwrap();
        assert!(body.starts_with('['));
        assert!(body.contains("] Posted (ID: p1):\nHello\n\nhttps://example.com/x\n---\n\n"));
    }

    #[tokio::test]
    async fn entries_accumulate() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit_log.txt"));

        log.append("p1", "one").await.unwrap();
        log.append("p2", "two").await.unwrap();

        let body = tokio::fs::read_to_string(dir.path().join("audit_log.txt"))
            .await
            .unwrap();
        assert_eq!(body.matches("---\n\n").count(), 2);
        assert!(body.contains("(ID: p1)"));
        assert!(body.contains("(ID: p2)"));
    }

    #[tokio::test]
    async fn as_a_sink_it_generates_the_post_id() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit_log.txt"));
        let post = RenderedPost {
            content_id: "/content/x".to_string(),
            text: "fallback text".to_string(),
        };

        let id = log.deliver(&post).await.unwrap();
        assert!(id.starts_with("log_"));

        let body = tokio::fs::read_to_string(dir.path().join("audit_log.txt"))
            .await
            .unwrap();
        assert!(body.contains(&format!("(ID: {id})")));
    }

    #[tokio::test]
    async fn unwritable_path_fails() {
        let log = AuditLog::new(PathBuf::from("/nonexistent-dir/audit.txt"));
        assert!(log.append("p1", "text").await.is_err());
    }
}
