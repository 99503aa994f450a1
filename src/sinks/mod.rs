//! Delivery sinks for rendered posts.
//!
//! Sinks are ranked; the publisher walks them in order and stops at the
//! first success. The audit log is also a sink so a publish cycle always
//! has somewhere durable to land.

pub mod audit;
pub mod buffer;
pub mod outbox;

pub use audit::AuditLog;
pub use buffer::BufferSink;
pub use outbox::OutboxSink;

use async_trait::async_trait;

use crate::error::SinkError;
use crate::publish::render::RenderedPost;

/// Where a post actually landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Queued on Buffer for the configured profile.
    Buffer,
    /// Appended to the local outbox file for later replay.
    Outbox,
    /// Written to the audit log only.
    AuditOnly,
}

impl DeliveryMode {
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryMode::Buffer => "buffer",
            DeliveryMode::Outbox => "outbox",
            DeliveryMode::AuditOnly => "audit-only",
        }
    }
}

/// A delivery target for rendered posts.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Mode recorded on the post when this sink accepts it.
    fn mode(&self) -> DeliveryMode;

    /// Deliver a post, returning a post identifier.
    async fn deliver(&self, post: &RenderedPost) -> Result<String, SinkError>;
}
