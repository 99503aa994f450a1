//! feedrelay — feed-to-social posting bot with spam filtering.

pub mod app;
pub mod config;
pub mod error;
pub mod feed;
pub mod pipeline;
pub mod publish;
pub mod report;
pub mod scheduler;
pub mod sinks;
pub mod store;
