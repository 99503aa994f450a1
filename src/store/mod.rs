//! Persistence layer — libSQL-backed article queue and post log.

pub mod articles;
pub mod db;
pub mod migrations;

pub use articles::{Article, ArticleStore, QueueStats};
pub use db::Database;
