//! Article processing pipeline.
//!
//! Every fetched feed item flows through:
//! 1. `RawFeedItem::into_article()` — normalization into the article schema
//! 2. `Classifier::classify()` — spam rule evaluation (rules reloaded per call)
//! 3. `ArticleStore::add_article()` — idempotent admission into the queue
//!
//! Spam articles are stored too, flagged, so they can be reported on and
//! never re-fetched as "new" next cycle.

pub mod classify;
pub mod processor;
pub mod rules;
pub mod types;

pub use classify::{Classifier, Verdict};
pub use processor::{IngestReport, Processor};
pub use rules::{RuleStore, SpamRule};
pub use types::NewArticle;
