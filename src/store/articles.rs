//! Article queue and post log.
//!
//! All queue state lives in two tables: `articles` (admission and posting
//! flags) and `post_log` (one receipt per published article). Every
//! mutation funnels through [`ArticleStore`].

use std::sync::Arc;

use chrono::Utc;
use libsql::params;
use tracing::{debug, warn};

use crate::error::DatabaseError;
use crate::pipeline::types::NewArticle;
use crate::store::db::Database;

const ARTICLE_COLUMNS: &str = "content_id, title, author_name, author_alias, description, url, tags, created_at, published_at, fetched_at, is_spam, posted";

/// A stored article.
#[derive(Debug, Clone)]
pub struct Article {
    pub content_id: String,
    pub title: String,
    pub author_name: Option<String>,
    pub author_alias: Option<String>,
    pub description: Option<String>,
    pub url: String,
    /// Comma-joined tag list, as fetched.
    pub tags: Option<String>,
    pub created_at: Option<i64>,
    pub published_at: Option<i64>,
    pub fetched_at: i64,
    pub is_spam: bool,
    pub posted: bool,
}

/// Queue counts: clean unposted, receipts written, spam blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStats {
    pub pending: i64,
    pub posted: i64,
    pub spam: i64,
}

/// Article store over a shared database handle.
pub struct ArticleStore {
    db: Arc<Database>,
}

impl ArticleStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Queue an article unless it is already known.
    ///
    /// The post log is checked first so an article can never re-enter the
    /// queue once a receipt exists for it, even if its queue row was
    /// pruned. Returns true only when a new row was actually inserted.
    pub async fn add_article(
        &self,
        article: &NewArticle,
        is_spam: bool,
    ) -> Result<bool, DatabaseError> {
        let conn = self.db.conn();

        let mut rows = conn
            .query(
                "SELECT 1 FROM post_log WHERE content_id = ?1",
                params![article.content_id.as_str()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("add_article log check: {e}")))?;
        if matches!(rows.next().await, Ok(Some(_))) {
            debug!(content_id = %article.content_id, "Article already posted, not queueing");
            return Ok(false);
        }

        let changed = conn
            .execute(
                "INSERT OR IGNORE INTO articles (content_id, title, author_name, author_alias,
                    description, url, tags, created_at, published_at, fetched_at, is_spam)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    article.content_id.as_str(),
                    article.title.as_str(),
                    opt_text(article.author_name.as_deref()),
                    opt_text(article.author_alias.as_deref()),
                    opt_text(article.description.as_deref()),
                    article.url.as_str(),
                    opt_text(article.tags.as_deref()),
                    opt_int(article.created_at),
                    opt_int(article.published_at),
                    Utc::now().timestamp(),
                    is_spam as i64,
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("add_article: {e}")))?;

        Ok(changed > 0)
    }

    /// Next article eligible for posting: not spam, not posted, oldest
    /// publication time first. Rows with no publication time sort first.
    pub async fn next_pending(&self) -> Result<Option<Article>, DatabaseError> {
        let conn = self.db.conn();
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {ARTICLE_COLUMNS} FROM articles
                     WHERE posted = 0 AND is_spam = 0
                     ORDER BY published_at ASC LIMIT 1"
                ),
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("next_pending: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let article = row_to_article(&row)
                    .map_err(|e| DatabaseError::Query(format!("next_pending row parse: {e}")))?;
                Ok(Some(article))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("next_pending: {e}"))),
        }
    }

    /// Mark an article as posted and write its receipt, in one transaction.
    ///
    /// The update is conditional on `posted = 0`, so concurrent or replayed
    /// commits leave exactly one receipt. Returns false when the article is
    /// unknown or already posted (a logged no-op, not an error).
    pub async fn mark_posted(
        &self,
        content_id: &str,
        post_id: Option<&str>,
    ) -> Result<bool, DatabaseError> {
        let conn = self.db.conn();
        let tx = conn
            .transaction()
            .await
            .map_err(|e| DatabaseError::Query(format!("mark_posted begin: {e}")))?;

        let mut rows = tx
            .query(
                "SELECT title, url FROM articles WHERE content_id = ?1",
                params![content_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("mark_posted lookup: {e}")))?;

        let row = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("mark_posted lookup: {e}")))?;
        let Some(row) = row else {
            warn!(content_id, "mark_posted called for unknown article");
            return Ok(false);
        };
        let title: String = row
            .get(0)
            .map_err(|e| DatabaseError::Query(format!("mark_posted row parse: {e}")))?;
        let url: String = row
            .get(1)
            .map_err(|e| DatabaseError::Query(format!("mark_posted row parse: {e}")))?;

        let changed = tx
            .execute(
                "UPDATE articles SET posted = 1 WHERE content_id = ?1 AND posted = 0",
                params![content_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("mark_posted update: {e}")))?;
        if changed == 0 {
            // Dropping the transaction rolls it back.
            warn!(content_id, "Article already posted, not writing receipt");
            return Ok(false);
        }

        tx.execute(
            "INSERT INTO post_log (content_id, title, url, posted_at, post_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                content_id,
                title,
                url,
                Utc::now().timestamp(),
                opt_text(post_id),
            ],
        )
        .await
        .map_err(|e| DatabaseError::Query(format!("mark_posted receipt: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| DatabaseError::Query(format!("mark_posted commit: {e}")))?;

        debug!(content_id, post_id = ?post_id, "Article marked posted");
        Ok(true)
    }

    /// Flag a queued article as spam. Posted articles are left untouched.
    pub async fn mark_spam(&self, content_id: &str) -> Result<bool, DatabaseError> {
        let conn = self.db.conn();
        let changed = conn
            .execute(
                "UPDATE articles SET is_spam = 1 WHERE content_id = ?1 AND posted = 0",
                params![content_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("mark_spam: {e}")))?;
        Ok(changed > 0)
    }

    /// Queue statistics.
    pub async fn stats(&self) -> Result<QueueStats, DatabaseError> {
        let conn = self.db.conn();
        let pending = count(conn, "SELECT COUNT(*) FROM articles WHERE posted = 0 AND is_spam = 0").await?;
        let spam = count(conn, "SELECT COUNT(*) FROM articles WHERE is_spam = 1").await?;
        let posted = count(conn, "SELECT COUNT(*) FROM post_log").await?;
        Ok(QueueStats {
            pending,
            posted,
            spam,
        })
    }

    /// Spam articles fetched at or after the cutoff, newest first.
    pub async fn recent_spam(&self, cutoff: i64) -> Result<Vec<Article>, DatabaseError> {
        let conn = self.db.conn();
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {ARTICLE_COLUMNS} FROM articles
                     WHERE is_spam = 1 AND fetched_at >= ?1
                     ORDER BY fetched_at DESC"
                ),
                params![cutoff],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("recent_spam: {e}")))?;

        collect_articles(&mut rows).await
    }

    /// All clean unposted articles, in queue order. Input for the re-scan;
    /// posted articles are never revisited.
    pub async fn clean_unposted(&self) -> Result<Vec<Article>, DatabaseError> {
        let conn = self.db.conn();
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {ARTICLE_COLUMNS} FROM articles
                     WHERE posted = 0 AND is_spam = 0
                     ORDER BY published_at ASC"
                ),
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("clean_unposted: {e}")))?;

        collect_articles(&mut rows).await
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Map a libsql Row to an Article. Column order matches ARTICLE_COLUMNS.
fn row_to_article(row: &libsql::Row) -> Result<Article, libsql::Error> {
    Ok(Article {
        content_id: row.get(0)?,
        title: row.get(1)?,
        author_name: row.get(2).ok(),
        author_alias: row.get(3).ok(),
        description: row.get(4).ok(),
        url: row.get(5)?,
        tags: row.get(6).ok(),
        created_at: row.get(7).ok(),
        published_at: row.get(8).ok(),
        fetched_at: row.get(9)?,
        is_spam: row.get::<i64>(10)? != 0,
        posted: row.get::<i64>(11)? != 0,
    })
}

async fn collect_articles(rows: &mut libsql::Rows) -> Result<Vec<Article>, DatabaseError> {
    let mut articles = Vec::new();
    while let Ok(Some(row)) = rows.next().await {
        match row_to_article(&row) {
            Ok(article) => articles.push(article),
            Err(e) => {
                warn!("Skipping article row: {e}");
            }
        }
    }
    Ok(articles)
}

async fn count(conn: &libsql::Connection, sql: &str) -> Result<i64, DatabaseError> {
    let mut rows = conn
        .query(sql, ())
        .await
        .map_err(|e| DatabaseError::Query(format!("count: {e}")))?;
    match rows.next().await {
        Ok(Some(row)) => Ok(row.get::<i64>(0).unwrap_or(0)),
        _ => Ok(0),
    }
}

/// Convert `Option<&str>` to libsql Value.
fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

/// Convert `Option<i64>` to libsql Value.
fn opt_int(v: Option<i64>) -> libsql::Value {
    match v {
        Some(v) => libsql::Value::Integer(v),
        None => libsql::Value::Null,
    }
}
