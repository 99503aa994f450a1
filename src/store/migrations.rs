//! Schema migrations.
//!
//! Applied sequentially by version; the `_migrations` table records what
//! has already run, so reopening a database is a no-op.

use libsql::Connection;

use crate::error::DatabaseError;

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// Ordered migration list. New versions go at the end.
static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: r#"
        CREATE TABLE IF NOT EXISTS articles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            content_id TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            author_name TEXT,
            author_alias TEXT,
            description TEXT,
            url TEXT NOT NULL,
            tags TEXT,
            created_at INTEGER,
            published_at INTEGER,
            fetched_at INTEGER NOT NULL,
            is_spam INTEGER NOT NULL DEFAULT 0,
            posted INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_articles_queue ON articles(posted, is_spam, published_at);
        CREATE INDEX IF NOT EXISTS idx_articles_spam ON articles(is_spam, fetched_at);

        CREATE TABLE IF NOT EXISTS post_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            content_id TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            url TEXT NOT NULL,
            posted_at INTEGER NOT NULL,
            post_id TEXT
        );
    "#,
}];

/// Bring the schema up to the latest version.
pub async fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        (),
    )
    .await
    .map_err(|e| DatabaseError::Migration(format!("creating _migrations table: {e}")))?;

    let applied = applied_version(conn).await?;

    for migration in MIGRATIONS.iter().filter(|m| m.version > applied) {
        tracing::info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        conn.execute_batch(migration.sql).await.map_err(|e| {
            DatabaseError::Migration(format!("V{} ({}): {e}", migration.version, migration.name))
        })?;
        conn.execute(
            "INSERT OR IGNORE INTO _migrations (version, name) VALUES (?1, ?2)",
            libsql::params![migration.version, migration.name],
        )
        .await
        .map_err(|e| DatabaseError::Migration(format!("recording V{}: {e}", migration.version)))?;
    }

    Ok(())
}

/// Highest version already applied, 0 for a fresh database.
async fn applied_version(conn: &Connection) -> Result<i64, DatabaseError> {
    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM _migrations", ())
        .await
        .map_err(|e| DatabaseError::Migration(format!("reading schema version: {e}")))?;

    let Some(row) = rows
        .next()
        .await
        .map_err(|e| DatabaseError::Migration(format!("reading schema version: {e}")))?
    else {
        return Ok(0);
    };

    row.get(0)
        .map_err(|e| DatabaseError::Migration(format!("reading schema version: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_conn() -> Connection {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .unwrap();
        db.connect().unwrap()
    }

    #[tokio::test]
    async fn migrations_create_all_tables() {
        let conn = test_conn().await;
        run_migrations(&conn).await.unwrap();

        for table in &["articles", "post_log", "_migrations"] {
            let mut rows = conn
                .query(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    libsql::params![*table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap().unwrap();
            let count: i64 = row.get(0).unwrap();
            assert_eq!(count, 1, "table '{}' missing", table);
        }
    }

    #[tokio::test]
    async fn rerunning_migrations_is_a_no_op() {
        let conn = test_conn().await;
        run_migrations(&conn).await.unwrap();
        run_migrations(&conn).await.unwrap();

        assert_eq!(applied_version(&conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn content_id_is_unique() {
        let conn = test_conn().await;
        run_migrations(&conn).await.unwrap();

        conn.execute(
            "INSERT INTO articles (content_id, title, url, fetched_at) VALUES ('a1', 't', 'u', 0)",
            (),
        )
        .await
        .unwrap();

        let dup = conn
            .execute(
                "INSERT INTO articles (content_id, title, url, fetched_at) VALUES ('a1', 't2', 'u2', 1)",
                (),
            )
            .await;
        assert!(dup.is_err(), "duplicate content_id should be rejected");
    }
}
