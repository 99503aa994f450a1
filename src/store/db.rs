//! libSQL database handle — connection wrapper and migrations.

use std::path::Path;

use libsql::Connection;
use tracing::info;

use crate::error::DatabaseError;
use crate::store::migrations;

/// Handle to the article database.
///
/// One connection, shared by every store call. `libsql::Connection` is
/// `Send + Sync`, so the handle can sit behind an `Arc`.
pub struct Database {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: Connection,
}

impl Database {
    /// Open a local database file, creating it and its parent directory
    /// if needed, and bring the schema up to date.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Open(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Open(format!("Failed to open database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Open(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        info!(path = %path.display(), "Database opened");
        Ok(Self { db, conn })
    }

    /// In-memory database, used by tests.
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| DatabaseError::Open(format!("Failed to create in-memory database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Open(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        Ok(Self { db, conn })
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}
