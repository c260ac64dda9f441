// Database connection management
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use anyhow::Result;
use std::path::{Path, PathBuf};

use super::migrations::run_migrations;
use crate::error::WorkflowError;

pub struct DatabaseConnection {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl DatabaseConnection {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut conn = Connection::open(&db_path)?;
        tracing::info!(path = %db_path.display(), "opened database");

        // Run migrations
        run_migrations(&mut conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(db_path),
        })
    }

    /// Private in-memory database with the schema applied
    pub fn in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        run_migrations(&mut conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    /// File backing this connection, `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Re-apply schema creation. A no-op on an initialized store.
    pub fn create_tables(&self) -> Result<()> {
        self.with_session(|conn| run_migrations(conn))
    }

    /// Hold the connection for the duration of `f`. The lock is released
    /// when `f` returns, whether it succeeded or not.
    pub fn with_session<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock().map_err(|_| WorkflowError::LockPoisoned)?;
        tracing::debug!("session opened");
        let result = f(&mut *conn);
        tracing::debug!(ok = result.is_ok(), "session closed");
        result
    }
}

impl Clone for DatabaseConnection {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            path: self.path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_releases_lock() {
        let db = DatabaseConnection::in_memory().unwrap();

        let failed: Result<()> = db.with_session(|_| Err(anyhow::anyhow!("boom")));
        assert!(failed.is_err());

        let count: i64 = db
            .with_session(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM experiments", [], |row| row.get(0))?)
            })
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_clone_shares_connection() {
        let db = DatabaseConnection::in_memory().unwrap();
        let other = db.clone();

        db.with_session(|conn| {
            conn.execute("INSERT INTO subjects DEFAULT VALUES", [])?;
            Ok(())
        })
        .unwrap();

        let count: i64 = other
            .with_session(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM subjects", [], |row| row.get(0))?)
            })
            .unwrap();
        assert_eq!(count, 1);
        assert!(other.path().is_none());
    }

    #[test]
    fn test_create_tables_twice() {
        let db = DatabaseConnection::in_memory().unwrap();
        db.create_tables().unwrap();
        db.create_tables().unwrap();
    }
}
