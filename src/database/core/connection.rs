//! Database connection management
//!
//! This module provides the connection wrapper handed to every scenario.

use std::time::Duration;

use anyhow::{anyhow, Result};
use rusqlite::{Connection, ErrorCode};

/// Default time SQLite waits on a locked database before giving up
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Core database connection wrapper
///
/// `DatabaseConn` provides a thin wrapper around SQLite connections,
/// handling both file-based and in-memory databases. Every connection is
/// opened with foreign-key enforcement switched on, since SQLite leaves it
/// off by default.
pub struct DatabaseConn {
    pub conn: Connection,
}

impl DatabaseConn {
    /// Open a database at the specified path
    ///
    /// If the path is `None`, an in-memory database is created.
    pub fn open(path: Option<&str>) -> Result<Self> {
        Self::open_with_timeout(path, DEFAULT_BUSY_TIMEOUT)
    }

    /// Open a database with an explicit busy timeout
    pub fn open_with_timeout(path: Option<&str>, busy_timeout: Duration) -> Result<Self> {
        let conn = match path {
            Some(p) => Connection::open(p)
                .map_err(|e| anyhow!("Failed to open database at '{}': {}", p, e))?,
            None => Connection::open_in_memory()
                .map_err(|e| anyhow!("Failed to create in-memory database: {}", e))?,
        };

        let db = DatabaseConn { conn };
        db.configure(busy_timeout)?;
        Ok(db)
    }

    /// Open a database at the specified path (convenience method)
    pub fn open_path(path: &str) -> Result<Self> {
        Self::open(Some(path))
    }

    /// Create an in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::open(None)
    }

    fn configure(&self, busy_timeout: Duration) -> Result<()> {
        self.conn
            .busy_timeout(busy_timeout)
            .map_err(|e| anyhow!("Failed to set busy timeout: {}", e))?;

        self.conn
            .execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| anyhow!("Failed to enable foreign keys: {}", e))?;

        Ok(())
    }

    /// Whether foreign-key enforcement is active on this connection
    pub fn foreign_keys_enabled(&self) -> Result<bool> {
        let enabled: i64 = self
            .conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .map_err(|e| anyhow!("Failed to read foreign_keys pragma: {}", e))?;
        Ok(enabled == 1)
    }

    /// Execute a SQL statement
    pub fn execute(&self, sql: &str) -> Result<usize> {
        self.conn
            .execute(sql, [])
            .map_err(|e| anyhow!("Failed to execute SQL: {}", e))
    }

    /// Execute a SQL statement with parameters
    pub fn execute_with_params<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<usize> {
        self.conn
            .execute(sql, params)
            .map_err(|e| anyhow!("Failed to execute SQL with params: {}", e))
    }

    /// Execute an insert and return the rowid it produced
    pub fn insert<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<i64> {
        self.execute_with_params(sql, params)?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Run a single-value `COUNT(*)`-style query
    pub fn count<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<i64> {
        self.conn
            .query_row(sql, params, |row| row.get(0))
            .map_err(|e| anyhow!("Failed to run count query: {}", e))
    }

    /// Begin an unchecked transaction
    ///
    /// This is useful for batch operations where we want to commit
    /// multiple statements atomically.
    pub fn transaction(&self) -> Result<rusqlite::Transaction<'_>> {
        self.conn
            .unchecked_transaction()
            .map_err(|e| anyhow!("Failed to begin transaction: {}", e))
    }

    /// Check if a table exists in the database
    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        let count: i32 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [table_name],
                |row| row.get(0),
            )
            .map_err(|e| anyhow!("Failed to check table existence: {}", e))?;
        Ok(count > 0)
    }

    /// Get the row count for a table
    pub fn table_count(&self, table_name: &str) -> Result<u64> {
        let query = format!("SELECT COUNT(*) FROM {}", table_name);
        let count: u64 = self
            .conn
            .query_row(&query, [], |row| row.get(0))
            .map_err(|e| anyhow!("Failed to get table count: {}", e))?;
        Ok(count)
    }

    /// Collect the detail column of `EXPLAIN QUERY PLAN` for a statement
    pub fn query_plan(&self, sql: &str) -> Result<Vec<String>> {
        let explain = format!("EXPLAIN QUERY PLAN {}", sql);
        let mut stmt = self
            .conn
            .prepare(&explain)
            .map_err(|e| anyhow!("Failed to prepare query plan: {}", e))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(3))
            .map_err(|e| anyhow!("Failed to read query plan: {}", e))?;

        let mut details = Vec::new();
        for detail in rows {
            details.push(detail.map_err(|e| anyhow!("Failed to read query plan row: {}", e))?);
        }
        Ok(details)
    }

    /// Close the connection, reporting any error SQLite raises on close
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| anyhow!("Failed to close database: {}", e))
    }
}

/// Whether an error is SQLite's integrity-constraint violation
pub fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = DatabaseConn::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_foreign_keys_enabled_on_open() {
        let db = DatabaseConn::open_in_memory().unwrap();
        assert!(db.foreign_keys_enabled().unwrap());
    }

    #[test]
    fn test_table_exists() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE test_table (id INTEGER PRIMARY KEY)")
            .unwrap();

        assert!(db.table_exists("test_table").unwrap());
        assert!(!db.table_exists("nonexistent_table").unwrap());
    }

    #[test]
    fn test_insert_returns_rowid() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)")
            .unwrap();

        let first = db.insert("INSERT INTO t (name) VALUES (?1)", ["a"]).unwrap();
        let second = db.insert("INSERT INTO t (name) VALUES (?1)", ["b"]).unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(db.table_count("t").unwrap(), 2);
        assert_eq!(
            db.count("SELECT COUNT(*) FROM t WHERE name = ?1", ["b"])
                .unwrap(),
            1
        );
    }

    #[test]
    fn test_query_plan_mentions_index() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)")
            .unwrap();
        db.execute("CREATE INDEX idx_t_name ON t(name)").unwrap();

        let plan = db.query_plan("SELECT * FROM t WHERE name = 'x'").unwrap();
        assert!(plan.iter().any(|d| d.contains("idx_t_name")));
    }

    #[test]
    fn test_constraint_violation_detection() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE p (id INTEGER PRIMARY KEY)").unwrap();
        db.execute("CREATE TABLE c (id INTEGER PRIMARY KEY, p_id INTEGER REFERENCES p(id))")
            .unwrap();

        let err = db
            .conn
            .execute("INSERT INTO c (p_id) VALUES (42)", [])
            .unwrap_err();
        assert!(is_constraint_violation(&err));

        let err = db.conn.execute("SELECT * FROM missing", []).unwrap_err();
        assert!(!is_constraint_violation(&err));
    }

    #[test]
    fn test_close() {
        let db = DatabaseConn::open_in_memory().unwrap();
        assert!(db.close().is_ok());
    }
}
