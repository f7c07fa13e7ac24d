//! Session lifecycle for scenario runs
//!
//! A [`Session`] owns the path to the database file. Starting one drops and
//! rebuilds the schema exactly once; afterwards every scenario borrows its own
//! connection through [`Session::with_connection`], which closes it again
//! whether the body succeeds or not. Table contents are never reset between
//! scenarios of the same session.

use std::time::Duration;

use anyhow::{anyhow, Result};
use tracing::{debug, info};

use crate::database::core::{DatabaseConn, SchemaManager, DEFAULT_BUSY_TIMEOUT};

pub struct Session {
    path: String,
    busy_timeout: Duration,
}

impl Session {
    /// Bootstrap the schema at `path` and return the session handle
    pub fn start(path: &str) -> Result<Self> {
        Self::start_with_timeout(path, DEFAULT_BUSY_TIMEOUT)
    }

    pub fn start_with_timeout(path: &str, busy_timeout: Duration) -> Result<Self> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    anyhow!("Failed to create directory for '{}': {}", path, e)
                })?;
            }
        }

        info!("bootstrapping schema at {}", path);
        let db = DatabaseConn::open_with_timeout(Some(path), busy_timeout)?;
        SchemaManager::new(&db.conn)
            .bootstrap()
            .map_err(|e| anyhow!("Schema bootstrap failed: {}", e))?;
        db.close()?;

        Ok(Session {
            path: path.to_string(),
            busy_timeout,
        })
    }

    /// Path of the database file backing this session
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Open a fresh connection, hand it to `body`, and close it afterwards
    ///
    /// The connection has foreign-key enforcement enabled. It is closed on
    /// every exit path; if `body` panics the connection is dropped during
    /// unwinding. A close error is only reported when `body` succeeded.
    pub fn with_connection<T, F>(&self, body: F) -> Result<T>
    where
        F: FnOnce(&DatabaseConn) -> Result<T>,
    {
        let db = DatabaseConn::open_with_timeout(Some(&self.path), self.busy_timeout)?;
        debug!("opened connection to {}", self.path);

        let result = body(&db);
        let closed = db.close();
        debug!("closed connection to {}", self.path);

        match (result, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), _) => Err(e),
        }
    }
}
