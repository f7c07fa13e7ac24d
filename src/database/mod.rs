//! Database module
//!
//! ```text
//! database/
//! ├── core/           # Foundation
//! │   ├── connection  # SQLite DatabaseConn wrapper
//! │   └── schema      # Scenario schema definitions and bootstrap
//! │
//! └── session         # Per-session bootstrap and per-scenario connections
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use sqlcheck::database::Session;
//!
//! // Drops and rebuilds the schema once
//! let session = Session::start("identifier.sqlite")?;
//!
//! // Each call opens a fresh connection and closes it afterwards
//! let users = session.with_connection(|db| db.table_count("users"))?;
//! ```

pub mod core;
pub mod session;

pub use core::{
    is_constraint_violation, DatabaseConn, SchemaDefinitions, SchemaManager, SchemaObject,
    SchemaStatus, DEFAULT_BUSY_TIMEOUT,
};
pub use session::Session;
