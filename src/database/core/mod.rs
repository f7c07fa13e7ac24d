//! Core database infrastructure
//!
//! This module provides the foundational database components:
//! - `DatabaseConn`: SQLite connection wrapper with foreign keys enabled
//! - `SchemaManager`: Schema bootstrap and inspection
//! - `SchemaStatus`: Schema state enumeration

mod connection;
mod schema;

pub use connection::{is_constraint_violation, DatabaseConn, DEFAULT_BUSY_TIMEOUT};
pub use schema::{SchemaDefinitions, SchemaManager, SchemaObject, SchemaStatus};
