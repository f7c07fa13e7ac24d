#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! sqlcheck - relational database features, demonstrated against SQLite
//!
//! sqlcheck runs a fixed catalog of scenarios (updates, joins, views,
//! triggers, foreign keys, indexes, transactions, parameterized queries,
//! pattern matching, cascading deletes and batch inserts) against a SQLite
//! file. It can be used as a command-line application with an interactive
//! menu, or as a library.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | `cli` | CLI binary with interactive menu | `clap`, `colored`, `tabled`, `tracing-subscriber` |
//!
//! # Architecture
//!
//! - **[`database`]**: SQLite connection wrapper, schema bootstrap, and the
//!   [`Session`] that hands out one connection per scenario
//! - **[`harness`]**: scenario catalog, scenario bodies, runner and reporting
//! - **[`config`]**: configuration management
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sqlcheck::{HarnessConfig, ScenarioGroup, TestRunner, TracingReporter};
//!
//! let config = HarnessConfig::new(&None)?;
//! let runner = TestRunner::new(&config, &TracingReporter);
//!
//! let summary = runner.run_group(ScenarioGroup::Basic)?;
//! println!("{} passed, {} failed", summary.passed(), summary.failed());
//! ```

pub mod config;
pub mod database;
pub mod harness;

pub use config::{format_size, get_sqlite_info, HarnessConfig, SqliteDatabaseInfo};

pub use database::{
    DatabaseConn, SchemaDefinitions, SchemaManager, SchemaObject, SchemaStatus, Session,
};

pub use harness::{
    NullReporter, Reporter, RunSummary, Scenario, ScenarioGroup, ScenarioReport, TestRunner,
    TracingReporter,
};
