//! Scenario harness
//!
//! - `catalog`: the named scenarios and their menu groups
//! - `checks`: the scenario bodies
//! - `report`: run results and the [`Reporter`] interface
//! - `runner`: selection and sequential execution inside one session
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlcheck::harness::{TestRunner, TracingReporter};
//! use sqlcheck::HarnessConfig;
//!
//! let config = HarnessConfig::default();
//! let runner = TestRunner::new(&config, &TracingReporter);
//! let summary = runner.run_names(&["test_cascade_delete".to_string()])?;
//! assert!(summary.is_success());
//! ```

pub mod catalog;
mod checks;
pub mod report;
pub mod runner;

pub use catalog::{Scenario, ScenarioGroup};
pub use report::{NullReporter, Reporter, RunSummary, ScenarioReport, TracingReporter};
pub use runner::TestRunner;

use crate::config::HarnessConfig;
use crate::database::DatabaseConn;

/// Everything a scenario body gets to work with
pub struct ScenarioContext<'a> {
    pub db: &'a DatabaseConn,
    pub config: &'a HarnessConfig,
    pub reporter: &'a dyn Reporter,
}

impl<'a> ScenarioContext<'a> {
    pub fn new(
        db: &'a DatabaseConn,
        config: &'a HarnessConfig,
        reporter: &'a dyn Reporter,
    ) -> Self {
        ScenarioContext {
            db,
            config,
            reporter,
        }
    }

    pub fn step(&self, action: &str) {
        self.reporter.action(action, None);
    }

    pub fn step_with(&self, action: &str, details: &str) {
        self.reporter.action(action, Some(details));
    }
}
