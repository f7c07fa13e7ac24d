//! Run results and the reporting interface
//!
//! Scenario bodies never format output themselves. They describe what they
//! are doing through a [`Reporter`], and the caller decides how (or whether)
//! to show it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::harness::catalog::Scenario;

/// Outcome of one scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub description: String,
    pub passed: bool,
    pub duration_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScenarioReport {
    pub fn passed(scenario: Scenario, duration_ms: f64) -> Self {
        ScenarioReport {
            name: scenario.name().to_string(),
            description: scenario.description().to_string(),
            passed: true,
            duration_ms,
            error: None,
        }
    }

    pub fn failed(scenario: Scenario, duration_ms: f64, error: &anyhow::Error) -> Self {
        ScenarioReport {
            name: scenario.name().to_string(),
            description: scenario.description().to_string(),
            passed: false,
            duration_ms,
            error: Some(format!("{:#}", error)),
        }
    }
}

/// Outcome of a whole session
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub database_path: String,
    pub reports: Vec<ScenarioReport>,
}

impl RunSummary {
    pub fn new(database_path: &str) -> Self {
        RunSummary {
            started_at: Utc::now(),
            database_path: database_path.to_string(),
            reports: Vec::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.reports.len()
    }

    pub fn passed(&self) -> usize {
        self.reports.iter().filter(|r| r.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    /// True when every selected scenario passed; vacuously true for an empty run
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn report(&self, name: &str) -> Option<&ScenarioReport> {
        self.reports.iter().find(|r| r.name == name)
    }
}

/// Receiver of progress events during a run
pub trait Reporter {
    fn session_started(&self, _database_path: &str, _scenarios: &[Scenario]) {}

    fn scenario_started(&self, _scenario: Scenario) {}

    /// A step inside the running scenario
    fn action(&self, _action: &str, _details: Option<&str>) {}

    fn scenario_finished(&self, _report: &ScenarioReport) {}

    fn session_finished(&self, _summary: &RunSummary) {}
}

/// Discards every event
pub struct NullReporter;

impl Reporter for NullReporter {}

/// Forwards events to `tracing`
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn session_started(&self, database_path: &str, scenarios: &[Scenario]) {
        info!(
            "starting session with {} scenario(s) against {}",
            scenarios.len(),
            database_path
        );
    }

    fn scenario_started(&self, scenario: Scenario) {
        info!("running {}: {}", scenario.name(), scenario.description());
    }

    fn action(&self, action: &str, details: Option<&str>) {
        match details {
            Some(d) => info!("{}: {}", action, d),
            None => info!("{}", action),
        }
    }

    fn scenario_finished(&self, report: &ScenarioReport) {
        match &report.error {
            None => info!("{} passed in {:.2}ms", report.name, report.duration_ms),
            Some(e) => warn!("{} failed after {:.2}ms: {}", report.name, report.duration_ms, e),
        }
    }

    fn session_finished(&self, summary: &RunSummary) {
        info!(
            "session finished: {} passed, {} failed",
            summary.passed(),
            summary.failed()
        );
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;

    /// Records events as plain strings so tests can assert on them
    #[derive(Default)]
    pub struct RecordingReporter {
        pub events: RefCell<Vec<String>>,
    }

    impl RecordingReporter {
        pub fn events(&self) -> Vec<String> {
            self.events.borrow().clone()
        }
    }

    impl Reporter for RecordingReporter {
        fn session_started(&self, _database_path: &str, scenarios: &[Scenario]) {
            self.events
                .borrow_mut()
                .push(format!("session:{}", scenarios.len()));
        }

        fn scenario_started(&self, scenario: Scenario) {
            self.events
                .borrow_mut()
                .push(format!("start:{}", scenario.name()));
        }

        fn action(&self, action: &str, _details: Option<&str>) {
            self.events.borrow_mut().push(format!("action:{}", action));
        }

        fn scenario_finished(&self, report: &ScenarioReport) {
            self.events
                .borrow_mut()
                .push(format!("finish:{}:{}", report.name, report.passed));
        }

        fn session_finished(&self, summary: &RunSummary) {
            self.events
                .borrow_mut()
                .push(format!("done:{}/{}", summary.passed(), summary.total()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_summary_counts() {
        let mut summary = RunSummary::new("x.sqlite");
        assert!(summary.is_success());
        assert_eq!(summary.total(), 0);

        summary
            .reports
            .push(ScenarioReport::passed(Scenario::UpdateUser, 1.0));
        summary.reports.push(ScenarioReport::failed(
            Scenario::LikeQuery,
            2.0,
            &anyhow!("expected 2 rows"),
        ));

        assert_eq!(summary.total(), 2);
        assert_eq!(summary.passed(), 1);
        assert_eq!(summary.failed(), 1);
        assert!(!summary.is_success());
        assert_eq!(
            summary.report("test_like_query").unwrap().error.as_deref(),
            Some("expected 2 rows")
        );
    }

    #[test]
    fn test_passed_report_omits_error_in_json() {
        let report = ScenarioReport::passed(Scenario::CascadeDelete, 3.5);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["name"], "test_cascade_delete");
        assert!(json.get("error").is_none());
    }
}
