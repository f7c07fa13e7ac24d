//! Sequential scenario runner
//!
//! A run selects scenarios by exact name, bootstraps the schema once, and
//! executes the selection in catalog order, each scenario on its own
//! connection. A bootstrap failure aborts the run; a scenario failure is
//! recorded and the run moves on.

use std::time::Instant;

use anyhow::Result;
use tracing::{info, warn};

use crate::config::HarnessConfig;
use crate::database::Session;
use crate::harness::catalog::{Scenario, ScenarioGroup};
use crate::harness::report::{Reporter, RunSummary, ScenarioReport};
use crate::harness::ScenarioContext;

pub struct TestRunner<'a> {
    config: &'a HarnessConfig,
    reporter: &'a dyn Reporter,
}

impl<'a> TestRunner<'a> {
    pub fn new(config: &'a HarnessConfig, reporter: &'a dyn Reporter) -> Self {
        TestRunner { config, reporter }
    }

    /// Resolve names to scenarios
    ///
    /// Matching is exact. Unknown names are skipped, duplicates collapse, and
    /// the result follows catalog order regardless of input order.
    pub fn select<S: AsRef<str>>(names: &[S]) -> Vec<Scenario> {
        let mut requested = Vec::new();
        for name in names {
            match Scenario::from_name(name.as_ref()) {
                Some(scenario) => requested.push(scenario),
                None => warn!("no scenario named '{}', skipping", name.as_ref()),
            }
        }

        Scenario::all()
            .iter()
            .copied()
            .filter(|s| requested.contains(s))
            .collect()
    }

    pub fn run_names<S: AsRef<str>>(&self, names: &[S]) -> Result<RunSummary> {
        self.run(&Self::select(names))
    }

    pub fn run_group(&self, group: ScenarioGroup) -> Result<RunSummary> {
        self.run(&group.scenarios())
    }

    pub fn run_all(&self) -> Result<RunSummary> {
        self.run(Scenario::all())
    }

    /// Run the given scenarios inside one session
    ///
    /// An empty selection returns an empty summary without touching the
    /// database file.
    pub fn run(&self, scenarios: &[Scenario]) -> Result<RunSummary> {
        let mut summary = RunSummary::new(&self.config.database_path);
        if scenarios.is_empty() {
            info!("no scenarios selected");
            return Ok(summary);
        }

        self.reporter
            .session_started(&self.config.database_path, scenarios);
        let session =
            Session::start_with_timeout(&self.config.database_path, self.config.busy_timeout())?;

        for scenario in scenarios {
            let report = self.run_one(&session, *scenario);
            self.reporter.scenario_finished(&report);
            summary.reports.push(report);
        }

        self.reporter.session_finished(&summary);
        Ok(summary)
    }

    fn run_one(&self, session: &Session, scenario: Scenario) -> ScenarioReport {
        self.reporter.scenario_started(scenario);

        let start = Instant::now();
        let result = session.with_connection(|db| {
            scenario.run(&ScenarioContext::new(db, self.config, self.reporter))
        });
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(()) => ScenarioReport::passed(scenario, duration_ms),
            Err(e) => ScenarioReport::failed(scenario, duration_ms, &e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::report::testing::RecordingReporter;
    use crate::harness::NullReporter;
    use tempfile::tempdir;

    fn config_in(dir: &tempfile::TempDir) -> HarnessConfig {
        HarnessConfig {
            database_path: dir.path().join("run.sqlite").to_str().unwrap().to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_select_exact_and_ordered() {
        let selected = TestRunner::select(&[
            "test_cascade_delete",
            "test_update_user",
            "test_update",
            "test_cascade_delete",
        ]);
        assert_eq!(selected, vec![Scenario::UpdateUser, Scenario::CascadeDelete]);
    }

    #[test]
    fn test_unknown_names_are_a_no_op() {
        let dir = tempdir().unwrap();
        let config = config_in(&dir);
        let runner = TestRunner::new(&config, &NullReporter);

        let summary = runner.run_names(&["not_a_test"]).unwrap();
        assert_eq!(summary.total(), 0);
        assert!(summary.is_success());
        assert!(!std::path::Path::new(&config.database_path).exists());
    }

    #[test]
    fn test_run_all_passes() {
        let dir = tempdir().unwrap();
        let config = config_in(&dir);
        let runner = TestRunner::new(&config, &NullReporter);

        let summary = runner.run_all().unwrap();
        let failures: Vec<_> = summary
            .reports
            .iter()
            .filter(|r| !r.passed)
            .map(|r| format!("{}: {:?}", r.name, r.error))
            .collect();
        assert!(failures.is_empty(), "failures: {:?}", failures);
        assert_eq!(summary.total(), Scenario::all().len());
    }

    #[test]
    fn test_run_all_twice_resets_state() {
        let dir = tempdir().unwrap();
        let config = config_in(&dir);
        let runner = TestRunner::new(&config, &NullReporter);

        assert!(runner.run_all().unwrap().is_success());
        assert!(runner.run_all().unwrap().is_success());
    }

    #[test]
    fn test_basic_group() {
        let dir = tempdir().unwrap();
        let config = config_in(&dir);
        let runner = TestRunner::new(&config, &NullReporter);

        let summary = runner.run_group(ScenarioGroup::Basic).unwrap();
        assert_eq!(summary.total(), 5);
        assert!(summary.is_success());
    }

    #[test]
    fn test_failure_does_not_stop_the_run() {
        let dir = tempdir().unwrap();
        let config = config_in(&dir);
        let runner = TestRunner::new(&config, &NullReporter);

        // running the LIKE scenario twice in one session doubles the Silva count
        let summary = runner
            .run(&[Scenario::LikeQuery, Scenario::LikeQuery, Scenario::CascadeDelete])
            .unwrap();
        assert_eq!(summary.total(), 3);
        assert!(summary.reports[0].passed);
        assert!(!summary.reports[1].passed);
        assert!(summary.reports[2].passed);
    }

    #[test]
    fn test_bootstrap_failure_aborts() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "plain file").unwrap();
        let config = HarnessConfig {
            database_path: blocker.join("run.sqlite").to_str().unwrap().to_string(),
            ..Default::default()
        };
        let runner = TestRunner::new(&config, &NullReporter);
        assert!(runner.run_names(&["test_update_user"]).is_err());
    }

    #[test]
    fn test_reporter_sees_lifecycle() {
        let dir = tempdir().unwrap();
        let config = config_in(&dir);
        let reporter = RecordingReporter::default();
        let runner = TestRunner::new(&config, &reporter);

        runner.run_names(&["test_update_user"]).unwrap();
        let events = reporter.events();
        assert_eq!(events.first().map(String::as_str), Some("session:1"));
        assert!(events.contains(&"start:test_update_user".to_string()));
        assert!(events.contains(&"finish:test_update_user:true".to_string()));
        assert_eq!(events.last().map(String::as_str), Some("done:1/1"));
    }
}
