use clap::Args;
use serde::Serialize;
use sqlcheck::{
    HarnessConfig, NullReporter, Reporter, RunSummary, Scenario, ScenarioGroup, TestRunner,
};
use tabled::Tabled;

use super::console::{print_error, ConsoleReporter};
use super::output::{print_json, print_json_lines, print_rows, OutputFormat};

/// Arguments for the Run command
///
/// Names, `--group` and `--all` are alternative ways to select; combining
/// them is rejected.
#[derive(Args)]
pub struct RunArgs {
    /// Scenario names to run, matched exactly (e.g. test_cascade_delete)
    pub names: Vec<String>,

    /// Run every scenario of a group: basic, index, transaction, parameterized, like, cascade, batch
    #[clap(short, long, conflicts_with = "names")]
    pub group: Option<String>,

    /// Run every scenario
    #[clap(short, long, conflicts_with_all = ["group", "names"])]
    pub all: bool,

    /// Do not print per-step progress
    #[clap(short, long)]
    pub quiet: bool,
}

#[derive(Serialize, Tabled)]
struct ResultRow {
    #[tabled(rename = "Scenario")]
    name: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Time (ms)")]
    time: String,
    #[tabled(rename = "Error")]
    error: String,
}

/// Returns `true` when every selected scenario passed
pub fn run(config: &HarnessConfig, args: RunArgs, output_format: OutputFormat) -> bool {
    let RunArgs {
        names,
        group,
        all,
        quiet,
    } = args;

    let selection: Vec<Scenario> = if all {
        Scenario::all().to_vec()
    } else if let Some(g) = group {
        match ScenarioGroup::from_name(&g) {
            Some(group) => group.scenarios(),
            None => {
                print_error(&format!("unknown group '{}'", g));
                return false;
            }
        }
    } else if names.is_empty() {
        print_error("nothing to run: pass scenario names, --group, or --all");
        return false;
    } else {
        TestRunner::select(names.as_slice())
    };

    let reporter: &dyn Reporter = if quiet || output_format.is_json() {
        &NullReporter
    } else {
        &ConsoleReporter
    };

    let runner = TestRunner::new(config, reporter);
    match runner.run(&selection) {
        Ok(summary) => {
            print_summary(&summary, output_format);
            summary.is_success()
        }
        Err(e) => {
            print_error(&e.to_string());
            false
        }
    }
}

fn print_summary(summary: &RunSummary, output_format: OutputFormat) {
    match output_format {
        OutputFormat::Json | OutputFormat::JsonPretty => print_json(summary, output_format),
        OutputFormat::JsonLine => print_json_lines(&summary.reports),
        _ => {
            let rows: Vec<ResultRow> = summary
                .reports
                .iter()
                .map(|r| ResultRow {
                    name: r.name.clone(),
                    result: if r.passed { "passed" } else { "failed" }.to_string(),
                    time: format!("{:.2}", r.duration_ms),
                    error: r.error.clone().unwrap_or_default(),
                })
                .collect();
            print_rows(&rows, output_format);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct RunCli {
        #[clap(flatten)]
        args: RunArgs,
    }

    fn parse(argv: &[&str]) -> Result<RunArgs, clap::Error> {
        RunCli::try_parse_from(std::iter::once("run").chain(argv.iter().copied()))
            .map(|cli| cli.args)
    }

    #[test]
    fn test_single_selection_modes_parse() {
        let args = parse(&["test_like_query", "test_cascade_delete"]).unwrap();
        assert_eq!(args.names.len(), 2);
        assert_eq!(parse(&["-g", "basic"]).unwrap().group.as_deref(), Some("basic"));
        assert!(parse(&["--all", "-q"]).unwrap().all);
    }

    #[test]
    fn test_mixed_selections_are_rejected() {
        assert!(parse(&["--all", "--group", "basic"]).is_err());
        assert!(parse(&["--all", "test_like_query"]).is_err());
        assert!(parse(&["--group", "like", "test_cascade_delete"]).is_err());
    }
}
