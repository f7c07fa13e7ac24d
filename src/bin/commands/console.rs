//! Colored terminal output

use colored::*;
use sqlcheck::{Reporter, RunSummary, Scenario, ScenarioReport};

/// Prints run progress to stdout with colors
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn session_started(&self, database_path: &str, scenarios: &[Scenario]) {
        print_step(
            "Preparing test environment",
            &format!("Rebuilding the schema in {}", database_path),
        );
        print_step(
            "Running tests",
            &format!("{} scenario(s) in a single session", scenarios.len()),
        );
    }

    fn scenario_started(&self, scenario: Scenario) {
        println!(
            "\n{} {}",
            "Running test:".green(),
            scenario.name().yellow()
        );
        println!("{} {}", "Description:".cyan(), scenario.description().white());
    }

    fn action(&self, action: &str, details: Option<&str>) {
        println!("{} {}", "[ACTION]".blue(), action.green());
        if let Some(d) = details {
            println!("  {}", d.white());
        }
    }

    fn scenario_finished(&self, report: &ScenarioReport) {
        match &report.error {
            None => println!(
                "{} {} ({:.2} ms)",
                "PASSED".green().bold(),
                report.name,
                report.duration_ms
            ),
            Some(e) => {
                println!(
                    "{} {} ({:.2} ms)",
                    "FAILED".red().bold(),
                    report.name,
                    report.duration_ms
                );
                println!("  {}", e.red());
            }
        }
    }

    fn session_finished(&self, summary: &RunSummary) {
        print_step("Tests finished", "Checking results");
        let line = format!(
            "{} passed, {} failed, {} total",
            summary.passed(),
            summary.failed(),
            summary.total()
        );
        if summary.is_success() {
            println!("{}", line.green());
        } else {
            println!("{}", line.red());
        }
    }
}

pub fn print_step(step: &str, description: &str) {
    println!("{} {}", "[STEP]".cyan(), step.yellow());
    if !description.is_empty() {
        println!("  {}", description.white());
    }
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "ERROR:".red().bold(), message);
}
