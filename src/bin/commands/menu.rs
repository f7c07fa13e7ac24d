use std::io::{self, BufRead, Write};

use colored::*;
use sqlcheck::{HarnessConfig, ScenarioGroup, TestRunner};

use super::console::{print_error, print_step, ConsoleReporter};
use super::manual;

/// A parsed main-menu selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Group(ScenarioGroup),
    All,
    Manual,
    Quit,
}

impl MenuChoice {
    /// Parse trimmed, case-insensitive input; anything unknown is `None`
    pub fn parse(input: &str) -> Option<MenuChoice> {
        let normalized = input.trim().to_uppercase();
        let mut chars = normalized.chars();
        let key = chars.next()?;
        if chars.next().is_some() {
            return None;
        }

        match key {
            '0' => Some(MenuChoice::All),
            'M' => Some(MenuChoice::Manual),
            'Q' => Some(MenuChoice::Quit),
            k => ScenarioGroup::from_menu_key(k).map(MenuChoice::Group),
        }
    }
}

pub fn run(config: &HarnessConfig) {
    let stdin = io::stdin();
    let mut input = stdin.lock();

    loop {
        clear_screen();
        print_menu();

        print!("\n{}", "Enter your choice: ".cyan());
        let _ = io::stdout().flush();

        let mut line = String::new();
        match input.read_line(&mut line) {
            // end of input behaves like quitting
            Ok(0) => return,
            Ok(_) => {}
            Err(e) => {
                print_error(&format!("failed to read input: {}", e));
                return;
            }
        }

        match MenuChoice::parse(&line) {
            Some(MenuChoice::Group(group)) => {
                clear_screen();
                run_group(config, group);
                pause(&mut input, "Press Enter to continue...");
            }
            Some(MenuChoice::All) => {
                clear_screen();
                println!("\n{}\n", "Running all tests...".green());
                run_all(config);
                pause(&mut input, "Press Enter to continue...");
            }
            Some(MenuChoice::Manual) => {
                clear_screen();
                manual::run();
                pause(&mut input, "Press Enter to return to the main menu...");
            }
            Some(MenuChoice::Quit) => {
                println!("\n{}", "Shutting down the test system. Goodbye!".yellow());
                return;
            }
            None => {
                println!("\n{}", "Invalid option. Try again.".red());
                pause(&mut input, "Press Enter to continue...");
            }
        }
    }
}

fn print_menu() {
    let rule = "=".repeat(50);
    println!("{}", rule.cyan());
    println!("{}", format!("{:^50}", "DATABASE TEST SYSTEM").yellow());
    println!("{}", rule.cyan());
    println!("\n{}", "Choose an option:".white());
    for group in ScenarioGroup::all() {
        println!(
            "{} {}",
            format!("{}.", group.menu_key()).green(),
            group.title()
        );
    }
    println!("{} Manual and detailed explanations", "M.".yellow());
    println!("{} Run all tests", "0.".blue());
    println!("{} Quit", "Q.".red());
}

fn run_group(config: &HarnessConfig, group: ScenarioGroup) {
    let scenarios = group.scenarios();
    println!("\n{} {}\n", "Running:".green(), group.title().yellow());
    for scenario in &scenarios {
        println!(
            "{} {}",
            "Test:".green(),
            scenario.name().yellow()
        );
        println!("{} {}", "Description:".cyan(), scenario.description().white());
    }
    if scenarios.len() > 1 {
        print_step(
            "Running every test of the group in one session",
            "The database is rebuilt only once, at the start",
        );
    }

    let runner = TestRunner::new(config, &ConsoleReporter);
    if let Err(e) = runner.run(&scenarios) {
        print_error(&e.to_string());
    }
}

fn run_all(config: &HarnessConfig) {
    print_step("Running every test", "This may take a while");
    let runner = TestRunner::new(config, &ConsoleReporter);
    if let Err(e) = runner.run_all() {
        print_error(&e.to_string());
    }
}

fn clear_screen() {
    print!("{}", "\n".repeat(50));
}

fn pause<R: BufRead>(input: &mut R, prompt: &str) {
    print!("\n{}", prompt.green());
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = input.read_line(&mut line);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_groups() {
        assert_eq!(
            MenuChoice::parse("1"),
            Some(MenuChoice::Group(ScenarioGroup::Basic))
        );
        assert_eq!(
            MenuChoice::parse(" 6 \n"),
            Some(MenuChoice::Group(ScenarioGroup::Cascade))
        );
    }

    #[test]
    fn test_parse_letters_case_insensitive() {
        assert_eq!(MenuChoice::parse("m"), Some(MenuChoice::Manual));
        assert_eq!(MenuChoice::parse("Q"), Some(MenuChoice::Quit));
        assert_eq!(MenuChoice::parse("q\n"), Some(MenuChoice::Quit));
        assert_eq!(MenuChoice::parse("0"), Some(MenuChoice::All));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(MenuChoice::parse(""), None);
        assert_eq!(MenuChoice::parse("8"), None);
        assert_eq!(MenuChoice::parse("12"), None);
        assert_eq!(MenuChoice::parse("quit"), None);
    }
}
