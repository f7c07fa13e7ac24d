use serde::Serialize;
use sqlcheck::Scenario;
use tabled::Tabled;

use super::output::{print_rows, OutputFormat};

#[derive(Serialize, Tabled)]
struct ScenarioEntry {
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Group")]
    group: &'static str,
    #[tabled(rename = "Menu")]
    menu_key: char,
    #[tabled(rename = "Description")]
    description: &'static str,
}

pub fn run(output_format: OutputFormat) {
    let entries: Vec<ScenarioEntry> = Scenario::all()
        .iter()
        .map(|s| ScenarioEntry {
            name: s.name(),
            group: s.group().name(),
            menu_key: s.group().menu_key(),
            description: s.description(),
        })
        .collect();

    print_rows(&entries, output_format);
}
