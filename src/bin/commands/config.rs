use serde::Serialize;
use sqlcheck::{format_size, get_sqlite_info, HarnessConfig, SqliteDatabaseInfo};

use super::output::{print_json, OutputFormat};

#[derive(Debug, Serialize)]
struct ConfigInfo<'a> {
    config_file: String,
    settings: &'a HarnessConfig,
    database: SqliteDatabaseInfo,
}

pub fn run(config: &HarnessConfig, config_path: &Option<String>, output_format: OutputFormat) {
    let config_file = config_path
        .clone()
        .unwrap_or_else(HarnessConfig::config_file_path);

    let info = ConfigInfo {
        config_file,
        settings: config,
        database: get_sqlite_info(config),
    };

    if output_format.is_json() {
        print_json(&info, output_format);
        return;
    }

    println!("Config File:        {}", info.config_file);
    println!("{}", config.summary());
    println!();
    println!("Database:");
    println!("  Exists:           {}", info.database.exists);
    if let Some(size) = info.database.size_bytes {
        println!("  Size:             {}", format_size(size));
    }
    println!("  Schema:           {}", info.database.schema_status);
}
