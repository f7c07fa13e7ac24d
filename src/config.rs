use anyhow::{anyhow, Result};
use config::Config;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::database::{DatabaseConn, SchemaManager, SchemaStatus};

/// Default location of the scenario database, relative to the working directory
pub const DEFAULT_DATABASE_PATH: &str = "identifier.sqlite";

#[derive(Debug, Clone, Serialize)]
pub struct HarnessConfig {
    /// Path to the SQLite file rebuilt at the start of every session
    pub database_path: String,

    /// Rows inserted by the index scenario (default: 1000)
    pub index_rows: u32,

    /// Rows inserted by each phase of the batch scenario (default: 100)
    pub batch_rows: u32,

    /// How long a connection waits on a locked database (default: 5000ms)
    pub busy_timeout_ms: u64,
}

const EMPTY_CONFIG: &str = r#"### sqlcheck configuration file

### database file rebuilt at the start of every run
# database_path = "identifier.sqlite"

### scenario sizes
# index_rows = 1000
# batch_rows = 100

### milliseconds to wait on a locked database
# busy_timeout_ms = 5000
"#;

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            index_rows: 1000,
            batch_rows: 100,
            busy_timeout_ms: 5000,
        }
    }
}

impl HarnessConfig {
    /// Function to create and initialize a new configuration
    pub fn new(path: &Option<String>) -> Result<HarnessConfig> {
        let mut builder = Config::builder();

        // Add in toml configuration file
        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                let config_dir = Self::config_dir()?;
                std::fs::create_dir_all(config_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create sqlcheck directory: {}", e))?;
                let p = Self::config_file_path();
                if Path::new(p.as_str()).exists() {
                    builder = builder.add_source(config::File::with_name(p.as_str()));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG).map_err(|e| {
                        anyhow!("Unable to create config file {}: {}", p.as_str(), e)
                    })?;
                }
            }
        }

        // Add in settings from the environment (with a prefix of SQLCHECK)
        // E.g., `SQLCHECK_DATABASE_PATH=/tmp/x.sqlite ./sqlcheck` would move the database
        builder = builder.add_source(config::Environment::with_prefix("SQLCHECK"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        Self::from_map(&config)
    }

    fn from_map(config: &HashMap<String, String>) -> Result<HarnessConfig> {
        let defaults = HarnessConfig::default();

        let database_path = config
            .get("database_path")
            .cloned()
            .unwrap_or(defaults.database_path);

        let index_rows = parse_positive(config, "index_rows", defaults.index_rows)?;
        let batch_rows = parse_positive(config, "batch_rows", defaults.batch_rows)?;

        let busy_timeout_ms = match config.get("busy_timeout_ms") {
            Some(v) => v
                .parse()
                .map_err(|e| anyhow!("Invalid busy_timeout_ms '{}': {}", v, e))?,
            None => defaults.busy_timeout_ms,
        };

        Ok(HarnessConfig {
            database_path,
            index_rows,
            batch_rows,
            busy_timeout_ms,
        })
    }

    /// Busy timeout as Duration
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        let lines = [
            format!("Database Path:      {}", self.database_path),
            format!("Index Rows:         {}", self.index_rows),
            format!("Batch Rows:         {}", self.batch_rows),
            format!("Busy Timeout:       {} ms", self.busy_timeout_ms),
        ];
        lines.join("\n")
    }

    fn config_dir() -> Result<String> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not find home directory"))?
            .to_str()
            .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?
            .to_owned();
        Ok(format!("{}/.sqlcheck", home_dir))
    }

    /// Get the config file path
    pub fn config_file_path() -> String {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| "~".to_string());
        format!("{}/.sqlcheck/sqlcheck.toml", home_dir)
    }
}

fn parse_positive(config: &HashMap<String, String>, key: &str, default: u32) -> Result<u32> {
    match config.get(key) {
        Some(v) => {
            let parsed: u32 = v
                .parse()
                .map_err(|e| anyhow!("Invalid {} '{}': {}", key, v, e))?;
            if parsed == 0 {
                return Err(anyhow!("{} must be greater than zero", key));
            }
            Ok(parsed)
        }
        None => Ok(default),
    }
}

/// Information about the SQLite database file
#[derive(Debug, Serialize, Clone)]
pub struct SqliteDatabaseInfo {
    pub path: String,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    pub schema_status: String,
}

/// Get SQLite database information without modifying the file
pub fn get_sqlite_info(config: &HarnessConfig) -> SqliteDatabaseInfo {
    let path = config.database_path.clone();
    let exists = Path::new(&path).exists();
    let size_bytes = if exists {
        std::fs::metadata(&path).ok().map(|m| m.len())
    } else {
        None
    };

    let schema_status = if exists {
        match DatabaseConn::open_path(&path)
            .and_then(|db| SchemaManager::new(&db.conn).check_status())
        {
            Ok(status) => status.to_string(),
            Err(e) => format!("unreadable ({})", e),
        }
    } else {
        SchemaStatus::NotInitialized.to_string()
    };

    SqliteDatabaseInfo {
        path,
        exists,
        size_bytes,
        schema_status,
    }
}

/// Format bytes into a human-readable string
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Session;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.database_path, DEFAULT_DATABASE_PATH);
        assert_eq!(config.index_rows, 1000);
        assert_eq!(config.batch_rows, 100);
        assert_eq!(config.busy_timeout(), Duration::from_millis(5000));
    }

    #[test]
    fn test_missing_file_is_created_with_template() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sqlcheck.toml");
        let path_str = path.to_str().unwrap().to_string();

        let config = HarnessConfig::new(&Some(path_str)).unwrap();
        assert!(path.exists());
        assert_eq!(config.index_rows, 1000);
    }

    #[test]
    fn test_values_read_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sqlcheck.toml");
        std::fs::write(
            &path,
            "database_path = \"/tmp/other.sqlite\"\nindex_rows = 50\nbatch_rows = 20\n",
        )
        .unwrap();

        let config = HarnessConfig::new(&Some(path.to_str().unwrap().to_string())).unwrap();
        assert_eq!(config.database_path, "/tmp/other.sqlite");
        assert_eq!(config.index_rows, 50);
        assert_eq!(config.batch_rows, 20);
    }

    #[test]
    fn test_from_map_rejects_zero_rows() {
        let mut map = HashMap::new();
        map.insert("batch_rows".to_string(), "0".to_string());
        assert!(HarnessConfig::from_map(&map).is_err());
    }

    #[test]
    fn test_from_map_rejects_garbage() {
        let mut map = HashMap::new();
        map.insert("index_rows".to_string(), "many".to_string());
        assert!(HarnessConfig::from_map(&map).is_err());
    }

    #[test]
    fn test_sqlite_info() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("info.sqlite");
        let config = HarnessConfig {
            database_path: path.to_str().unwrap().to_string(),
            ..Default::default()
        };

        let info = get_sqlite_info(&config);
        assert!(!info.exists);
        assert_eq!(info.schema_status, "not initialized");

        Session::start(&config.database_path).unwrap();
        let info = get_sqlite_info(&config);
        assert!(info.exists);
        assert!(info.size_bytes.is_some());
        assert_eq!(info.schema_status, "current");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }
}
