use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub nexu: NexuConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub relations: RelationsConfig,
}

/// Nexu-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NexuConfig {
    /// SQLite database holding the content and relation tables.
    pub db_path: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: PathBuf,
}

/// Identifier resolution cache configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached identifier resolutions. 0 keeps every entry
    /// for the lifetime of the process.
    #[serde(default)]
    pub capacity: usize,
}

/// Relation type configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RelationsConfig {
    #[serde(default = "default_document_relation_type")]
    pub document_relation_type: String,
}

impl Default for RelationsConfig {
    fn default() -> Self {
        Self {
            document_relation_type: default_document_relation_type(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_migrations_dir() -> PathBuf {
    PathBuf::from("migrations")
}

fn default_document_relation_type() -> String {
    "nexuDocumentToDocument".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in NEXU_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let config_path = std::env::var("NEXU_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        Self::parse(&config_str)
            .with_context(|| format!("Invalid config file: {}", config_path.display()))
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str).context("Failed to parse config.toml")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.nexu.db_path.as_os_str().is_empty() {
            anyhow::bail!("nexu.db_path must not be empty");
        }

        if self.relations.document_relation_type.trim().is_empty() {
            anyhow::bail!("relations.document_relation_type must not be empty");
        }

        Ok(())
    }

    /// Get database path
    pub fn db_path(&self) -> &Path {
        &self.nexu.db_path
    }

    /// Get the directory holding the SQL migrations
    pub fn migrations_dir(&self) -> &Path {
        &self.nexu.migrations_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serialize config tests that mutate process-wide env so they don't race.
    static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

    const FULL_CONFIG: &str = r#"
[nexu]
db_path = "./test.db"
log_level = "debug"
migrations_dir = "./sql"

[cache]
capacity = 512

[relations]
document_relation_type = "customDocToDoc"
"#;

    #[test]
    fn test_config_parse_full() {
        let config = Config::parse(FULL_CONFIG).unwrap();
        assert_eq!(config.nexu.log_level, "debug");
        assert_eq!(config.db_path(), Path::new("./test.db"));
        assert_eq!(config.migrations_dir(), Path::new("./sql"));
        assert_eq!(config.cache.capacity, 512);
        assert_eq!(config.relations.document_relation_type, "customDocToDoc");
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::parse("[nexu]\ndb_path = \"nexu.db\"\n").unwrap();
        assert_eq!(config.nexu.log_level, "info");
        assert_eq!(config.migrations_dir(), Path::new("migrations"));
        assert_eq!(config.cache.capacity, 0);
        assert_eq!(config.relations.document_relation_type, "nexuDocumentToDocument");
    }

    #[test]
    fn test_config_rejects_empty_relation_type() {
        let err = Config::parse(
            "[nexu]\ndb_path = \"nexu.db\"\n[relations]\ndocument_relation_type = \" \"\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("document_relation_type"));
    }

    #[test]
    fn test_config_rejects_empty_db_path() {
        let err = Config::parse("[nexu]\ndb_path = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("db_path"));
    }

    #[test]
    fn test_config_missing_section() {
        assert!(Config::parse("[cache]\ncapacity = 1\n").is_err());
    }

    #[test]
    fn test_config_load_from_env_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nexu.toml");
        fs::write(&config_path, FULL_CONFIG).unwrap();

        let original = std::env::var("NEXU_CONFIG").ok();
        std::env::set_var("NEXU_CONFIG", config_path.to_str().unwrap());
        let config = Config::load();
        std::env::remove_var("NEXU_CONFIG");
        if let Some(v) = original {
            std::env::set_var("NEXU_CONFIG", v);
        }

        let config = config.unwrap();
        assert_eq!(config.cache.capacity, 512);
    }

    #[test]
    fn test_config_invalid_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let original = std::env::var("NEXU_CONFIG").ok();
        std::env::set_var("NEXU_CONFIG", "nonexistent.toml");
        let config = Config::load();
        assert!(config.is_err());
        std::env::remove_var("NEXU_CONFIG");
        if let Some(v) = original {
            std::env::set_var("NEXU_CONFIG", v);
        }
    }
}
