//! Configuration management for the promptdoc service.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Environment variables
//! - Command-line flags
//! - Config files (promptdoc.yaml)
//!
//! Precedence is: defaults < config file < environment < CLI flags.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Default caller identity when the transport supplies none.
pub const ANON_USER: &str = "user_anon";

/// Storage backend selection for the prompt catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-lifetime only, no persistence.
    Memory,
    /// In-memory catalog mirrored to a JSON file after every mutation.
    Snapshot,
    /// Every mutation is an immediate, individually durable SQLite write.
    Sqlite,
}

impl StorageBackend {
    /// Parse a backend name from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Some(Self::Memory),
            "snapshot" | "file" => Some(Self::Snapshot),
            "sqlite" | "db" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Get the canonical backend name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Snapshot => "snapshot",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Per-provider configuration overrides.
///
/// Unset fields fall back to the provider's built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderOverrides {
    /// Model identifier (e.g., "gpt-4o-mini")
    pub model: Option<String>,

    /// Sampling temperature (0.0 - 2.0)
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    #[serde(rename = "maxTokens")]
    pub max_tokens: Option<u32>,

    /// Additional retry attempts on transport/provider errors
    pub retries: Option<u32>,

    /// Exponential backoff base in seconds
    pub backoff: Option<f64>,

    /// Custom API endpoint URL
    pub endpoint: Option<String>,
}

/// Generation provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Provider used when a request does not name one
    #[serde(rename = "default", default = "default_provider")]
    pub default_provider: String,

    /// OpenAI overrides
    #[serde(default)]
    pub openai: ProviderOverrides,

    /// Gemini overrides
    #[serde(default)]
    pub gemini: ProviderOverrides,
}

fn default_provider() -> String {
    "mock".to_string()
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            openai: ProviderOverrides::default(),
            gemini: ProviderOverrides::default(),
        }
    }
}

/// Main application configuration.
///
/// This struct holds all global configuration options that affect
/// behavior across commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding durable state (snapshot file, SQLite database)
    pub data_dir: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Prompt catalog storage backend
    pub storage: StorageBackend,

    /// Generation provider settings
    pub providers: ProvidersConfig,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    storage: Option<StorageConfig>,
    logging: Option<LoggingConfig>,
    providers: Option<ProvidersConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StorageConfig {
    backend: Option<String>,
    #[serde(rename = "dataDir")]
    data_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("var"),
            config_file: None,
            storage: StorageBackend::Memory,
            providers: ProvidersConfig::default(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `PROMPTDOC_DATA_DIR`: Directory for durable state
    /// - `PROMPTDOC_CONFIG`: Path to config file
    /// - `PROMPTDOC_STORAGE`: Storage backend (memory, snapshot, sqlite)
    /// - `PROMPTDOC_PROVIDER`: Default generation provider
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an explicit config file path, as supplied by
    /// the CLI. Falls back to `PROMPTDOC_CONFIG`, then `promptdoc.yaml`.
    pub fn load_from(config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(data_dir) = std::env::var("PROMPTDOC_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }

        config.config_file = config_file;
        if config.config_file.is_none() {
            if let Ok(path) = std::env::var("PROMPTDOC_CONFIG") {
                config.config_file = Some(PathBuf::from(path));
            }
        }

        // Load from YAML config file if it exists
        let config_path = if let Some(ref cf) = config.config_file {
            cf.clone()
        } else {
            PathBuf::from("promptdoc.yaml")
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(storage) = std::env::var("PROMPTDOC_STORAGE") {
            config.storage = StorageBackend::parse(&storage).ok_or_else(|| {
                AppError::Configuration(format!("Unknown storage backend: {}", storage))
            })?;
        }

        if let Ok(provider) = std::env::var("PROMPTDOC_PROVIDER") {
            config.providers.default_provider = provider;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Configuration(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(storage) = config_file.storage {
            if let Some(backend) = storage.backend {
                result.storage = StorageBackend::parse(&backend).ok_or_else(|| {
                    AppError::Configuration(format!("Unknown storage backend: {}", backend))
                })?;
            }
            if let Some(data_dir) = storage.data_dir {
                result.data_dir = PathBuf::from(data_dir);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(providers) = config_file.providers {
            result.providers = providers;
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables
    /// and the config file.
    pub fn with_overrides(
        mut self,
        data_dir: Option<PathBuf>,
        storage: Option<StorageBackend>,
        provider: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(data_dir) = data_dir {
            self.data_dir = data_dir;
        }

        if let Some(storage) = storage {
            self.storage = storage;
        }

        if let Some(provider) = provider {
            self.providers.default_provider = provider;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Path to the SQLite database (prompt catalog and audit log).
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("promptdoc.db")
    }

    /// Path to the snapshot file for the snapshot storage backend.
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join("data.json")
    }

    /// Ensure the data directory exists.
    pub fn ensure_data_dir(&self) -> AppResult<()> {
        std::fs::create_dir_all(&self.data_dir).map_err(|e| {
            AppError::Configuration(format!(
                "Failed to create data directory {:?}: {}",
                self.data_dir, e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_parsing() {
        assert_eq!(StorageBackend::parse("memory"), Some(StorageBackend::Memory));
        assert_eq!(StorageBackend::parse("file"), Some(StorageBackend::Snapshot));
        assert_eq!(StorageBackend::parse("SQLite"), Some(StorageBackend::Sqlite));
        assert_eq!(StorageBackend::parse("postgres"), None);
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.providers.default_provider, "mock");
        assert_eq!(config.database_path(), PathBuf::from("var/promptdoc.db"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default().with_overrides(
            Some(PathBuf::from("/tmp/pd")),
            Some(StorageBackend::Sqlite),
            Some("openai".to_string()),
            None,
            true,
            false,
        );
        assert_eq!(config.data_dir, PathBuf::from("/tmp/pd"));
        assert_eq!(config.storage, StorageBackend::Sqlite);
        assert_eq!(config.providers.default_provider, "openai");
        // Verbose implies debug logging when no explicit level is set
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_providers_config_yaml() {
        let yaml = r#"
default: openai
openai:
  model: gpt-4o
  temperature: 0.2
  maxTokens: 512
gemini:
  retries: 5
"#;
        let providers: ProvidersConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(providers.default_provider, "openai");
        assert_eq!(providers.openai.model.as_deref(), Some("gpt-4o"));
        assert_eq!(providers.openai.max_tokens, Some(512));
        assert_eq!(providers.gemini.retries, Some(5));
        assert!(providers.gemini.model.is_none());
    }
}
