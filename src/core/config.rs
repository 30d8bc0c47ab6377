use super::error::{Error, Result};
use crate::search::model::QueryType;
use reqwest::Url;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Search service address used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8001";
/// Collection searched when nothing else is configured
pub const DEFAULT_COLLECTION: &str = "full_stack_fastapi_template";

const CONFIG_FILE_NAME: &str = "config.json";
const LOG_FILE_NAME: &str = "codesearch.log";

/// Resolved client configuration.
///
/// Built once at startup and never mutated afterwards; components that need
/// it receive a reference or a clone.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root URL of the search service
    pub base_url: Url,
    /// Collection every search is issued against
    pub collection_name: String,
    /// Retrieval mode sent with each search
    pub query_type: QueryType,
    /// Directory for the config file and logs
    pub base_dir: PathBuf,
}

/// Values supplied on the command line or through the environment.
/// Anything left `None` falls through to the config file, then the defaults.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub collection_name: Option<String>,
    pub query_type: Option<QueryType>,
    pub config_path: Option<PathBuf>,
    pub base_dir: Option<PathBuf>,
}

/// On-disk shape of `config.json`
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub collection_name: Option<String>,
    pub query_type: Option<QueryType>,
}

impl ConfigFile {
    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            Error::Config(format!("Invalid config file {}: {}", path.display(), e))
        })
    }
}

impl Config {
    /// Get the default configuration directory
    pub fn default_base_dir() -> Result<PathBuf> {
        dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))
            .map(|home| home.join(".codesearch"))
    }

    /// Create a configuration from explicit values
    pub fn new(base_url: &str, collection_name: impl Into<String>) -> Result<Self> {
        let base_dir = Self::default_base_dir().unwrap_or_else(|_| PathBuf::from(".codesearch"));

        Ok(Self {
            base_url: parse_base_url(base_url)?,
            collection_name: validate_collection(collection_name.into())?,
            query_type: QueryType::default(),
            base_dir,
        })
    }

    /// Resolve the configuration from overrides, the config file and defaults
    /// (in that order of precedence).
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let base_dir = match overrides.base_dir {
            Some(dir) => dir,
            None => Self::default_base_dir().unwrap_or_else(|_| PathBuf::from(".codesearch")),
        };

        let file = match &overrides.config_path {
            // An explicitly requested file has to exist.
            Some(path) => ConfigFile::load(path)?,
            None => {
                let path = base_dir.join(CONFIG_FILE_NAME);
                if path.exists() {
                    ConfigFile::load(&path)?
                } else {
                    ConfigFile::default()
                }
            }
        };

        let base_url = overrides
            .base_url
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let collection_name = overrides
            .collection_name
            .or(file.collection_name)
            .unwrap_or_else(|| DEFAULT_COLLECTION.to_string());
        let query_type = overrides
            .query_type
            .or(file.query_type)
            .unwrap_or_default();

        Ok(Self {
            base_url: parse_base_url(&base_url)?,
            collection_name: validate_collection(collection_name)?,
            query_type,
            base_dir,
        })
    }

    /// Path of the log file written while the TUI owns the terminal
    pub fn log_path(&self) -> PathBuf {
        self.base_dir.join(LOG_FILE_NAME)
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::Config(format!("Invalid base URL '{}': {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(Error::Config(format!(
            "Base URL must be an http(s) URL, got '{}'",
            raw
        )));
    }

    Ok(url)
}

fn validate_collection(name: String) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::Config("Collection name must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}
