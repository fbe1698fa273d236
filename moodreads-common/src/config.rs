//! Configuration loading, root folder and credential resolution
//!
//! Bootstrap configuration comes from a single TOML file. Every section and
//! key is optional; missing values fall back to built-in defaults.
//!
//! # Resolution priority
//!
//! Root folder:
//! 1. Command-line argument (highest priority)
//! 2. `MOODREADS_ROOT_FOLDER` environment variable
//! 3. TOML `root_folder`
//! 4. OS-dependent default (fallback)
//!
//! Analysis service API key:
//! 1. `MOODREADS_API_KEY` environment variable
//! 2. `ANTHROPIC_API_KEY` environment variable
//! 3. TOML `analysis.api_key`

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "MOODREADS_ROOT_FOLDER";

/// Environment variables holding the analysis service key, highest priority first
pub const API_KEY_ENV_VARS: [&str; 2] = ["MOODREADS_API_KEY", "ANTHROPIC_API_KEY"];

/// Document store file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "moodreads.db";

/// Analysis cache file name inside the root folder
pub const CACHE_FILE_NAME: &str = "emotion_cache.json";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding the database and cache files
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub recommendation: RecommendationConfig,

    #[serde(default)]
    pub batch: BatchConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// External text-analysis service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// API key (lowest priority source, see module docs)
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Fixed minimum delay between consecutive service calls
    #[serde(default = "default_min_call_interval_ms")]
    pub min_call_interval_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            min_call_interval_ms: default_min_call_interval_ms(),
        }
    }
}

/// Recommendation output limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Hard ceiling applied regardless of the requested limit
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

/// Batch profiling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Timeout guard wrapped around each book
    #[serde(default = "default_item_timeout_secs")]
    pub item_timeout_secs: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            item_timeout_secs: default_item_timeout_secs(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_model() -> String {
    "claude-3-sonnet-20240229".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.2
}

fn default_min_call_interval_ms() -> u64 {
    1000
}

fn default_limit() -> usize {
    5
}

fn default_max_limit() -> usize {
    10
}

fn default_item_timeout_secs() -> u64 {
    120
}

/// Default configuration file path (`<config_dir>/moodreads/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("moodreads").join("config.toml"))
}

/// Locate the bootstrap TOML file
///
/// An explicit path must exist. Without one, the default path is used when
/// it exists; `None` means built-in defaults apply.
///
/// Does not log: callers report the source once tracing is initialized.
pub fn locate_config_file(explicit_path: Option<&Path>) -> Result<Option<PathBuf>> {
    match explicit_path {
        Some(path) if path.exists() => Ok(Some(path.to_path_buf())),
        Some(path) => Err(Error::Config(format!(
            "Config file not found: {}",
            path.display()
        ))),
        None => Ok(default_config_path().filter(|path| path.exists())),
    }
}

/// Read and parse one TOML configuration file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    parse_toml_config(&content)
}

/// Load TOML configuration, falling back to built-in defaults
pub fn load_toml_config(explicit_path: Option<&Path>) -> Result<TomlConfig> {
    match locate_config_file(explicit_path)? {
        Some(path) => read_toml_config(&path),
        None => Ok(TomlConfig::default()),
    }
}

/// Parse TOML configuration text
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Resolve the root folder following the documented priority order
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    get_default_root_folder()
}

/// Get OS-dependent default root folder path
fn get_default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("moodreads"))
        .unwrap_or_else(|| PathBuf::from("./moodreads_data"))
}

/// Resolve the analysis service API key
///
/// Fails fast with a configuration error when no source holds a valid key.
pub fn resolve_api_key(toml_config: &TomlConfig) -> Result<String> {
    let mut candidates: Vec<(&str, String)> = Vec::new();

    for var in API_KEY_ENV_VARS {
        if let Ok(key) = std::env::var(var) {
            if is_valid_key(&key) {
                candidates.push((var, key));
            }
        }
    }

    if let Some(key) = &toml_config.analysis.api_key {
        if is_valid_key(key) {
            candidates.push(("TOML analysis.api_key", key.clone()));
        }
    }

    if candidates.len() > 1 {
        let sources: Vec<&str> = candidates.iter().map(|(source, _)| *source).collect();
        warn!(
            "Analysis API key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    match candidates.into_iter().next() {
        Some((source, key)) => {
            info!("Analysis API key loaded from {}", source);
            Ok(key.trim().to_string())
        }
        None => Err(Error::Config(
            "Analysis API key not configured. Please configure using one of:\n\
             1. Environment: MOODREADS_API_KEY=your-key-here\n\
             2. Environment: ANTHROPIC_API_KEY=your-key-here\n\
             3. TOML config: ~/.config/moodreads/config.toml ([analysis] api_key = \"your-key\")"
                .to_string(),
        )),
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
