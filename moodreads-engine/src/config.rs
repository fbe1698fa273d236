//! Engine configuration
//!
//! Flattens the bootstrap TOML settings plus the resolved root folder into
//! the values the engine components need.

use moodreads_common::config::{AnalysisConfig, TomlConfig, CACHE_FILE_NAME, DATABASE_FILE_NAME};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub root_folder: PathBuf,
    pub analysis: AnalysisConfig,
    pub default_limit: usize,
    pub max_limit: usize,
    pub item_timeout: Duration,
}

impl EngineConfig {
    pub fn from_toml(root_folder: &Path, toml_config: &TomlConfig) -> Self {
        Self {
            root_folder: root_folder.to_path_buf(),
            analysis: toml_config.analysis.clone(),
            default_limit: toml_config.recommendation.default_limit,
            max_limit: toml_config.recommendation.max_limit,
            item_timeout: Duration::from_secs(toml_config.batch.item_timeout_secs),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.root_folder.join(CACHE_FILE_NAME)
    }
}
