//! Run configuration: compiled defaults, project TOML, env overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Immutable configuration for one engine run.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`BLASTRADIUS_*`)
/// 2. Project config (`blastradius.toml` in the project root)
/// 3. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RadiusConfig {
    /// Cache directory name under the project root.
    pub cache_dir_name: String,
    /// Project configuration file whose hash invalidates the cache.
    pub project_config_file: String,
    /// Files processed between cooperative yields in long loops.
    pub batch_yield_size: usize,
    /// Cap on file paths in the oracle grounding context.
    pub max_context_files: usize,
    /// Cap on symbol descriptors in the oracle grounding context.
    pub max_context_symbols: usize,
    /// Cap on hint-resolved intent candidates.
    pub max_resolved_hints: usize,
    /// Cap on keyword-resolved intent candidates.
    pub max_resolved_keywords: usize,
    /// Pass-B score below which a prompt is foreign to the codebase.
    pub relevance_threshold: f32,
    /// Minimum combined hint score to accept a pass-A candidate.
    pub hint_acceptance_threshold: f32,
    /// Minimum keyword score to accept a pass-B candidate.
    pub keyword_acceptance_threshold: f32,
}

impl Default for RadiusConfig {
    fn default() -> Self {
        Self {
            cache_dir_name: ".blastradius".to_string(),
            project_config_file: "tsconfig.json".to_string(),
            batch_yield_size: 20,
            max_context_files: 150,
            max_context_symbols: 400,
            max_resolved_hints: 20,
            max_resolved_keywords: 10,
            relevance_threshold: 0.30,
            hint_acceptance_threshold: 0.45,
            keyword_acceptance_threshold: 0.25,
        }
    }
}

/// Optional-field mirror of [`RadiusConfig`] for TOML merging.
/// Unknown keys are silently ignored (forward-compatible).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "snake_case")]
struct PartialConfig {
    cache_dir_name: Option<String>,
    project_config_file: Option<String>,
    batch_yield_size: Option<usize>,
    max_context_files: Option<usize>,
    max_context_symbols: Option<usize>,
    max_resolved_hints: Option<usize>,
    max_resolved_keywords: Option<usize>,
    relevance_threshold: Option<f32>,
    hint_acceptance_threshold: Option<f32>,
    keyword_acceptance_threshold: Option<f32>,
}

impl RadiusConfig {
    /// Load configuration for `root` with the documented resolution order.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let project_path = root.join("blastradius.toml");
        if project_path.exists() {
            let content = std::fs::read_to_string(&project_path).map_err(|e| {
                ConfigError::FileUnreadable {
                    path: project_path.display().to_string(),
                    message: e.to_string(),
                }
            })?;
            let partial: PartialConfig =
                toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
                    path: project_path.display().to_string(),
                    message: e.to_string(),
                })?;
            Self::merge(&mut config, partial);
        }

        Self::apply_env_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let partial: PartialConfig =
            toml::from_str(toml_str).map_err(|e| ConfigError::ParseFailed {
                path: "<string>".to_string(),
                message: e.to_string(),
            })?;
        let mut config = Self::default();
        Self::merge(&mut config, partial);
        config.validate()?;
        Ok(config)
    }

    fn merge(base: &mut RadiusConfig, other: PartialConfig) {
        if let Some(v) = other.cache_dir_name {
            base.cache_dir_name = v;
        }
        if let Some(v) = other.project_config_file {
            base.project_config_file = v;
        }
        if let Some(v) = other.batch_yield_size {
            base.batch_yield_size = v;
        }
        if let Some(v) = other.max_context_files {
            base.max_context_files = v;
        }
        if let Some(v) = other.max_context_symbols {
            base.max_context_symbols = v;
        }
        if let Some(v) = other.max_resolved_hints {
            base.max_resolved_hints = v;
        }
        if let Some(v) = other.max_resolved_keywords {
            base.max_resolved_keywords = v;
        }
        if let Some(v) = other.relevance_threshold {
            base.relevance_threshold = v;
        }
        if let Some(v) = other.hint_acceptance_threshold {
            base.hint_acceptance_threshold = v;
        }
        if let Some(v) = other.keyword_acceptance_threshold {
            base.keyword_acceptance_threshold = v;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `BLASTRADIUS_BATCH_YIELD_SIZE`, `BLASTRADIUS_CACHE_DIR_NAME`, etc.
    fn apply_env_overrides(config: &mut RadiusConfig) {
        if let Ok(val) = std::env::var("BLASTRADIUS_CACHE_DIR_NAME") {
            if !val.is_empty() {
                config.cache_dir_name = val;
            }
        }
        if let Ok(val) = std::env::var("BLASTRADIUS_PROJECT_CONFIG_FILE") {
            if !val.is_empty() {
                config.project_config_file = val;
            }
        }
        if let Ok(val) = std::env::var("BLASTRADIUS_BATCH_YIELD_SIZE") {
            if let Ok(v) = val.parse::<usize>() {
                config.batch_yield_size = v;
            }
        }
        if let Ok(val) = std::env::var("BLASTRADIUS_RELEVANCE_THRESHOLD") {
            if let Ok(v) = val.parse::<f32>() {
                config.relevance_threshold = v;
            }
        }
    }

    /// Validate every threshold to its documented range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_yield_size == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "batch_yield_size".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        for (field, value) in [
            ("relevance_threshold", self.relevance_threshold),
            ("hint_acceptance_threshold", self.hint_acceptance_threshold),
            ("keyword_acceptance_threshold", self.keyword_acceptance_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ValidationFailed {
                    field: field.to_string(),
                    message: "must be between 0.0 and 1.0".to_string(),
                });
            }
        }
        if self.cache_dir_name.is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "cache_dir_name".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
