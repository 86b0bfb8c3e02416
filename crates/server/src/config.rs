//! # Application Configuration
//!
//! This module defines the configuration structure for the `brandsight-server` and
//! provides the logic for loading it from a `config.yml` file and environment
//! variables.

use brandsight::{
    constants::{DEFAULT_DB_FILE, DEFAULT_NUM_RESULTS, DEFAULT_REQUEST_TIMEOUT_SECS},
    providers::factory::{AiProviderSettings, ExaSettings},
    ExtractOptions, GenerateOptions, GenerateOverrides, PipelineConfig, SearchFailurePolicy,
};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::time::Duration;
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// `:memory:` keeps insights in process; anything else is a SQLite file path.
    /// Loaded from `DB_URL` env var.
    #[serde(default = "default_db_url")]
    pub db_url: String,
    /// Per-call timeout for every remote provider.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub pipeline: PipelineSection,
}

fn default_port() -> u16 {
    9090
}

fn default_db_url() -> String {
    DEFAULT_DB_FILE.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_num_results() -> usize {
    DEFAULT_NUM_RESULTS
}

fn default_max_characters() -> usize {
    ExtractOptions::default().max_characters
}

fn default_generation_provider() -> String {
    "gemini".to_string()
}

/// The web-search provider (Exa `/search`).
#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_num_results")]
    pub num_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            num_results: default_num_results(),
        }
    }
}

/// The content-extraction provider (Exa `/contents`).
#[derive(Debug, Deserialize, Clone)]
pub struct ExtractionConfig {
    #[serde(default)]
    pub api_url: Option<String>,
    /// Falls back to `search.api_key` when unset.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_max_characters")]
    pub max_characters: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            max_characters: default_max_characters(),
        }
    }
}

/// The generative-text provider and its default sampling parameters.
#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    /// The type of provider ("gemini" or "local").
    #[serde(default = "default_generation_provider")]
    pub provider: String,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub top_p: Option<f32>,
    #[serde(default)]
    pub top_k: Option<u32>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_generation_provider(),
            api_url: None,
            api_key: None,
            model_name: None,
            temperature: None,
            max_tokens: None,
            top_p: None,
            top_k: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PipelineSection {
    #[serde(default)]
    pub search_failure_policy: SearchFailurePolicy,
}

/// `${VAR}` substitution leaves unset variables as empty strings; treat those as absent.
fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn search_settings(&self) -> ExaSettings {
        ExaSettings {
            api_url: non_empty(&self.search.api_url),
            api_key: non_empty(&self.search.api_key),
        }
    }

    pub fn extraction_settings(&self) -> ExaSettings {
        ExaSettings {
            api_url: non_empty(&self.extraction.api_url),
            api_key: non_empty(&self.extraction.api_key)
                .or_else(|| non_empty(&self.search.api_key)),
        }
    }

    pub fn ai_settings(&self) -> AiProviderSettings {
        AiProviderSettings {
            provider: self.generation.provider.clone(),
            api_url: non_empty(&self.generation.api_url),
            api_key: non_empty(&self.generation.api_key),
            model_name: non_empty(&self.generation.model_name),
        }
    }

    /// The pipeline settings, with configured generation values layered over the defaults.
    pub fn pipeline_config(&self) -> PipelineConfig {
        let overrides = GenerateOverrides {
            model: non_empty(&self.generation.model_name),
            temperature: self.generation.temperature,
            max_tokens: self.generation.max_tokens,
            top_p: self.generation.top_p,
            top_k: self.generation.top_k,
        };
        PipelineConfig {
            num_results: self.search.num_results,
            max_characters: self.extraction.max_characters,
            search_failure_policy: self.pipeline.search_failure_policy,
            generate_options: GenerateOptions::default().merged(Some(&overrides)),
        }
    }
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(format!("Invalid substitution pattern: {e}")))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration from a file and environment variables.
///
/// - An explicit `config_path_override` must exist. Without one, `config.yml` next to
///   the crate manifest is used if present, otherwise only defaults and the environment.
/// - Top-level keys like `port` and `db_url` are overridden by `PORT` and `DB_URL`.
/// - Nested keys are overridden by `BRANDSIGHT_...` variables (e.g., `BRANDSIGHT_SEARCH__API_KEY`).
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let base_path = env!("CARGO_MANIFEST_DIR");
    let mut builder = ConfigBuilder::builder()
        // Layer 1: Programmatic defaults.
        .set_default("generation.provider", default_generation_provider())?;

    // Layer 2: Main config file.
    match config_path_override {
        Some(path) => {
            let content = read_and_substitute(path)?.ok_or_else(|| {
                ConfigError::NotFound(format!("Main config file not found at '{path}'."))
            })?;
            info!("Loading configuration from '{path}'.");
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None => {
            let user_config_path = format!("{base_path}/config.yml");
            if let Some(content) = read_and_substitute(&user_config_path)? {
                info!("Loading user-defined configuration from '{user_config_path}'.");
                builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
            } else {
                info!("'{user_config_path}' not found. Using defaults and environment only.");
            }
        }
    }

    let settings = builder
        // Layer 3: Load environment variables for top-level keys like PORT.
        .add_source(Environment::default())
        // Layer 4: Load prefixed environment variables for deeper overrides.
        .add_source(
            Environment::with_prefix("BRANDSIGHT")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    Ok(config)
}
