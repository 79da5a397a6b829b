//! Server configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional YAML
//! file, then `CARPRICE_*` environment variables (`__` separates sections,
//! e.g. `CARPRICE_MODEL__PATH`). CLI flags are applied last by the binary.

use carprice_model::DEFAULT_MODEL_PATH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "CARPRICE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ListenConfig,

    #[serde(default)]
    pub model: ModelSettings,
}

/// Listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allow cross-origin calls to the API from any origin
    #[serde(default)]
    pub allow_any_origin: bool,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            allow_any_origin: false,
        }
    }
}

/// Model artifact settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Artifact directory or JSON file
    #[serde(default = "default_model_path")]
    pub path: PathBuf,

    /// Load the artifact before accepting connections
    #[serde(default)]
    pub preload: bool,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            preload: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from an optional file plus the process environment.
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        Self::load_with_env(path, environment())
    }

    /// Load from an optional file plus the given environment source
    pub fn load_with_env(path: Option<&Path>, env: config::Environment) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        Self::build(builder, env)
    }

    /// Parse configuration from YAML text plus the given environment source
    pub fn from_yaml(yaml: &str, env: config::Environment) -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml));
        Self::build(builder, env)
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        env: config::Environment,
    ) -> anyhow::Result<Self> {
        let config = builder.add_source(env).build()?.try_deserialize()?;
        Ok(config)
    }
}

/// `CARPRICE_*` environment source
pub fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn default_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    7860
}

fn default_model_path() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_PATH)
}
