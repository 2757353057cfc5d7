//! Configuration management module
//!
//! Layers an optional YAML/JSON file under `PAGEMIRROR__*` environment
//! overrides using the `config` crate.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ::config::{Config as ConfigBuilder, Environment, File};
use layout_dom::LayoutConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const ENV_PREFIX: &str = "PAGEMIRROR";
pub const LOCAL_CONFIG: &str = "config/pagemirror.yaml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub replay: ReplaySettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplaySettings {
    /// Append the session metrics to replay output.
    pub metrics: bool,
    /// Drop changelists produced by the initial discovery pass.
    pub skip_discovery: bool,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            metrics: true,
            skip_discovery: false,
        }
    }
}

pub struct LoadedConfig {
    pub config: Config,
    pub path: PathBuf,
    pub from_file: bool,
}

/// Resolves the config path: explicit path, else `config/pagemirror.yaml`,
/// else `<config dir>/pagemirror/config.yaml`.
pub fn resolve_path(config_path: Option<&Path>) -> PathBuf {
    if let Some(path) = config_path {
        return path.to_path_buf();
    }
    let local = PathBuf::from(LOCAL_CONFIG);
    if local.exists() {
        return local;
    }
    match dirs::config_dir() {
        Some(mut path) => {
            path.push("pagemirror");
            path.push("config.yaml");
            path
        }
        None => local,
    }
}

pub fn load_config(config_path: Option<&Path>) -> Result<LoadedConfig> {
    let path = resolve_path(config_path);
    let from_file = path.exists();
    if from_file {
        info!("Loading configuration from: {}", path.display());
    } else if config_path.is_some() {
        warn!(
            "Config file not found, using defaults: {}",
            path.display()
        );
    }

    let settings = ConfigBuilder::builder()
        .add_source(File::from(path.as_path()).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to assemble configuration")?;
    let config: Config = settings
        .try_deserialize()
        .with_context(|| format!("Failed to parse configuration {}", path.display()))?;

    Ok(LoadedConfig {
        config,
        path,
        from_file,
    })
}
