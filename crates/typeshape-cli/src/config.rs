use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use typeshape_resolver::ResolverOptions;

use crate::args::CliArgs;

pub const CONFIG_FILE_NAME: &str = "typeshape.json";

/// Contents of `typeshape.json`.
///
/// Resolver tunables sit at the top level next to the driver settings:
///
/// ```json
/// { "includeVendor": false, "jobs": 4, "componentReturnTypes": ["ReactNode"] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeshapeConfig {
    #[serde(default)]
    pub include_vendor: Option<bool>,
    #[serde(default)]
    pub jobs: Option<usize>,
    #[serde(default)]
    pub pretty: Option<bool>,
    #[serde(default)]
    pub root: Option<String>,
    #[serde(flatten)]
    pub resolver: ResolverOptions,
}

pub fn parse_config(source: &str) -> Result<TypeshapeConfig> {
    let config = serde_json::from_str(source).context("failed to parse typeshape.json")?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<TypeshapeConfig> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    parse_config(&source).with_context(|| format!("failed to parse config: {}", path.display()))
}

/// `typeshape.json` in `directory`, if one exists.
pub fn find_config(directory: &Path) -> Option<PathBuf> {
    let candidate = directory.join(CONFIG_FILE_NAME);
    candidate.is_file().then_some(candidate)
}

/// Settings after merging command line flags over the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub resolver: ResolverOptions,
    pub include_vendor: bool,
    pub jobs: usize,
    pub pretty: bool,
    pub root: Option<PathBuf>,
    pub exports: Vec<String>,
}

impl Settings {
    /// Flags win over config values; a boolean flag can only switch a setting on.
    pub fn merge(args: &CliArgs, config: TypeshapeConfig) -> Self {
        Self {
            resolver: config.resolver,
            include_vendor: args.include_vendor || config.include_vendor.unwrap_or(false),
            jobs: args.jobs.or(config.jobs).unwrap_or(1).max(1),
            pretty: args.pretty || config.pretty.unwrap_or(false),
            root: args.root.clone().or_else(|| config.root.map(PathBuf::from)),
            exports: args.exports.clone(),
        }
    }
}

/// Load the config named by `--config`, or the one next to the snapshot.
pub fn load_settings(args: &CliArgs) -> Result<Settings> {
    let path = args.config.clone().or_else(|| {
        args.snapshot
            .parent()
            .and_then(|directory| find_config(directory))
    });

    let config = match path {
        Some(path) => {
            tracing::debug!(config = %path.display(), "loading config");
            load_config(&path)?
        }
        None => TypeshapeConfig::default(),
    };
    Ok(Settings::merge(args, config))
}
