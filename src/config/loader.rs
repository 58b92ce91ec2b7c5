//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ConfigMap;
use crate::config::validation::{validate_config, ValidationError};

/// File name looked up in every search directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// System-wide config directory, checked first.
pub const SYSTEM_CONFIG_DIR: &str = "/etc/dcp-web";

/// Directory under `$HOME`, checked second.
pub const HOME_CONFIG_DIR: &str = "dcp-web";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("the config file was not found in any of the valid locations: {}", display_paths(.0))]
    NotFound(Vec<PathBuf>),

    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file {path:?} is not valid YAML: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("validation failed: {}", display_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Candidate config locations in lookup order.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![Path::new(SYSTEM_CONFIG_DIR).join(CONFIG_FILE_NAME)];
    if let Some(home) = std::env::var_os("HOME") {
        paths.push(PathBuf::from(home).join(HOME_CONFIG_DIR).join(CONFIG_FILE_NAME));
    }
    paths.push(PathBuf::from(".").join(CONFIG_FILE_NAME));
    paths
}

/// Return the first candidate that exists on disk.
pub fn locate_config(candidates: &[PathBuf]) -> Result<PathBuf, ConfigError> {
    candidates
        .iter()
        .find(|p| p.is_file())
        .cloned()
        .ok_or_else(|| ConfigError::NotFound(candidates.to_vec()))
}

/// Parse and validate configuration from YAML text.
pub fn parse_config(path: &Path, content: &str) -> Result<ConfigMap, ConfigError> {
    let config: ConfigMap = serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load and validate configuration from a YAML file.
pub fn load_config(path: &Path) -> Result<ConfigMap, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(path, &content)
}

/// Locate the config file on the standard search path and load it.
///
/// Returns the path that was used so the caller can watch it.
pub fn read_environment_file() -> Result<(PathBuf, ConfigMap), ConfigError> {
    tracing::info!("reading environment file");
    let path = locate_config(&search_paths())?;
    let config = load_config(&path)?;
    tracing::info!(path = %path.display(), "configuration loaded");
    Ok((path, config))
}
