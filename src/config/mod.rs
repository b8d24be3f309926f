//! Configuration loading and validation.
//!
//! [`load`] resolves the config file (explicit path, then auto-detection in
//! the working directory) and falls back to built-in defaults when no file
//! exists. Submodules provide the data model, the format-specific
//! parsers, and validation.

pub mod model;
pub mod sources;
pub mod validation;

use std::path::{Path, PathBuf};

use crate::error::RosterError;
use model::Config;

/// File names tried, in order, when no `--config` is given.
pub const CANDIDATES: &[&str] = &["roster.yaml", "roster.yml", "roster.json", "roster.toml"];

#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    /// Path the config came from, or `"defaults"`.
    pub source_name: String,
}

pub async fn load(explicit: Option<&Path>) -> Result<LoadedConfig, RosterError> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => discover(Path::new(".")).await,
    };

    let Some(path) = path else {
        tracing::info!("no config file found, using defaults");
        return Ok(LoadedConfig {
            config: Config::default(),
            source_name: "defaults".to_string(),
        });
    };

    let config = sources::load_file(&path).await?;
    Ok(LoadedConfig {
        config,
        source_name: path.display().to_string(),
    })
}

/// Auto-detect a config file in `dir`.
pub async fn discover(dir: &Path) -> Option<PathBuf> {
    for name in CANDIDATES {
        let path = dir.join(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(path = %path.display(), "auto-detected config file");
            return Some(path);
        }
    }
    None
}
