//! File-backed config sources.
//!
//! [`parse_config_str`] picks the deserializer from the file extension
//! (YAML, JSON and TOML, each gated by a feature flag). [`load_file`] reads
//! a file asynchronously, parses it and validates the result.

use std::path::Path;

use super::model::Config;
use super::validation::validate;
use crate::error::RosterError;

/// Parse a config string based on file extension.
pub fn parse_config_str(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<Config, RosterError> {
    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yml::from_str(content).map_err(|e| RosterError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "json")]
        "json" => serde_json::from_str(content).map_err(|e| RosterError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "toml")]
        "toml" => toml::from_str(content).map_err(|e| RosterError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        other => Err(RosterError::UnsupportedFormat(other.to_string())),
    }
}

#[must_use]
pub fn extension(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("")
}

/// Read, parse and validate a config file.
pub async fn load_file(path: &Path) -> Result<Config, RosterError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RosterError::ConfigFileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            RosterError::Io(e)
        }
    })?;

    let config = parse_config_str(extension(path), &content, &path.display().to_string())?;

    if let Err(errors) = validate(&config) {
        return Err(RosterError::ConfigValidation { errors });
    }
    Ok(config)
}
