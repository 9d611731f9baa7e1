use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resolver::CollisionPolicy;

/// Run settings: sheet names, artifact file names, resolver and join policy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub sheets: SheetNames,
    pub artifacts: ArtifactNames,
    pub resolver: ResolverConfig,
    pub format: FormatConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetNames {
    pub rules: String,
    pub address_lists: String,
    pub url_lists: String,
    pub services: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            rules: "security-rules".to_string(),
            address_lists: "iplist".to_string(),
            url_lists: "url_lists".to_string(),
            services: "service".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifactNames {
    pub rules: String,
    pub address_lists: String,
    pub url_lists: String,
    pub services: String,
    pub service_groups: String,
    pub applications: String,
    pub application_groups: String,
}

impl Default for ArtifactNames {
    fn default() -> Self {
        Self {
            rules: "securityrules.json".to_string(),
            address_lists: "iplist.json".to_string(),
            url_lists: "url_lists.json".to_string(),
            services: "service_input.json".to_string(),
            service_groups: "service_list_input.json".to_string(),
            applications: "application_input.json".to_string(),
            application_groups: "application_list_input.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    pub collision: CollisionPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatConfig {
    /// Separator placed between list items when a list is written to one cell.
    pub join: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            join: ", ".to_string(),
        }
    }
}

/// Errors returned when loading a config file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid config {path}: {reason}")]
    Invalid { path: String, reason: String },
}

/// Load a config from a TOML file. Missing keys take their default values.
pub fn load_config(path: &Path) -> Result<Config, ConfigLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_config(&raw, path.display().to_string())
}

/// Built-in config.
pub fn default_config() -> Config {
    let embedded = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml"));
    parse_config(embedded, "embedded config".to_string()).unwrap_or_default()
}

fn parse_config(raw: &str, path: String) -> Result<Config, ConfigLoadError> {
    let parsed: Config = toml::from_str(raw).map_err(|source| ConfigLoadError::Parse {
        path: path.clone(),
        source,
    })?;
    if parsed.format.join.trim() != "," {
        return Err(ConfigLoadError::Invalid {
            path,
            reason: format!(
                "format.join must be a comma with optional spaces, got {:?}",
                parsed.format.join
            ),
        });
    }
    Ok(parsed)
}
