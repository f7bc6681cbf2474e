use crate::cli::OutputFormat;
use crate::parser::COMBINED_FIELD_COUNT;
use crate::schema::{COMBINED_FIELDS, FieldSchema, SchemaError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid field names in config: {0}")]
    Schema(#[from] SchemaError),
    #[error("Config names {found} fields, but combined log records have {expected}")]
    FieldCount { expected: usize, found: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Free-form label for the loaded profile.
    pub profile_name: String,
    pub fields: FieldRules,
    pub output: OutputRules,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile_name: "combined".to_string(),
            fields: FieldRules::default(),
            output: OutputRules::default(),
        }
    }
}

impl AppConfig {
    /// Field schema described by `fields.names`
    pub fn schema(&self) -> Result<FieldSchema, ConfigError> {
        if self.fields.names.len() != COMBINED_FIELD_COUNT {
            return Err(ConfigError::FieldCount {
                expected: COMBINED_FIELD_COUNT,
                found: self.fields.names.len(),
            });
        }
        Ok(FieldSchema::new(self.fields.names.iter().cloned())?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldRules {
    /// Name of each record field, in record order
    pub names: Vec<String>,
}

impl Default for FieldRules {
    fn default() -> Self {
        Self {
            names: COMBINED_FIELDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputRules {
    pub separator: String,
    pub rfc3339: bool,
    pub format: OutputFormat,
}

impl Default for OutputRules {
    fn default() -> Self {
        Self {
            separator: "\t".to_string(),
            rfc3339: false,
            format: OutputFormat::Text,
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    if let Some(path) = path {
        load_config_from_path(path)
    } else {
        Ok(default_config().clone())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    let config = toml::from_str::<AppConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display,
        source,
    })?;
    log::debug!("loaded config profile '{}'", config.profile_name);
    Ok(config)
}

pub fn default_config() -> &'static AppConfig {
    static DEFAULT_CONFIG: LazyLock<AppConfig> = LazyLock::new(AppConfig::default);
    &DEFAULT_CONFIG
}
