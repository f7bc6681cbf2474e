use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How matching records are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Selected fields separated by the configured separator
    #[default]
    Text,
    /// One JSON object per line, keyed by field name
    Json,
}
