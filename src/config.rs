//! TOML configuration file support for power users.
//!
//! Instead of passing many CLI flags, users can specify settings in a
//! config file:
//!
//! ```toml
//! # recovlit.toml
//! [analysis]
//! cutoff = 85.0
//! window = [10.0, 200.0]
//! bin_edges = [0.1, 1.0, 10.0, 50.0, 100.0, 200.0, 800.0]
//!
//! [output]
//! compression_level = 9
//! row_group_size = 200000
//! ```
//!
//! CLI flags take precedence over config-file values, which take
//! precedence over the built-in defaults.

use std::path::Path;

use serde::Deserialize;

/// Errors loading or parsing a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Could not read the config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that could not be read.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Config file contents are not valid TOML for this schema.
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Root configuration structure for recovlit.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Analysis thresholds and bin edges.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Output file settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Configuration for the analysis stages.
#[derive(Debug, Default, Deserialize)]
pub struct AnalysisConfig {
    /// Pass/alert cutoff on recovery percent.
    pub cutoff: Option<f64>,

    /// Closed tolerance window `[low, high]` in µg/mL.
    pub window: Option<[f64; 2]>,

    /// Concentration bin edges in µg/mL, strictly increasing.
    pub bin_edges: Option<Vec<f64>>,
}

/// Configuration for Parquet output.
#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    /// ZSTD compression level (1-22).
    pub compression_level: Option<i32>,

    /// Number of rows per Parquet row group.
    pub row_group_size: Option<usize>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}
