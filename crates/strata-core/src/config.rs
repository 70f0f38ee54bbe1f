use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use strata_util::errors::StrataError;

/// Global user configuration loaded from `~/.strata/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub index: IndexConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Beam search settings from `[resolver]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "default_beam_width", rename = "beam-width")]
    pub beam_width: usize,
    /// Maximum number of finished stacks to report.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            beam_width: default_beam_width(),
            limit: default_limit(),
        }
    }
}

fn default_beam_width() -> usize {
    5000
}

fn default_limit() -> usize {
    10
}

/// Stack generation settings from `[generator]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Chance that the `sampling` decision function keeps deepening a path.
    #[serde(default = "default_sampling_probability", rename = "sampling-probability")]
    pub sampling_probability: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sampling_probability: default_sampling_probability(),
        }
    }
}

fn default_sampling_probability() -> f64 {
    0.5
}

/// Package index settings from `[index]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Base URL of a warehouse JSON API used to fill artifact digests.
    #[serde(default)]
    pub warehouse: Option<String>,
    /// Default catalog file used when no `--catalog` is given.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
}

/// Explicitly configured pipeline units from `[[pipeline.units]]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub units: Vec<UnitEntry>,
}

/// A unit requested by name, with its raw (unvalidated) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitEntry {
    pub name: String,
    #[serde(default)]
    pub configuration: toml::Table,
}

impl GlobalConfig {
    /// Load the global configuration, or return defaults if the file doesn't exist.
    pub fn load() -> miette::Result<Self> {
        Self::load_from(&Self::default_path())
    }

    pub fn load_from(path: &Path) -> miette::Result<Self> {
        if !path.is_file() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| StrataError::Configuration {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        toml::from_str(&content).map_err(|e| {
            StrataError::Configuration {
                message: format!("Failed to parse {}: {e}", path.display()),
            }
            .into()
        })
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the path to the strata data directory (`~/.strata/`).
pub fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".strata")
}
