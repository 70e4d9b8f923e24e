//! Engine configuration, persisted as TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::vsa::Dimension;
use crate::vsa::bundler::DEFAULT_BUNDLE_SEED;

/// Threshold `HoloGraph::ask` decodes with.
///
/// Sits below the 0.5 orthogonality baseline so answers survive the
/// cross-talk of many superposed facts.
pub const DEFAULT_ASK_THRESHOLD: f32 = 0.45;

/// Name of the config file kept inside a data directory.
pub const CONFIG_FILE: &str = "holokg.toml";

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Configuration for a [`HoloGraph`](crate::graph::HoloGraph) and its store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoloConfig {
    /// Hypervector dimension.
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    /// Decode threshold for answers (strict `>`).
    #[serde(default = "default_ask_threshold")]
    pub ask_threshold: f32,
    /// Seed for the hologram's bundling RNG.
    #[serde(default = "default_bundle_seed")]
    pub bundle_seed: u64,
    /// Data directory for persistence. `None` for memory-only use.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_dimension() -> usize {
    Dimension::DEFAULT.0
}
fn default_ask_threshold() -> f32 {
    DEFAULT_ASK_THRESHOLD
}
fn default_bundle_seed() -> u64 {
    DEFAULT_BUNDLE_SEED
}

impl Default for HoloConfig {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
            ask_threshold: default_ask_threshold(),
            bundle_seed: default_bundle_seed(),
            data_dir: None,
        }
    }
}

impl HoloConfig {
    /// The configured dimension as a [`Dimension`].
    pub fn dim(&self) -> Dimension {
        Dimension(self.dimension)
    }

    /// Check value ranges.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.dimension == 0 {
            return Err(ConfigError::Invalid {
                message: "dimension must be > 0".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.ask_threshold) {
            return Err(ConfigError::Invalid {
                message: format!("ask_threshold {} is outside [0, 1]", self.ask_threshold),
            });
        }
        Ok(())
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Find the configuration for `data_dir`.
    ///
    /// An explicit `path` wins. Otherwise `<data_dir>/holokg.toml` is loaded
    /// if it exists, and defaults are used if it doesn't.
    pub fn discover(path: Option<&Path>, data_dir: &Path) -> ConfigResult<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let local = data_dir.join(CONFIG_FILE);
        if local.is_file() {
            tracing::debug!(path = %local.display(), "using data directory config");
            Self::load(&local)
        } else {
            Ok(Self::default())
        }
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}
