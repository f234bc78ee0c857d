//! Pipeline configuration file and environment support.
//!
//! Settings are read from `herdwatch.toml` (if present) and then overridden by
//! `HERDWATCH_*` environment variables.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::models::{LayerCatalogue, LayerId, TileSources, TimeKey};

/// Smallest and largest fraction of the fitted box added on each side.
pub const MIN_FIT_PADDING: f64 = 0.15;
pub const MAX_FIT_PADDING: f64 = 0.20;

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    Read { path: String, message: String },
    #[error("Failed to parse config: {0}")]
    Parse(String),
    #[error("Invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}

/// How layer files are laid out below the data root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    /// `root/<time key>/<file>`, with date navigation.
    #[default]
    Dated,
    /// `root/latest/<file>`, no navigation.
    Latest,
}

impl FromStr for DataMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dated" | "temporal" | "weekly" => Ok(Self::Dated),
            "latest" => Ok(Self::Latest),
            _ => Err(format!("Unknown data mode: {}", s)),
        }
    }
}

/// Complete configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub layers: LayerCatalogue,
    #[serde(default)]
    pub tiles: TileSources,
    #[serde(default)]
    pub server: ServerSettings,
}

/// Where published files come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    /// `http`, `local` or `memory`; inferred from `root` when absent.
    #[serde(rename = "type", default)]
    pub source_type: Option<String>,
    #[serde(default = "default_root")]
    pub root: String,
    /// Per-request timeout. Unset means requests are never cut off.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Behaviour of the refresh pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    #[serde(default)]
    pub mode: DataMode,
    /// Fade layers shown after the base date.
    #[serde(default = "default_true")]
    pub fade: bool,
    #[serde(default = "default_fit_padding")]
    pub fit_padding: f64,
    /// Fetch enabled layers concurrently instead of one after another.
    #[serde(default)]
    pub parallel_fetch: bool,
    /// Fixed date keys; when empty the keys come from `index.json`.
    #[serde(default)]
    pub dates: Vec<TimeKey>,
    #[serde(default = "default_layers")]
    pub default_layers: Vec<LayerId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_root() -> String {
    "data".to_string()
}

fn default_true() -> bool {
    true
}

fn default_fit_padding() -> f64 {
    MIN_FIT_PADDING
}

fn default_layers() -> Vec<LayerId> {
    ["presence", "hotspots"]
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            source_type: None,
            root: default_root(),
            timeout_secs: None,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            mode: DataMode::default(),
            fade: true,
            fit_padding: default_fit_padding(),
            parallel_fetch: false,
            dates: Vec::new(),
            default_layers: default_layers(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl PipelineSettings {
    /// Whether date navigation (and the index document) is in play.
    pub fn temporal_navigation(&self) -> bool {
        self.mode == DataMode::Dated
    }

    /// Whether the lead-time fade multiplier applies.
    pub fn fade_enabled(&self) -> bool {
        self.fade && self.temporal_navigation()
    }
}

impl FromStr for PipelineConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        content.parse()
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `herdwatch.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    ///
    /// Returns `Ok(None)` when no file exists.
    pub fn from_default_location() -> Result<Option<Self>, ConfigError> {
        let search_paths = [
            PathBuf::from("herdwatch.toml"),
            PathBuf::from("backend/herdwatch.toml"),
            PathBuf::from("../herdwatch.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path).map(Some);
            }
        }
        Ok(None)
    }

    /// File (or defaults) plus environment overrides, validated.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_default_location()?.unwrap_or_default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides.
    ///
    /// # Environment Variables
    /// - `HERDWATCH_SOURCE`: `http` | `local` | `memory`
    /// - `HERDWATCH_DATA_ROOT`: base URL or directory of the published data
    /// - `HERDWATCH_MODE`: `dated` | `latest`
    /// - `HERDWATCH_TEMPORAL`: `true` selects `dated`, `false` selects `latest`
    /// - `HERDWATCH_FADE`: `true` | `false`
    /// - `HERDWATCH_TIMEOUT_SECS`: per-request timeout in seconds
    /// - `HOST`, `PORT`: server bind address
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = env::var("HERDWATCH_SOURCE") {
            value.parse::<super::factory::SourceType>().map_err(|message| ConfigError::Invalid {
                key: "HERDWATCH_SOURCE".to_string(),
                message,
            })?;
            self.source.source_type = Some(value);
        }
        if let Ok(value) = env::var("HERDWATCH_DATA_ROOT") {
            self.source.root = value;
        }
        if let Ok(value) = env::var("HERDWATCH_MODE") {
            self.pipeline.mode = value.parse().map_err(|message| ConfigError::Invalid {
                key: "HERDWATCH_MODE".to_string(),
                message,
            })?;
        }
        if let Ok(value) = env::var("HERDWATCH_TEMPORAL") {
            self.pipeline.mode = if parse_env::<bool>("HERDWATCH_TEMPORAL", &value)? {
                DataMode::Dated
            } else {
                DataMode::Latest
            };
        }
        if let Ok(value) = env::var("HERDWATCH_FADE") {
            self.pipeline.fade = parse_env("HERDWATCH_FADE", &value)?;
        }
        if let Ok(value) = env::var("HERDWATCH_TIMEOUT_SECS") {
            self.source.timeout_secs = Some(parse_env("HERDWATCH_TIMEOUT_SECS", &value)?);
        }
        if let Ok(value) = env::var("HOST") {
            self.server.host = value;
        }
        if let Ok(value) = env::var("PORT") {
            self.server.port = parse_env("PORT", &value)?;
        }
        Ok(())
    }

    /// Check cross-field constraints and normalize padding into range.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.source.root.trim().is_empty() && self.source.source_type.as_deref() != Some("memory") {
            return Err(ConfigError::Invalid {
                key: "source.root".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if !self.pipeline.fit_padding.is_finite() {
            return Err(ConfigError::Invalid {
                key: "pipeline.fit_padding".to_string(),
                message: "must be a number".to_string(),
            });
        }
        self.pipeline.fit_padding = self
            .pipeline
            .fit_padding
            .clamp(MIN_FIT_PADDING, MAX_FIT_PADDING);

        if let Some(unknown) = self
            .pipeline
            .default_layers
            .iter()
            .find(|id| self.layers.get(id).is_none())
        {
            return Err(ConfigError::Invalid {
                key: "pipeline.default_layers".to_string(),
                message: format!("unknown layer '{}'", unknown),
            });
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key: key.to_string(),
        message: format!("cannot parse '{}'", value),
    })
}
