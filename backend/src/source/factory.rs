//! Source factory for dependency injection.
//!
//! Creates the configured `DataSource` at startup.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use super::config::SourceSettings;
use super::data_source::DataSource;
use super::error::{FetchError, FetchResult};
use super::sources::{LocalSource, MemorySource};

/// Source type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    /// Static web host
    Http,
    /// Local directory
    Local,
    /// In-memory files
    Memory,
}

impl FromStr for SourceType {
    type Err = String;

    /// Parse source type from string ("http", "local", "memory").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "http" | "https" | "web" => Ok(Self::Http),
            "local" | "fs" | "file" => Ok(Self::Local),
            "memory" | "mem" => Ok(Self::Memory),
            _ => Err(format!("Unknown source type: {}", s)),
        }
    }
}

impl SourceType {
    /// Guess the source type from the shape of a data root.
    pub fn infer(root: &str) -> Self {
        if root.starts_with("http://") || root.starts_with("https://") {
            Self::Http
        } else {
            Self::Local
        }
    }

    /// Whether files can be published into this source from outside the
    /// process. An in-memory source starts empty and is only filled by code.
    pub fn is_externally_published(&self) -> bool {
        !matches!(self, Self::Memory)
    }
}

/// Factory for creating source instances.
pub struct SourceFactory;

impl SourceFactory {
    /// Create a source from settings.
    ///
    /// # Returns
    /// * `Ok(Arc<dyn DataSource>)` - Source instance
    /// * `Err(FetchError::Configuration)` - Unknown type, bad root, or disabled feature
    pub fn create(settings: &SourceSettings) -> FetchResult<Arc<dyn DataSource>> {
        let source_type = match settings.source_type.as_deref() {
            Some(s) => s.parse().map_err(FetchError::configuration)?,
            None => SourceType::infer(&settings.root),
        };
        let timeout = settings.timeout_secs.map(Duration::from_secs);

        match source_type {
            SourceType::Http => Self::create_http(&settings.root, timeout),
            SourceType::Local => Ok(Arc::new(LocalSource::new(&settings.root))),
            SourceType::Memory => Ok(Arc::new(MemorySource::new())),
        }
    }

    #[cfg(feature = "http-source")]
    fn create_http(root: &str, timeout: Option<Duration>) -> FetchResult<Arc<dyn DataSource>> {
        let source = super::sources::HttpSource::new(root, timeout)?;
        Ok(Arc::new(source))
    }

    #[cfg(not(feature = "http-source"))]
    fn create_http(_root: &str, _timeout: Option<Duration>) -> FetchResult<Arc<dyn DataSource>> {
        Err(FetchError::configuration("HTTP source feature not enabled"))
    }
}
