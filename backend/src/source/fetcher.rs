//! Layer fetcher: maps (time key, layer) to a published file and loads it.
//!
//! Fetching never fails outright. Missing files, HTTP errors, unreadable JSON
//! and wrong document shapes all come back as [`FetchOutcome::Missing`] with
//! the location that was tried.

use log::{debug, warn};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use super::checksum::calculate_revision;
use super::config::DataMode;
use super::data_source::DataSource;
use super::error::{FetchError, FetchResult};
use crate::models::{FeatureCollection, HistogramDocument, IndexDocument, LayerDescriptor, MetaDocument, TimeKey};

/// Folder holding the most recent publish.
pub const LATEST_FOLDER: &str = "latest";
pub const INDEX_FILE: &str = "index.json";
pub const META_FILE: &str = "meta.json";
pub const HISTOGRAM_FILE: &str = "ndvi_hist.json";

/// Result of a fetch that never raises.
#[derive(Debug, Clone)]
pub enum FetchOutcome<T> {
    Loaded {
        data: T,
        location: String,
        /// SHA-256 of the raw payload.
        revision: String,
    },
    Missing {
        location: String,
        error: FetchError,
    },
}

impl<T> FetchOutcome<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }

    /// Location that was read or attempted.
    pub fn location(&self) -> &str {
        match self {
            Self::Loaded { location, .. } | Self::Missing { location, .. } => location,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Loaded { data, .. } => Some(data),
            Self::Missing { .. } => None,
        }
    }

    pub fn into_result(self) -> FetchResult<T> {
        match self {
            Self::Loaded { data, .. } => Ok(data),
            Self::Missing { error, .. } => Err(error),
        }
    }
}

/// Loads layer files and auxiliary documents from a [`DataSource`].
#[derive(Debug, Clone)]
pub struct LayerFetcher {
    source: Arc<dyn DataSource>,
    mode: DataMode,
}

impl LayerFetcher {
    pub fn new(source: Arc<dyn DataSource>, mode: DataMode) -> Self {
        Self { source, mode }
    }

    pub fn source(&self) -> &Arc<dyn DataSource> {
        &self.source
    }

    pub fn mode(&self) -> DataMode {
        self.mode
    }

    /// Relative path of `file` for `key`: `<key>/<file>` or `latest/<file>`.
    pub fn location_for(&self, key: Option<&TimeKey>, file: &str) -> FetchResult<String> {
        let folder = match self.mode {
            DataMode::Latest => LATEST_FOLDER,
            DataMode::Dated => {
                let key = key.ok_or_else(|| FetchError::invalid_location("no time key selected"))?;
                validate_segment(key.as_str())?;
                key.as_str()
            }
        };
        validate_segment(file)?;
        Ok(format!("{}/{}", folder, file))
    }

    /// Fetch and decode one layer's feature collection.
    pub async fn fetch_layer(
        &self,
        key: Option<&TimeKey>,
        layer: &LayerDescriptor,
    ) -> FetchOutcome<FeatureCollection> {
        let outcome = match self.location_for(key, &layer.file) {
            Ok(path) => self.fetch_document(&path, "fetch_layer").await,
            Err(error) => FetchOutcome::Missing {
                location: layer.file.clone(),
                error: error.with_operation("fetch_layer"),
            },
        };

        match outcome {
            FetchOutcome::Missing { location, error } => {
                let error = error.with_layer(&layer.id);
                warn!("Layer {} missing at {}: {}", layer.id, location, error.message());
                FetchOutcome::Missing { location, error }
            }
            loaded => loaded,
        }
    }

    /// Fetch the per-folder freshness document.
    pub async fn fetch_meta(&self, key: Option<&TimeKey>) -> FetchOutcome<MetaDocument> {
        match self.location_for(key, META_FILE) {
            Ok(path) => self.fetch_document(&path, "fetch_meta").await,
            Err(error) => FetchOutcome::Missing {
                location: META_FILE.to_string(),
                error,
            },
        }
    }

    /// Fetch the NDVI histogram document (unvalidated).
    pub async fn fetch_histogram(&self, key: Option<&TimeKey>) -> FetchOutcome<HistogramDocument> {
        match self.location_for(key, HISTOGRAM_FILE) {
            Ok(path) => self.fetch_document(&path, "fetch_histogram").await,
            Err(error) => FetchOutcome::Missing {
                location: HISTOGRAM_FILE.to_string(),
                error,
            },
        }
    }

    /// Fetch the top-level `index.json`.
    pub async fn fetch_index(&self) -> FetchOutcome<IndexDocument> {
        self.fetch_document(INDEX_FILE, "fetch_index").await
    }

    /// Read `path` and decode it as `T`.
    ///
    /// Invalid JSON is a parse error; valid JSON of the wrong shape is a format error.
    pub async fn fetch_document<T: DeserializeOwned>(&self, path: &str, operation: &str) -> FetchOutcome<T> {
        let location = self.source.locate(path);

        let bytes = match self.source.read(path).await {
            Ok(bytes) => bytes,
            Err(error) => {
                return FetchOutcome::Missing {
                    location,
                    error: error.with_operation(operation),
                }
            }
        };

        let decoded = serde_json::from_slice::<serde_json::Value>(&bytes)
            .map_err(|e| FetchError::parse(e.to_string()))
            .and_then(|value| {
                serde_json::from_value::<T>(value).map_err(|e| FetchError::format(e.to_string()))
            });

        match decoded {
            Ok(data) => {
                debug!("Loaded {} ({} bytes)", location, bytes.len());
                FetchOutcome::Loaded {
                    data,
                    revision: calculate_revision(&bytes),
                    location,
                }
            }
            Err(error) => FetchOutcome::Missing {
                error: error.with_operation(operation).with_location(location.clone()),
                location,
            },
        }
    }
}

/// Reject anything that could escape the data root.
fn validate_segment(segment: &str) -> FetchResult<()> {
    let bad = segment.is_empty()
        || segment.starts_with('.')
        || segment.contains('/')
        || segment.contains('\\')
        || segment.chars().any(char::is_control);
    if bad {
        return Err(FetchError::invalid_location(format!("unsafe path segment '{}'", segment)));
    }
    Ok(())
}
