//! In-memory source implementation.
//!
//! Stores published files in a `HashMap` keyed by relative path. Used by unit
//! and integration tests, and for local development without a data host.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::source::data_source::DataSource;
use crate::source::error::{FetchError, FetchResult};
use crate::source::factory::SourceType;

/// In-memory source.
///
/// # Example
/// ```
/// use herdwatch::source::MemorySource;
///
/// let source = MemorySource::new();
/// source.insert_json("index.json", &serde_json::json!({"dates": ["2026-01-01"]}));
/// assert!(source.contains("index.json"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    data: Arc<RwLock<MemoryData>>,
}

#[derive(Debug, Default)]
struct MemoryData {
    files: HashMap<String, Vec<u8>>,
    failures: HashMap<String, FetchError>,
    delays: HashMap<String, Duration>,
    reads: HashMap<String, usize>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish (or overwrite) raw bytes at `path`.
    pub fn insert(&self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.data.write().files.insert(path.into(), bytes.into());
    }

    /// Publish a JSON document at `path`.
    pub fn insert_json(&self, path: impl Into<String>, value: &serde_json::Value) {
        self.insert(path, value.to_string().into_bytes());
    }

    pub fn remove(&self, path: &str) {
        self.data.write().files.remove(path);
    }

    pub fn contains(&self, path: &str) -> bool {
        self.data.read().files.contains_key(path)
    }

    /// Make every read of `path` fail with `error`.
    pub fn fail(&self, path: impl Into<String>, error: FetchError) {
        self.data.write().failures.insert(path.into(), error);
    }

    /// Delay every read of `path`.
    pub fn delay(&self, path: impl Into<String>, delay: Duration) {
        self.data.write().delays.insert(path.into(), delay);
    }

    /// How many times `path` has been read.
    pub fn read_count(&self, path: &str) -> usize {
        self.data.read().reads.get(path).copied().unwrap_or(0)
    }
}

#[async_trait]
impl DataSource for MemorySource {
    async fn read(&self, path: &str) -> FetchResult<Vec<u8>> {
        let delay = {
            let mut data = self.data.write();
            *data.reads.entry(path.to_string()).or_insert(0) += 1;
            data.delays.get(path).copied()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let data = self.data.read();
        if let Some(error) = data.failures.get(path) {
            return Err(error.clone().with_location(self.locate(path)));
        }
        data.files
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::not_found("no file published").with_location(self.locate(path)))
    }

    fn locate(&self, path: &str) -> String {
        format!("memory://{}", path.trim_start_matches('/'))
    }

    fn source_type(&self) -> SourceType {
        SourceType::Memory
    }
}
