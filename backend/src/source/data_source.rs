//! Abstract interface over where published layer files live.

use async_trait::async_trait;
use std::fmt;

use super::error::FetchResult;
use super::factory::SourceType;

/// Read-only access to a tree of published files.
///
/// Paths are relative to the data root and use `/` separators, e.g.
/// `2026-01-08/presence.geojson` or `index.json`.
#[async_trait]
pub trait DataSource: Send + Sync + fmt::Debug {
    /// Read the raw bytes published at `path`.
    ///
    /// Implementations must not serve cached copies: producers overwrite files in
    /// place and every call has to observe the latest published version.
    async fn read(&self, path: &str) -> FetchResult<Vec<u8>>;

    /// Where `path` resolves to, for diagnostics (URL or filesystem path).
    fn locate(&self, path: &str) -> String;

    /// Which backend this is.
    fn source_type(&self) -> SourceType;
}
