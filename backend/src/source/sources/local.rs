//! Local-directory source, for a checked-out copy of the published data tree.

use async_trait::async_trait;
use log::debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::source::data_source::DataSource;
use crate::source::error::{FetchError, FetchResult};
use crate::source::factory::SourceType;

/// Reads files below a root directory.
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }
}

#[async_trait]
impl DataSource for LocalSource {
    async fn read(&self, path: &str) -> FetchResult<Vec<u8>> {
        let full = self.resolve(path);
        debug!("read {}", full.display());
        tokio::fs::read(&full).await.map_err(|e| {
            let location = full.display().to_string();
            match e.kind() {
                ErrorKind::NotFound => FetchError::not_found("no file published").with_location(location),
                _ => FetchError::transport(e.to_string()).with_location(location),
            }
        })
    }

    fn locate(&self, path: &str) -> String {
        self.resolve(path).display().to_string()
    }

    fn source_type(&self) -> SourceType {
        SourceType::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_published_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("latest")).unwrap();
        std::fs::write(dir.path().join("latest/meta.json"), br#"{"updated": "x"}"#).unwrap();

        let source = LocalSource::new(dir.path());
        let bytes = source.read("latest/meta.json").await.unwrap();
        assert_eq!(bytes, br#"{"updated": "x"}"#);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalSource::new(dir.path());
        let err = source.read("2026-01-01/hotspots.geojson").await.unwrap_err();
        assert!(matches!(err, FetchError::NotFound { .. }));
        let location = err.context().location.clone().unwrap();
        assert!(location.ends_with("hotspots.geojson"));
    }

    #[tokio::test]
    async fn test_reading_directory_is_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("latest")).unwrap();
        let source = LocalSource::new(dir.path());
        let err = source.read("latest").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }

    #[test]
    fn test_locate_joins_segments() {
        let source = LocalSource::new("/srv/data");
        assert_eq!(
            source.locate("2026-01-01/presence.geojson"),
            PathBuf::from("/srv/data/2026-01-01/presence.geojson").display().to_string()
        );
    }
}
