//! HTTP(S) source for files published on a static host.

use async_trait::async_trait;
use log::debug;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::StatusCode;
use std::time::Duration;

use crate::source::data_source::DataSource;
use crate::source::error::{FetchError, FetchResult};
use crate::source::factory::SourceType;

/// Fetches files below a base URL.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    root: String,
}

impl HttpSource {
    /// Create a source rooted at `root` (e.g. `https://host/data`).
    ///
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(root: impl Into<String>, timeout: Option<Duration>) -> FetchResult<Self> {
        let root = root.into();
        if !(root.starts_with("http://") || root.starts_with("https://")) {
            return Err(FetchError::configuration(format!(
                "HTTP data root must start with http:// or https://, got '{}'",
                root
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            root: root.trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &str {
        &self.root
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn read(&self, path: &str) -> FetchResult<Vec<u8>> {
        let url = self.locate(path);
        debug!("GET {}", url);

        // Cache-busting query plus no-cache headers: intermediaries must not
        // hand back a copy older than the last publish.
        let response = self
            .client
            .get(&url)
            .header(CACHE_CONTROL, "no-cache, no-store, max-age=0")
            .header(PRAGMA, "no-cache")
            .query(&[("_", chrono::Utc::now().timestamp_millis())])
            .send()
            .await
            .map_err(|e| FetchError::transport(e.to_string()).with_location(url.clone()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::not_found("no file published").with_location(url));
        }
        if !status.is_success() {
            return Err(FetchError::http_status(
                status.as_u16(),
                status.canonical_reason().unwrap_or("request failed"),
            )
            .with_location(url));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::transport(format!("Failed to read body: {}", e)).with_location(url))?;
        Ok(body.to_vec())
    }

    fn locate(&self, path: &str) -> String {
        format!("{}/{}", self.root, path.trim_start_matches('/'))
    }

    fn source_type(&self) -> SourceType {
        SourceType::Http
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_http_root() {
        let err = HttpSource::new("ftp://example.org/data", None).unwrap_err();
        assert!(matches!(err, FetchError::Configuration { .. }));
    }

    #[test]
    fn test_locate_joins_paths() {
        let source = HttpSource::new("https://example.org/data/", None).unwrap();
        assert_eq!(source.root(), "https://example.org/data");
        assert_eq!(
            source.locate("2026-01-01/presence.geojson"),
            "https://example.org/data/2026-01-01/presence.geojson"
        );
        assert_eq!(source.locate("/index.json"), "https://example.org/data/index.json");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let source =
            HttpSource::new("http://127.0.0.1:9", Some(Duration::from_millis(500))).unwrap();
        let err = source.read("index.json").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
        assert_eq!(
            err.context().location.as_deref(),
            Some("http://127.0.0.1:9/index.json")
        );
    }
}
