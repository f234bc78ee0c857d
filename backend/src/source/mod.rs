//! Access to published layer data.
//!
//! Layer files are produced elsewhere and published as a static tree:
//!
//! ```text
//! <root>/index.json                  {"dates": [...], "latest": "..."}
//! <root>/<time key>/presence.geojson
//! <root>/<time key>/hotspots.geojson
//! <root>/<time key>/meta.json
//! <root>/<time key>/ndvi_hist.json
//! <root>/latest/...                  same files, most recent publish
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Services (pipeline controller, compositor, histogram)  │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  LayerFetcher - location rules, JSON decoding,          │
//! │  never-failing FetchOutcome                             │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  DataSource trait                                       │
//! │  - HttpSource (static host, no caching)                 │
//! │  - LocalSource (directory)                              │
//! │  - MemorySource (tests, development)                    │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod checksum;
pub mod config;
pub mod data_source;
pub mod error;
pub mod factory;
pub mod fetcher;
pub mod sources;

pub use checksum::calculate_revision;
pub use config::{ConfigError, DataMode, PipelineConfig, PipelineSettings, ServerSettings, SourceSettings};
pub use data_source::DataSource;
pub use error::{ErrorContext, FetchError, FetchResult};
pub use factory::{SourceFactory, SourceType};
pub use fetcher::{FetchOutcome, LayerFetcher};
#[cfg(feature = "http-source")]
pub use sources::HttpSource;
pub use sources::{LocalSource, MemorySource};
