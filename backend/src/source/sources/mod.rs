//! Data source implementations.
//!
//! - `http`: files on a static web host (requires the `http-source` feature)
//! - `local`: files in a local directory
//! - `memory`: in-memory files for tests and local development
#[cfg(feature = "http-source")]
pub mod http;
pub mod local;
pub mod memory;

#[cfg(feature = "http-source")]
pub use http::HttpSource;
pub use local::LocalSource;
pub use memory::MemorySource;
