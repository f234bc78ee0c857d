//! # Herdwatch Backend
//!
//! Temporal layer pipeline for the herd-monitoring map.
//!
//! Producer jobs publish GeoJSON overlays, an NDVI histogram and freshness
//! metadata into dated folders. This crate resolves which dates exist, loads
//! the enabled overlays for the active date, styles every feature, keeps the
//! map free of stale or duplicate overlays, and serves the composed scene to
//! the browser over HTTP.
//!
//! ## Features
//!
//! - **Time Index**: sorted date/week keys with prev/next navigation and lead time
//! - **Fetching**: HTTP, local directory and in-memory sources; failures become
//!   reported "missing" layers, never errors
//! - **Styling**: intensity ramps, line weights, detection markers, lead-time fade
//! - **Compositing**: clear-then-add refresh cycles guarded by generation tickets
//! - **Histogram**: validated NDVI histogram chart data
//! - **HTTP API**: RESTful endpoints for the map front-end
//!
//! ## Architecture
//!
//! - [`api`]: Public type surface
//! - [`models`]: Time keys, layer catalogue, GeoJSON subset, published documents
//! - [`source`]: Data sources, fetcher, configuration and errors
//! - [`services`]: Pipeline controller and its components
//! - [`http`]: Axum-based HTTP server and request handlers

pub mod api;

pub mod models;
pub mod services;
pub mod source;

#[cfg(feature = "http-server")]
pub mod http;
