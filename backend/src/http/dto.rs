//! Data Transfer Objects for the HTTP API.
//!
//! Pipeline types that already derive `Serialize` are re-exported as-is.

use serde::{Deserialize, Serialize};

pub use crate::services::{
    CommitSummary, HistogramBar, HistogramChart, MissingLayer, NavigationState, RefreshStatus, Scene,
};

use crate::models::{LayerDescriptor, LayerId, OverlayOpacity, TileSources, TimeKey};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Where layer files are read from
    pub source: String,
    /// `ready`, `unavailable`, or `disabled` without temporal navigation
    pub time_index: String,
}

/// Everything the client needs to build its controls.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigResponse {
    pub tiles: TileSources,
    pub layers: Vec<LayerDescriptor>,
    pub default_layers: Vec<LayerId>,
    pub opacity: OpacityResponse,
    pub temporal_navigation: bool,
    pub fade: bool,
}

/// Request body for `POST /v1/dates/select`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectDateRequest {
    pub key: TimeKey,
}

/// Request body for `POST /v1/dates/step`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRequest {
    /// `prev` or `next`
    pub direction: String,
}

/// Request body for `POST /v1/refresh`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshRequest {
    /// Enabled layers; the configured defaults when absent.
    #[serde(default)]
    pub layers: Option<Vec<LayerId>>,
}

/// Outcome of a refresh plus the scene to draw.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    pub message: String,
    pub status: RefreshStatus,
    pub committed: Option<CommitSummary>,
    pub tracked: Vec<LayerId>,
    pub scene: Scene,
}

/// Request body for `PUT /v1/opacity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpacityRequest {
    pub percent: i64,
}

/// NDVI overlay opacity as the slider shows it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpacityResponse {
    pub percent: u8,
    pub fraction: f64,
    pub label: String,
}

impl From<OverlayOpacity> for OpacityResponse {
    fn from(opacity: OverlayOpacity) -> Self {
        Self {
            percent: opacity.percent(),
            fraction: opacity.fraction(),
            label: opacity.label(),
        }
    }
}
