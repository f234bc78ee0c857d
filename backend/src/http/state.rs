//! Application state for the HTTP server.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::models::OverlayOpacity;
use crate::services::{MapController, SceneMap};
use crate::source::PipelineConfig;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Owner of the time index and the composed scene
    pub controller: Arc<MapController<SceneMap>>,
    /// Loaded configuration, served to the client as-is
    pub config: Arc<PipelineConfig>,
    /// Current NDVI overlay opacity
    pub opacity: Arc<RwLock<OverlayOpacity>>,
}

impl AppState {
    pub fn new(controller: Arc<MapController<SceneMap>>, config: Arc<PipelineConfig>) -> Self {
        let opacity = config.tiles.ndvi.opacity;
        Self {
            controller,
            config,
            opacity: Arc::new(RwLock::new(opacity)),
        }
    }
}
