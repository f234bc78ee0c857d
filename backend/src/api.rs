//! Public API surface.
//!
//! This file consolidates the types a front-end or embedding application
//! works with. All data types derive Serialize for JSON responses.

pub use crate::models::BoundingBox;
pub use crate::models::Feature;
pub use crate::models::FeatureCollection;
pub use crate::models::GeometryKind;
pub use crate::models::HistogramDocument;
pub use crate::models::IndexDocument;
pub use crate::models::LayerCatalogue;
pub use crate::models::LayerDescriptor;
pub use crate::models::LayerId;
pub use crate::models::MetaDocument;
pub use crate::models::OverlayOpacity;
pub use crate::models::TileSources;
pub use crate::models::TimeKey;
pub use crate::services::CommitSummary;
pub use crate::services::Direction;
pub use crate::services::FeatureStyle;
pub use crate::services::HistogramChart;
pub use crate::services::MapController;
pub use crate::services::MissingLayer;
pub use crate::services::NavigationState;
pub use crate::services::RefreshReport;
pub use crate::services::RefreshStatus;
pub use crate::services::RenderedOverlay;
pub use crate::services::Scene;
pub use crate::services::SceneMap;
pub use crate::source::FetchError;
pub use crate::source::PipelineConfig;
