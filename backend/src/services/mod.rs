//! Service layer: the temporal layer pipeline.
//!
//! Services sit between the data sources and the HTTP surface. The
//! [`MapController`] owns the pipeline state and drives the other pieces:
//!
//! - [`time_index`]: available keys, base/active key, lead time
//! - [`style`]: per-feature style and popup text
//! - [`compositor`]: overlay tracking, refresh commits, view fitting
//! - [`histogram`]: NDVI histogram validation and chart bars
//! - [`status`]: the status line shown after a refresh

pub mod compositor;
pub mod histogram;
pub mod pipeline;
pub mod status;
pub mod style;
pub mod time_index;

pub use compositor::{
    render_layer, CommitSummary, MapCompositor, MapSurface, RefreshTicket, RenderedOverlay, Scene, SceneMap,
    StyledFeature, TrackedLayer,
};
pub use histogram::{HistogramBar, HistogramChart, HistogramError};
pub use pipeline::{MapController, RefreshReport};
pub use status::{MissingLayer, MissingReason, RefreshStatus};
pub use style::{
    clamp01, confidence_color, derive_style, extract_intensity, popup_text, presence_color, risk_color, FeatureStyle,
    Intensity,
};
pub use time_index::{Direction, NavigationState, TimeIndexError, TimeIndexResolver};
