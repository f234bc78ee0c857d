//! Map compositor: owns the overlay-tracking table and applies refresh cycles.
//!
//! A refresh is split in two. [`MapCompositor::begin_refresh`] hands out a
//! generation ticket before any fetch starts; [`MapCompositor::commit`] later
//! applies the rendered overlays in one step:
//!
//! ```text
//! commit(ticket)
//!   ├─ stale ticket ──────────────► discarded (superseded)
//!   └─ current ticket
//!        1. Clearing  remove every tracked overlay from the map
//!        2. Adding    add each rendered overlay, one per layer id
//!        3. Fitting   union of overlay bounds, padded, applied to the view
//! ```
//!
//! The map itself sits behind the [`MapSurface`] trait so the compositor can
//! drive the server-side [`SceneMap`] or a test double.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::style::{derive_style, popup_text, FeatureStyle};
use crate::models::{BoundingBox, FeatureCollection, Geometry, GeometryKind, LayerDescriptor, LayerId};

/// Something overlays can be drawn on.
pub trait MapSurface: Send {
    fn add_overlay(&mut self, overlay: RenderedOverlay);

    /// Remove the overlay for `layer`. Returns whether one was present.
    fn remove_overlay(&mut self, layer: &LayerId) -> bool;

    fn fit_bounds(&mut self, bounds: BoundingBox);
}

/// One feature ready for the client to draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyledFeature {
    pub geometry: Geometry,
    pub style: FeatureStyle,
    pub popup: String,
}

/// A layer rendered for the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedOverlay {
    pub layer: LayerId,
    pub kind: GeometryKind,
    pub label: String,
    pub location: String,
    pub revision: String,
    pub features: Vec<StyledFeature>,
    /// `None` when the layer's geometry could not be bounded.
    pub bounds: Option<BoundingBox>,
}

/// Style every feature of `collection` for `layer`.
///
/// Features without geometry are dropped. A bounds failure only removes the
/// layer from view fitting.
pub fn render_layer(
    layer: &LayerDescriptor,
    collection: &FeatureCollection,
    location: impl Into<String>,
    revision: impl Into<String>,
    lead_days: Option<i64>,
) -> RenderedOverlay {
    let features = collection
        .features
        .iter()
        .filter_map(|feature| {
            feature.geometry.as_ref().map(|geometry| StyledFeature {
                geometry: geometry.clone(),
                style: derive_style(layer, feature, lead_days),
                popup: popup_text(layer, feature),
            })
        })
        .collect();

    let bounds = match collection.bounds() {
        Ok(bounds) => Some(bounds),
        Err(e) => {
            debug!("Layer {} excluded from view fitting: {}", layer.id, e);
            None
        }
    };

    RenderedOverlay {
        layer: layer.id.clone(),
        kind: layer.kind,
        label: layer.label.clone(),
        location: location.into(),
        revision: revision.into(),
        features,
        bounds,
    }
}

/// Entry of the tracking table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedLayer {
    pub location: String,
    pub revision: String,
    pub bounds: Option<BoundingBox>,
}

/// Generation ticket of one refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// What a successful commit left on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitSummary {
    pub generation: u64,
    pub layers: Vec<LayerId>,
    pub view: Option<BoundingBox>,
}

/// Owns the map and the single source of truth for which overlays are on it.
#[derive(Debug)]
pub struct MapCompositor<M: MapSurface> {
    map: M,
    tracked: BTreeMap<LayerId, TrackedLayer>,
    issued: u64,
}

impl<M: MapSurface> MapCompositor<M> {
    pub fn new(map: M) -> Self {
        Self {
            map,
            tracked: BTreeMap::new(),
            issued: 0,
        }
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    /// Issue the ticket for a new refresh. Every older ticket becomes stale.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued += 1;
        RefreshTicket(self.issued)
    }

    pub fn is_current(&self, ticket: RefreshTicket) -> bool {
        ticket.0 == self.issued
    }

    /// Replace the map contents with `overlays` and fit the view.
    ///
    /// Returns `None` without touching the map when `ticket` is stale.
    pub fn commit(
        &mut self,
        ticket: RefreshTicket,
        overlays: Vec<RenderedOverlay>,
        padding: f64,
    ) -> Option<CommitSummary> {
        if !self.is_current(ticket) {
            info!(
                "Refresh {} superseded by refresh {}, discarding {} overlay(s)",
                ticket.0,
                self.issued,
                overlays.len()
            );
            return None;
        }

        self.remove_tracked();

        for overlay in overlays {
            if self.tracked.contains_key(&overlay.layer) {
                self.map.remove_overlay(&overlay.layer);
            }
            self.tracked.insert(
                overlay.layer.clone(),
                TrackedLayer {
                    location: overlay.location.clone(),
                    revision: overlay.revision.clone(),
                    bounds: overlay.bounds,
                },
            );
            self.map.add_overlay(overlay);
        }

        let view = BoundingBox::union_all(self.tracked.values().filter_map(|t| t.bounds.as_ref()))
            .map(|bounds| bounds.pad(padding));
        if let Some(view) = view {
            self.map.fit_bounds(view);
        }

        debug!("Refresh {} committed {} layer(s)", ticket.0, self.tracked.len());
        Some(CommitSummary {
            generation: ticket.0,
            layers: self.tracked_layers(),
            view,
        })
    }

    /// Remove every overlay. Refreshes still in flight become stale.
    pub fn clear(&mut self) {
        self.issued += 1;
        self.remove_tracked();
    }

    /// Identifiers currently on the map, in order.
    pub fn tracked_layers(&self) -> Vec<LayerId> {
        self.tracked.keys().cloned().collect()
    }

    pub fn tracked(&self, layer: &LayerId) -> Option<&TrackedLayer> {
        self.tracked.get(layer)
    }

    fn remove_tracked(&mut self) {
        for layer in self.tracked.keys() {
            self.map.remove_overlay(layer);
        }
        self.tracked.clear();
    }
}

// ============================================================================
// Server-side map
// ============================================================================

/// Snapshot of what the client should draw.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scene {
    pub overlays: Vec<RenderedOverlay>,
    pub view: Option<BoundingBox>,
}

/// In-process map holding the scene served to the browser.
#[derive(Debug, Clone, Default)]
pub struct SceneMap {
    overlays: Vec<RenderedOverlay>,
    view: Option<BoundingBox>,
}

impl SceneMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene(&self) -> Scene {
        Scene {
            overlays: self.overlays.clone(),
            view: self.view,
        }
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }
}

impl MapSurface for SceneMap {
    fn add_overlay(&mut self, overlay: RenderedOverlay) {
        self.overlays.push(overlay);
    }

    fn remove_overlay(&mut self, layer: &LayerId) -> bool {
        let before = self.overlays.len();
        self.overlays.retain(|o| &o.layer != layer);
        self.overlays.len() != before
    }

    fn fit_bounds(&mut self, bounds: BoundingBox) {
        self.view = Some(bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LayerCatalogue;
    use serde_json::json;

    #[derive(Debug, Default)]
    struct RecordingMap {
        events: Vec<String>,
        live: Vec<LayerId>,
    }

    impl MapSurface for RecordingMap {
        fn add_overlay(&mut self, overlay: RenderedOverlay) {
            self.events.push(format!("add {}", overlay.layer));
            self.live.push(overlay.layer);
        }

        fn remove_overlay(&mut self, layer: &LayerId) -> bool {
            self.events.push(format!("remove {}", layer));
            let before = self.live.len();
            self.live.retain(|l| l != layer);
            before != self.live.len()
        }

        fn fit_bounds(&mut self, _bounds: BoundingBox) {
            self.events.push("fit".to_string());
        }
    }

    fn descriptor(id: &str) -> LayerDescriptor {
        LayerCatalogue::default()
            .get(&id.parse().unwrap())
            .cloned()
            .unwrap()
    }

    fn collection(value: serde_json::Value) -> FeatureCollection {
        serde_json::from_value(value).unwrap()
    }

    fn square(lon: f64, lat: f64, p: f64) -> serde_json::Value {
        json!({
            "type": "Feature",
            "properties": {"p": p},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[lon, lat], [lon + 1.0, lat], [lon + 1.0, lat + 1.0], [lon, lat]]]
            }
        })
    }

    fn overlay(id: &str, lon: f64) -> RenderedOverlay {
        let fc = collection(json!({"type": "FeatureCollection", "features": [square(lon, 0.0, 0.5)]}));
        render_layer(&descriptor(id), &fc, format!("memory://{}", id), "rev", None)
    }

    #[test]
    fn test_render_layer_styles_and_bounds() {
        let fc = collection(json!({
            "type": "FeatureCollection",
            "features": [square(36.0, -1.0, 0.9), {"type": "Feature", "geometry": null, "properties": {}}]
        }));
        let rendered = render_layer(&descriptor("presence"), &fc, "loc", "abc", None);
        assert_eq!(rendered.features.len(), 1);
        assert_eq!(rendered.features[0].popup, "Presence: 0.90");
        let bounds = rendered.bounds.unwrap();
        assert_eq!(bounds.west, 36.0);
        assert_eq!(bounds.north, 0.0);
    }

    #[test]
    fn test_render_layer_without_bounds() {
        let fc = collection(json!({"type": "FeatureCollection", "features": []}));
        let rendered = render_layer(&descriptor("presence"), &fc, "loc", "abc", None);
        assert!(rendered.bounds.is_none());
        assert!(rendered.features.is_empty());
    }

    #[test]
    fn test_commit_clears_before_adding() {
        let mut compositor = MapCompositor::new(RecordingMap::default());
        let t1 = compositor.begin_refresh();
        compositor.commit(t1, vec![overlay("presence", 0.0)], 0.15).unwrap();

        let t2 = compositor.begin_refresh();
        compositor
            .commit(t2, vec![overlay("presence", 0.0), overlay("hotspots", 2.0)], 0.15)
            .unwrap();

        assert_eq!(
            compositor.map().events,
            vec!["add presence", "fit", "remove presence", "add presence", "add hotspots", "fit"]
        );
        assert_eq!(compositor.map().live.len(), 2);
    }

    #[test]
    fn test_commit_is_idempotent() {
        let mut compositor = MapCompositor::new(SceneMap::new());
        for _ in 0..2 {
            let ticket = compositor.begin_refresh();
            compositor
                .commit(ticket, vec![overlay("presence", 0.0), overlay("corridors", 1.0)], 0.15)
                .unwrap();
        }
        let ids: Vec<String> = compositor.tracked_layers().iter().map(|l| l.to_string()).collect();
        assert_eq!(ids, vec!["corridors", "presence"]);
        assert_eq!(compositor.map().overlay_count(), 2);
    }

    #[test]
    fn test_duplicate_overlay_replaces_prior() {
        let mut compositor = MapCompositor::new(SceneMap::new());
        let ticket = compositor.begin_refresh();
        compositor
            .commit(ticket, vec![overlay("presence", 0.0), overlay("presence", 5.0)], 0.15)
            .unwrap();
        assert_eq!(compositor.map().overlay_count(), 1);
        assert_eq!(compositor.map().scene().overlays[0].bounds.unwrap().west, 5.0);
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mut compositor = MapCompositor::new(SceneMap::new());
        let slow = compositor.begin_refresh();
        let fast = compositor.begin_refresh();

        compositor.commit(fast, vec![overlay("presence", 0.0)], 0.15).unwrap();
        assert!(compositor.commit(slow, vec![overlay("hotspots", 0.0)], 0.15).is_none());

        assert_eq!(compositor.tracked_layers(), vec!["presence".parse::<LayerId>().unwrap()]);
    }

    #[test]
    fn test_fit_uses_padded_union() {
        let mut compositor = MapCompositor::new(SceneMap::new());
        let ticket = compositor.begin_refresh();
        let mut unbounded = overlay("hotspots", 0.0);
        unbounded.bounds = None;
        let summary = compositor
            .commit(ticket, vec![overlay("presence", 0.0), overlay("corridors", 9.0), unbounded], 0.2)
            .unwrap();

        let view = summary.view.unwrap();
        assert!((view.west - (-2.0)).abs() < 1e-9);
        assert!((view.east - 12.0).abs() < 1e-9);
        assert_eq!(compositor.map().scene().view, Some(view));
        assert_eq!(summary.layers.len(), 3);
    }

    #[test]
    fn test_empty_commit_leaves_view() {
        let mut compositor = MapCompositor::new(SceneMap::new());
        let ticket = compositor.begin_refresh();
        let summary = compositor.commit(ticket, Vec::new(), 0.15).unwrap();
        assert!(summary.view.is_none());
        assert!(compositor.map().scene().view.is_none());
    }

    #[test]
    fn test_clear_invalidates_in_flight() {
        let mut compositor = MapCompositor::new(SceneMap::new());
        let first = compositor.begin_refresh();
        compositor.commit(first, vec![overlay("presence", 0.0)], 0.15).unwrap();

        let pending = compositor.begin_refresh();
        compositor.clear();
        assert!(compositor.tracked_layers().is_empty());
        assert_eq!(compositor.map().overlay_count(), 0);
        assert!(compositor.commit(pending, vec![overlay("presence", 0.0)], 0.15).is_none());
    }
}
