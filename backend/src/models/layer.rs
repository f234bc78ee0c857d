//! Overlay layer identifiers and their static descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed string key naming one overlay dataset (`presence`, `hotspots`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LayerId(String);

impl LayerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for LayerId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(format!("Invalid layer identifier: '{}'", s))
        }
    }
}

impl TryFrom<String> for LayerId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LayerId> for String {
    fn from(id: LayerId) -> Self {
        id.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Geometry kind rendered by a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    Point,
    Line,
    Polygon,
}

/// Color ramp used for area layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaRamp {
    /// Pale to dark red, for hotspot/risk layers.
    Risk,
    /// Pale to dark blue, for every other area layer.
    #[default]
    Presence,
}

/// Static configuration for one overlay layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDescriptor {
    pub id: LayerId,
    pub kind: GeometryKind,
    /// File name inside a time-key folder, e.g. `presence.geojson`.
    pub file: String,
    /// Feature property holding the scalar intensity.
    pub property: String,
    /// Popup prefix.
    pub label: String,
    #[serde(default)]
    pub ramp: AreaRamp,
    /// Stroke color for line layers.
    #[serde(default = "default_line_color")]
    pub line_color: String,
    /// Intensity used when the property is missing or non-numeric.
    #[serde(default)]
    pub default_intensity: Option<f64>,
}

fn default_line_color() -> String {
    "#8e44ad".to_string()
}

impl LayerDescriptor {
    pub fn new(id: &str, kind: GeometryKind, property: &str, label: &str) -> Self {
        Self {
            id: LayerId(id.to_string()),
            kind,
            file: format!("{}.geojson", id),
            property: property.to_string(),
            label: label.to_string(),
            ramp: AreaRamp::Presence,
            line_color: default_line_color(),
            default_intensity: None,
        }
    }

    pub fn with_ramp(mut self, ramp: AreaRamp) -> Self {
        self.ramp = ramp;
        self
    }

    pub fn with_line_color(mut self, color: impl Into<String>) -> Self {
        self.line_color = color.into();
        self
    }

    /// Fallback intensity: 0.5 for line weight, 0.3 for area and point layers.
    pub fn fallback_intensity(&self) -> f64 {
        self.default_intensity.unwrap_or(match self.kind {
            GeometryKind::Line => 0.5,
            GeometryKind::Point | GeometryKind::Polygon => 0.3,
        })
    }
}

/// Ordered set of known layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerCatalogue {
    layers: Vec<LayerDescriptor>,
}

impl LayerCatalogue {
    /// Build a catalogue, keeping the first descriptor for a repeated id.
    pub fn new(layers: Vec<LayerDescriptor>) -> Self {
        let mut unique: Vec<LayerDescriptor> = Vec::with_capacity(layers.len());
        for layer in layers {
            if !unique.iter().any(|l| l.id == layer.id) {
                unique.push(layer);
            }
        }
        Self { layers: unique }
    }

    pub fn get(&self, id: &LayerId) -> Option<&LayerDescriptor> {
        self.layers.iter().find(|l| &l.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerDescriptor> {
        self.layers.iter()
    }

    pub fn ids(&self) -> Vec<LayerId> {
        self.layers.iter().map(|l| l.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerCatalogue {
    fn default() -> Self {
        Self::new(vec![
            LayerDescriptor::new("presence", GeometryKind::Polygon, "p", "Presence"),
            LayerDescriptor::new("hotspots", GeometryKind::Polygon, "risk", "Hotspot risk")
                .with_ramp(AreaRamp::Risk),
            LayerDescriptor::new("corridors", GeometryKind::Line, "w", "Corridor weight"),
            LayerDescriptor::new("detections", GeometryKind::Point, "conf", "Detection"),
            LayerDescriptor::new("grazing", GeometryKind::Polygon, "g", "Grazing pressure"),
            LayerDescriptor::new("water", GeometryKind::Line, "w", "Water access")
                .with_line_color("#2b8cbe"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_id_validation() {
        assert!("presence".parse::<LayerId>().is_ok());
        assert!("water_2".parse::<LayerId>().is_ok());
        assert!("".parse::<LayerId>().is_err());
        assert!("../etc".parse::<LayerId>().is_err());
        assert!("Hotspots".parse::<LayerId>().is_err());
    }

    #[test]
    fn test_layer_id_serde_rejects_invalid() {
        let ok: Result<LayerId, _> = serde_json::from_str("\"corridors\"");
        assert!(ok.is_ok());
        let bad: Result<LayerId, _> = serde_json::from_str("\"a/b\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_default_catalogue() {
        let catalogue = LayerCatalogue::default();
        assert_eq!(catalogue.len(), 6);

        let hotspots = catalogue.get(&"hotspots".parse().unwrap()).unwrap();
        assert_eq!(hotspots.kind, GeometryKind::Polygon);
        assert_eq!(hotspots.ramp, AreaRamp::Risk);
        assert_eq!(hotspots.file, "hotspots.geojson");
        assert_eq!(hotspots.property, "risk");

        let detections = catalogue.get(&"detections".parse().unwrap()).unwrap();
        assert_eq!(detections.kind, GeometryKind::Point);
    }

    #[test]
    fn test_fallback_intensity_by_kind() {
        let catalogue = LayerCatalogue::default();
        let corridors = catalogue.get(&"corridors".parse().unwrap()).unwrap();
        let presence = catalogue.get(&"presence".parse().unwrap()).unwrap();
        assert_eq!(corridors.fallback_intensity(), 0.5);
        assert_eq!(presence.fallback_intensity(), 0.3);
    }

    #[test]
    fn test_catalogue_drops_duplicates() {
        let catalogue = LayerCatalogue::new(vec![
            LayerDescriptor::new("presence", GeometryKind::Polygon, "p", "Presence"),
            LayerDescriptor::new("presence", GeometryKind::Line, "x", "Other"),
        ]);
        assert_eq!(catalogue.len(), 1);
        assert_eq!(catalogue.iter().next().unwrap().property, "p");
    }
}
