//! Minimal GeoJSON model: enough structure to style features and bound them.
//!
//! Geometry coordinates are kept as raw JSON and handed back to the client
//! untouched; only bounding boxes are computed server-side.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Error computing bounds of a geometry or layer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("geometry has no coordinates")]
    Empty,
    #[error("coordinate is not finite: [{0}, {1}]")]
    NonFinite(f64, f64),
    #[error("malformed coordinates: {0}")]
    Malformed(String),
}

/// A GeoJSON `FeatureCollection`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "feature_collection_type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

fn feature_collection_type() -> String {
    "FeatureCollection".to_string()
}

/// A single feature with free-form properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: Map<String, Value>,
}

/// RFC 7946 allows `"properties": null`; treat it like an empty object.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<Map<String, Value>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Geometry object; coordinates stay as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub coordinates: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometries: Option<Vec<Geometry>>,
}

/// Axis-aligned lon/lat box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    pub fn from_point(lon: f64, lat: f64) -> Self {
        Self {
            west: lon,
            south: lat,
            east: lon,
            north: lat,
        }
    }

    pub fn extend(&mut self, lon: f64, lat: f64) {
        self.west = self.west.min(lon);
        self.east = self.east.max(lon);
        self.south = self.south.min(lat);
        self.north = self.north.max(lat);
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            west: self.west.min(other.west),
            south: self.south.min(other.south),
            east: self.east.max(other.east),
            north: self.north.max(other.north),
        }
    }

    /// Union of every box, or `None` for an empty input.
    pub fn union_all<'a>(boxes: impl IntoIterator<Item = &'a BoundingBox>) -> Option<BoundingBox> {
        boxes
            .into_iter()
            .fold(None, |acc: Option<BoundingBox>, b| match acc {
                Some(a) => Some(a.union(b)),
                None => Some(*b),
            })
    }

    /// Grow each side by `ratio` of the box's width/height.
    pub fn pad(&self, ratio: f64) -> BoundingBox {
        let dx = (self.east - self.west) * ratio;
        let dy = (self.north - self.south) * ratio;
        BoundingBox {
            west: self.west - dx,
            south: self.south - dy,
            east: self.east + dx,
            north: self.north + dy,
        }
    }
}

impl Geometry {
    /// Bounding box of every position in this geometry.
    pub fn bounds(&self) -> Result<BoundingBox, GeometryError> {
        let mut bbox = None;
        self.accumulate(&mut bbox)?;
        bbox.ok_or(GeometryError::Empty)
    }

    fn accumulate(&self, bbox: &mut Option<BoundingBox>) -> Result<(), GeometryError> {
        if let Some(children) = &self.geometries {
            for child in children {
                child.accumulate(bbox)?;
            }
            return Ok(());
        }
        walk_positions(&self.coordinates, bbox)
    }
}

fn walk_positions(value: &Value, bbox: &mut Option<BoundingBox>) -> Result<(), GeometryError> {
    let items = match value {
        Value::Null => return Ok(()),
        Value::Array(items) => items,
        other => return Err(GeometryError::Malformed(format!("expected array, got {}", other))),
    };

    // A position is an array whose leading entries are numbers.
    if let Some(Value::Number(_)) = items.first() {
        let lon = items.first().and_then(Value::as_f64);
        let lat = items.get(1).and_then(Value::as_f64);
        let (lon, lat) = match (lon, lat) {
            (Some(lon), Some(lat)) => (lon, lat),
            _ => return Err(GeometryError::Malformed(format!("bad position {}", value))),
        };
        if !lon.is_finite() || !lat.is_finite() {
            return Err(GeometryError::NonFinite(lon, lat));
        }
        match bbox {
            Some(b) => b.extend(lon, lat),
            None => *bbox = Some(BoundingBox::from_point(lon, lat)),
        }
        return Ok(());
    }

    for item in items {
        walk_positions(item, bbox)?;
    }
    Ok(())
}

impl FeatureCollection {
    pub fn empty() -> Self {
        Self {
            kind: feature_collection_type(),
            features: Vec::new(),
        }
    }

    /// Bounds of every feature geometry. Features without geometry are skipped;
    /// a malformed geometry fails the whole collection.
    pub fn bounds(&self) -> Result<BoundingBox, GeometryError> {
        let mut bbox = None;
        for geometry in self.features.iter().filter_map(|f| f.geometry.as_ref()) {
            geometry.accumulate(&mut bbox)?;
        }
        bbox.ok_or(GeometryError::Empty)
    }
}
