//! Feature style and popup derivation.
//!
//! Pure functions of (layer, feature, lead days). Intensities are clamped to
//! `[0, 1]`; missing or non-numeric values use the layer's fallback.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{AreaRamp, Feature, GeometryKind, LayerDescriptor};

pub use crate::models::lead_fade;

/// Thresholds between the five ramp colors. A value equal to a threshold
/// selects the higher bucket.
pub const RAMP_STOPS: [f64; 4] = [0.2, 0.4, 0.6, 0.8];

/// Pale to dark red.
pub const RISK_RAMP: [&str; 5] = ["#fee5d9", "#fcae91", "#fb6a4a", "#de2d26", "#a50f15"];

/// Pale to dark blue.
pub const PRESENCE_RAMP: [&str; 5] = ["#eff3ff", "#bdd7e7", "#6baed6", "#3182bd", "#08519c"];

pub const CONFIDENCE_HIGH: &str = "#2ecc71";
pub const CONFIDENCE_MEDIUM: &str = "#f1c40f";
pub const CONFIDENCE_LOW: &str = "#e74c3c";

const POINT_STROKE: &str = "#222222";

/// Rendering style of a single feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureStyle {
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

impl FeatureStyle {
    /// Multiply every opacity by `fade`.
    pub fn faded(mut self, fade: f64) -> Self {
        self.opacity *= fade;
        self.fill_opacity = self.fill_opacity.map(|o| o * fade);
        self
    }
}

/// Intensity pulled from a feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intensity {
    /// Clamped value used for styling.
    pub value: f64,
    /// The property as published, when numeric.
    pub raw: Option<f64>,
}

/// Clamp to `[0, 1]`; NaN maps to 0.
pub fn clamp01(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Numeric reading of a JSON property: numbers and numeric strings.
pub fn numeric_value(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    v.filter(|v| v.is_finite())
}

/// `clamp01` over a JSON value; anything non-numeric yields 0.
pub fn clamp01_value(value: &Value) -> f64 {
    numeric_value(value).map(clamp01).unwrap_or(0.0)
}

/// Read `layer.property` from `feature`, clamped, with the layer fallback.
pub fn extract_intensity(layer: &LayerDescriptor, feature: &Feature) -> Intensity {
    let raw = feature.properties.get(&layer.property).and_then(numeric_value);
    Intensity {
        value: raw.map(clamp01).unwrap_or_else(|| layer.fallback_intensity()),
        raw,
    }
}

fn ramp_index(v: f64) -> usize {
    let v = clamp01(v);
    RAMP_STOPS.iter().filter(|stop| v >= **stop).count()
}

pub fn risk_color(v: f64) -> &'static str {
    RISK_RAMP[ramp_index(v)]
}

pub fn presence_color(v: f64) -> &'static str {
    PRESENCE_RAMP[ramp_index(v)]
}

pub fn ramp_color(ramp: AreaRamp, v: f64) -> &'static str {
    match ramp {
        AreaRamp::Risk => risk_color(v),
        AreaRamp::Presence => presence_color(v),
    }
}

/// Three-step detection confidence color.
pub fn confidence_color(confidence: f64) -> &'static str {
    if confidence >= 0.8 {
        CONFIDENCE_HIGH
    } else if confidence >= 0.6 {
        CONFIDENCE_MEDIUM
    } else {
        CONFIDENCE_LOW
    }
}

/// Style for `feature` on `layer`.
///
/// `lead_days` is the feature date's offset from the base date, or `None`
/// when the fade multiplier does not apply.
pub fn derive_style(layer: &LayerDescriptor, feature: &Feature, lead_days: Option<i64>) -> FeatureStyle {
    let intensity = extract_intensity(layer, feature);
    let v = intensity.value;

    let style = match layer.kind {
        GeometryKind::Polygon => {
            let color = ramp_color(layer.ramp, v).to_string();
            let (fill_opacity, stroke_opacity) = match layer.ramp {
                AreaRamp::Risk => (0.45, 0.25),
                AreaRamp::Presence => (0.35, 0.18),
            };
            FeatureStyle {
                fill_color: Some(color.clone()),
                color,
                weight: 1.0,
                opacity: stroke_opacity,
                fill_opacity: Some(fill_opacity),
                radius: None,
            }
        }
        GeometryKind::Line => FeatureStyle {
            color: layer.line_color.clone(),
            weight: 2.0 + 6.0 * v,
            opacity: 0.9,
            fill_color: None,
            fill_opacity: None,
            radius: None,
        },
        GeometryKind::Point => FeatureStyle {
            color: POINT_STROKE.to_string(),
            weight: 1.0,
            opacity: 0.9,
            fill_color: Some(confidence_color(v).to_string()),
            fill_opacity: Some(0.85),
            radius: Some(3.0 + 6.0 * v),
        },
    };

    match lead_days {
        Some(days) if days > 0 => style.faded(lead_fade(days)),
        _ => style,
    }
}

/// Popup text: layer label and value to two decimals, or `n/a`.
///
/// Point layers show confidence plus the first identifying attribute found
/// among `herd_id`, `class` and `label`.
pub fn popup_text(layer: &LayerDescriptor, feature: &Feature) -> String {
    let raw = extract_intensity(layer, feature).raw;
    let value = raw.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "n/a".to_string());

    if layer.kind != GeometryKind::Point {
        return format!("{}: {}", escape_html(&layer.label), value);
    }

    let mut text = format!("{}: confidence {}", escape_html(&layer.label), value);
    let identity = ["herd_id", "class", "label"].iter().find_map(|key| {
        feature
            .properties
            .get(*key)
            .and_then(attribute_text)
            .map(|v| (*key, v))
    });
    if let Some((key, v)) = identity {
        let name = match key {
            "herd_id" => "herd",
            other => other,
        };
        text.push_str(&format!(", {} {}", name, escape_html(&v)));
    }
    text
}

fn attribute_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Popups are rendered as HTML by the map widget.
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
