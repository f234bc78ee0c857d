//! Human-readable status line for a refresh cycle.

use serde::{Deserialize, Serialize};

use crate::models::{LayerId, TimeKey};
use crate::source::FetchError;

/// Why an enabled layer is not on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingReason {
    /// Nothing published, unreachable, or not JSON.
    NotFound,
    /// JSON of the wrong shape.
    FormatError,
    /// Not in the layer catalogue.
    UnknownLayer,
}

impl MissingReason {
    pub fn from_error(error: &FetchError) -> Self {
        if error.is_format_error() {
            Self::FormatError
        } else {
            Self::NotFound
        }
    }
}

/// An enabled layer that could not be loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingLayer {
    pub layer: LayerId,
    /// Location that was tried.
    pub location: String,
    pub reason: MissingReason,
    pub detail: String,
}

impl MissingLayer {
    fn describe(&self) -> String {
        match self.reason {
            MissingReason::NotFound => format!("{} ({})", self.layer, self.location),
            MissingReason::FormatError => format!("{} (format error at {})", self.layer, self.location),
            MissingReason::UnknownLayer => format!("{} (unknown layer)", self.layer),
        }
    }
}

/// Outcome summary of one refresh cycle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RefreshStatus {
    pub key: Option<TimeKey>,
    pub requested: usize,
    pub loaded: Vec<LayerId>,
    pub missing: Vec<MissingLayer>,
    /// From `meta.json`, when loaded.
    pub freshness: Option<String>,
    /// A newer refresh finished first; nothing from this one was applied.
    pub superseded: bool,
    /// The time index could not be resolved.
    pub unavailable: Option<String>,
}

impl RefreshStatus {
    /// Status line for the UI.
    pub fn message(&self) -> String {
        if self.superseded {
            return "Superseded by a newer refresh.".to_string();
        }
        if let Some(reason) = &self.unavailable {
            return format!("No data available: {}.", reason.trim_end_matches('.'));
        }
        if self.requested == 0 {
            return "No layers selected.".to_string();
        }

        let scope = self
            .key
            .as_ref()
            .map(|k| format!(" for {}", k))
            .unwrap_or_default();

        let mut message = if self.loaded.is_empty() {
            format!("No data available{}.", scope)
        } else {
            let noun = if self.loaded.len() == 1 { "layer" } else { "layers" };
            format!("Loaded {} {}{}.", self.loaded.len(), noun, scope)
        };

        if !self.missing.is_empty() {
            let missing: Vec<String> = self.missing.iter().map(MissingLayer::describe).collect();
            message.push_str(&format!(" Missing: {}.", missing.join("; ")));
        }
        if let Some(freshness) = &self.freshness {
            message.push(' ');
            message.push_str(freshness);
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> LayerId {
        s.parse().unwrap()
    }

    fn missing(layer: &str, location: &str, reason: MissingReason) -> MissingLayer {
        MissingLayer {
            layer: id(layer),
            location: location.to_string(),
            reason,
            detail: String::new(),
        }
    }

    #[test]
    fn test_loaded_with_missing() {
        let status = RefreshStatus {
            key: Some(TimeKey::new("2026-01-08")),
            requested: 2,
            loaded: vec![id("presence")],
            missing: vec![missing("hotspots", "data/2026-01-08/hotspots.geojson", MissingReason::NotFound)],
            ..Default::default()
        };
        assert_eq!(
            status.message(),
            "Loaded 1 layer for 2026-01-08. Missing: hotspots (data/2026-01-08/hotspots.geojson)."
        );
    }

    #[test]
    fn test_nothing_loaded() {
        let status = RefreshStatus {
            requested: 2,
            missing: vec![
                missing("presence", "latest/presence.geojson", MissingReason::FormatError),
                missing("lions", "-", MissingReason::UnknownLayer),
            ],
            ..Default::default()
        };
        assert_eq!(
            status.message(),
            "No data available. Missing: presence (format error at latest/presence.geojson); lions (unknown layer)."
        );
    }

    #[test]
    fn test_freshness_appended() {
        let status = RefreshStatus {
            requested: 2,
            loaded: vec![id("presence"), id("corridors")],
            freshness: Some("Updated 2026-01-08T06:00Z.".to_string()),
            ..Default::default()
        };
        assert_eq!(status.message(), "Loaded 2 layers. Updated 2026-01-08T06:00Z.");
    }

    #[test]
    fn test_special_states() {
        assert_eq!(RefreshStatus::default().message(), "No layers selected.");
        let superseded = RefreshStatus {
            superseded: true,
            ..Default::default()
        };
        assert_eq!(superseded.message(), "Superseded by a newer refresh.");
        let unavailable = RefreshStatus {
            unavailable: Some("index lists no dates".to_string()),
            ..Default::default()
        };
        assert_eq!(unavailable.message(), "No data available: index lists no dates.");
    }

    #[test]
    fn test_reason_from_error() {
        assert_eq!(
            MissingReason::from_error(&FetchError::format("bad")),
            MissingReason::FormatError
        );
        assert_eq!(
            MissingReason::from_error(&FetchError::http_status(500, "x")),
            MissingReason::NotFound
        );
    }
}
