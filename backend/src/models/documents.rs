//! Auxiliary JSON documents published next to the layer files.

use serde::{Deserialize, Serialize};

use super::time::TimeKey;

/// Top-level `index.json` listing the published time keys.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndexDocument {
    #[serde(default)]
    pub dates: Vec<TimeKey>,
    #[serde(default)]
    pub latest: Option<TimeKey>,
}

/// Per-folder `meta.json` freshness record.
///
/// Producers write either `updated`/`notes` or `updated_utc`/`note`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetaDocument {
    #[serde(default, alias = "updated_utc")]
    pub updated: Option<String>,
    #[serde(default, alias = "note")]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl MetaDocument {
    /// One-line freshness note, e.g. `Updated 2026-01-08T06:00Z (ok). Notes: ...`.
    pub fn freshness_note(&self) -> Option<String> {
        let updated = self.updated.as_deref()?.trim();
        if updated.is_empty() {
            return None;
        }
        let mut note = format!("Updated {}", updated);
        if let Some(status) = self.status.as_deref().filter(|s| !s.is_empty()) {
            note.push_str(&format!(" ({})", status));
        }
        note.push('.');
        if let Some(notes) = self.notes.as_deref().filter(|s| !s.trim().is_empty()) {
            note.push_str(&format!(" Notes: {}", notes.trim()));
        }
        Some(note)
    }
}

/// `ndvi_hist.json`: `counts.len() + 1` bin edges with optional summary stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramDocument {
    pub bins: Vec<f64>,
    pub counts: Vec<u64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub mean: Option<f64>,
    #[serde(default)]
    pub p10: Option<f64>,
    #[serde(default)]
    pub p90: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_document_parses() {
        let doc: IndexDocument =
            serde_json::from_str(r#"{"dates": ["2026-01-01", "2026-01-08"], "latest": "2026-01-08"}"#)
                .unwrap();
        assert_eq!(doc.dates.len(), 2);
        assert_eq!(doc.latest, Some(TimeKey::new("2026-01-08")));
    }

    #[test]
    fn test_index_document_tolerates_missing_fields() {
        let doc: IndexDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.dates.is_empty());
        assert!(doc.latest.is_none());
    }

    #[test]
    fn test_meta_aliases() {
        let doc: MetaDocument = serde_json::from_str(
            r#"{"status": "ok", "updated_utc": "2026-01-08T06:00:00+00:00", "note": "detections empty"}"#,
        )
        .unwrap();
        assert_eq!(doc.updated.as_deref(), Some("2026-01-08T06:00:00+00:00"));
        assert_eq!(
            doc.freshness_note().unwrap(),
            "Updated 2026-01-08T06:00:00+00:00 (ok). Notes: detections empty"
        );
    }

    #[test]
    fn test_meta_without_updated_has_no_note() {
        let doc: MetaDocument = serde_json::from_str(r#"{"notes": "x"}"#).unwrap();
        assert!(doc.freshness_note().is_none());
    }

    #[test]
    fn test_histogram_counts_must_be_non_negative() {
        let parsed: Result<HistogramDocument, _> =
            serde_json::from_str(r#"{"bins": [0.0, 1.0], "counts": [-1]}"#);
        assert!(parsed.is_err());
    }
}
