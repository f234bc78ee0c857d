//! NDVI histogram validation and chart preparation.

use log::warn;
use serde::Serialize;

use crate::models::{HistogramDocument, TimeKey};
use crate::source::{FetchOutcome, LayerFetcher};

/// Why no chart could be produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HistogramError {
    #[error("Histogram not found at {location}")]
    NotFound { location: String },

    #[error("Histogram format error at {location}: {message}")]
    Format { location: String, message: String },
}

/// One histogram bar, `[lower, upper)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBar {
    pub lower: f64,
    pub upper: f64,
    pub center: f64,
    pub count: u64,
    pub label: String,
}

/// Chart-ready histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramChart {
    pub date: Option<String>,
    pub bars: Vec<HistogramBar>,
    pub total: u64,
    pub mean: Option<f64>,
    pub p10: Option<f64>,
    pub p90: Option<f64>,
    /// e.g. `2026-01-08: mean 0.42, p10 0.18, p90 0.66`
    pub summary: String,
}

/// Check the structural invariants of a histogram document.
///
/// Edges must number exactly one more than the counts, be finite, and never
/// decrease. Violations reject the whole document.
pub fn validate(doc: &HistogramDocument) -> Result<(), String> {
    if doc.counts.is_empty() {
        return Err("histogram has no counts".to_string());
    }
    if doc.bins.len() != doc.counts.len() + 1 {
        return Err(format!(
            "expected {} bin edges for {} counts, found {}",
            doc.counts.len() + 1,
            doc.counts.len(),
            doc.bins.len()
        ));
    }
    if doc.bins.iter().any(|b| !b.is_finite()) {
        return Err("bin edges must be finite".to_string());
    }
    if doc.bins.windows(2).any(|w| w[1] < w[0]) {
        return Err("bin edges must be non-decreasing".to_string());
    }
    Ok(())
}

/// Validate and convert a histogram document into chart bars.
pub fn to_chart(doc: &HistogramDocument) -> Result<HistogramChart, String> {
    validate(doc)?;
    let total = doc
        .counts
        .iter()
        .try_fold(0u64, |acc, &count| acc.checked_add(count))
        .ok_or_else(|| "histogram counts overflow a 64-bit total".to_string())?;

    let bars: Vec<HistogramBar> = doc
        .bins
        .windows(2)
        .zip(&doc.counts)
        .map(|(edges, &count)| HistogramBar {
            lower: edges[0],
            upper: edges[1],
            center: (edges[0] + edges[1]) / 2.0,
            count,
            label: format!("{:.2} to {:.2}", edges[0], edges[1]),
        })
        .collect();

    Ok(HistogramChart {
        date: doc.date.clone(),
        total,
        bars,
        mean: doc.mean,
        p10: doc.p10,
        p90: doc.p90,
        summary: summary_line(doc),
    })
}

fn summary_line(doc: &HistogramDocument) -> String {
    let stats: Vec<String> = [("mean", doc.mean), ("p10", doc.p10), ("p90", doc.p90)]
        .iter()
        .filter_map(|(name, value)| value.filter(|v| v.is_finite()).map(|v| format!("{} {:.2}", name, v)))
        .collect();

    let stats = if stats.is_empty() {
        "no summary statistics".to_string()
    } else {
        stats.join(", ")
    };
    match doc.date.as_deref().filter(|d| !d.is_empty()) {
        Some(date) => format!("{}: {}", date, stats),
        None => stats,
    }
}

/// Fetch `ndvi_hist.json` for `key` and turn it into a chart.
pub async fn load_histogram(
    fetcher: &LayerFetcher,
    key: Option<&TimeKey>,
) -> Result<HistogramChart, HistogramError> {
    match fetcher.fetch_histogram(key).await {
        FetchOutcome::Loaded { data, location, .. } => to_chart(&data).map_err(|message| {
            warn!("Rejected histogram at {}: {}", location, message);
            HistogramError::Format { location, message }
        }),
        FetchOutcome::Missing { location, error } if error.is_format_error() => Err(HistogramError::Format {
            location,
            message: error.message().to_string(),
        }),
        FetchOutcome::Missing { location, .. } => Err(HistogramError::NotFound { location }),
    }
}
