#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Every variable `PipelineConfig::apply_env` reads.
pub const CONFIG_ENV: [&str; 8] = [
    "HERDWATCH_SOURCE",
    "HERDWATCH_DATA_ROOT",
    "HERDWATCH_MODE",
    "HERDWATCH_TEMPORAL",
    "HERDWATCH_FADE",
    "HERDWATCH_TIMEOUT_SECS",
    "HOST",
    "PORT",
];

/// Runs `f` with environment variables temporarily modified.
///
/// Restores variables on unwind and serializes access to the process
/// environment across parallel tests. Every [`CONFIG_ENV`] variable not named
/// in `changes` is unset for the duration.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let mut all: Vec<(&str, Option<&str>)> = CONFIG_ENV
        .iter()
        .filter(|k| !changes.iter().any(|(c, _)| c == *k))
        .map(|k| (*k, None))
        .collect();
    all.extend_from_slice(changes);
    let _guard = ScopedEnv::new(&all);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// One-square polygon layer with `property = value`.
pub fn polygon_layer(property: &str, value: f64, lon: f64, lat: f64) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {property: value},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[lon, lat], [lon + 0.5, lat], [lon + 0.5, lat + 0.5], [lon, lat]]]
            }
        }]
    })
}

pub fn line_layer(property: &str, value: f64) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {property: value},
            "geometry": {"type": "LineString", "coordinates": [[36.0, -1.0], [36.8, -0.6]]}
        }]
    })
}

pub fn detections_layer() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"conf": 0.91, "herd_id": "H12"},
                "geometry": {"type": "Point", "coordinates": [36.4, -0.8]}
            },
            {
                "type": "Feature",
                "properties": {"conf": "0.55", "class": "cattle"},
                "geometry": {"type": "Point", "coordinates": [36.5, -0.7]}
            }
        ]
    })
}

pub fn histogram() -> Value {
    json!({
        "date": "2026-01-08",
        "bins": [-1.0, -0.5, 0.0, 0.5, 1.0],
        "counts": [2, 10, 40, 8],
        "mean": 0.21,
        "p10": -0.12,
        "p90": 0.48
    })
}

/// Writes a two-date data tree under `root`:
/// `2026-01-01` has presence only, `2026-01-08` has every layer but grazing.
pub fn write_data_tree(root: &Path) {
    let files: Vec<(&str, Value)> = vec![
        ("index.json", json!({"dates": ["2026-01-01", "2026-01-08"], "latest": "2026-01-08"})),
        ("2026-01-01/presence.geojson", polygon_layer("p", 0.15, 36.0, -1.0)),
        ("2026-01-08/presence.geojson", polygon_layer("p", 0.65, 36.0, -1.0)),
        ("2026-01-08/hotspots.geojson", polygon_layer("risk", 0.85, 37.0, -2.0)),
        ("2026-01-08/corridors.geojson", line_layer("w", 0.5)),
        ("2026-01-08/water.geojson", line_layer("w", 1.0)),
        ("2026-01-08/detections.geojson", detections_layer()),
        (
            "2026-01-08/meta.json",
            json!({"updated": "2026-01-08T06:00Z", "notes": "Sentinel-2 tile T36MZE"}),
        ),
        ("2026-01-08/ndvi_hist.json", histogram()),
    ];

    for (path, value) in files {
        let target = root.join(path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(target, serde_json::to_vec_pretty(&value).unwrap()).unwrap();
    }
}
