//! Basemap and NDVI tile source definitions handed to the map front-end.
//!
//! Tiles are never served or proxied here; the client loads them directly.

use serde::{Deserialize, Serialize};

use super::opacity::OverlayOpacity;

/// XYZ raster tile service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterTileSource {
    pub name: String,
    pub url_template: String,
    pub attribution: String,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,
}

/// WMS layer for the vegetation index overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WmsTileSource {
    pub url: String,
    pub layer: String,
    #[serde(default = "default_wms_format")]
    pub format: String,
    #[serde(default = "default_true")]
    pub transparent: bool,
    pub attribution: String,
    #[serde(default)]
    pub opacity: OverlayOpacity,
}

/// Missing entries fall back to the public defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileSources {
    pub street: RasterTileSource,
    pub satellite: RasterTileSource,
    pub ndvi: WmsTileSource,
}

fn default_max_zoom() -> u8 {
    19
}

fn default_wms_format() -> String {
    "image/png".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for TileSources {
    fn default() -> Self {
        Self {
            street: RasterTileSource {
                name: "Street".to_string(),
                url_template: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
                attribution: "&copy; OpenStreetMap contributors".to_string(),
                max_zoom: 19,
            },
            satellite: RasterTileSource {
                name: "Satellite".to_string(),
                url_template:
                    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}"
                        .to_string(),
                attribution: "Tiles &copy; Esri".to_string(),
                max_zoom: 19,
            },
            ndvi: WmsTileSource {
                url: "https://gibs.earthdata.nasa.gov/wms/epsg3857/best/wms.cgi".to_string(),
                layer: "MODIS_Terra_NDVI_8Day".to_string(),
                format: default_wms_format(),
                transparent: true,
                attribution: "NASA GIBS / MODIS NDVI (8-day)".to_string(),
                opacity: OverlayOpacity::default(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_carry_attribution() {
        let tiles = TileSources::default();
        assert!(!tiles.street.attribution.is_empty());
        assert!(!tiles.satellite.attribution.is_empty());
        assert_eq!(tiles.ndvi.layer, "MODIS_Terra_NDVI_8Day");
        assert_eq!(tiles.ndvi.opacity.percent(), 70);
    }

    #[test]
    fn test_wms_defaults_from_partial_toml() {
        let wms: WmsTileSource = toml::from_str(
            r#"
            url = "https://example.org/wms"
            layer = "NDVI"
            attribution = "x"
            opacity = 40
            "#,
        )
        .unwrap();
        assert_eq!(wms.format, "image/png");
        assert!(wms.transparent);
        assert_eq!(wms.opacity.percent(), 40);
    }

    #[test]
    fn test_partial_sources_keep_defaults() {
        let tiles: TileSources = toml::from_str(
            r#"
            [ndvi]
            url = "https://example.org/wms"
            layer = "NDVI_16Day"
            attribution = "x"
            "#,
        )
        .unwrap();
        assert_eq!(tiles.ndvi.layer, "NDVI_16Day");
        assert_eq!(tiles.street, TileSources::default().street);
    }
}
