use serde::{Deserialize, Serialize};

/// Overlay opacity as an integer percent, as set by the UI slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct OverlayOpacity(u8);

impl OverlayOpacity {
    /// Clamp any integer into `0..=100`.
    pub fn from_percent(percent: i64) -> Self {
        Self(percent.clamp(0, 100) as u8)
    }

    pub fn percent(&self) -> u8 {
        self.0
    }

    /// Opacity in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Slider label, e.g. `70%`.
    pub fn label(&self) -> String {
        format!("{}%", self.0)
    }
}

impl Default for OverlayOpacity {
    fn default() -> Self {
        Self(70)
    }
}

impl From<i64> for OverlayOpacity {
    fn from(v: i64) -> Self {
        OverlayOpacity::from_percent(v)
    }
}

impl From<OverlayOpacity> for u8 {
    fn from(v: OverlayOpacity) -> Self {
        v.0
    }
}
