use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of days after the base date at which the lead fade bottoms out.
pub const FADE_HORIZON_DAYS: f64 = 46.0;

/// Opaque time bucket identifier (ISO date or ISO week label).
///
/// Lexicographic ordering on the string coincides with chronological ordering
/// for `YYYY-MM-DD` and `YYYY-Www` keys, so `Ord` is derived from the string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeKey(String);

impl TimeKey {
    /// Create a new time key.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Calendar date of this key at UTC midnight.
    ///
    /// ISO dates map to themselves, ISO week labels map to the Monday of that
    /// week. Anything else has no calendar date.
    pub fn to_date(&self) -> Option<NaiveDate> {
        let s = self.0.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Some(date);
        }
        parse_iso_week(s)
    }

    /// Signed whole-day difference `self - base`.
    ///
    /// Both keys are reduced to calendar dates first, so the result never
    /// depends on the local timezone.
    pub fn days_since(&self, base: &TimeKey) -> Option<i64> {
        let this = self.to_date()?;
        let base = base.to_date()?;
        Some((this - base).num_days())
    }
}

impl fmt::Display for TimeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TimeKey {
    fn from(v: &str) -> Self {
        TimeKey::new(v)
    }
}

impl From<String> for TimeKey {
    fn from(v: String) -> Self {
        TimeKey(v)
    }
}

/// `YYYY-Www` (also accepts lowercase `w`).
fn parse_iso_week(s: &str) -> Option<NaiveDate> {
    let (year, week) = s.split_once('-')?;
    let week = week.strip_prefix('W').or_else(|| week.strip_prefix('w'))?;
    if year.len() != 4 || week.is_empty() || week.len() > 2 {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let week: u32 = week.parse().ok()?;
    NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
}

/// Opacity multiplier for data shown `lead_days` after the base date.
///
/// `1 - lead/46`, clamped to `[0.35, 1.0]`. Dates at or before the base are
/// never faded.
pub fn lead_fade(lead_days: i64) -> f64 {
    if lead_days <= 0 {
        return 1.0;
    }
    (1.0 - lead_days as f64 / FADE_HORIZON_DAYS).clamp(0.35, 1.0)
}
