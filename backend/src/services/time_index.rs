//! Time-index resolution and date navigation.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::{IndexDocument, TimeKey};

/// The resolver has nothing to navigate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimeIndexError {
    #[error("No data available: {0}")]
    Unusable(String),
}

/// Navigation direction for prev/next controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[serde(alias = "prev")]
    Previous,
    Next,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prev" | "previous" | "back" => Ok(Self::Previous),
            "next" | "forward" => Ok(Self::Next),
            _ => Err(format!("Unknown direction: {}", s)),
        }
    }
}

/// Snapshot of the navigation controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationState {
    pub keys: Vec<TimeKey>,
    pub base: TimeKey,
    pub active: TimeKey,
    /// Days from `base` to `active`, when both are calendar keys.
    pub lead_days: Option<i64>,
    pub has_previous: bool,
    pub has_next: bool,
}

/// Sorted set of available time keys with a base and an active key.
///
/// Invariant: `keys` is non-empty, sorted, duplicate-free, and `active`
/// always indexes into it.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeIndexResolver {
    keys: Vec<TimeKey>,
    base: TimeKey,
    active: usize,
}

impl TimeIndexResolver {
    /// Build from UI-supplied keys. Base and active key are the last key.
    pub fn from_keys(keys: impl IntoIterator<Item = TimeKey>) -> Result<Self, TimeIndexError> {
        let keys = normalize(keys);
        let base = keys
            .last()
            .cloned()
            .ok_or_else(|| TimeIndexError::Unusable("no dates listed".to_string()))?;
        Ok(Self {
            active: keys.len() - 1,
            keys,
            base,
        })
    }

    /// Build from `index.json`. The base is `latest`, falling back to the last date.
    pub fn from_index_document(doc: &IndexDocument) -> Result<Self, TimeIndexError> {
        let keys = normalize(doc.dates.iter().cloned());
        if keys.is_empty() {
            return Err(TimeIndexError::Unusable("index lists no dates".to_string()));
        }

        let base = doc
            .latest
            .clone()
            .filter(|k| !k.as_str().trim().is_empty())
            .or_else(|| keys.last().cloned())
            .ok_or_else(|| TimeIndexError::Unusable("index lists no dates".to_string()))?;

        let active = keys
            .iter()
            .position(|k| *k == base)
            .unwrap_or(keys.len() - 1);

        Ok(Self { keys, base, active })
    }

    pub fn keys(&self) -> &[TimeKey] {
        &self.keys
    }

    pub fn base(&self) -> &TimeKey {
        &self.base
    }

    pub fn active(&self) -> &TimeKey {
        &self.keys[self.active]
    }

    /// Make `key` active. Unknown keys are ignored; returns whether it was applied.
    pub fn select_key(&mut self, key: &TimeKey) -> bool {
        match self.keys.binary_search(key) {
            Ok(index) => {
                self.active = index;
                true
            }
            Err(_) => false,
        }
    }

    /// Whether a step in `direction` is possible from the active key.
    pub fn can_step(&self, direction: Direction) -> bool {
        match direction {
            Direction::Previous => self.active > 0,
            Direction::Next => self.active + 1 < self.keys.len(),
        }
    }

    /// Move one entry in `direction`. No-op at either end; returns whether it moved.
    pub fn step(&mut self, direction: Direction) -> bool {
        if !self.can_step(direction) {
            return false;
        }
        match direction {
            Direction::Previous => self.active -= 1,
            Direction::Next => self.active += 1,
        }
        true
    }

    /// Signed whole days from the base key to `key`.
    pub fn lead_time(&self, key: &TimeKey) -> Option<i64> {
        key.days_since(&self.base)
    }

    pub fn active_lead_time(&self) -> Option<i64> {
        self.lead_time(self.active())
    }

    pub fn navigation(&self) -> NavigationState {
        NavigationState {
            keys: self.keys.clone(),
            base: self.base.clone(),
            active: self.active().clone(),
            lead_days: self.active_lead_time(),
            has_previous: self.can_step(Direction::Previous),
            has_next: self.can_step(Direction::Next),
        }
    }
}

fn normalize(keys: impl IntoIterator<Item = TimeKey>) -> Vec<TimeKey> {
    let mut keys: Vec<TimeKey> = keys
        .into_iter()
        .filter(|k| !k.as_str().trim().is_empty())
        .collect();
    keys.sort();
    keys.dedup();
    keys
}
