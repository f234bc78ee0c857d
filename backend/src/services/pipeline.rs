//! The map controller: single owner of the time index, fetcher and compositor.
//!
//! One refresh cycle:
//! 1. take a generation ticket from the compositor
//! 2. fetch every enabled layer for the active key (sequentially, or
//!    concurrently when `parallel_fetch` is set), never failing
//! 3. style loaded layers, record missing ones with the location tried
//! 4. read `meta.json` when anything loaded
//! 5. commit: clear, add, fit, unless a newer refresh already committed
//!
//! Locks are only held for the synchronous parts; fetches run unlocked.

use futures::future::join_all;
use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::Arc;

use super::compositor::{render_layer, CommitSummary, MapCompositor, MapSurface, RenderedOverlay};
use super::histogram::{self, HistogramChart, HistogramError};
use super::status::{MissingLayer, MissingReason, RefreshStatus};
use super::time_index::{Direction, NavigationState, TimeIndexError, TimeIndexResolver};
use crate::models::{FeatureCollection, LayerCatalogue, LayerDescriptor, LayerId, TimeKey};
use crate::source::{DataSource, FetchOutcome, LayerFetcher, PipelineConfig, PipelineSettings};

/// Result of one refresh cycle.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub status: RefreshStatus,
    pub message: String,
    /// `None` when the cycle was superseded or could not run.
    pub committed: Option<CommitSummary>,
}

impl RefreshReport {
    fn new(status: RefreshStatus, committed: Option<CommitSummary>) -> Self {
        Self {
            message: status.message(),
            status,
            committed,
        }
    }
}

pub struct MapController<M: MapSurface> {
    fetcher: LayerFetcher,
    catalogue: LayerCatalogue,
    settings: PipelineSettings,
    resolver: RwLock<Option<TimeIndexResolver>>,
    compositor: Mutex<MapCompositor<M>>,
}

impl<M: MapSurface> MapController<M> {
    pub fn new(fetcher: LayerFetcher, catalogue: LayerCatalogue, settings: PipelineSettings, map: M) -> Self {
        Self {
            fetcher,
            catalogue,
            settings,
            resolver: RwLock::new(None),
            compositor: Mutex::new(MapCompositor::new(map)),
        }
    }

    /// Controller for a loaded configuration reading from `source`.
    pub fn from_config(config: &PipelineConfig, source: Arc<dyn DataSource>, map: M) -> Self {
        let fetcher = LayerFetcher::new(source, config.pipeline.mode);
        Self::new(fetcher, config.layers.clone(), config.pipeline.clone(), map)
    }

    pub fn catalogue(&self) -> &LayerCatalogue {
        &self.catalogue
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn fetcher(&self) -> &LayerFetcher {
        &self.fetcher
    }

    /// Resolve the time index.
    ///
    /// Without temporal navigation there is nothing to resolve and `Ok(None)`
    /// is returned. Static dates from the settings win over `index.json`.
    pub async fn initialize(&self) -> Result<Option<NavigationState>, TimeIndexError> {
        if !self.settings.temporal_navigation() {
            *self.resolver.write() = None;
            return Ok(None);
        }

        let resolver = self.resolve_index().await?;
        info!(
            "Time index resolved: {} key(s), base {}",
            resolver.keys().len(),
            resolver.base()
        );
        let navigation = resolver.navigation();
        *self.resolver.write() = Some(resolver);
        Ok(Some(navigation))
    }

    /// Re-read `index.json` so dates published since the last read appear.
    ///
    /// The active key survives when it is still listed, otherwise the base
    /// key becomes active. If the index cannot be read the previous resolver
    /// is kept; without one the error is returned. Static dates never change,
    /// so they are resolved once.
    pub async fn reload_index(&self) -> Result<Option<NavigationState>, TimeIndexError> {
        if !self.settings.temporal_navigation() {
            return Ok(None);
        }
        if !self.settings.dates.is_empty() {
            return match self.navigation() {
                Some(navigation) => Ok(Some(navigation)),
                None => self.initialize().await,
            };
        }

        match self.resolve_index().await {
            Ok(mut resolver) => {
                let mut guard = self.resolver.write();
                if let Some(previous) = guard.as_ref() {
                    if !resolver.select_key(previous.active()) {
                        debug!("Active key {} no longer published, using base {}", previous.active(), resolver.base());
                    }
                }
                let navigation = resolver.navigation();
                *guard = Some(resolver);
                Ok(Some(navigation))
            }
            Err(error) => self.navigation().map(Some).ok_or(error),
        }
    }

    pub fn navigation(&self) -> Option<NavigationState> {
        self.resolver.read().as_ref().map(TimeIndexResolver::navigation)
    }

    pub fn active_key(&self) -> Option<TimeKey> {
        self.resolver.read().as_ref().map(|r| r.active().clone())
    }

    /// Make `key` active. Keys outside the index are ignored.
    pub fn select_date(&self, key: &TimeKey) -> Result<NavigationState, TimeIndexError> {
        let mut guard = self.resolver.write();
        let resolver = guard.as_mut().ok_or_else(not_initialized)?;
        if !resolver.select_key(key) {
            debug!("Ignoring selection of unknown key {}", key);
        }
        Ok(resolver.navigation())
    }

    /// Move the active key one step. No-op at either end.
    pub fn step(&self, direction: Direction) -> Result<NavigationState, TimeIndexError> {
        let mut guard = self.resolver.write();
        let resolver = guard.as_mut().ok_or_else(not_initialized)?;
        resolver.step(direction);
        Ok(resolver.navigation())
    }

    /// Run one refresh cycle for the enabled `layers`.
    pub async fn refresh(&self, layers: &[LayerId]) -> RefreshReport {
        self.refresh_with(layers, |_, _| ()).await.0
    }

    /// Run one refresh cycle, then call `inspect` with the map and tracked
    /// layers under the same lock as the commit.
    ///
    /// The inspected state is the map as it stood right after this cycle's
    /// commit; when the cycle was superseded it is the newer cycle's map.
    pub async fn refresh_with<R>(
        &self,
        layers: &[LayerId],
        inspect: impl FnOnce(&M, &[LayerId]) -> R,
    ) -> (RefreshReport, R) {
        if let Err(error) = self.reload_index().await {
            debug!("Refreshing without a time index: {}", error);
        }

        let (key, lead_days) = match self.refresh_scope() {
            Ok(scope) => scope,
            Err(TimeIndexError::Unusable(reason)) => {
                let status = RefreshStatus {
                    requested: layers.len(),
                    unavailable: Some(reason),
                    ..Default::default()
                };
                let compositor = self.compositor.lock();
                let inspected = inspect(compositor.map(), &compositor.tracked_layers());
                return (RefreshReport::new(status, None), inspected);
            }
        };

        let ticket = self.compositor.lock().begin_refresh();

        let mut requested: Vec<&LayerId> = Vec::new();
        for id in layers {
            if !requested.contains(&id) {
                requested.push(id);
            }
        }

        let mut status = RefreshStatus {
            key: key.clone(),
            requested: requested.len(),
            ..Default::default()
        };

        let mut descriptors: Vec<&LayerDescriptor> = Vec::new();
        for id in requested {
            match self.catalogue.get(id) {
                Some(descriptor) => descriptors.push(descriptor),
                None => status.missing.push(MissingLayer {
                    layer: id.clone(),
                    location: String::new(),
                    reason: MissingReason::UnknownLayer,
                    detail: format!("layer '{}' is not in the catalogue", id),
                }),
            }
        }

        let outcomes = self.fetch_layers(key.as_ref(), &descriptors).await;

        let mut overlays: Vec<RenderedOverlay> = Vec::new();
        for (descriptor, outcome) in descriptors.iter().zip(outcomes) {
            match outcome {
                FetchOutcome::Loaded {
                    data,
                    location,
                    revision,
                } => {
                    overlays.push(render_layer(descriptor, &data, location, revision, lead_days));
                    status.loaded.push(descriptor.id.clone());
                }
                FetchOutcome::Missing { location, error } => status.missing.push(MissingLayer {
                    layer: descriptor.id.clone(),
                    location,
                    reason: MissingReason::from_error(&error),
                    detail: error.to_string(),
                }),
            }
        }

        if !overlays.is_empty() {
            status.freshness = self
                .fetcher
                .fetch_meta(key.as_ref())
                .await
                .data()
                .and_then(|meta| meta.freshness_note());
        }

        let (committed, inspected) = {
            let mut compositor = self.compositor.lock();
            let committed = compositor.commit(ticket, overlays, self.settings.fit_padding);
            let inspected = inspect(compositor.map(), &compositor.tracked_layers());
            (committed, inspected)
        };
        status.superseded = committed.is_none();

        let report = RefreshReport::new(status, committed);
        info!("Refresh {}: {}", ticket.generation(), report.message);
        (report, inspected)
    }

    /// Histogram for the active key, or the latest folder.
    pub async fn load_histogram(&self) -> Result<HistogramChart, HistogramError> {
        let key = self.active_key();
        histogram::load_histogram(&self.fetcher, key.as_ref()).await
    }

    /// Remove every overlay from the map.
    pub fn clear(&self) {
        self.compositor.lock().clear();
    }

    pub fn tracked_layers(&self) -> Vec<LayerId> {
        self.compositor.lock().tracked_layers()
    }

    /// Run `f` against the map while holding the compositor.
    pub fn with_map<R>(&self, f: impl FnOnce(&M) -> R) -> R {
        f(self.compositor.lock().map())
    }

    /// Build a resolver from the static dates or a fresh read of `index.json`.
    async fn resolve_index(&self) -> Result<TimeIndexResolver, TimeIndexError> {
        if !self.settings.dates.is_empty() {
            return TimeIndexResolver::from_keys(self.settings.dates.iter().cloned());
        }
        match self.fetcher.fetch_index().await {
            FetchOutcome::Loaded { data, .. } => TimeIndexResolver::from_index_document(&data),
            FetchOutcome::Missing { location, error } => {
                warn!("Time index unavailable at {}: {}", location, error);
                Err(TimeIndexError::Unusable(format!("index unavailable at {}", location)))
            }
        }
    }

    /// Active key and fade lead time for the next refresh.
    fn refresh_scope(&self) -> Result<(Option<TimeKey>, Option<i64>), TimeIndexError> {
        if !self.settings.temporal_navigation() {
            return Ok((None, None));
        }
        let guard = self.resolver.read();
        let resolver = guard.as_ref().ok_or_else(not_initialized)?;
        let lead_days = if self.settings.fade_enabled() {
            resolver.active_lead_time()
        } else {
            None
        };
        Ok((Some(resolver.active().clone()), lead_days))
    }

    async fn fetch_layers(
        &self,
        key: Option<&TimeKey>,
        descriptors: &[&LayerDescriptor],
    ) -> Vec<FetchOutcome<FeatureCollection>> {
        if self.settings.parallel_fetch {
            join_all(descriptors.iter().map(|d| self.fetcher.fetch_layer(key, d))).await
        } else {
            let mut outcomes = Vec::with_capacity(descriptors.len());
            for descriptor in descriptors {
                outcomes.push(self.fetcher.fetch_layer(key, descriptor).await);
            }
            outcomes
        }
    }
}

fn not_initialized() -> TimeIndexError {
    TimeIndexError::Unusable("time index not loaded".to_string())
}
