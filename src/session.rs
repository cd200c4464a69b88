use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use hexgrid::CellId;

use crate::{
    config::EditorConfig,
    county::{CountySource, GeoId, GeometryIndex},
    editor::{CellView, GridOverlay, MapHost, MaskView, OverlayMode},
    grid::{GridCache, HexGridBuilder, IdleHost, IdleTicket, SharedGridCache},
    selection::{CountySelectionReconciler, CoverageStore, PersistedCoverage, SelectedCounty},
};

/// Receives the session's outward notifications.
pub trait CoverageListener {
    /// A paint or click was committed for `geo_id`.
    fn zones_changed(&mut self, geo_id: &GeoId, zones: &[CellId]);

    /// The selected county list changed.
    fn counties_changed(&mut self, counties: &[SelectedCounty]);

    /// A grid finished building.
    fn grid_ready(&mut self, _geo_id: &GeoId, _cells: usize) {}
}

/// Listener that keeps every notification, in order. Nothing is ever
/// released, so it suits tests and one-shot tools, not a long-lived page.
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    pub zones: Vec<(GeoId, Vec<CellId>)>,
    pub counties: Vec<Vec<SelectedCounty>>,
    pub grids: Vec<(GeoId, usize)>,
}

impl CoverageListener for RecordingListener {
    fn zones_changed(&mut self, geo_id: &GeoId, zones: &[CellId]) {
        self.zones.push((geo_id.clone(), zones.to_vec()));
    }

    fn counties_changed(&mut self, counties: &[SelectedCounty]) {
        self.counties.push(counties.to_vec());
    }

    fn grid_ready(&mut self, geo_id: &GeoId, cells: usize) {
        self.grids.push((geo_id.clone(), cells));
    }
}

/// One outward notification, as handed to the map host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CoverageEvent {
    #[serde(rename_all = "camelCase")]
    ZonesChanged { geo_id: GeoId, zones: Vec<CellId> },
    CountiesChanged { counties: Vec<SelectedCounty> },
    #[serde(rename_all = "camelCase")]
    GridReady { geo_id: GeoId, cells: usize },
}

impl CoverageEvent {
    /// Whether `self` makes `older` obsolete.
    fn supersedes(&self, older: &CoverageEvent) -> bool {
        use CoverageEvent::*;
        match (self, older) {
            (ZonesChanged { geo_id: a, .. }, ZonesChanged { geo_id: b, .. }) => a == b,
            (CountiesChanged { .. }, CountiesChanged { .. }) => true,
            (GridReady { geo_id: a, .. }, GridReady { geo_id: b, .. }) => a == b,
            _ => false,
        }
    }
}

/// Listener that buffers notifications until the host drains them.
///
/// Undrained events are coalesced: only the latest zone list per county,
/// the latest county list and the latest grid per county are kept.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<CoverageEvent>,
}

impl EventQueue {
    pub fn new() -> Self { Self::default() }

    #[inline] pub fn len(&self) -> usize { self.events.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.events.is_empty() }

    /// Pending events, oldest first, leaving the queue empty.
    pub fn take(&mut self) -> Vec<CoverageEvent> { std::mem::take(&mut self.events) }

    fn push(&mut self, event: CoverageEvent) {
        self.events.retain(|older| !event.supersedes(older));
        self.events.push(event);
    }
}

impl CoverageListener for EventQueue {
    fn zones_changed(&mut self, geo_id: &GeoId, zones: &[CellId]) {
        self.push(CoverageEvent::ZonesChanged { geo_id: geo_id.clone(), zones: zones.to_vec() });
    }

    fn counties_changed(&mut self, counties: &[SelectedCounty]) {
        self.push(CoverageEvent::CountiesChanged { counties: counties.to_vec() });
    }

    fn grid_ready(&mut self, geo_id: &GeoId, cells: usize) {
        self.push(CoverageEvent::GridReady { geo_id: geo_id.clone(), cells });
    }
}

/// Everything the map host should draw, bottom layer first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Frame {
    /// Saved zones of selected counties other than the one being edited.
    pub zones: Vec<CellView>,
    pub mask: Vec<MaskView>,
    /// The editable grid of the active county.
    pub cells: Vec<CellView>,
    pub loading: bool,
}

/// The coverage editing page: the county selection, the zone editor for at
/// most one active county, and read-only overlays for the other counties
/// with saved zones.
pub struct CoverageSession<H, L> {
    config: EditorConfig,
    host: H,
    listener: L,
    cache: SharedGridCache,
    index: Option<Arc<GeometryIndex>>,
    selection: CountySelectionReconciler,
    persisted: PersistedCoverage,
    active: Option<GridOverlay>,
    views: Vec<GridOverlay>,
    zoom: f64,
}

impl<H: MapHost + IdleHost, L: CoverageListener> CoverageSession<H, L> {
    /// A session that will hydrate from `persisted` once the dataset loads.
    pub fn new(config: EditorConfig, host: H, listener: L, persisted: PersistedCoverage) -> Self {
        Self::with_cache(config, host, listener, persisted, GridCache::shared())
    }

    pub fn with_cache(config: EditorConfig, host: H, listener: L, persisted: PersistedCoverage, cache: SharedGridCache) -> Self {
        Self {
            config,
            host,
            listener,
            cache,
            index: None,
            selection: CountySelectionReconciler::new(),
            persisted,
            active: None,
            views: Vec::new(),
            zoom: 0.0,
        }
    }

    #[inline] pub fn config(&self) -> &EditorConfig { &self.config }

    #[inline] pub fn host(&self) -> &H { &self.host }

    #[inline] pub fn host_mut(&mut self) -> &mut H { &mut self.host }

    #[inline] pub fn listener(&self) -> &L { &self.listener }

    #[inline] pub fn listener_mut(&mut self) -> &mut L { &mut self.listener }

    #[inline] pub fn cache(&self) -> &SharedGridCache { &self.cache }

    #[inline] pub fn index(&self) -> Option<&Arc<GeometryIndex>> { self.index.as_ref() }

    #[inline] pub fn counties(&self) -> &[SelectedCounty] { self.selection.counties() }

    #[inline] pub fn selection(&self) -> &CountySelectionReconciler { &self.selection }

    #[inline] pub fn zoom(&self) -> f64 { self.zoom }

    pub fn active_county(&self) -> Option<&GeoId> { self.active.as_ref().map(|o| &o.county().geo_id) }

    #[inline] pub fn active_overlay(&self) -> Option<&GridOverlay> { self.active.as_ref() }

    #[inline] pub fn view_overlays(&self) -> &[GridOverlay] { &self.views }

    /// True while any visible overlay is still building.
    pub fn is_loading(&self) -> bool {
        self.active.iter().chain(&self.views).any(GridOverlay::is_loading)
    }

    fn builder(&self) -> HexGridBuilder { HexGridBuilder::from_config(&self.config) }

    fn grid_visible(&self) -> bool { self.zoom >= self.config.min_zoom }

    /// The reference dataset finished loading, or failed to. A failure
    /// leaves the selection untouched.
    pub fn dataset_loaded(&mut self, index: Result<GeometryIndex>) {
        let index = match index {
            Ok(index) => Arc::new(index),
            Err(e) => {
                self.selection.hydrate_failed(&e);
                return
            }
        };

        let changed = self.selection.hydrate(&index, &self.persisted);
        self.index = Some(index);
        if changed { self.listener.counties_changed(self.selection.counties()) }
        self.sync_views();
    }

    /// Load the dataset from `source` and feed it to [`dataset_loaded`](Self::dataset_loaded).
    pub fn load_dataset(&mut self, source: &dyn CountySource) {
        self.dataset_loaded(GeometryIndex::load(source));
    }

    /// The map picker emitted its selection list.
    pub fn picker_changed(&mut self, emitted: Vec<SelectedCounty>) {
        if !self.selection.apply_emitted(emitted) { return }

        if let Some(geo_id) = self.active_county().cloned() {
            match self.selection.get(&geo_id).map(|county| county.zone.clone()) {
                Some(zone) => if let Some(active) = self.active.as_mut() { active.sync_zone(zone) },
                None => self.stop_editing(),
            }
        }

        self.listener.counties_changed(self.selection.counties());
        self.sync_views();
    }

    /// Toggle the county under (`lon`, `lat`). Returns the county toggled.
    pub fn pick_at(&mut self, lon: f64, lat: f64) -> Option<GeoId> {
        let feature = self.index.as_ref()?.locate(lon, lat)?.clone();
        self.picker_changed(vec![SelectedCounty::from_feature(&feature)]);
        Some(feature.geo_id.clone())
    }

    /// Open `geo_id` in the zone editor, or close it if it already is.
    /// Returns whether a county is being edited afterwards.
    pub fn edit_county(&mut self, geo_id: &GeoId) -> bool {
        if self.active_county() == Some(geo_id) {
            self.stop_editing();
            return false
        }

        let Some(county) = self.selection.get(geo_id) else {
            tracing::debug!(%geo_id, "cannot edit an unselected county");
            return self.active.is_some()
        };
        let Some(feature) = self.index.as_ref().and_then(|index| index.get(geo_id.as_str())).cloned() else {
            tracing::debug!(%geo_id, "county not in dataset");
            return self.active.is_some()
        };

        let zone = county.zone.clone();
        self.close_active();

        let visible = self.grid_visible();
        let mut overlay = GridOverlay::new(feature, zone, self.builder(), OverlayMode::Edit, self.cache.clone(), self.config.batch_size);
        overlay.attach(&mut self.host);
        overlay.set_visible(&mut self.host, visible);
        self.active = Some(overlay);

        tracing::debug!(%geo_id, "editing zones");
        self.sync_views();
        true
    }

    /// Close the zone editor without committing an unfinished paint.
    pub fn stop_editing(&mut self) {
        if self.close_active() { self.sync_views() }
    }

    fn close_active(&mut self) -> bool {
        let Some(mut overlay) = self.active.take() else { return false };
        overlay.teardown(&mut self.host);
        true
    }

    /// Drop `geo_id` from the selection, closing its editor if open.
    pub fn remove_county(&mut self, geo_id: &GeoId) -> bool {
        if !self.selection.remove(geo_id) { return false }
        if self.active_county() == Some(geo_id) { self.close_active(); }
        self.listener.counties_changed(self.selection.counties());
        self.sync_views();
        true
    }

    /// Map zoom changed; grids only show at `min_zoom` and above.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
        let visible = self.grid_visible();
        for overlay in self.active.iter_mut().chain(&mut self.views) {
            overlay.set_visible(&mut self.host, visible);
        }
    }

    /// Change grid resolution or clip mode, restarting every build.
    pub fn set_grid_params(&mut self, grid_size: u32, clip_edges: bool) {
        self.config.grid_size = grid_size;
        self.config.clip_edges = clip_edges;
        let builder = self.builder();
        for overlay in self.active.iter_mut().chain(&mut self.views) {
            overlay.set_builder(&mut self.host, builder);
        }
    }

    pub fn pointer_down(&mut self, erase: bool) -> bool {
        match self.active.as_mut() {
            Some(active) => active.pointer_down(&mut self.host, erase),
            None => false,
        }
    }

    pub fn pointer_move(&mut self, cell: CellId) -> bool {
        self.active.as_mut().is_some_and(|active| active.pointer_move(cell))
    }

    /// Pointer released anywhere; commits a paint in progress.
    pub fn pointer_up(&mut self) -> Option<Vec<CellId>> {
        let zones = self.active.as_mut()?.pointer_up(&mut self.host)?;
        self.commit_zones(&zones);
        Some(zones)
    }

    pub fn click_cell(&mut self, cell: CellId) -> Option<Vec<CellId>> {
        let zones = self.active.as_mut()?.click(cell)?;
        self.commit_zones(&zones);
        Some(zones)
    }

    fn commit_zones(&mut self, zones: &[CellId]) {
        let Some(geo_id) = self.active_county().cloned() else { return };
        self.listener.zones_changed(&geo_id, zones);
        if self.selection.update_zones(&geo_id, zones) {
            self.listener.counties_changed(self.selection.counties());
        }
    }

    /// Deliver an idle slot to whichever overlay requested it.
    pub fn on_idle(&mut self, ticket: IdleTicket) {
        for overlay in self.active.iter_mut().chain(&mut self.views) {
            if overlay.on_idle(&mut self.host, ticket) {
                self.listener.grid_ready(&overlay.county().geo_id, overlay.cells().len());
            }
        }
    }

    pub fn render(&self) -> Frame {
        let mut frame = Frame { loading: self.is_loading(), ..Frame::default() };
        for view in &self.views {
            frame.zones.extend(view.render());
        }
        if let Some(active) = &self.active {
            frame.mask = active.mask();
            frame.cells = active.render();
        }
        frame
    }

    /// Write the selection's FIPS codes to `store`.
    pub fn save(&mut self, store: &mut dyn CoverageStore) -> Result<PersistedCoverage> {
        let coverage = self.selection.to_persisted();
        store.set_fips(&coverage)?;
        tracing::info!(counties = coverage.len(), "saved operating counties");
        self.persisted = coverage.clone();
        Ok(coverage)
    }

    /// Cancel all builds and release the map.
    pub fn teardown(&mut self) {
        self.close_active();
        for mut overlay in self.views.drain(..) {
            overlay.teardown(&mut self.host);
        }
    }

    /// Keep one read-only overlay per selected county with saved zones,
    /// other than the active one.
    fn sync_views(&mut self) {
        let Some(index) = self.index.clone() else { return };
        let active = self.active_county().cloned();
        let wanted: Vec<&SelectedCounty> = self.selection.counties().iter()
            .filter(|c| c.is_partial() && Some(&c.geo_id) != active.as_ref())
            .collect();

        let mut kept = Vec::with_capacity(wanted.len());
        for mut overlay in std::mem::take(&mut self.views) {
            match wanted.iter().find(|c| c.geo_id == overlay.county().geo_id) {
                Some(county) => {
                    overlay.sync_zone(county.zone.iter().copied());
                    kept.push(overlay);
                }
                None => overlay.teardown(&mut self.host),
            }
        }

        let visible = self.grid_visible();
        let builder = self.builder();
        for county in wanted {
            if kept.iter().any(|o: &GridOverlay| o.county().geo_id == county.geo_id) { continue }
            let Some(feature) = index.get(county.geo_id.as_str()) else { continue };
            let mut overlay = GridOverlay::new(
                feature.clone(), county.zone.iter().copied(), builder, OverlayMode::View, self.cache.clone(), self.config.batch_size,
            );
            overlay.set_visible(&mut self.host, visible);
            kept.push(overlay);
        }

        self.views = kept;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u32]) -> Vec<CellId> { raw.iter().copied().map(CellId).collect() }

    #[test]
    fn queue_keeps_latest_per_county() {
        let a = GeoId::from("0500000US17001");
        let b = GeoId::from("0500000US17003");
        let mut queue = EventQueue::new();
        queue.zones_changed(&a, &ids(&[1]));
        queue.zones_changed(&b, &ids(&[2]));
        queue.grid_ready(&a, 40);
        queue.zones_changed(&a, &ids(&[1, 3]));
        queue.counties_changed(&[]);
        queue.counties_changed(&[]);

        assert_eq!(queue.take(), vec![
            CoverageEvent::ZonesChanged { geo_id: b, zones: ids(&[2]) },
            CoverageEvent::GridReady { geo_id: a.clone(), cells: 40 },
            CoverageEvent::ZonesChanged { geo_id: a, zones: ids(&[1, 3]) },
            CoverageEvent::CountiesChanged { counties: Vec::new() },
        ]);
        assert!(queue.is_empty());
    }

    #[test]
    fn events_serialize_with_a_kind_tag() {
        let event = CoverageEvent::ZonesChanged { geo_id: GeoId::from("0500000US17001"), zones: ids(&[7]) };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "zonesChanged", "geoId": "0500000US17001", "zones": [7] }));
    }
}
