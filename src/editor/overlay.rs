use std::{collections::BTreeSet, sync::Arc};

use geo::{BooleanOps, MultiPolygon, Polygon, polygon};

use hexgrid::CellId;

use crate::{
    county::CountyFeature,
    grid::{BuildEvent, GridCell, GridKey, GridRequest, HexGridBuilder, IdleHost, IdleTicket, IncrementalScheduler, LatLng, SharedGridCache, swap_ring},
};

use super::{CellView, MapHost, MaskView, PathStyle, ZoneSelectionController};

/// Whether an overlay is the interactive editor or a read-only display of
/// saved zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayMode {
    Edit,
    View,
}

/// The hex grid drawn over one county: owns its build, its zone state and
/// the render instructions derived from them.
#[derive(Debug)]
pub struct GridOverlay {
    county: Arc<CountyFeature>,
    builder: HexGridBuilder,
    mode: OverlayMode,
    visible: bool,
    scheduler: IncrementalScheduler,
    cells: Arc<[GridCell]>,
    loading: bool,
    controller: ZoneSelectionController,
    mask: Vec<Vec<Vec<LatLng>>>,
    listening: bool,
}

impl GridOverlay {
    pub fn new(
        county: Arc<CountyFeature>,
        zone: impl IntoIterator<Item = CellId>,
        builder: HexGridBuilder,
        mode: OverlayMode,
        cache: SharedGridCache,
        batch_size: usize,
    ) -> Self {
        let editable = mode == OverlayMode::Edit;
        let mask = if editable { outside_mask(&county.geometry) } else { Vec::new() };
        Self {
            county,
            builder,
            mode,
            visible: false,
            scheduler: IncrementalScheduler::new(cache, batch_size),
            cells: Arc::from(Vec::new()),
            loading: false,
            controller: ZoneSelectionController::new(zone, editable),
            mask,
            listening: false,
        }
    }

    #[inline] pub fn county(&self) -> &Arc<CountyFeature> { &self.county }

    #[inline] pub fn mode(&self) -> OverlayMode { self.mode }

    #[inline] pub fn builder(&self) -> HexGridBuilder { self.builder }

    #[inline] pub fn key(&self) -> GridKey { self.builder.key(&self.county.geo_id) }

    #[inline] pub fn is_visible(&self) -> bool { self.visible }

    /// True while a build for the current parameters is outstanding.
    #[inline] pub fn is_loading(&self) -> bool { self.loading }

    #[inline] pub fn cells(&self) -> &[GridCell] { &self.cells }

    #[inline] pub fn zone(&self) -> &BTreeSet<CellId> { self.controller.zone() }

    #[inline] pub fn controller(&self) -> &ZoneSelectionController { &self.controller }

    /// Register paint listeners with the map (edit mode only).
    pub fn attach(&mut self, map: &mut dyn MapHost) {
        if self.mode == OverlayMode::Edit && !self.listening {
            map.attach_paint_listeners();
            self.listening = true;
        }
    }

    pub fn set_visible(&mut self, host: &mut dyn IdleHost, visible: bool) {
        if self.visible == visible { return }
        self.visible = visible;
        self.refresh(host);
    }

    /// Switch grid parameters, restarting the build.
    pub fn set_builder(&mut self, host: &mut dyn IdleHost, builder: HexGridBuilder) {
        if self.builder == builder { return }
        self.builder = builder;
        self.refresh(host);
    }

    /// Bring the cells in line with visibility and parameters: served from
    /// cache when possible, otherwise scheduled.
    pub fn refresh(&mut self, host: &mut dyn IdleHost) {
        if !self.visible {
            self.scheduler.cancel(host);
            self.cells = Arc::from(Vec::new());
            self.loading = false;
            return
        }

        match self.scheduler.request(host, self.county.clone(), self.builder) {
            GridRequest::Ready(cells) => {
                self.cells = cells;
                self.loading = false;
            }
            GridRequest::Scheduled => {
                self.cells = Arc::from(Vec::new());
                self.loading = true;
            }
        }
    }

    /// Deliver an idle slot. Returns `true` if the cells changed.
    pub fn on_idle(&mut self, host: &mut dyn IdleHost, ticket: IdleTicket) -> bool {
        match self.scheduler.on_idle(host, ticket) {
            Some(BuildEvent::Completed { key, cells }) if key == self.key() => {
                tracing::debug!(county = %key.county, cells = cells.len(), "grid ready");
                self.cells = cells;
                self.loading = false;
                true
            }
            Some(BuildEvent::Failed { key, .. }) if key == self.key() => {
                self.cells = Arc::from(Vec::new());
                self.loading = false;
                true
            }
            Some(_) => {
                tracing::trace!("discarding grid for superseded parameters");
                false
            }
            None => false,
        }
    }

    /// Replace the zone from outside (e.g. after the parent reconciles).
    pub fn sync_zone(&mut self, zone: impl IntoIterator<Item = CellId>) { self.controller.sync(zone) }

    pub fn pointer_down(&mut self, map: &mut dyn MapHost, erase: bool) -> bool {
        self.visible && self.controller.pointer_down(map, erase)
    }

    pub fn pointer_move(&mut self, cell: CellId) -> bool { self.controller.pointer_move(cell) }

    pub fn pointer_up(&mut self, map: &mut dyn MapHost) -> Option<Vec<CellId>> { self.controller.pointer_up(map) }

    pub fn click(&mut self, cell: CellId) -> Option<Vec<CellId>> {
        if !self.visible { return None }
        self.controller.click(cell)
    }

    /// Cancel pending work, end any paint without committing it, and release
    /// map listeners.
    pub fn teardown<H: MapHost + IdleHost>(&mut self, host: &mut H) {
        self.scheduler.cancel(host);
        self.loading = false;
        if self.mode == OverlayMode::Edit {
            self.controller.teardown(host);
        }
        if self.listening {
            host.detach_paint_listeners();
            self.listening = false;
        }
    }

    /// Cells to draw: every cell when editing, only saved zones otherwise.
    pub fn render(&self) -> Vec<CellView> {
        if !self.visible { return Vec::new() }

        match self.mode {
            OverlayMode::Edit => self.cells.iter().map(|cell| {
                let style = if self.controller.contains(cell.id) { PathStyle::SELECTED } else { PathStyle::UNSELECTED };
                CellView { id: cell.id, rings: cell.rings.clone(), style, interactive: true }
            }).collect(),
            OverlayMode::View => self.cells.iter()
                .filter(|cell| self.controller.contains(cell.id))
                .map(|cell| CellView { id: cell.id, rings: cell.rings.clone(), style: PathStyle::ZONE, interactive: false })
                .collect(),
        }
    }

    /// Shade outside the county, drawn only by a visible editor.
    pub fn mask(&self) -> Vec<MaskView> {
        if !self.visible || self.mode != OverlayMode::Edit { return Vec::new() }
        self.mask.iter().map(|rings| MaskView { rings: rings.clone(), style: PathStyle::MASK }).collect()
    }
}

/// A world-sized rectangle with `county` cut out, as `[lat, lng]` rings per
/// polygon.
fn outside_mask(county: &MultiPolygon<f64>) -> Vec<Vec<Vec<LatLng>>> {
    let world: Polygon<f64> = polygon![
        (x: -200.0, y: -95.0), (x: 200.0, y: -95.0), (x: 200.0, y: 95.0), (x: -200.0, y: 95.0), (x: -200.0, y: -95.0),
    ];
    MultiPolygon::new(vec![world]).difference(county).0.iter()
        .map(|poly| std::iter::once(poly.exterior()).chain(poly.interiors()).map(swap_ring).collect())
        .collect()
}
