use std::collections::BTreeSet;

use hexgrid::CellId;

use super::MapHost;

/// Drag-paint state. The erase flag is fixed when painting starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaintState {
    #[default]
    Idle,
    Painting { erase: bool },
}

/// Working zone set for the county being edited, plus click and drag-paint
/// handling. Callers only ever receive sorted, deduplicated snapshots, and
/// only on a click or at the end of a paint.
#[derive(Debug, Clone, Default)]
pub struct ZoneSelectionController {
    working: BTreeSet<CellId>,
    paint: PaintState,
    editable: bool,
}

impl ZoneSelectionController {
    pub fn new(zone: impl IntoIterator<Item = CellId>, editable: bool) -> Self {
        Self { working: zone.into_iter().collect(), paint: PaintState::Idle, editable }
    }

    #[inline] pub fn zone(&self) -> &BTreeSet<CellId> { &self.working }

    #[inline] pub fn contains(&self, id: CellId) -> bool { self.working.contains(&id) }

    #[inline] pub fn paint_state(&self) -> PaintState { self.paint }

    #[inline] pub fn is_painting(&self) -> bool { matches!(self.paint, PaintState::Painting { .. }) }

    #[inline] pub fn is_editable(&self) -> bool { self.editable }

    /// The working set as the caller sees it.
    pub fn snapshot(&self) -> Vec<CellId> { self.working.iter().copied().collect() }

    /// Replace the working set with a zone pushed from outside. Ignored
    /// mid-paint; the paint's own commit supersedes it.
    pub fn sync(&mut self, zone: impl IntoIterator<Item = CellId>) {
        if self.is_painting() {
            tracing::trace!("ignoring zone sync during paint");
            return
        }
        self.working = zone.into_iter().collect();
    }

    /// Pointer pressed over the map. Starts a paint and suspends map
    /// panning; returns whether painting started.
    pub fn pointer_down(&mut self, map: &mut dyn MapHost, erase: bool) -> bool {
        if !self.editable { return false }
        self.paint = PaintState::Painting { erase };
        map.set_dragging(false);
        true
    }

    /// Pointer moved over `cell`. Mutates the working set only; nothing is
    /// reported until the paint ends.
    pub fn pointer_move(&mut self, cell: CellId) -> bool {
        match self.paint {
            PaintState::Idle => false,
            PaintState::Painting { erase: false } => self.working.insert(cell),
            PaintState::Painting { erase: true } => self.working.remove(&cell),
        }
    }

    /// Pointer released anywhere. Ends a paint, restores panning and returns
    /// the snapshot to commit; `None` if no paint was in progress.
    pub fn pointer_up(&mut self, map: &mut dyn MapHost) -> Option<Vec<CellId>> {
        if !self.is_painting() { return None }
        self.paint = PaintState::Idle;
        map.set_dragging(true);
        Some(self.snapshot())
    }

    /// Toggle one cell and return the snapshot to commit.
    pub fn click(&mut self, cell: CellId) -> Option<Vec<CellId>> {
        if !self.editable { return None }
        if !self.working.remove(&cell) { self.working.insert(cell); }
        Some(self.snapshot())
    }

    /// Drop any paint in progress without committing it.
    pub fn teardown(&mut self, map: &mut dyn MapHost) {
        if self.is_painting() {
            tracing::debug!("discarding unfinished paint");
        }
        self.paint = PaintState::Idle;
        map.set_dragging(true);
    }
}
