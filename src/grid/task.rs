use std::{cell::Cell, rc::Rc, sync::Arc};

use geo::Polygon;

use hexgrid::{GridError, IdentitySet};

use crate::county::CountyFeature;

use super::{GridCell, GridKey, HexGridBuilder};

/// Shared cancellation flag for a [`BuildTask`]. Cloning gives another
/// handle on the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Rc<Cell<bool>>);

impl CancelHandle {
    pub fn cancel(&self) { self.0.set(true) }

    #[inline] pub fn is_cancelled(&self) -> bool { self.0.get() }
}

/// Result of advancing a [`BuildTask`] by one slice.
#[derive(Debug, Clone)]
pub enum BuildStep {
    /// More work remains; call `step` again in a later slot.
    Pending,
    Complete(Arc<[GridCell]>),
    Cancelled,
    Failed(GridError),
}

#[derive(Debug)]
enum Stage {
    Planning,
    Building {
        candidates: Vec<Polygon<f64>>,
        next: usize,
        seen: IdentitySet,
        cells: Vec<GridCell>,
    },
    Done,
}

/// A grid build split into slices: one to plan the lattice, then one per
/// batch of `batch_size` candidate hexes.
#[derive(Debug)]
pub struct BuildTask {
    key: GridKey,
    county: Arc<CountyFeature>,
    builder: HexGridBuilder,
    batch_size: usize,
    stage: Stage,
    cancel: CancelHandle,
}

impl BuildTask {
    pub fn new(county: Arc<CountyFeature>, builder: HexGridBuilder, batch_size: usize) -> Self {
        Self {
            key: builder.key(&county.geo_id),
            county,
            builder,
            batch_size: batch_size.max(1),
            stage: Stage::Planning,
            cancel: CancelHandle::default(),
        }
    }

    #[inline] pub fn key(&self) -> &GridKey { &self.key }

    pub fn cancel_handle(&self) -> CancelHandle { self.cancel.clone() }

    pub fn cancel(&self) { self.cancel.cancel() }

    #[inline] pub fn is_cancelled(&self) -> bool { self.cancel.is_cancelled() }

    #[inline] pub fn is_done(&self) -> bool { matches!(self.stage, Stage::Done) }

    /// Candidate hexes processed so far and in total, once planned.
    pub fn progress(&self) -> Option<(usize, usize)> {
        match &self.stage {
            Stage::Building { candidates, next, .. } => Some((*next, candidates.len())),
            _ => None,
        }
    }

    /// Do one slice of work.
    pub fn step(&mut self) -> BuildStep {
        if self.is_cancelled() {
            self.stage = Stage::Done;
            return BuildStep::Cancelled
        }

        match &mut self.stage {
            Stage::Planning => match self.builder.candidates(&self.county.geometry) {
                Ok(candidates) => {
                    tracing::debug!(county = %self.key.county, candidates = candidates.len(), "grid build planned");
                    let capacity = candidates.len();
                    self.stage = Stage::Building {
                        candidates,
                        next: 0,
                        seen: IdentitySet::new(),
                        cells: Vec::with_capacity(capacity),
                    };
                    BuildStep::Pending
                }
                Err(e) => {
                    self.stage = Stage::Done;
                    BuildStep::Failed(e)
                }
            },
            Stage::Building { candidates, next, seen, cells } => {
                let end = (*next + self.batch_size).min(candidates.len());
                for hex in &candidates[*next..end] {
                    self.builder.emit(hex, &self.county.geometry, seen, cells);
                }
                *next = end;

                if end < candidates.len() { return BuildStep::Pending }

                let cells: Arc<[GridCell]> = Arc::from(std::mem::take(cells));
                self.stage = Stage::Done;
                BuildStep::Complete(cells)
            }
            Stage::Done => BuildStep::Cancelled,
        }
    }
}
