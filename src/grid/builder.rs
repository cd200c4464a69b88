use geo::{BoundingRect, Intersects, MultiPolygon, Polygon};

use hexgrid::{GridError, HexTiling, IdentitySet, MIN_HEX_KM, bottom_width_km, cell_id, clip_to, hex_size_km, is_areal};

use crate::{config::EditorConfig, county::GeoId};

use super::{GridCell, GridKey};

/// Produces the hex cells covering a county polygon.
///
/// The build runs in two halves so it can be time-sliced: [`candidates`]
/// plans the lattice and keeps the hexes touching the county, then
/// [`emit`] turns each candidate into zero or more finished cells.
///
/// [`candidates`]: HexGridBuilder::candidates
/// [`emit`]: HexGridBuilder::emit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexGridBuilder {
    grid_size: u32,
    clip_edges: bool,
    min_hex_km: f64,
}

impl HexGridBuilder {
    pub fn new(grid_size: u32, clip_edges: bool) -> Self {
        Self { grid_size, clip_edges, min_hex_km: MIN_HEX_KM }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.grid_size, config.clip_edges).with_min_hex_km(config.min_hex_km)
    }

    pub fn with_min_hex_km(mut self, min_hex_km: f64) -> Self {
        self.min_hex_km = min_hex_km;
        self
    }

    #[inline] pub fn grid_size(&self) -> u32 { self.grid_size }

    #[inline] pub fn clip_edges(&self) -> bool { self.clip_edges }

    /// Cache key for a build of `county` with these parameters.
    pub fn key(&self, county: &GeoId) -> GridKey {
        GridKey::new(county.clone(), self.grid_size, self.clip_edges, self.min_hex_km)
    }

    /// Hex edge length, in kilometres, used for `county`.
    pub fn hex_size_km(&self, county: &MultiPolygon<f64>) -> Result<f64, GridError> {
        let bounds = county.bounding_rect().ok_or(GridError::EmptyBounds)?;
        hex_size_km(&bounds, self.grid_size, self.min_hex_km)
    }

    /// Lattice hexes that intersect `county`, in lattice order.
    pub fn candidates(&self, county: &MultiPolygon<f64>) -> Result<Vec<Polygon<f64>>, GridError> {
        let bounds = county.bounding_rect().ok_or(GridError::EmptyBounds)?;
        let size_km = hex_size_km(&bounds, self.grid_size, self.min_hex_km)?;
        let tiling = HexTiling::over(bounds, size_km)?;

        tracing::trace!(
            width_km = bottom_width_km(&bounds),
            size_km,
            lattice = tiling.len(),
            "planned hex lattice"
        );

        Ok(tiling.hexagons().filter(|hex| hex.intersects(county)).collect())
    }

    /// Turn one candidate hex into cells, appending to `out`. Degenerate clip
    /// output and ids already in `seen` are skipped.
    pub fn emit(&self, hex: &Polygon<f64>, county: &MultiPolygon<f64>, seen: &mut IdentitySet, out: &mut Vec<GridCell>) {
        let mut push = |part: &Polygon<f64>| {
            let Some(id) = cell_id(part) else { return };
            if seen.insert(id) {
                out.push(GridCell::from_polygon(id, part));
            } else {
                tracing::trace!(%id, "skipping duplicate cell id");
            }
        };

        if self.clip_edges {
            for part in clip_to(hex, county) { push(&part) }
        } else if is_areal(hex) {
            push(hex);
        }
    }

    /// Build every cell at once.
    pub fn build(&self, county: &MultiPolygon<f64>) -> Result<Vec<GridCell>, GridError> {
        let candidates = self.candidates(county)?;
        let mut seen = IdentitySet::new();
        let mut cells = Vec::with_capacity(candidates.len());
        for hex in &candidates {
            self.emit(hex, county, &mut seen, &mut cells);
        }
        Ok(cells)
    }
}
