use geo::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};

use hexgrid::CellId;

/// A `[lat, lng]` pair, the order map renderers expect.
pub type LatLng = [f64; 2];

/// One built grid cell, ready to draw. Rings are stored in `[lat, lng]`
/// order; the first ring is the exterior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub id: CellId,
    pub rings: Vec<Vec<LatLng>>,
}

impl GridCell {
    /// Build a cell from lon/lat geometry, swapping coordinate order once.
    pub fn from_polygon(id: CellId, polygon: &Polygon<f64>) -> Self {
        let rings = std::iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .map(swap_ring)
            .collect();
        Self { id, rings }
    }

    /// The cell geometry back in lon/lat order.
    pub fn to_polygon(&self) -> Polygon<f64> {
        let mut rings = self.rings.iter().map(|ring| {
            LineString::from(ring.iter().map(|&[lat, lng]| Coord { x: lng, y: lat }).collect::<Vec<_>>())
        });
        let exterior = rings.next().unwrap_or_else(|| LineString::new(vec![]));
        Polygon::new(exterior, rings.collect())
    }
}

pub(crate) fn swap_ring(ring: &LineString<f64>) -> Vec<LatLng> {
    ring.coords().map(|c| [c.y, c.x]).collect()
}

#[cfg(test)]
mod tests {
    use geo::polygon;

    use super::*;

    #[test]
    fn swaps_to_lat_lng_and_back() {
        let poly = polygon![(x: -88.0, y: 40.0), (x: -87.0, y: 40.0), (x: -87.0, y: 41.0)];
        let cell = GridCell::from_polygon(CellId(1), &poly);
        assert_eq!(cell.rings[0][0], [40.0, -88.0]);
        assert_eq!(cell.to_polygon(), poly);
    }
}
