use geo::{Coord, LineString, Point, Polygon, Rect};

use crate::{GridError, measure::km_per_degree};

/// A flat-topped hexagonal lattice covering a lon/lat bounding box.
///
/// The lattice is anchored at the south-west corner of the box, so the same
/// box and edge length always produce the same hexagons in the same order.
/// Column `c` is centred at `west + 1.5·c·rx`; odd columns are shifted half
/// a row south.
#[derive(Debug, Clone, PartialEq)]
pub struct HexTiling {
    origin: Coord<f64>,
    rx: f64, // circumradius in degrees of longitude
    ry: f64, // circumradius in degrees of latitude
    cols: u32,
    rows: u32,
}

impl HexTiling {
    /// Plan a lattice of hexes with edge length `size_km` whose union covers
    /// `bounds` completely.
    pub fn over(bounds: Rect<f64>, size_km: f64) -> Result<Self, GridError> {
        if !(size_km.is_finite() && size_km > 0.0) { return Err(GridError::InvalidHexSize(size_km)) }

        let (min, max) = (bounds.min(), bounds.max());
        if ![min.x, min.y, max.x, max.y].iter().all(|v| v.is_finite()) {
            return Err(GridError::EmptyBounds)
        }

        let center = Point::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);
        let (km_x, km_y) = km_per_degree(center);
        if !(km_x > 0.0 && km_y > 0.0) { return Err(GridError::EmptyBounds) }

        let rx = size_km / km_x;
        let ry = size_km / km_y;
        let row_height = 3f64.sqrt() * ry;

        // A point is inside the hex whose centre is within rx horizontally and
        // row_height/2 vertically, so those margins are all the lattice needs.
        let cols = ((bounds.width() + rx) / (1.5 * rx)).floor() as u32;
        let rows = (bounds.height() / row_height).floor() as u32 + 1;

        Ok(Self { origin: min, rx, ry, cols, rows })
    }

    /// Circumradius of each hex in degrees, as `(lon, lat)`.
    #[inline] pub fn radius(&self) -> (f64, f64) { (self.rx, self.ry) }

    /// Number of hexes in the lattice.
    #[inline] pub fn len(&self) -> usize { (self.cols as usize + 1) * (self.rows as usize + 1) }

    /// True if the lattice holds no hexes (never the case for a valid plan).
    #[inline] pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Centre of the hex at (`col`, `row`).
    pub fn center(&self, col: u32, row: u32) -> Coord<f64> {
        let row_height = 3f64.sqrt() * self.ry;
        let mut y = self.origin.y + row as f64 * row_height;
        if col % 2 == 1 { y -= row_height / 2.0 }
        Coord { x: self.origin.x + 1.5 * self.rx * col as f64, y }
    }

    /// Closed hexagon ring at (`col`, `row`), counter-clockwise from due east.
    pub fn hexagon(&self, col: u32, row: u32) -> Polygon<f64> {
        let c = self.center(col, row);
        let mut ring: Vec<Coord<f64>> = (0..6)
            .map(|i| {
                let angle = std::f64::consts::FRAC_PI_3 * i as f64;
                Coord { x: c.x + self.rx * angle.cos(), y: c.y + self.ry * angle.sin() }
            })
            .collect();
        ring.push(ring[0]);
        Polygon::new(LineString(ring), vec![])
    }

    /// Every hex in column-major order.
    pub fn hexagons(&self) -> impl Iterator<Item = Polygon<f64>> + '_ {
        (0..=self.cols).flat_map(move |col| (0..=self.rows).map(move |row| self.hexagon(col, row)))
    }
}
