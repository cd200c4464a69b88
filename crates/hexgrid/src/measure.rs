use geo::{Distance, Haversine, Point, Rect};

use crate::GridError;

/// Smallest hex edge length the builder will produce, in km.
///
/// Tiny counties would otherwise get hundreds of micro-cells that are both
/// useless to paint and slow to clip.
pub const MIN_HEX_KM: f64 = 3.0;

/// Great-circle width of `bounds` along its southern edge, in km.
pub fn bottom_width_km(bounds: &Rect<f64>) -> f64 {
    let sw = Point::new(bounds.min().x, bounds.min().y);
    let se = Point::new(bounds.max().x, bounds.min().y);
    Haversine.distance(sw, se) / 1000.0
}

/// Kilometres spanned by one degree of longitude and one degree of latitude
/// around `center`.
pub fn km_per_degree(center: Point<f64>) -> (f64, f64) {
    let (x, y) = (center.x(), center.y());
    let dx = Haversine.distance(Point::new(x - 0.5, y), Point::new(x + 0.5, y)) / 1000.0;
    let dy = Haversine.distance(Point::new(x, y - 0.5), Point::new(x, y + 0.5)) / 1000.0;
    (dx, dy)
}

/// Hex edge length for a county of the given `bounds` at `grid_size`
/// subdivisions across, floored at `min_km`.
pub fn hex_size_km(bounds: &Rect<f64>, grid_size: u32, min_km: f64) -> Result<f64, GridError> {
    if grid_size == 0 { return Err(GridError::ZeroGridSize) }
    if !(min_km.is_finite() && min_km > 0.0) { return Err(GridError::InvalidHexSize(min_km)) }

    let width = bottom_width_km(bounds);
    if !width.is_finite() { return Err(GridError::EmptyBounds) }

    Ok((width / grid_size as f64).max(min_km))
}

#[cfg(test)]
mod tests {
    use geo::{Coord, Rect};

    use super::*;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect<f64> {
        Rect::new(Coord { x: x0, y: y0 }, Coord { x: x1, y: y1 })
    }

    #[test]
    fn one_degree_at_equator_is_about_111_km() {
        let w = bottom_width_km(&rect(0.0, 0.0, 1.0, 1.0));
        assert!((w - 111.19).abs() < 0.5, "width was {w}");
    }

    #[test]
    fn width_shrinks_with_latitude() {
        let equator = bottom_width_km(&rect(0.0, 0.0, 1.0, 1.0));
        let north = bottom_width_km(&rect(0.0, 60.0, 1.0, 61.0));
        assert!((north / equator - 0.5).abs() < 0.01);
    }

    #[test]
    fn hex_size_divides_width() {
        let bounds = rect(-90.0, 40.0, -89.0, 41.0);
        let size = hex_size_km(&bounds, 10, MIN_HEX_KM).unwrap();
        assert!((size - bottom_width_km(&bounds) / 10.0).abs() < 1e-9);
    }

    #[test]
    fn hex_size_is_floored() {
        let bounds = rect(-90.0, 40.0, -89.9, 40.1);
        assert_eq!(hex_size_km(&bounds, 50, MIN_HEX_KM).unwrap(), MIN_HEX_KM);
    }

    #[test]
    fn zero_grid_size_is_rejected() {
        let bounds = rect(0.0, 0.0, 1.0, 1.0);
        assert_eq!(hex_size_km(&bounds, 0, MIN_HEX_KM), Err(GridError::ZeroGridSize));
    }

    #[test]
    fn km_per_degree_matches_latitude_scaling() {
        let (dx, dy) = km_per_degree(Point::new(0.0, 60.0));
        assert!((dx / dy - 0.5).abs() < 0.01);
    }
}
