use geo::{Area, BooleanOps, CoordsIter, MultiPolygon, Polygon};

/// Returns `true` if `polygon` has finite coordinates and strictly positive
/// area. Slivers produced by clipping along a shared boundary fail this test.
pub fn is_areal(polygon: &Polygon<f64>) -> bool {
    let area = polygon.unsigned_area();
    area.is_finite() && area > 0.0 && polygon.coords_iter().all(|c| c.x.is_finite() && c.y.is_finite())
}

/// Intersect `hex` with `county`, returning one polygon per surviving part.
///
/// Degenerate parts are dropped rather than reported; an empty result means
/// the hex only touched the county boundary.
pub fn clip_to(hex: &Polygon<f64>, county: &MultiPolygon<f64>) -> Vec<Polygon<f64>> {
    let hex = MultiPolygon::new(vec![hex.clone()]);
    county.intersection(&hex).0.into_iter()
        .filter(is_areal)
        .collect()
}
