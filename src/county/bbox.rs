use geo::Rect;
use rstar::{AABB, RTreeObject};

/// R-tree entry for one county: the lon/lat envelope of its geometry and
/// the position of the feature in [`GeometryIndex`](super::GeometryIndex).
#[derive(Debug, Clone, PartialEq)]
pub(super) struct CountyEnvelope {
    feature: usize,
    envelope: AABB<[f64; 2]>,
}

impl CountyEnvelope {
    pub(super) fn new(feature: usize, bounds: Rect<f64>) -> Self {
        Self { feature, envelope: AABB::from_corners(bounds.min().into(), bounds.max().into()) }
    }

    #[inline] pub(super) fn feature(&self) -> usize { self.feature }
}

impl RTreeObject for CountyEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope { self.envelope }
}

#[cfg(test)]
mod tests {
    use geo::coord;

    use super::*;

    #[test]
    fn envelope_spans_the_bounds() {
        let entry = CountyEnvelope::new(3, Rect::new(coord! { x: -89.0, y: 40.0 }, coord! { x: -88.5, y: 40.4 }));
        assert_eq!(entry.feature(), 3);
        assert_eq!(entry.envelope(), AABB::from_corners([-89.0, 40.0], [-88.5, 40.4]));
    }
}
