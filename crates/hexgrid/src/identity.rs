use std::fmt;

use ahash::AHashSet;
use geo::{Centroid, Polygon};
use serde::{Deserialize, Serialize};

/// Centroid coordinates are multiplied by this and rounded before mixing,
/// i.e. quantized to 1e-5° (about 1.1 m). Far finer than the 3 km hex floor,
/// far coarser than the jitter repeated clipping introduces.
pub const ID_QUANTUM: f64 = 1e5;

/// Initial state of the mix.
pub const ID_SEED: u32 = 5381;

/// Left-rotation applied before each word is folded in.
pub const ID_ROTATION: u32 = 5;

/// Odd multiplier applied after each fold (the 32-bit golden ratio).
pub const ID_MULTIPLIER: u32 = 0x9e37_79b9;

/// Geometry-derived identity of a grid cell.
///
/// Two builds of the same county at the same resolution and clip mode give
/// every cell the same id, whatever order the cells were produced in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(pub u32);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CellId {
    fn from(id: u32) -> Self { Self(id) }
}

/// Quantize a coordinate in degrees to an integer grid of `ID_QUANTUM`.
#[inline]
pub fn quantize(degrees: f64) -> i32 {
    (degrees * ID_QUANTUM).round() as i32
}

/// Fold two quantized coordinates into an id. Order-sensitive:
/// `mix(a, b) != mix(b, a)` in general.
#[inline]
pub fn mix(q_lng: i32, q_lat: i32) -> CellId {
    let mut h = ID_SEED;
    for word in [q_lng as u32, q_lat as u32] {
        h = (h.rotate_left(ID_ROTATION) ^ word).wrapping_mul(ID_MULTIPLIER);
    }
    CellId(h ^ (h >> 16))
}

/// Identity of the cell with geometry `polygon`, or `None` if it has no
/// centroid (empty geometry).
pub fn cell_id(polygon: &Polygon<f64>) -> Option<CellId> {
    let c = polygon.centroid()?;
    if !(c.x().is_finite() && c.y().is_finite()) { return None }
    Some(mix(quantize(c.x()), quantize(c.y())))
}

/// Ids already emitted by one build; the first cell with a given id wins.
#[derive(Debug, Default, Clone)]
pub struct IdentitySet {
    seen: AHashSet<CellId>,
}

impl IdentitySet {
    pub fn new() -> Self { Self::default() }

    /// Record `id`, returning `false` if it was already present.
    #[inline] pub fn insert(&mut self, id: CellId) -> bool { self.seen.insert(id) }

    #[inline] pub fn contains(&self, id: CellId) -> bool { self.seen.contains(&id) }

    #[inline] pub fn len(&self) -> usize { self.seen.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.seen.is_empty() }
}

#[cfg(test)]
mod tests {
    use geo::polygon;

    use super::*;

    #[test]
    fn quantize_absorbs_jitter() {
        assert_eq!(quantize(-89.123_456_1), quantize(-89.123_456_1 + 1e-9));
        assert_ne!(quantize(-89.123_45), quantize(-89.123_46));
    }

    #[test]
    fn mix_is_order_sensitive() {
        assert_ne!(mix(100, 200), mix(200, 100));
    }

    #[test]
    fn mix_is_stable() {
        assert_eq!(mix(-8_912_345, 4_012_345), mix(-8_912_345, 4_012_345));
    }

    #[test]
    fn same_shape_same_id_regardless_of_ring_start() {
        let a = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)];
        let b = polygon![(x: 1.0, y: 1.0), (x: 0.0, y: 1.0), (x: 0.0, y: 0.0), (x: 1.0, y: 0.0)];
        assert_eq!(cell_id(&a), cell_id(&b));
    }

    #[test]
    fn neighbouring_cells_differ() {
        let a = polygon![(x: 0.0, y: 0.0), (x: 0.05, y: 0.0), (x: 0.05, y: 0.05), (x: 0.0, y: 0.05)];
        let b = polygon![(x: 0.05, y: 0.0), (x: 0.1, y: 0.0), (x: 0.1, y: 0.05), (x: 0.05, y: 0.05)];
        assert_ne!(cell_id(&a), cell_id(&b));
    }

    #[test]
    fn identity_set_rejects_repeats() {
        let mut seen = IdentitySet::new();
        assert!(seen.insert(CellId(7)));
        assert!(!seen.insert(CellId(7)));
        assert_eq!(seen.len(), 1);
    }
}
