use std::{cell::RefCell, rc::Rc, sync::Arc};

use ahash::AHashMap;

use crate::county::GeoId;

use super::GridCell;

/// Identifies one grid: the same key always means the same cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GridKey {
    pub county: GeoId,
    pub grid_size: u32,
    pub clip_edges: bool,
    min_hex_km: u64, // f64 bits, so the key stays `Eq + Hash`
}

impl GridKey {
    pub fn new(county: GeoId, grid_size: u32, clip_edges: bool, min_hex_km: f64) -> Self {
        Self { county, grid_size, clip_edges, min_hex_km: min_hex_km.to_bits() }
    }

    /// Hex size floor the grid was built with.
    #[inline] pub fn min_hex_km(&self) -> f64 { f64::from_bits(self.min_hex_km) }
}

/// Completed grids, memoized for the session. Only finished builds are
/// ever inserted; there is no eviction.
#[derive(Debug, Default)]
pub struct GridCache {
    grids: AHashMap<GridKey, Arc<[GridCell]>>,
}

/// A cache shared by every overlay in one session.
pub type SharedGridCache = Rc<RefCell<GridCache>>;

impl GridCache {
    pub fn new() -> Self { Self::default() }

    pub fn shared() -> SharedGridCache { Rc::new(RefCell::new(Self::new())) }

    pub fn get(&self, key: &GridKey) -> Option<Arc<[GridCell]>> { self.grids.get(key).cloned() }

    #[inline] pub fn contains(&self, key: &GridKey) -> bool { self.grids.contains_key(key) }

    pub fn insert(&mut self, key: GridKey, cells: Arc<[GridCell]>) {
        tracing::debug!(county = %key.county, grid_size = key.grid_size, clip = key.clip_edges, min_hex_km = key.min_hex_km(), cells = cells.len(), "caching grid");
        self.grids.insert(key, cells);
    }

    #[inline] pub fn len(&self) -> usize { self.grids.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.grids.is_empty() }

    pub fn clear(&mut self) { self.grids.clear() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(grid_size: u32, clip_edges: bool) -> GridKey {
        GridKey::new(GeoId::from("0500000US17019"), grid_size, clip_edges, 3.0)
    }

    #[test]
    fn keys_distinguish_every_parameter() {
        let mut cache = GridCache::new();
        cache.insert(key(20, true), Arc::from(Vec::new()));
        assert!(cache.contains(&key(20, true)));
        assert!(!cache.contains(&key(20, false)));
        assert!(!cache.contains(&key(21, true)));
        assert!(!cache.contains(&GridKey::new(GeoId::from("0500000US17019"), 20, true, 1.0)));
    }

    #[test]
    fn separate_caches_are_isolated() {
        let a = GridCache::shared();
        let b = GridCache::shared();
        a.borrow_mut().insert(key(20, true), Arc::from(Vec::new()));
        assert_eq!(a.borrow().len(), 1);
        assert!(b.borrow().is_empty());
    }
}
