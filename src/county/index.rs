use std::sync::Arc;

use ahash::AHashMap;
use anyhow::{Context, Result};
use geo::{Contains, Point};
use rstar::{RTree, AABB};

use crate::io::geojson::read_counties_from_geojson_bytes;

use super::{bbox::CountyEnvelope, CountyFeature, CountySource, Fips, GeoId};

/// The loaded county reference dataset, with lookup by GEO_ID, by FIPS, and
/// by location.
#[derive(Debug, Default)]
pub struct GeometryIndex {
    features: Vec<Arc<CountyFeature>>,
    by_geo_id: AHashMap<GeoId, usize>,
    by_fips: AHashMap<Fips, usize>,
    rtree: RTree<CountyEnvelope>,
}

impl GeometryIndex {
    /// Build an index over `features`. Later duplicates of a GEO_ID are dropped.
    pub fn new(features: Vec<CountyFeature>) -> Self {
        let mut kept = Vec::with_capacity(features.len());
        let mut by_geo_id = AHashMap::with_capacity(features.len());
        let mut by_fips = AHashMap::with_capacity(features.len());

        for feature in features {
            if by_geo_id.contains_key(&feature.geo_id) {
                tracing::debug!(geo_id = %feature.geo_id, "dropping duplicate county feature");
                continue
            }
            let idx = kept.len();
            by_geo_id.insert(feature.geo_id.clone(), idx);
            if let Some(fips) = feature.fips() { by_fips.entry(fips).or_insert(idx); }
            kept.push(Arc::new(feature));
        }

        let rtree = RTree::bulk_load(kept.iter().enumerate()
            .filter_map(|(i, f)| f.bounds().map(|rect| CountyEnvelope::new(i, rect)))
            .collect());

        Self { features: kept, by_geo_id, by_fips, rtree }
    }

    /// Read and index the dataset from `source`.
    pub fn load(source: &dyn CountySource) -> Result<Self> {
        let bytes = source.read()?;
        let features = read_counties_from_geojson_bytes(&bytes)
            .with_context(|| format!("Failed to load counties from {}", source.describe()))?;
        let index = Self::new(features);
        tracing::info!(counties = index.len(), source = %source.describe(), "county dataset loaded");
        Ok(index)
    }

    pub fn from_geojson_str(text: &str) -> Result<Self> {
        Ok(Self::new(read_counties_from_geojson_bytes(text.as_bytes())?))
    }

    #[inline] pub fn len(&self) -> usize { self.features.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.features.is_empty() }

    /// All features, in dataset order.
    #[inline] pub fn features(&self) -> &[Arc<CountyFeature>] { &self.features }

    pub fn get(&self, geo_id: &str) -> Option<&Arc<CountyFeature>> {
        self.by_geo_id.get(geo_id).map(|&i| &self.features[i])
    }

    pub fn get_by_fips(&self, fips: &Fips) -> Option<&Arc<CountyFeature>> {
        self.by_fips.get(fips).map(|&i| &self.features[i])
    }

    /// Look up a county by either GEO_ID or 5-digit FIPS.
    pub fn resolve(&self, key: &str) -> Option<&Arc<CountyFeature>> {
        self.get(key).or_else(|| Fips::parse(key).and_then(|fips| self.get_by_fips(&fips)))
    }

    /// The county containing (`lon`, `lat`), if any.
    pub fn locate(&self, lon: f64, lat: f64) -> Option<&Arc<CountyFeature>> {
        let point = Point::new(lon, lat);
        let envelope = AABB::from_point([lon, lat]);

        let mut hits: Vec<usize> = self.rtree.locate_in_envelope_intersecting(&envelope)
            .map(CountyEnvelope::feature)
            .collect();
        hits.sort_unstable();

        hits.into_iter()
            .map(|i| &self.features[i])
            .find(|f| f.geometry.contains(&point))
    }
}
