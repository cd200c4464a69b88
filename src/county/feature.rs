use std::sync::Arc;

use geo::{BoundingRect, MultiPolygon, Rect};

use super::{Fips, GeoId};

/// One county from the reference dataset. Read-only once loaded.
#[derive(Debug, Clone)]
pub struct CountyFeature {
    pub geo_id: GeoId,
    pub state: Arc<str>,  // 2-digit state FIPS, e.g. "17"
    pub county: Arc<str>, // 3-digit county FIPS, e.g. "019"
    pub name: Arc<str>,   // e.g. "Champaign"
    pub geometry: MultiPolygon<f64>, // lon/lat; single polygons are lifted
}

impl CountyFeature {
    /// FIPS code built from the `STATE` and `COUNTY` properties.
    #[inline] pub fn fips(&self) -> Option<Fips> { Fips::from_state_county(&self.state, &self.county) }

    #[inline] pub fn bounds(&self) -> Option<Rect<f64>> { self.geometry.bounding_rect() }
}
