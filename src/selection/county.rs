use std::{collections::BTreeSet, sync::Arc};

use serde::{Deserialize, Serialize};

use hexgrid::CellId;

use crate::county::{CountyFeature, Fips, GeoId};

/// A county the user covers. An empty `zone` means the whole county.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedCounty {
    #[serde(rename = "GEO_ID")]
    pub geo_id: GeoId,
    #[serde(rename = "NAME")]
    pub name: Arc<str>,
    #[serde(rename = "STATE")]
    pub state: Arc<str>,
    #[serde(rename = "ZONE", default)]
    pub zone: BTreeSet<CellId>,
}

impl SelectedCounty {
    /// A freshly selected county with no zones.
    pub fn from_feature(feature: &CountyFeature) -> Self {
        Self {
            geo_id: feature.geo_id.clone(),
            name: feature.name.clone(),
            state: feature.state.clone(),
            zone: BTreeSet::new(),
        }
    }

    #[inline] pub fn fips(&self) -> Option<Fips> { self.geo_id.fips() }

    /// True if only part of the county is covered.
    #[inline] pub fn is_partial(&self) -> bool { !self.zone.is_empty() }
}
