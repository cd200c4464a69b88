mod bbox;
mod feature;
mod geo_id;
mod index;
mod source;

pub use feature::CountyFeature;
pub use geo_id::{COUNTY_GEO_ID_PREFIX, Fips, GeoId, fips_from_geo_id, geo_id_from_fips, state_fips};
pub use index::GeometryIndex;
pub use source::{CountySource, DiskSource, MemSource};

#[cfg(feature = "download")]
pub use source::HttpSource;
