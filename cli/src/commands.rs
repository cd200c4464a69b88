pub mod fips;
pub mod grid;
pub mod locate;

use anyhow::Result;
use coverzone::{DiskSource, GeometryIndex};

/// Load the county dataset from a path, or from a URL when built with
/// downloads enabled.
pub fn load_index(location: &str) -> Result<GeometryIndex> {
    if location.starts_with("http://") || location.starts_with("https://") {
        return load_remote(location)
    }
    GeometryIndex::load(&DiskSource::new(location))
}

#[cfg(feature = "download")]
fn load_remote(url: &str) -> Result<GeometryIndex> {
    GeometryIndex::load(&coverzone::HttpSource::new(url))
}

#[cfg(not(feature = "download"))]
fn load_remote(url: &str) -> Result<GeometryIndex> {
    anyhow::bail!("cannot fetch {url}: built without the `download` feature")
}
