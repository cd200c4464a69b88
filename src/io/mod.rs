//! Format-specific reading and writing.

pub(crate) mod geojson;
