use std::sync::Arc;

use serde::Serialize;
use wasm_bindgen::{JsValue, prelude::wasm_bindgen};

use coverzone_core::{Fips, GeometryIndex, MemSource, fips_from_geo_id, geo_id_from_fips};

use crate::common::*;

#[derive(Serialize)]
struct CountyInfo<'a> {
    #[serde(rename = "GEO_ID")]
    geo_id: &'a str,
    #[serde(rename = "STATE")]
    state: &'a str,
    #[serde(rename = "COUNTY")]
    county: &'a str,
    #[serde(rename = "NAME")]
    name: &'a str,
    fips: Option<String>,
}

/// The county reference dataset, for lookups from JS.
#[wasm_bindgen]
pub struct WasmCountyIndex {
    inner: Arc<GeometryIndex>,
}

#[wasm_bindgen]
impl WasmCountyIndex {
    /// Parse the dataset from the bytes of a GeoJSON FeatureCollection.
    #[wasm_bindgen(constructor)]
    pub fn new(bytes: &[u8]) -> Result<WasmCountyIndex, JsValue> {
        let index = GeometryIndex::load(&MemSource::new(bytes.to_vec())).map_err(js_err)?;
        Ok(WasmCountyIndex { inner: Arc::new(index) })
    }

    pub fn len(&self) -> usize { self.inner.len() }

    pub fn is_empty(&self) -> bool { self.inner.is_empty() }

    /// County properties by GEO_ID or FIPS; `undefined` if unknown.
    pub fn get(&self, key: &str) -> Result<JsValue, JsValue> {
        let Some(feature) = self.inner.resolve(key) else { return Ok(JsValue::UNDEFINED) };
        to_js(&CountyInfo {
            geo_id: feature.geo_id.as_str(),
            state: &feature.state,
            county: &feature.county,
            name: &feature.name,
            fips: feature.fips().map(|f| f.to_string()),
        })
    }

    /// GEO_ID of the county containing the point, if any.
    pub fn locate(&self, lon: f64, lat: f64) -> Option<String> {
        self.inner.locate(lon, lat).map(|f| f.geo_id.to_string())
    }

    #[wasm_bindgen(js_name = "fips_to_geo_id")]
    pub fn fips_to_geo_id(fips: &str) -> Option<String> {
        Fips::parse(fips).map(|f| geo_id_from_fips(&f).to_string())
    }

    #[wasm_bindgen(js_name = "geo_id_to_fips")]
    pub fn geo_id_to_fips(geo_id: &str) -> Option<String> {
        fips_from_geo_id(geo_id).map(|f| f.to_string())
    }
}
