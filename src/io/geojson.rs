use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{json, Value};

use crate::{county::{CountyFeature, GeoId}, grid::GridCell};

/// Read county features from GeoJSON FeatureCollection bytes.
///
/// Features missing any of `GEO_ID`, `STATE`, `COUNTY`, `NAME`, or whose
/// geometry is not a (Multi)Polygon, are skipped rather than failing the load.
pub(crate) fn read_counties_from_geojson_bytes(bytes: &[u8]) -> Result<Vec<CountyFeature>> {
    let value: Value = serde_json::from_slice(bytes).context("Failed to parse county GeoJSON")?;

    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("County GeoJSON is not a FeatureCollection"))?;

    let mut out = Vec::with_capacity(features.len());
    for (i, feature) in features.iter().enumerate() {
        match parse_county_feature(feature) {
            Ok(Some(county)) => out.push(county),
            Ok(None) => tracing::trace!(feature = i, "skipping feature without county properties"),
            Err(e) => tracing::debug!(feature = i, error = %e, "skipping malformed county feature"),
        }
    }

    Ok(out)
}

/// Parse one feature; `Ok(None)` means the properties are incomplete.
fn parse_county_feature(feature: &Value) -> Result<Option<CountyFeature>> {
    let props = &feature["properties"];
    let text = |key: &str| props[key].as_str().filter(|s| !s.is_empty()).map(Arc::<str>::from);

    let (Some(geo_id), Some(state), Some(county), Some(name)) =
        (text("GEO_ID"), text("STATE"), text("COUNTY"), text("NAME")) else { return Ok(None) };

    let geometry = parse_areal_geometry(&feature["geometry"])?;

    Ok(Some(CountyFeature { geo_id: GeoId::new(geo_id), state, county, name, geometry }))
}

/// Parse a GeoJSON Polygon or MultiPolygon geometry object.
fn parse_areal_geometry(geometry: &Value) -> Result<MultiPolygon<f64>> {
    let coords = geometry["coordinates"].as_array()
        .ok_or_else(|| anyhow!("geometry has no coordinates"))?;

    match geometry["type"].as_str() {
        Some("Polygon") => Ok(MultiPolygon::new(vec![parse_polygon_coords(coords)?])),
        Some("MultiPolygon") => coords.iter()
            .map(|poly| {
                let rings = poly.as_array().ok_or_else(|| anyhow!("MultiPolygon member is not an array"))?;
                parse_polygon_coords(rings)
            })
            .collect::<Result<Vec<_>>>()
            .map(MultiPolygon::new),
        other => bail!("unsupported geometry type {other:?}"),
    }
}

/// Parse `[exterior, hole, hole, ...]` rings into a polygon.
fn parse_polygon_coords(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| {
        let ring = ring.as_array().ok_or_else(|| anyhow!("ring is not an array"))?;
        parse_ring_coords(ring)
    });

    let exterior = rings.next().ok_or_else(|| anyhow!("polygon has no exterior ring"))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;

    Ok(Polygon::new(exterior, interiors))
}

/// Parse a ring of `[lng, lat]` positions, closing it if needed.
fn parse_ring_coords(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = Vec::with_capacity(coords.len() + 1);

    for position in coords {
        let pair = position.as_array()
            .filter(|p| p.len() >= 2)
            .ok_or_else(|| anyhow!("position must be an array of at least two numbers"))?;
        let x = pair[0].as_f64().ok_or_else(|| anyhow!("Invalid coordinate: x must be a number"))?;
        let y = pair[1].as_f64().ok_or_else(|| anyhow!("Invalid coordinate: y must be a number"))?;
        points.push(Coord { x, y });
    }

    if points.len() < 3 { bail!("ring has fewer than three positions") }

    // Ensure ring is closed (first point == last point)
    if points[0] != points[points.len() - 1] {
        points.push(points[0]);
    }

    Ok(LineString(points))
}

/// Export grid cells as a GeoJSON FeatureCollection, one Polygon per cell
/// with coordinates restored to `[lng, lat]`.
pub fn cells_to_geojson(geo_id: &GeoId, cells: &[GridCell]) -> Value {
    let features: Vec<Value> = cells.iter().map(|cell| {
        let rings: Vec<Vec<[f64; 2]>> = cell.rings.iter()
            .map(|ring| ring.iter().map(|&[lat, lng]| [lng, lat]).collect())
            .collect();

        json!({
            "type": "Feature",
            "id": cell.id.0,
            "geometry": { "type": "Polygon", "coordinates": rings },
            "properties": { "id": cell.id.0, "GEO_ID": geo_id.as_str() },
        })
    }).collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Serialize grid cells to GeoJSON bytes.
pub fn write_cells_to_geojson_bytes(geo_id: &GeoId, cells: &[GridCell]) -> Result<Vec<u8>> {
    serde_json::to_vec(&cells_to_geojson(geo_id, cells)).context("Failed to serialize grid GeoJSON")
}

#[cfg(test)]
mod tests {
    use hexgrid::CellId;

    use super::*;

    const TWO_COUNTIES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "GEO_ID": "0500000US17019", "STATE": "17", "COUNTY": "019", "NAME": "Champaign", "LSAD": "County" },
                "geometry": { "type": "Polygon", "coordinates": [[[-88.5, 40.0], [-88.0, 40.0], [-88.0, 40.4], [-88.5, 40.4]]] }
            },
            {
                "type": "Feature",
                "properties": { "GEO_ID": "0500000US17001", "STATE": "17", "COUNTY": "001", "NAME": "Adams" },
                "geometry": { "type": "MultiPolygon", "coordinates": [
                    [[[-91.5, 39.8], [-91.0, 39.8], [-91.0, 40.2], [-91.5, 40.2], [-91.5, 39.8]]],
                    [[[-91.7, 39.9], [-91.6, 39.9], [-91.6, 40.0], [-91.7, 39.9]]]
                ] }
            },
            {
                "type": "Feature",
                "properties": { "GEO_ID": "0500000US17003", "NAME": "No state" },
                "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]] }
            },
            {
                "type": "Feature",
                "properties": { "GEO_ID": "0500000US17005", "STATE": "17", "COUNTY": "005", "NAME": "Point" },
                "geometry": { "type": "Point", "coordinates": [0, 0] }
            }
        ]
    }"#;

    #[test]
    fn reads_polygon_and_multipolygon_features() {
        let counties = read_counties_from_geojson_bytes(TWO_COUNTIES.as_bytes()).unwrap();
        assert_eq!(counties.len(), 2);
        assert_eq!(counties[0].geo_id.as_str(), "0500000US17019");
        assert_eq!(counties[0].geometry.0.len(), 1);
        assert_eq!(counties[1].geometry.0.len(), 2);
        assert_eq!(&*counties[1].name, "Adams");
    }

    #[test]
    fn open_rings_are_closed() {
        let counties = read_counties_from_geojson_bytes(TWO_COUNTIES.as_bytes()).unwrap();
        let ring = &counties[0].geometry.0[0].exterior().0;
        assert_eq!(ring.first(), ring.last());
        assert_eq!(ring.len(), 5);
    }

    #[test]
    fn non_collection_is_an_error() {
        assert!(read_counties_from_geojson_bytes(br#"{"type":"Feature"}"#).is_err());
        assert!(read_counties_from_geojson_bytes(b"not json").is_err());
    }

    #[test]
    fn cells_export_swaps_back_to_lng_lat() {
        let cell = GridCell {
            id: CellId(42),
            rings: vec![vec![[40.0, -88.0], [40.0, -87.9], [40.1, -87.9], [40.0, -88.0]]],
        };
        let value = cells_to_geojson(&GeoId::from("0500000US17019"), &[cell]);
        assert_eq!(value["features"][0]["id"], 42);
        assert_eq!(value["features"][0]["geometry"]["coordinates"][0][0][0], -88.0);
        assert_eq!(value["features"][0]["geometry"]["coordinates"][0][0][1], 40.0);
    }
}
