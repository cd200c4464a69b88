// Integration tests for grid construction: determinism, cell validity,
// batched builds, caching and discarding of superseded builds.

use std::{collections::BTreeSet, sync::Arc};

use coverzone::{
    BuildEvent, CellId, CountyFeature, GeoId, GeometryIndex, GridCache, GridOverlay, GridRequest, HeadlessMap,
    HexGridBuilder, IdleQueue, IncrementalScheduler, OverlayMode, write_cells_to_geojson_bytes,
};
use geo::{Area, MultiPolygon, polygon};

const COUNTIES: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": { "GEO_ID": "0500000US17001", "STATE": "17", "COUNTY": "001", "NAME": "Adams" },
            "geometry": { "type": "Polygon", "coordinates": [[[-89.0, 40.0], [-88.5, 40.0], [-88.6, 40.4], [-89.0, 40.35], [-89.0, 40.0]]] }
        },
        {
            "type": "Feature",
            "properties": { "GEO_ID": "0500000US17003", "STATE": "17", "COUNTY": "003", "NAME": "Alexander" },
            "geometry": { "type": "MultiPolygon", "coordinates": [
                [[[-88.5, 40.0], [-88.0, 40.0], [-88.0, 40.4], [-88.6, 40.4], [-88.5, 40.0]]],
                [[[-87.9, 40.1], [-87.8, 40.1], [-87.8, 40.2], [-87.9, 40.2], [-87.9, 40.1]]]
            ] }
        }
    ]
}"#;

fn index() -> GeometryIndex {
    GeometryIndex::from_geojson_str(COUNTIES).unwrap()
}

fn county(geo_id: &str) -> Arc<CountyFeature> {
    index().get(geo_id).unwrap().clone()
}

fn ids(cells: &[coverzone::GridCell]) -> BTreeSet<CellId> {
    cells.iter().map(|c| c.id).collect()
}

#[test]
fn independent_builds_give_identical_ids() {
    let adams = county("0500000US17001");
    for clip in [true, false] {
        let a = HexGridBuilder::new(20, clip).build(&adams.geometry).unwrap();
        let b = HexGridBuilder::new(20, clip).build(&county("0500000US17001").geometry).unwrap();
        assert_eq!(ids(&a), ids(&b));
    }
}

#[test]
fn batch_size_does_not_change_the_grid() {
    let adams = county("0500000US17001");
    let builder = HexGridBuilder::new(20, true);
    let expected = ids(&builder.build(&adams.geometry).unwrap());

    for batch_size in [1, 7, 200] {
        let mut scheduler = IncrementalScheduler::new(GridCache::shared(), batch_size);
        let mut queue = IdleQueue::new();
        scheduler.request(&mut queue, adams.clone(), builder);

        let mut built = None;
        while let Some(ticket) = queue.pop() {
            if let Some(BuildEvent::Completed { cells, .. }) = scheduler.on_idle(&mut queue, ticket) {
                built = Some(cells);
            }
        }
        assert_eq!(ids(&built.unwrap()), expected, "batch size {batch_size}");
    }
}

#[test]
fn clipped_cells_have_positive_area_and_unique_ids() {
    for geo_id in ["0500000US17001", "0500000US17003"] {
        let cells = HexGridBuilder::new(25, true).build(&county(geo_id).geometry).unwrap();
        assert!(cells.iter().all(|c| c.to_polygon().unsigned_area() > 0.0));
        assert_eq!(ids(&cells).len(), cells.len());
    }
}

#[test]
fn clipped_grid_covers_the_county_exactly() {
    let alexander = county("0500000US17003");
    let cells = HexGridBuilder::new(25, true).build(&alexander.geometry).unwrap();
    let total: f64 = cells.iter().map(|c| c.to_polygon().unsigned_area()).sum();
    let area = alexander.geometry.unsigned_area();
    assert!((total - area).abs() / area < 1e-6);
}

#[test]
fn detached_part_gets_its_own_cells() {
    let alexander = county("0500000US17003");
    let island = MultiPolygon::new(vec![polygon![
        (x: -87.9, y: 40.1), (x: -87.8, y: 40.1), (x: -87.8, y: 40.2), (x: -87.9, y: 40.2), (x: -87.9, y: 40.1),
    ]]);
    let cells = HexGridBuilder::new(25, true).build(&alexander.geometry).unwrap();
    let on_island: f64 = cells.iter()
        .map(|c| c.to_polygon())
        .filter(|p| p.exterior().0.iter().all(|c| c.x >= -87.9 - 1e-9))
        .map(|p| p.unsigned_area())
        .sum();
    assert!((on_island - island.unsigned_area()).abs() < 1e-9);
}

#[test]
fn grid_parameters_change_the_ids() {
    let adams = county("0500000US17001");
    let coarse = ids(&HexGridBuilder::new(10, true).build(&adams.geometry).unwrap());
    let fine = ids(&HexGridBuilder::new(30, true).build(&adams.geometry).unwrap());
    assert!(fine.len() > coarse.len());
    assert_ne!(coarse, fine);
}

#[test]
fn cache_hit_skips_the_scheduler() {
    let cache = GridCache::shared();
    let adams = county("0500000US17001");
    let builder = HexGridBuilder::new(20, true);

    let mut map = HeadlessMap::new();
    let mut first = GridOverlay::new(adams.clone(), Vec::<CellId>::new(), builder, OverlayMode::Edit, cache.clone(), 50);
    first.set_visible(&mut map, true);
    while let Some(ticket) = map.take_idle() { first.on_idle(&mut map, ticket); }
    assert_eq!(cache.borrow().len(), 1);

    let mut second = GridOverlay::new(adams, Vec::<CellId>::new(), builder, OverlayMode::View, cache.clone(), 50);
    second.set_visible(&mut map, true);
    assert_eq!(map.pending_idle(), 0);
    assert!(!second.is_loading());
    assert_eq!(second.cells(), first.cells());
}

#[test]
fn shared_cache_separates_hex_floors() {
    let cache = GridCache::shared();
    let adams = county("0500000US17001");
    let coarse = HexGridBuilder::new(20, true);
    let fine = coarse.with_min_hex_km(1.0);
    assert_ne!(coarse.key(&adams.geo_id), fine.key(&adams.geo_id));

    let mut map = HeadlessMap::new();
    let mut first = GridOverlay::new(adams.clone(), Vec::<CellId>::new(), coarse, OverlayMode::Edit, cache.clone(), 50);
    first.set_visible(&mut map, true);
    while let Some(ticket) = map.take_idle() { first.on_idle(&mut map, ticket); }

    let mut second = GridOverlay::new(adams, Vec::<CellId>::new(), fine, OverlayMode::Edit, cache.clone(), 50);
    second.set_visible(&mut map, true);
    assert!(second.is_loading());
    while let Some(ticket) = map.take_idle() { second.on_idle(&mut map, ticket); }

    assert_eq!(cache.borrow().len(), 2);
    assert!(second.cells().len() > first.cells().len());
}

#[test]
fn superseded_build_is_never_reported() {
    let cache = GridCache::shared();
    let mut scheduler = IncrementalScheduler::new(cache.clone(), 3);
    let mut queue = IdleQueue::new();
    let builder = HexGridBuilder::new(20, true);
    let adams = county("0500000US17001");
    let alexander = county("0500000US17003");

    scheduler.request(&mut queue, adams.clone(), builder);
    let stale = queue.pop().unwrap();
    scheduler.on_idle(&mut queue, stale);
    let pending = queue.pop().unwrap();

    assert!(matches!(scheduler.request(&mut queue, alexander.clone(), builder), GridRequest::Scheduled));
    assert!(scheduler.on_idle(&mut queue, pending).is_none());

    let mut reported = Vec::new();
    while let Some(ticket) = queue.pop() {
        reported.extend(scheduler.on_idle(&mut queue, ticket));
    }
    assert_eq!(reported.len(), 1);
    assert!(matches!(&reported[0], BuildEvent::Completed { key, .. } if key.county == alexander.geo_id));
    assert!(!cache.borrow().contains(&builder.key(&adams.geo_id)));
}

#[test]
fn exported_geojson_has_one_feature_per_cell() {
    let adams = county("0500000US17001");
    let cells = HexGridBuilder::new(10, true).build(&adams.geometry).unwrap();
    let bytes = write_cells_to_geojson_bytes(&GeoId::from("0500000US17001"), &cells).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["features"].as_array().unwrap().len(), cells.len());
    let lng = value["features"][0]["geometry"]["coordinates"][0][0][0].as_f64().unwrap();
    assert!((-89.1..=-88.4).contains(&lng));
}
