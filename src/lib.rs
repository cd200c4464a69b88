#![doc = "Coverzone public API"]
mod config;
mod county;
mod editor;
mod grid;
mod io;
mod selection;
mod session;

#[doc(inline)]
pub use config::EditorConfig;

#[doc(inline)]
pub use county::{
    COUNTY_GEO_ID_PREFIX, CountyFeature, CountySource, DiskSource, Fips, GeoId, GeometryIndex, MemSource,
    fips_from_geo_id, geo_id_from_fips, state_fips,
};

#[cfg(feature = "download")]
#[doc(inline)]
pub use county::HttpSource;

#[doc(inline)]
pub use grid::{
    BuildEvent, BuildStep, BuildTask, CancelHandle, GridCache, GridCell, GridKey, GridRequest, HexGridBuilder,
    IdleHost, IdleQueue, IdleTicket, IncrementalScheduler, LatLng, SharedGridCache,
};

#[doc(inline)]
pub use editor::{CellView, GridOverlay, HeadlessMap, MapHost, MaskView, OverlayMode, PaintState, PathStyle, ZoneSelectionController};

#[doc(inline)]
pub use selection::{
    CountySelectionReconciler, CoverageStore, HydrationGate, MemoryStore, PersistedCoverage, SelectedCounty, SelectionAction,
};

#[doc(inline)]
pub use session::{CoverageEvent, CoverageListener, CoverageSession, EventQueue, Frame, RecordingListener};

#[doc(inline)]
pub use io::geojson::{cells_to_geojson, write_cells_to_geojson_bytes};

#[doc(inline)]
pub use hexgrid::{CellId, GridError};
