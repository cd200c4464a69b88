use wasm_bindgen::{JsValue, prelude::wasm_bindgen};

use coverzone_core::{
    CellId, CoverageSession, EditorConfig, EventQueue, GeoId, GeometryIndex, HeadlessMap, MemSource, PersistedCoverage,
    SelectedCounty,
};

use crate::common::*;

/// The coverage editor driven by a browser map.
///
/// The page forwards map events and calls `pump` from `requestIdleCallback`
/// while `has_pending_work` is true. After pointer events it should read
/// `dragging` and enable or disable the map's own drag gesture to match,
/// then drain `take_events` to learn about zone and county changes.
#[wasm_bindgen]
pub struct WasmZoneEditor {
    inner: CoverageSession<HeadlessMap, EventQueue>,
}

#[wasm_bindgen]
impl WasmZoneEditor {
    /// `config`: optional `{ grid_size, clip_edges, batch_size, min_hex_km, min_zoom }`.
    /// `operating_counties`: persisted FIPS codes to hydrate from.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, operating_counties: Vec<String>) -> Result<WasmZoneEditor, JsValue> {
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(|e| js_err(format!("invalid editor config: {e}")))?
        };
        config.validate().map_err(js_err)?;

        let persisted = PersistedCoverage::from_codes(operating_counties.iter().map(String::as_str));
        let inner = CoverageSession::new(config, HeadlessMap::new(), EventQueue::new(), persisted);
        Ok(WasmZoneEditor { inner })
    }

    /// Hand over the county dataset bytes. A parse failure leaves the
    /// selection as it is and is reported back.
    pub fn load_dataset(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        let index = GeometryIndex::load(&MemSource::new(bytes.to_vec()));
        let error = index.as_ref().err().map(js_err);
        self.inner.dataset_loaded(index);
        match error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// The dataset fetch itself failed.
    pub fn dataset_failed(&mut self, message: &str) {
        self.inner.dataset_loaded(Err(fetch_error(message)));
    }

    /// The county picker emitted its selection list.
    pub fn picker_changed(&mut self, counties: JsValue) -> Result<(), JsValue> {
        let counties: Vec<SelectedCounty> = serde_wasm_bindgen::from_value(counties).map_err(js_err)?;
        self.inner.picker_changed(counties);
        Ok(())
    }

    /// Toggle the county under the point; returns its GEO_ID.
    pub fn pick_at(&mut self, lon: f64, lat: f64) -> Option<String> {
        self.inner.pick_at(lon, lat).map(|id| id.to_string())
    }

    /// Open or close the editor for a county. Returns whether a county is
    /// being edited afterwards.
    pub fn edit_county(&mut self, geo_id: &str) -> bool {
        self.inner.edit_county(&GeoId::from(geo_id))
    }

    pub fn stop_editing(&mut self) { self.inner.stop_editing() }

    pub fn remove_county(&mut self, geo_id: &str) -> bool {
        self.inner.remove_county(&GeoId::from(geo_id))
    }

    pub fn active_county(&self) -> Option<String> {
        self.inner.active_county().map(|id| id.to_string())
    }

    pub fn set_zoom(&mut self, zoom: f64) { self.inner.set_zoom(zoom) }

    pub fn set_grid_params(&mut self, grid_size: u32, clip_edges: bool) {
        self.inner.set_grid_params(grid_size, clip_edges)
    }

    pub fn pointer_down(&mut self, erase: bool) -> bool { self.inner.pointer_down(erase) }

    pub fn pointer_move(&mut self, cell: u32) -> bool { self.inner.pointer_move(CellId(cell)) }

    /// Returns the committed zone ids, or `undefined` if no paint was active.
    pub fn pointer_up(&mut self) -> Result<JsValue, JsValue> {
        match self.inner.pointer_up() {
            Some(zones) => to_js(&zones),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Returns the committed zone ids, or `undefined` if not editable.
    pub fn click_cell(&mut self, cell: u32) -> Result<JsValue, JsValue> {
        match self.inner.click_cell(CellId(cell)) {
            Some(zones) => to_js(&zones),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Whether the map should allow drag-panning right now.
    pub fn dragging(&self) -> bool { self.inner.host().dragging() }

    pub fn has_pending_work(&self) -> bool { self.inner.host().pending_idle() > 0 }

    /// Run one idle slot. Returns whether more work remains.
    pub fn pump(&mut self) -> bool {
        if let Some(ticket) = self.inner.host_mut().take_idle() {
            self.inner.on_idle(ticket);
        }
        self.has_pending_work()
    }

    /// Everything to draw: `{ zones, mask, cells, loading }`.
    pub fn render(&self) -> Result<JsValue, JsValue> { to_js_json(&self.inner.render()) }

    /// The selected counties, with their zones.
    pub fn counties(&self) -> Result<JsValue, JsValue> { to_js(&self.inner.counties()) }

    /// Notifications since the last call, oldest first, each tagged with
    /// `kind`: `zonesChanged`, `countiesChanged` or `gridReady`.
    pub fn take_events(&mut self) -> Result<JsValue, JsValue> {
        to_js_json(&self.inner.listener_mut().take())
    }

    /// FIPS codes to persist.
    pub fn operating_counties(&self) -> Vec<String> {
        self.inner.selection().to_persisted().operating_counties.iter().map(|f| f.to_string()).collect()
    }

    pub fn teardown(&mut self) { self.inner.teardown() }
}

fn fetch_error(message: &str) -> anyhow::Error {
    anyhow::anyhow!("county dataset fetch failed: {message}")
}
