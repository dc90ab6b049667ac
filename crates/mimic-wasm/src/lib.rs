//! Browser bindings for the MapMimic pipeline.
//!
//! The page owns the map widget and the renderer; this crate owns selection,
//! staleness, analysis and mesh generation. Fetching is delegated back to JS
//! through a `fetcher(url) -> Promise<Uint8Array>` callback.
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use js_sys::{Function, Promise, Uint8Array};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

use mimic_core::pipeline::{process_raster, PanelState};
use mimic_core::{MeshGeometry, MimicConfig, Tile, TileData, TileSession, ViewAction, ViewState};

/// Route `log` records to the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    // Already installed when the module is instantiated more than once.
    let _ = console_log::init_with_level(log::Level::Info);
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_tile(tile: &str) -> Result<Tile, JsValue> {
    tile.parse().map_err(js_err)
}

// ── Mesh buffers ──────────────────────────────────────────────────────────────

/// Flat typed-array views of a mesh, ready for a `BufferGeometry`.
#[wasm_bindgen]
pub struct MeshBuffers {
    mesh: Arc<MeshGeometry>,
}

fn flatten<const N: usize>(v: &[[f32; N]]) -> Vec<f32> {
    v.iter().flatten().copied().collect()
}

#[wasm_bindgen]
impl MeshBuffers {
    #[wasm_bindgen(getter)]
    pub fn columns(&self) -> u32 {
        self.mesh.columns as u32
    }

    #[wasm_bindgen(getter)]
    pub fn rows(&self) -> u32 {
        self.mesh.rows as u32
    }

    pub fn positions(&self) -> Vec<f32> {
        flatten(&self.mesh.positions)
    }

    pub fn colors(&self) -> Vec<f32> {
        flatten(&self.mesh.colors)
    }

    pub fn normals(&self) -> Vec<f32> {
        flatten(&self.mesh.normals)
    }

    pub fn uvs(&self) -> Vec<f32> {
        flatten(&self.mesh.uvs)
    }

    pub fn indices(&self) -> Vec<u32> {
        self.mesh.indices.clone()
    }

    #[wasm_bindgen(getter, js_name = textureUrl)]
    pub fn texture_url(&self) -> Option<String> {
        self.mesh.texture_url.clone()
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PanelView {
    state: &'static str,
    tile: Option<String>,
    has_data: bool,
    labels: Option<(String, String)>,
    summary: Vec<(&'static str, f32)>,
}

fn complete_with(session: &RefCell<TileSession>, tile: Tile, bytes: Option<Vec<u8>>) -> bool {
    let mut session = session.borrow_mut();
    let data = match bytes {
        Some(bytes) => process_raster(tile, bytes, &session.config().sampling),
        None => TileData::unavailable(tile),
    };
    session.complete(data)
}

async fn fetch_bytes(fetcher: &Function, url: &str) -> Result<Vec<u8>, JsValue> {
    let promise: Promise = fetcher.call1(&JsValue::NULL, &JsValue::from_str(url))?.dyn_into()?;
    let value = JsFuture::from(promise).await?;
    Ok(Uint8Array::new(&value).to_vec())
}

/// One map page's tile pipeline.
#[wasm_bindgen]
pub struct MimicSession {
    inner: Rc<RefCell<TileSession>>,
}

#[wasm_bindgen]
impl MimicSession {
    /// `config_json` is an optional partial `MimicConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<MimicSession, JsValue> {
        let config = match config_json {
            Some(text) => MimicConfig::from_json(&text).map_err(js_err)?,
            None => MimicConfig::default(),
        };
        Ok(Self { inner: Rc::new(RefCell::new(TileSession::new(config))) })
    }

    /// Select `"z/x/y"` (or clear with `undefined`). Returns the elevation URL
    /// to fetch when a new load starts.
    pub fn select(&self, tile: Option<String>) -> Result<Option<String>, JsValue> {
        let tile = tile.as_deref().map(parse_tile).transpose()?;
        Ok(self.inner.borrow_mut().select(tile).map(|req| req.url))
    }

    /// Publish raster bytes fetched for `tile`; `undefined` means the fetch
    /// failed. Returns `false` when the tile is no longer selected.
    pub fn complete(&self, tile: &str, bytes: Option<Vec<u8>>) -> Result<bool, JsValue> {
        let tile = parse_tile(tile)?;
        Ok(complete_with(&self.inner, tile, bytes))
    }

    /// Select `tile` and load it through `fetcher`. The promise resolves to
    /// whether the result was published.
    pub fn load(&self, tile: &str, fetcher: Function) -> Result<Promise, JsValue> {
        let tile = parse_tile(tile)?;
        let request = self.inner.borrow_mut().select(Some(tile));
        let session = Rc::clone(&self.inner);
        Ok(future_to_promise(async move {
            let Some(request) = request else {
                return Ok(JsValue::from_bool(session.borrow().data().is_some()));
            };
            let bytes = match fetch_bytes(&fetcher, &request.url).await {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    log::warn!("tile {tile}: fetch of {} failed: {e:?}", request.url);
                    None
                }
            };
            Ok(JsValue::from_bool(complete_with(&session, request.tile, bytes)))
        }))
    }

    /// `{ state, tile, hasData, labels, summary }` for the side panel.
    pub fn panel(&self) -> Result<JsValue, JsValue> {
        let session = self.inner.borrow();
        let view = match session.panel() {
            PanelState::Empty => PanelView { state: "empty", tile: None, has_data: false, labels: None, summary: vec![] },
            PanelState::Loading(tile) => PanelView {
                state: "loading",
                tile: Some(tile.to_string()),
                has_data: false,
                labels: session.card_labels(),
                summary: vec![],
            },
            PanelState::Ready(data) => PanelView {
                state: "ready",
                tile: Some(data.tile.to_string()),
                has_data: data.has_data(),
                labels: session.card_labels(),
                summary: data.analysis.as_ref().map(|a| a.summary_rows().to_vec()).unwrap_or_default(),
            },
        };
        serde_wasm_bindgen::to_value(&view).map_err(js_err)
    }

    /// Full analysis (stats, sorted samples, histogram) or `null`.
    pub fn analysis(&self) -> Result<JsValue, JsValue> {
        let session = self.inner.borrow();
        match session.data().and_then(|d| d.analysis.as_ref()) {
            Some(analysis) => serde_wasm_bindgen::to_value(&**analysis).map_err(js_err),
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen(js_name = directMesh)]
    pub fn direct_mesh(&self) -> Option<MeshBuffers> {
        self.inner.borrow_mut().direct_mesh().map(|mesh| MeshBuffers { mesh })
    }

    #[wasm_bindgen(js_name = proceduralMesh)]
    pub fn procedural_mesh(&self) -> Option<MeshBuffers> {
        self.inner.borrow_mut().procedural_mesh().map(|mesh| MeshBuffers { mesh })
    }

    /// New random seed for the procedural mesh; returns the seed.
    #[wasm_bindgen(js_name = regenerateMimic)]
    pub fn regenerate_mimic(&self) -> u32 {
        self.inner.borrow_mut().regenerate_mimic(&mut rand::thread_rng())
    }

    /// Encoded raster of the published tile, for the 2D card and download.
    pub fn raster(&self) -> Option<Vec<u8>> {
        let session = self.inner.borrow();
        session.data()?.raster.as_ref().map(|r| r.to_vec())
    }

    #[wasm_bindgen(js_name = downloadFilename)]
    pub fn download_filename(&self) -> Option<String> {
        let session = self.inner.borrow();
        session.data()?.download().map(|(name, _)| name)
    }
}

// ── Map view ──────────────────────────────────────────────────────────────────

/// Map centre, zoom and selection, synced with `location.search`.
#[wasm_bindgen]
pub struct MapView {
    state: ViewState,
}

#[wasm_bindgen]
impl MapView {
    #[wasm_bindgen(js_name = fromQuery)]
    pub fn from_query(query: &str) -> MapView {
        Self { state: ViewState::from_query(query) }
    }

    #[wasm_bindgen(js_name = toQuery)]
    pub fn to_query(&self) -> String {
        self.state.to_query()
    }

    #[wasm_bindgen(js_name = moveTo)]
    pub fn move_to(&mut self, longitude: f64, latitude: f64, zoom: f64) {
        self.state = self.state.reduce(ViewAction::Move { longitude, latitude, zoom });
    }

    /// Handle a map click; returns the new selection as `"z/x/y"`.
    pub fn click(&mut self, longitude: f64, latitude: f64) -> Option<String> {
        self.state = self.state.reduce(ViewAction::Click { longitude, latitude });
        self.selected()
    }

    pub fn select(&mut self, tile: Option<String>) -> Result<(), JsValue> {
        let tile = tile.as_deref().map(parse_tile).transpose()?;
        self.state = self.state.reduce(ViewAction::Select(tile));
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn selected(&self) -> Option<String> {
        self.state.selected.map(|t| t.to_string())
    }

    #[wasm_bindgen(getter)]
    pub fn longitude(&self) -> f64 {
        self.state.longitude
    }

    #[wasm_bindgen(getter)]
    pub fn latitude(&self) -> f64 {
        self.state.latitude
    }

    #[wasm_bindgen(getter)]
    pub fn zoom(&self) -> f64 {
        self.state.zoom
    }

    #[wasm_bindgen(getter, js_name = hillshadeIntensity)]
    pub fn hillshade_intensity(&self) -> f64 {
        self.state.hillshade_intensity()
    }

    /// Graticule label of the selected tile, e.g. `#12-2154-1434`.
    #[wasm_bindgen(getter, js_name = selectedLabel)]
    pub fn selected_label(&self) -> Option<String> {
        self.state.selected.map(|t| t.label())
    }
}
