//! Tile pipeline: fetch → decode → sample → analyse, and the session that
//! publishes results for the current selection only.
//!
//! Loading is split into `TileSession::select` (start) and
//! `TileSession::complete` (publish) so the caller can suspend in between,
//! on an event loop or a blocking HTTP client alike. A completion whose tile
//! no longer matches the selection is dropped.
use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;

use crate::analysis::{analyze, ElevationAnalysis};
use crate::config::{MimicConfig, ProceduralConfig, SamplingConfig};
use crate::error::{MimicError, Result};
use crate::grid::ElevationGrid;
use crate::memo::{ByPtr, Memo};
use crate::mesh::{build_direct_mesh, build_procedural_mesh, MeshGeometry};
use crate::raster::RasterImage;
use crate::tile::Tile;

// ── Sources ───────────────────────────────────────────────────────────────────

/// Where raster bytes come from. Implementations map transport failures and
/// non-2xx statuses to `MimicError::Fetch` / `MimicError::Http`.
pub trait TileSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// In-memory source keyed by URL; for tests and offline replay.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    tiles: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, bytes: Vec<u8>) {
        self.tiles.insert(url.into(), bytes);
    }
}

impl TileSource for MemorySource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.tiles
            .get(url)
            .cloned()
            .ok_or_else(|| MimicError::Http { url: url.to_string(), status: 404 })
    }
}

// ── Tile data ─────────────────────────────────────────────────────────────────

/// Everything derived from one tile's raster.
///
/// `grid` is empty and `analysis` is `None` when the tile has no data.
#[derive(Debug, Clone)]
pub struct TileData {
    pub tile: Tile,
    /// Encoded raster as fetched; the 2D view and the download.
    pub raster: Option<Arc<Vec<u8>>>,
    pub grid: Arc<ElevationGrid>,
    pub analysis: Option<Arc<ElevationAnalysis>>,
}

impl TileData {
    /// The "no data for this tile" state.
    pub fn unavailable(tile: Tile) -> Self {
        Self { tile, raster: None, grid: Arc::new(ElevationGrid::empty()), analysis: None }
    }

    pub fn has_data(&self) -> bool {
        self.analysis.is_some()
    }

    /// Suggested file name and bytes for exporting the 2D raster.
    pub fn download(&self) -> Option<(String, &[u8])> {
        self.raster.as_ref().map(|r| (self.tile.download_filename(), r.as_slice()))
    }
}

/// Decode `bytes` and run both sampling passes.
///
/// A decode failure is logged and yields the unavailable state; so does a
/// raster with no sampled pixels (analysis `None`).
pub fn process_raster(tile: Tile, bytes: Vec<u8>, sampling: &SamplingConfig) -> TileData {
    let image = match RasterImage::decode(&bytes) {
        Ok(image) => image,
        Err(e) => {
            log::warn!("tile {tile}: {e}");
            return TileData::unavailable(tile);
        }
    };

    let grid = image.sample_grid(sampling.grid_size);
    let samples = image.sparse_samples(sampling.sample_stride);
    let analysis = analyze(&samples, sampling.bin_count);
    if analysis.is_none() {
        log::warn!("tile {tile}: raster has no sampled pixels");
    }
    log::debug!(
        "tile {tile}: {}x{} raster, {}x{} grid, {} samples",
        image.width,
        image.height,
        grid.width,
        grid.height,
        samples.len()
    );

    TileData {
        tile,
        raster: Some(Arc::new(bytes)),
        grid: Arc::new(grid),
        analysis: analysis.map(Arc::new),
    }
}

/// Fetch and process one tile. Never fails: errors are logged and resolve
/// to `TileData::unavailable`.
pub fn load_tile(source: &dyn TileSource, tile: Tile, cfg: &MimicConfig) -> TileData {
    let url = tile.url(&cfg.elevation_url);
    match source.fetch(&url) {
        Ok(bytes) => process_raster(tile, bytes, &cfg.sampling),
        Err(e) => {
            log::warn!("tile {tile}: {e}");
            TileData::unavailable(tile)
        }
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

/// A fetch the caller should perform for the newly selected tile.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub tile: Tile,
    pub url: String,
}

/// What the terrain panel shows.
#[derive(Debug, Clone, Copy)]
pub enum PanelState<'a> {
    /// No tile selected.
    Empty,
    /// Selected tile is still loading.
    Loading(Tile),
    /// Selected tile finished loading, possibly with no data.
    Ready(&'a TileData),
}

type DirectKey = (Tile, ByPtr<ElevationGrid>, ByPtr<ElevationAnalysis>, f32);
type ProceduralKey = (Tile, ByPtr<ElevationAnalysis>, ProceduralConfig, f32);

/// Selection-scoped pipeline state with memoized meshes.
pub struct TileSession {
    config: MimicConfig,
    procedural: ProceduralConfig,
    selected: Option<Tile>,
    data: Option<TileData>,
    direct: Memo<DirectKey, MeshGeometry>,
    mimic: Memo<ProceduralKey, MeshGeometry>,
}

impl TileSession {
    pub fn new(config: MimicConfig) -> Self {
        let procedural = config.procedural.clone();
        Self { config, procedural, selected: None, data: None, direct: Memo::new(), mimic: Memo::new() }
    }

    pub fn config(&self) -> &MimicConfig {
        &self.config
    }

    pub fn selected(&self) -> Option<Tile> {
        self.selected
    }

    /// Change the selection. Returns the fetch to start, if any.
    ///
    /// Re-selecting the current tile is a no-op whether it is loading or
    /// loaded, so at most one fetch is in flight per selection. Published data
    /// for the previous tile is dropped immediately so the panel never shows
    /// one tile's terrain under another's label.
    pub fn select(&mut self, tile: Option<Tile>) -> Option<LoadRequest> {
        if tile == self.selected {
            return None;
        }
        self.selected = tile;
        self.data = None;
        tile.map(|tile| LoadRequest { tile, url: tile.url(&self.config.elevation_url) })
    }

    /// Publish a finished load. Returns `false` and discards `data` when its
    /// tile is no longer the selection.
    pub fn complete(&mut self, data: TileData) -> bool {
        if self.selected != Some(data.tile) {
            log::warn!(
                "discarding stale result for tile {} (selected: {})",
                data.tile,
                self.selected.map(|t| t.to_string()).unwrap_or_else(|| "none".to_string())
            );
            return false;
        }
        self.data = Some(data);
        true
    }

    /// Select `tile` and load it synchronously from `source`.
    pub fn load(&mut self, source: &dyn TileSource, tile: Tile) -> bool {
        match self.select(Some(tile)) {
            Some(req) => {
                let data = load_tile(source, req.tile, &self.config);
                self.complete(data)
            }
            None => self.data.is_some(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.selected.is_some() && self.data.is_none()
    }

    pub fn data(&self) -> Option<&TileData> {
        self.data.as_ref()
    }

    pub fn panel(&self) -> PanelState<'_> {
        match (self.selected, &self.data) {
            (None, _) => PanelState::Empty,
            (Some(_), Some(data)) => PanelState::Ready(data),
            (Some(tile), None) => PanelState::Loading(tile),
        }
    }

    /// Captions of the 2D and 3D cards for the selection, e.g. `2D: #9-3-4`.
    pub fn card_labels(&self) -> Option<(String, String)> {
        let label = self.selected?.label();
        Some((format!("2D: {label}"), format!("3D: {label}")))
    }

    /// Data-driven mesh of the published tile, textured with its satellite image.
    pub fn direct_mesh(&mut self) -> Option<Arc<MeshGeometry>> {
        let data = self.data.as_ref()?;
        let analysis = data.analysis.as_ref()?;
        let plane = self.config.mesh.plane_size;
        let key = (data.tile, ByPtr(Arc::clone(&data.grid)), ByPtr(Arc::clone(analysis)), plane);
        let texture = data.tile.url(&self.config.satellite_url);
        self.direct.get_or_try_compute(key, || {
            build_direct_mesh(&data.grid, analysis, &data.tile, plane).map(|m| m.with_texture(texture))
        })
    }

    /// Statistics-only mimic of the published tile.
    pub fn procedural_mesh(&mut self) -> Option<Arc<MeshGeometry>> {
        let data = self.data.as_ref()?;
        let analysis = data.analysis.as_ref()?;
        let plane = self.config.mesh.plane_size;
        let key = (data.tile, ByPtr(Arc::clone(analysis)), self.procedural.clone(), plane);
        let texture = data.tile.url(&self.config.satellite_url);
        let cfg = &self.procedural;
        self.mimic.get_or_try_compute(key, || {
            build_procedural_mesh(analysis, &data.tile, plane, cfg).map(|m| m.with_texture(texture))
        })
    }

    /// Draw a new noise seed for the mimic ("generate new mimic").
    pub fn regenerate_mimic<R: Rng + ?Sized>(&mut self, rng: &mut R) -> u32 {
        self.procedural = self.procedural.reseeded(rng);
        self.procedural.seed
    }

    pub fn procedural_config(&self) -> &ProceduralConfig {
        &self.procedural
    }
}
