//! MapMimic core: Terrarium tile decoding, elevation statistics and the two
//! terrain meshes (direct and statistics-only procedural).
//!
//! Everything here is synchronous and free of platform I/O, so the same code
//! runs natively and under `wasm32-unknown-unknown`. Fetching is abstracted by
//! [`pipeline::TileSource`].

pub mod analysis;
pub mod codec;
pub mod config;
pub mod error;
pub mod grid;
pub mod memo;
pub mod mesh;
pub mod noise;
pub mod pipeline;
pub mod raster;
pub mod tile;
pub mod view;

pub use analysis::{analyze, ElevationAnalysis};
pub use config::{MeshConfig, MimicConfig, ProceduralConfig, SamplingConfig};
pub use error::{MimicError, Result};
pub use grid::ElevationGrid;
pub use mesh::{build_direct_mesh, build_procedural_mesh, MeshGeometry, TerrainScale};
pub use pipeline::{load_tile, process_raster, LoadRequest, MemorySource, PanelState, TileData, TileSession, TileSource};
pub use raster::RasterImage;
pub use tile::{tile_size_in_meters, LatLon, Tile, TileExtent};
pub use view::{ViewAction, ViewState};
