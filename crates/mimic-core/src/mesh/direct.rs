//! Direct mesh: the sampled elevation grid laid out as-is.
use crate::analysis::ElevationAnalysis;
use crate::grid::ElevationGrid;
use crate::tile::Tile;

use super::{build_surface, MeshGeometry, TerrainScale};

/// Build the data-driven terrain mesh for `tile`.
///
/// One vertex per grid cell, heights relative to `analysis.min`. Returns
/// `None` when the grid is unavailable or too small to form a surface
/// (fewer than 2 cells along either axis).
pub fn build_direct_mesh(
    grid: &ElevationGrid,
    analysis: &ElevationAnalysis,
    tile: &Tile,
    plane_size: f32,
) -> Option<MeshGeometry> {
    if grid.width < 2 || grid.height < 2 || grid.data.len() != grid.width * grid.height {
        return None;
    }
    let scale = TerrainScale::for_tile(tile, plane_size);
    Some(build_surface(
        grid.width,
        grid.height,
        &grid.data,
        analysis.min,
        analysis.max,
        scale,
        plane_size,
    ))
}
