//! Height-mapped plane meshes for the 3D terrain views.
//!
//! Both the direct and the procedural mesh reduce to the same step: a
//! row-major grid of elevations in metres is laid out on a square plane,
//! lifted into scene units at the tile's geographic scale, tinted with the
//! hypsometric ramp, and given smooth vertex normals.
pub mod color;
pub mod direct;
pub mod procedural;

use serde::{Deserialize, Serialize};

use crate::tile::{tile_size_in_meters, Tile};
use color::elevation_color;

pub use direct::build_direct_mesh;
pub use procedural::{build_procedural_mesh, synthesize_elevations};

/// Zoom at which one metre of relief maps to one metre of ground extent.
const EXAGGERATION_PIVOT_ZOOM: f64 = 15.0;

/// Metres → scene units conversion for one tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainScale {
    /// Scene units per metre of ground at this tile.
    pub vertical_scale: f64,
    /// Zoom-dependent divisor: `exp(0.2 · (zoom − 15))`.
    pub exaggeration: f64,
}

impl TerrainScale {
    /// Scale for `tile` on a plane `plane_size` units wide.
    ///
    /// The tile's north-south ground extent is taken at its centre latitude.
    pub fn for_tile(tile: &Tile, plane_size: f32) -> Self {
        let extent = tile_size_in_meters(tile.zoom, tile.center().lat);
        Self {
            vertical_scale: plane_size as f64 / extent.north_south,
            exaggeration: (0.2 * (tile.zoom as f64 - EXAGGERATION_PIVOT_ZOOM)).exp(),
        }
    }

    /// Scene height of `elevation` above the tile minimum `min`.
    #[inline]
    pub fn height(&self, elevation: f32, min: f32) -> f32 {
        ((elevation - min) as f64 * self.vertical_scale / self.exaggeration) as f32
    }
}

/// Vertex grid with per-vertex attributes and a triangle list.
///
/// Vertices are row-major, row 0 at +y. Positions are `[x, y, z]` with z up;
/// renderers that want y-up rotate the mesh by −90° about x.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshGeometry {
    pub columns: usize,
    pub rows: usize,
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    /// Satellite texture for display. Vertex colours remain the fallback.
    pub texture_url: Option<String>,
}

impl MeshGeometry {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Lowest and highest vertex height.
    pub fn height_range(&self) -> (f32, f32) {
        self.positions
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| (lo.min(p[2]), hi.max(p[2])))
    }

    pub fn with_texture(mut self, url: impl Into<String>) -> Self {
        self.texture_url = Some(url.into());
        self
    }
}

/// Lay out `elevations` (`rows`×`columns`, row-major) on a `plane_size` plane.
///
/// Heights are relative to `min`; colours use the height normalised by
/// `max − min`, which is the tile's maximum scaled height. A flat tile
/// (`max <= min`) is coloured as the bottom of the ramp.
pub(crate) fn build_surface(
    columns: usize,
    rows: usize,
    elevations: &[f32],
    min: f32,
    max: f32,
    scale: TerrainScale,
    plane_size: f32,
) -> MeshGeometry {
    debug_assert_eq!(elevations.len(), columns * rows);
    let half = plane_size / 2.0;
    let dx = plane_size / (columns - 1) as f32;
    let dy = plane_size / (rows - 1) as f32;
    let relief = max - min;

    let n = columns * rows;
    let mut positions = Vec::with_capacity(n);
    let mut colors = Vec::with_capacity(n);
    let mut uvs = Vec::with_capacity(n);

    for i in 0..rows {
        let y = half - i as f32 * dy;
        let v = 1.0 - i as f32 / (rows - 1) as f32;
        for j in 0..columns {
            let elevation = elevations[i * columns + j];
            let x = -half + j as f32 * dx;
            positions.push([x, y, scale.height(elevation, min)]);

            let zn = if relief > 0.0 { (elevation - min) / relief } else { 0.0 };
            colors.push(elevation_color(zn));
            uvs.push([j as f32 / (columns - 1) as f32, v]);
        }
    }

    let indices = grid_indices(columns, rows);
    let normals = compute_normals(&positions, &indices);

    MeshGeometry { columns, rows, positions, colors, normals, uvs, indices, texture_url: None }
}

/// Two triangles per grid quad, counter-clockwise seen from +z.
fn grid_indices(columns: usize, rows: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity((columns - 1) * (rows - 1) * 6);
    for i in 0..rows - 1 {
        for j in 0..columns - 1 {
            let a = (i * columns + j) as u32;
            let b = ((i + 1) * columns + j) as u32;
            let c = ((i + 1) * columns + j + 1) as u32;
            let d = (i * columns + j + 1) as u32;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    indices
}

/// Area-weighted smooth vertex normals. Degenerate vertices point up.
pub fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![[0.0f32; 3]; positions.len()];

    for tri in indices.chunks_exact(3) {
        let [v0, v1, v2] = [positions[tri[0] as usize], positions[tri[1] as usize], positions[tri[2] as usize]];
        let e1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
        let e2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
        let n = [
            e1[1] * e2[2] - e1[2] * e2[1],
            e1[2] * e2[0] - e1[0] * e2[2],
            e1[0] * e2[1] - e1[1] * e2[0],
        ];
        for &idx in tri {
            let acc = &mut normals[idx as usize];
            acc[0] += n[0];
            acc[1] += n[1];
            acc[2] += n[2];
        }
    }

    for n in &mut normals {
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        *n = if len > 1e-12 { [n[0] / len, n[1] / len, n[2] / len] } else { [0.0, 0.0, 1.0] };
    }
    normals
}
