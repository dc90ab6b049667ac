//! Decoded Terrarium rasters and the two sampling passes over them.
//!
//! Grid extraction feeds the direct mesh; the sparse pass feeds the
//! statistics. Their resolutions are independent.
use crate::codec::decode;
use crate::error::{MimicError, Result};
use crate::grid::ElevationGrid;

/// Bytes per RGBA pixel.
const CHANNELS: usize = 4;

/// An RGBA8 raster, row-major, top row first.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl RasterImage {
    /// Wrap an RGBA8 buffer, checking its length against the dimensions.
    pub fn from_rgba(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self> {
        if pixels.len() != width * height * CHANNELS {
            return Err(MimicError::Decode(format!(
                "expected {} RGBA bytes for {width}x{height}, got {}",
                width * height * CHANNELS,
                pixels.len()
            )));
        }
        Ok(Self { width, height, pixels })
    }

    /// Decode an encoded image (PNG for Terrarium tiles) into RGBA8.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let (w, h) = rgba.dimensions();
        Self::from_rgba(w as usize, h as usize, rgba.into_raw())
    }

    /// Elevation of the pixel at column `x`, row `y`.
    #[inline]
    pub fn elevation_at(&self, x: usize, y: usize) -> f32 {
        let i = (y * self.width + x) * CHANNELS;
        decode(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2])
    }

    /// Extract a `grid_size`×`grid_size` grid by nearest sampling.
    ///
    /// Cell `(x, y)` reads pixel `(floor(x·W/N), floor(y·H/N))`, which never
    /// leaves the raster even when W or H is not a multiple of N. Returns the
    /// empty grid for an empty raster or `grid_size == 0`.
    pub fn sample_grid(&self, grid_size: usize) -> ElevationGrid {
        if grid_size == 0 || self.width == 0 || self.height == 0 {
            return ElevationGrid::empty();
        }
        let mut grid = ElevationGrid::new(grid_size, grid_size, 0.0);
        for gy in 0..grid_size {
            let py = gy * self.height / grid_size;
            for gx in 0..grid_size {
                let px = gx * self.width / grid_size;
                grid.set(gy, gx, self.elevation_at(px, py));
            }
        }
        grid
    }

    /// Decode every `pixel_stride`-th pixel of the raw buffer.
    ///
    /// Walks the byte buffer linearly, so the stride runs across row ends.
    /// Empty when the raster has no pixels.
    pub fn sparse_samples(&self, pixel_stride: usize) -> Vec<f32> {
        self.pixels
            .chunks_exact(CHANNELS)
            .step_by(pixel_stride.max(1))
            .map(|px| decode(px[0], px[1], px[2]))
            .collect()
    }
}
