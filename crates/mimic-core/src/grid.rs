use serde::{Deserialize, Serialize};

/// A low-resolution elevation grid in metres, row-major.
///
/// An empty grid (zero width or height) is the "unavailable" state produced
/// when the raster could not be decoded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElevationGrid {
    /// Row-major elevation values in metres.
    pub data: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl ElevationGrid {
    /// Create a new grid filled with the given value.
    pub fn new(width: usize, height: usize, fill: f32) -> Self {
        Self { data: vec![fill; width * height], width, height }
    }

    /// The "no data" grid.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, val: f32) {
        self.data[row * self.width + col] = val;
    }

    /// Iterate rows as slices, top row first.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks(self.width.max(1))
    }

    pub fn min_elevation(&self) -> f32 {
        self.data.iter().cloned().fold(f32::INFINITY, f32::min)
    }

    pub fn max_elevation(&self) -> f32 {
        self.data.iter().cloned().fold(f32::NEG_INFINITY, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_are_row_major() {
        let mut g = ElevationGrid::new(3, 2, 0.0);
        g.set(1, 2, 7.0);
        assert_eq!(g.data[5], 7.0);
        assert_eq!(g.get(1, 2), 7.0);
        let rows: Vec<&[f32]> = g.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], &[0.0, 0.0, 7.0]);
    }

    #[test]
    fn empty_grid_has_no_rows() {
        let g = ElevationGrid::empty();
        assert!(g.is_empty());
        assert_eq!(g.rows().count(), 0);
    }
}
