//! Procedural mesh: terrain rebuilt from the tile's statistics alone.
//!
//! Pipeline per vertex:
//!   1. fBm noise at the vertex's unit-square coordinate.
//!   2. Percentile `t = Φ(n)`; fBm averages octaves, so its output is
//!      close to normally distributed.
//!   3. Elevation = sorted sample at `floor(t · (N − 1))`.
//!
//! The spatial pattern is synthetic, but every height comes from the tile's
//! own empirical distribution. The elevation grid is never consulted.
#[cfg(feature = "threading")]
use rayon::prelude::*;

use crate::analysis::ElevationAnalysis;
use crate::config::ProceduralConfig;
use crate::noise::{normal_cdf, Fbm};
use crate::tile::Tile;

use super::{build_surface, MeshGeometry, TerrainScale};

/// Synthesize a `resolution`×`resolution` row-major elevation field.
///
/// Returns `None` when the analysis holds no samples or the resolution is
/// below 2. Deterministic for a given analysis and config.
pub fn synthesize_elevations(analysis: &ElevationAnalysis, cfg: &ProceduralConfig) -> Option<Vec<f32>> {
    let res = cfg.resolution;
    if res < 2 || analysis.sorted_elevations.is_empty() {
        return None;
    }
    let fbm = Fbm::new(cfg.seed, cfg.octaves, cfg.noise_scale);
    let step = 1.0 / (res - 1) as f64;

    let fill_row = |i: usize, row: &mut [f32]| {
        let v = i as f64 * step;
        for (j, out) in row.iter_mut().enumerate() {
            let n = fbm.sample(j as f64 * step, v);
            // quantile() only fails on an empty sample set, ruled out above.
            *out = analysis.quantile(normal_cdf(n)).unwrap_or(analysis.min);
        }
    };

    let mut field = vec![0.0f32; res * res];
    #[cfg(feature = "threading")]
    field.par_chunks_mut(res).enumerate().for_each(|(i, row)| fill_row(i, row));
    #[cfg(not(feature = "threading"))]
    field.chunks_mut(res).enumerate().for_each(|(i, row)| fill_row(i, row));

    Some(field)
}

/// Build the statistics-only mimic mesh for `tile`.
///
/// Heights and colours follow the same transform as the direct mesh. Returns
/// `None` ("no terrain") when the analysis holds no samples.
pub fn build_procedural_mesh(
    analysis: &ElevationAnalysis,
    tile: &Tile,
    plane_size: f32,
    cfg: &ProceduralConfig,
) -> Option<MeshGeometry> {
    let field = synthesize_elevations(analysis, cfg)?;
    let scale = TerrainScale::for_tile(tile, plane_size);
    Some(build_surface(
        cfg.resolution,
        cfg.resolution,
        &field,
        analysis.min,
        analysis.max,
        scale,
        plane_size,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;

    fn cfg(resolution: usize) -> ProceduralConfig {
        ProceduralConfig { resolution, ..ProceduralConfig::default() }
    }

    fn mountain_analysis() -> ElevationAnalysis {
        let samples: Vec<f32> = (0..2000).map(|i| 200.0 + (i as f32 * 0.37).sin() * 800.0 + i as f32).collect();
        analyze(&samples, 64).unwrap()
    }

    #[test]
    fn same_inputs_give_identical_meshes() {
        let analysis = mountain_analysis();
        let tile = Tile::new(11, 1000, 700).unwrap();
        let a = build_procedural_mesh(&analysis, &tile, 256.0, &cfg(48)).unwrap();
        let b = build_procedural_mesh(&analysis, &tile, 256.0, &cfg(48)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seed_changes_the_surface() {
        let analysis = mountain_analysis();
        let a = synthesize_elevations(&analysis, &cfg(32)).unwrap();
        let other = ProceduralConfig { seed: 12345, ..cfg(32) };
        let b = synthesize_elevations(&analysis, &other).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn every_height_is_an_observed_sample() {
        let analysis = mountain_analysis();
        let field = synthesize_elevations(&analysis, &cfg(40)).unwrap();
        assert_eq!(field.len(), 40 * 40);
        for v in &field {
            assert!(analysis.sorted_elevations.binary_search_by(|s| s.total_cmp(v)).is_ok());
        }
    }

    #[test]
    fn flat_tile_gives_uniform_height() {
        let analysis = analyze(&[88.0; 50], 64).unwrap();
        let mesh = build_procedural_mesh(&analysis, &Tile::new(9, 100, 100).unwrap(), 256.0, &cfg(16)).unwrap();
        let (lo, hi) = mesh.height_range();
        assert_eq!(lo, hi);
        assert!(mesh.positions.iter().all(|p| p[2].is_finite()));
    }

    #[test]
    fn single_sample_fills_every_vertex() {
        let analysis = analyze(&[-12.0], 4).unwrap();
        let field = synthesize_elevations(&analysis, &cfg(8)).unwrap();
        assert!(field.iter().all(|&v| v == -12.0));
    }

    #[test]
    fn empty_analysis_has_no_terrain() {
        let empty = ElevationAnalysis {
            min: 0.0,
            max: 0.0,
            mean: 0.0,
            std: 0.0,
            range: 0.0,
            sorted_elevations: vec![],
            bins: vec![0; 4],
        };
        let tile = Tile::new(3, 1, 1).unwrap();
        assert!(build_procedural_mesh(&empty, &tile, 256.0, &cfg(8)).is_none());
    }

    #[cfg(feature = "threading")]
    #[test]
    fn parallel_rows_match_serial_fill() {
        let analysis = mountain_analysis();
        let c = cfg(37);
        let parallel = synthesize_elevations(&analysis, &c).unwrap();

        let fbm = Fbm::new(c.seed, c.octaves, c.noise_scale);
        let step = 1.0 / 36.0;
        let serial: Vec<f32> = (0..37 * 37)
            .map(|k| {
                let (i, j) = (k / 37, k % 37);
                let n = fbm.sample(j as f64 * step, i as f64 * step);
                analysis.quantile(normal_cdf(n)).unwrap()
            })
            .collect();
        assert_eq!(parallel, serial);
    }

    #[test]
    fn mesh_has_configured_resolution() {
        let mesh = build_procedural_mesh(&mountain_analysis(), &Tile::new(5, 3, 9).unwrap(), 256.0, &cfg(20)).unwrap();
        assert_eq!((mesh.columns, mesh.rows), (20, 20));
        assert_eq!(mesh.triangle_count(), 19 * 19 * 2);
        assert_eq!(mesh.normals.len(), 400);
    }
}
