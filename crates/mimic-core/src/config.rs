//! Runtime configuration for the tile pipeline and mesh builders.
//!
//! Every field has a default matching the viewer's stock behaviour, so a JSON
//! config only needs the keys it changes.
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::analysis::DEFAULT_BIN_COUNT;
use crate::error::{MimicError, Result};
use crate::noise::seed_from_str;

/// Terrarium elevation tiles on the public AWS bucket.
pub const DEFAULT_ELEVATION_URL: &str =
    "https://s3.amazonaws.com/elevation-tiles-prod/terrarium/{z}/{x}/{y}.png";

/// World Imagery tiles; note the `{y}/{x}` order of this service.
pub const DEFAULT_SATELLITE_URL: &str =
    "https://services.arcgisonline.com/arcgis/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}.png";

/// Text seed the procedural mesh has always used.
pub const DEFAULT_SEED_TEXT: &str = "seed";

/// Raster sampling resolutions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Side length of the dense elevation grid.
    pub grid_size: usize,
    /// Pixel stride of the statistics pass (4 = every 4th pixel).
    pub sample_stride: usize,
    /// Histogram bucket count.
    pub bin_count: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self { grid_size: 32, sample_stride: 4, bin_count: DEFAULT_BIN_COUNT }
    }
}

/// Scene-space layout shared by both meshes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Edge length of the square plane in scene units.
    pub plane_size: f32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self { plane_size: 256.0 }
    }
}

/// Parameters of the statistics-only terrain reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProceduralConfig {
    /// Vertices per side of the synthesized grid.
    pub resolution: usize,
    pub octaves: u32,
    /// Base noise frequency over the unit square.
    pub noise_scale: f64,
    pub seed: u32,
}

impl Default for ProceduralConfig {
    fn default() -> Self {
        Self { resolution: 256, octaves: 5, noise_scale: 1.0, seed: seed_from_str(DEFAULT_SEED_TEXT) }
    }
}

impl ProceduralConfig {
    /// Same parameters with a fresh random seed ("generate new mimic").
    pub fn reseeded<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        Self { seed: rng.gen(), ..self.clone() }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MimicConfig {
    /// XYZ template for Terrarium elevation rasters.
    pub elevation_url: String,
    /// XYZ template for the satellite texture handed to the renderer.
    pub satellite_url: String,
    pub sampling: SamplingConfig,
    pub mesh: MeshConfig,
    pub procedural: ProceduralConfig,
}

impl Default for MimicConfig {
    fn default() -> Self {
        Self {
            elevation_url: DEFAULT_ELEVATION_URL.to_string(),
            satellite_url: DEFAULT_SATELLITE_URL.to_string(),
            sampling: SamplingConfig::default(),
            mesh: MeshConfig::default(),
            procedural: ProceduralConfig::default(),
        }
    }
}

impl MimicConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| MimicError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    /// Reject settings the pipeline cannot honour.
    pub fn validate(&self) -> Result<()> {
        let bad = |msg: &str| Err(MimicError::Config(msg.to_string()));
        if self.sampling.grid_size < 2 {
            return bad("sampling.grid_size must be at least 2");
        }
        if self.sampling.sample_stride == 0 {
            return bad("sampling.sample_stride must be positive");
        }
        if self.sampling.bin_count == 0 {
            return bad("sampling.bin_count must be positive");
        }
        if !(self.mesh.plane_size.is_finite() && self.mesh.plane_size > 0.0) {
            return bad("mesh.plane_size must be a positive number");
        }
        if self.procedural.resolution < 2 {
            return bad("procedural.resolution must be at least 2");
        }
        if !(self.procedural.noise_scale.is_finite() && self.procedural.noise_scale > 0.0) {
            return bad("procedural.noise_scale must be a positive number");
        }
        for (name, template) in [("elevation_url", &self.elevation_url), ("satellite_url", &self.satellite_url)] {
            if !["{z}", "{x}", "{y}"].iter().all(|p| template.contains(p)) {
                return Err(MimicError::Config(format!("{name} must contain {{z}}, {{x}} and {{y}}")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn defaults_are_valid() {
        let cfg = MimicConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.sampling.grid_size, 32);
        assert_eq!(cfg.sampling.sample_stride, 4);
        assert_eq!(cfg.sampling.bin_count, 64);
        assert_eq!(cfg.procedural.resolution, 256);
        assert_eq!(cfg.procedural.octaves, 5);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg = MimicConfig::from_json(r#"{ "sampling": { "grid_size": 64 }, "procedural": { "seed": 9 } }"#).unwrap();
        assert_eq!(cfg.sampling.grid_size, 64);
        assert_eq!(cfg.sampling.bin_count, 64);
        assert_eq!(cfg.procedural.seed, 9);
        assert_eq!(cfg.procedural.octaves, 5);
        assert_eq!(cfg.elevation_url, DEFAULT_ELEVATION_URL);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(MimicConfig::from_json(r#"{ "sampling": { "sample_stride": 0 } }"#).is_err());
        assert!(MimicConfig::from_json(r#"{ "procedural": { "resolution": 1 } }"#).is_err());
        assert!(MimicConfig::from_json(r#"{ "elevation_url": "https://example.test/tile.png" }"#).is_err());
        assert!(MimicConfig::from_json("not json").is_err());
    }

    #[test]
    fn reseed_changes_only_the_seed() {
        let base = ProceduralConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let next = base.reseeded(&mut rng);
        assert_eq!(next.octaves, base.octaves);
        assert_eq!(next.resolution, base.resolution);
        let again = base.reseeded(&mut StdRng::seed_from_u64(1));
        assert_eq!(next, again);
    }
}
