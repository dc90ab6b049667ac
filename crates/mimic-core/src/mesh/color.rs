//! Four-band hypsometric tint used for untextured terrain.
//!
//! Bands are keyed on height normalised to the tile's own relief; lightness
//! ramps linearly inside each band.

/// Elevation band of a normalised height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerrainBand {
    Water,
    Lowland,
    Highland,
    Peak,
}

impl TerrainBand {
    pub fn of(zn: f32) -> Self {
        if zn < 0.2 {
            TerrainBand::Water
        } else if zn < 0.4 {
            TerrainBand::Lowland
        } else if zn < 0.7 {
            TerrainBand::Highland
        } else {
            TerrainBand::Peak
        }
    }

    /// (hue, saturation, lightness) for normalised height `zn` in this band.
    fn hsl(self, zn: f32) -> (f32, f32, f32) {
        match self {
            TerrainBand::Water    => (0.60, 0.8, 0.3 + zn * 0.4),
            TerrainBand::Lowland  => (0.25, 0.7, 0.4 + zn * 0.3),
            TerrainBand::Highland => (0.08, 0.6, 0.4 + zn * 0.2),
            TerrainBand::Peak     => (0.00, 0.0, 0.7 + zn * 0.3),
        }
    }
}

/// RGB colour in [0, 1] for normalised height `zn`.
pub fn elevation_color(zn: f32) -> [f32; 3] {
    let (h, s, l) = TerrainBand::of(zn).hsl(zn);
    let (r, g, b) = hsl_to_rgb(h, s.clamp(0.0, 1.0), l.clamp(0.0, 1.0));
    [r, g, b]
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    if s == 0.0 {
        return (l, l, l);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);

    (r, g, b)
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 0.5 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}
