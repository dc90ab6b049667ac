//! Fractional Brownian motion over seeded simplex noise.
//!
//! fBm: sum of octaves with amplitude = gain^i and frequency = scale·lacunarity^i,
//! divided by the total amplitude so the result stays roughly within [−1, 1].
use noise::{NoiseFn, Simplex};

pub struct Fbm {
    pub octaves: u32,
    /// Base frequency of the first octave.
    pub scale: f64,
    pub lacunarity: f64,
    pub gain: f64,
    noise: Simplex,
}

impl Fbm {
    /// Construct an fBm with the given seed, octave count and base frequency.
    /// Lacunarity is fixed at 2.0 and gain at 0.5.
    pub fn new(seed: u32, octaves: u32, scale: f64) -> Self {
        Self { octaves, scale, lacunarity: 2.0, gain: 0.5, noise: Simplex::new(seed) }
    }

    /// Sum of the octave amplitudes; the normaliser applied by `sample`.
    pub fn total_amplitude(&self) -> f64 {
        (0..self.octaves).map(|o| self.gain.powi(o as i32)).sum()
    }

    /// Evaluate normalised fBm at `(x, y)`.
    ///
    /// Returns 0.0 when `octaves == 0`.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let mut value = 0.0f64;
        let mut norm = 0.0f64;
        let mut amp = 1.0f64;
        let mut freq = self.scale;
        for _ in 0..self.octaves {
            value += amp * self.noise.get([x * freq, y * freq]);
            norm += amp;
            amp *= self.gain;
            freq *= self.lacunarity;
        }
        if norm > 0.0 {
            value / norm
        } else {
            0.0
        }
    }
}

/// Stable 32-bit seed from a text seed (FNV-1a).
pub fn seed_from_str(text: &str) -> u32 {
    text.bytes().fold(0x811c_9dc5u32, |h, b| (h ^ b as u32).wrapping_mul(0x0100_0193))
}
