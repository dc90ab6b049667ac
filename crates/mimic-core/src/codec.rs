//! Terrarium elevation encoding.
//!
//! Elevation is stored as fixed point across the three colour channels:
//! R and G carry the 16-bit integer part, B the fraction in 1/256 m steps,
//! offset by 32768 m so that bathymetry stays positive.

/// Offset subtracted from the raw 24-bit value.
pub const TERRARIUM_OFFSET: f32 = 32768.0;

/// Lowest decodable elevation, `(0, 0, 0)`.
pub const MIN_ELEVATION: f32 = -TERRARIUM_OFFSET;

/// Highest decodable elevation, `(255, 255, 255)`.
pub const MAX_ELEVATION: f32 = 255.0 * 256.0 + 255.0 + 255.0 / 256.0 - TERRARIUM_OFFSET;

/// Decode one Terrarium pixel to metres.
///
/// Every result is a multiple of 1/256 below 2^16, so the f32 arithmetic
/// here is exact.
#[inline]
pub fn decode(r: u8, g: u8, b: u8) -> f32 {
    r as f32 * 256.0 + g as f32 + b as f32 / 256.0 - TERRARIUM_OFFSET
}

/// Inverse of `decode`, rounding to the nearest 1/256 m and saturating at
/// the encodable range. Used to build synthetic rasters.
pub fn encode(elevation: f32) -> [u8; 3] {
    let clamped = elevation.clamp(MIN_ELEVATION, MAX_ELEVATION);
    let fixed = ((clamped + TERRARIUM_OFFSET) * 256.0).round() as u32;
    [(fixed >> 16) as u8, (fixed >> 8) as u8, fixed as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sea_level_pixel() {
        assert_eq!(decode(128, 0, 0), 0.0);
    }

    #[test]
    fn channel_weights() {
        assert_eq!(decode(128, 1, 0), 1.0);
        assert_eq!(decode(128, 0, 128), 0.5);
        assert_eq!(decode(127, 255, 0), -1.0);
    }

    #[test]
    fn every_pixel_is_finite_and_bounded() {
        for r in 0..=255u8 {
            for g in (0..=255u8).step_by(5) {
                for b in [0u8, 1, 127, 128, 254, 255] {
                    let e = decode(r, g, b);
                    assert!(e.is_finite());
                    assert!((MIN_ELEVATION..=MAX_ELEVATION).contains(&e), "({r},{g},{b}) -> {e}");
                }
            }
        }
        assert_eq!(decode(0, 0, 0), MIN_ELEVATION);
        assert_eq!(decode(255, 255, 255), MAX_ELEVATION);
        assert_eq!(MAX_ELEVATION, 32767.996_093_75);
    }

    #[test]
    fn encode_inverts_decode() {
        for &(r, g, b) in &[(0u8, 0u8, 0u8), (128, 0, 0), (130, 17, 200), (255, 255, 255)] {
            assert_eq!(encode(decode(r, g, b)), [r, g, b]);
        }
        assert_eq!(encode(1e9), [255, 255, 255]);
    }
}
