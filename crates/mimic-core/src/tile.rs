//! Slippy-map tile addressing and the geographic helpers built on it.
//! All coordinate math uses f64 for precision.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MimicError, Result};

/// Equatorial circumference of the WGS84 ellipsoid in metres.
pub const EARTH_CIRCUMFERENCE_M: f64 = 40_075_016.686;

/// Highest latitude reachable in Web Mercator.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// Deepest zoom accepted by `Tile::new`; keeps `1 << zoom` inside `u32`.
pub const MAX_ZOOM: u32 = 30;

/// A point on the sphere in geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    /// Latitude in degrees, -90 to +90.
    pub lat: f64,
    /// Longitude in degrees, -180 to +180.
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A tile in a quad-tree (zoom/x/y) addressing scheme.
///
/// Invariant: `x, y < 2^zoom`. Constructed through `new`, `from_latlon` or
/// `parse`, all of which uphold it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub zoom: u32,
    pub x: u32,
    pub y: u32,
}

impl Tile {
    pub fn new(zoom: u32, x: u32, y: u32) -> Result<Self> {
        if zoom > MAX_ZOOM || x >= (1u32 << zoom) || y >= (1u32 << zoom) {
            return Err(MimicError::InvalidTile { zoom, x, y });
        }
        Ok(Self { zoom, x, y })
    }

    /// Number of tiles along one axis at this zoom.
    #[inline]
    pub fn scale(&self) -> u32 {
        1u32 << self.zoom
    }

    /// Returns the (min_lat, min_lon, max_lat, max_lon) bounding box for this tile.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let n = self.scale() as f64;
        let lon_min = (self.x as f64 / n) * 360.0 - 180.0;
        let lon_max = ((self.x + 1) as f64 / n) * 360.0 - 180.0;
        let lat_max = (std::f64::consts::PI * (1.0 - 2.0 * self.y as f64 / n)).sinh().atan().to_degrees();
        let lat_min = (std::f64::consts::PI * (1.0 - 2.0 * (self.y + 1) as f64 / n)).sinh().atan().to_degrees();
        (lat_min, lon_min, lat_max, lon_max)
    }

    /// The tile containing `ll` at the given zoom level.
    ///
    /// Longitudes wrap around the antimeridian; latitudes beyond the Mercator
    /// limit land in the first or last row.
    pub fn from_latlon(ll: LatLon, zoom: u32) -> Self {
        let zoom = zoom.min(MAX_ZOOM);
        let scale = 1u32 << zoom;
        let n = scale as f64;

        let fx = ((ll.lon + 180.0) / 360.0 * n).floor();
        let x = (fx as i64).rem_euclid(scale as i64) as u32;

        let lat_rad = ll.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
        let fy = ((1.0 - lat_rad.tan().asinh() / std::f64::consts::PI) / 2.0 * n).floor();
        let y = (fy.max(0.0) as u32).min(scale - 1);

        Self { zoom, x, y }
    }

    /// Return the center LatLon of this tile.
    pub fn center(&self) -> LatLon {
        let (lat_min, lon_min, lat_max, lon_max) = self.bounds();
        LatLon::new((lat_min + lat_max) / 2.0, (lon_min + lon_max) / 2.0)
    }

    /// Display label used on the panel cards and the graticule, e.g. `#12-2154-1434`.
    pub fn label(&self) -> String {
        format!("#{}-{}-{}", self.zoom, self.x, self.y)
    }

    /// File name for the exported 2D raster.
    pub fn download_filename(&self) -> String {
        format!("elevation-tile-{}-{}-{}.png", self.zoom, self.x, self.y)
    }

    /// Substitute `{z}`, `{x}` and `{y}` in an XYZ URL template.
    pub fn url(&self, template: &str) -> String {
        template
            .replace("{z}", &self.zoom.to_string())
            .replace("{x}", &self.x.to_string())
            .replace("{y}", &self.y.to_string())
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

impl FromStr for Tile {
    type Err = MimicError;

    /// Parse the `z/x/y` form produced by `Display`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        let [z, x, y] = parts.as_slice() else {
            return Err(MimicError::TileParse(s.to_string()));
        };
        let num = |p: &str| p.parse::<u32>().map_err(|_| MimicError::TileParse(s.to_string()));
        Tile::new(num(*z)?, num(*x)?, num(*y)?)
    }
}

/// Ground extent of one tile in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileExtent {
    pub east_west: f64,
    pub north_south: f64,
}

/// Ground size of a tile at `zoom` around `latitude` (degrees).
///
/// Web Mercator is conformal, so both axes shrink by `cos(latitude)`. The
/// latitude is clamped to the Mercator limit, which keeps the extent positive.
pub fn tile_size_in_meters(zoom: u32, latitude: f64) -> TileExtent {
    let lat = latitude.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let side = EARTH_CIRCUMFERENCE_M * lat.cos() / 2f64.powi(zoom as i32);
    TileExtent { east_west: side, north_south: side }
}
