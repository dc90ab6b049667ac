use thiserror::Error;

/// Errors raised inside the tile pipeline.
///
/// None of these escape `pipeline::load_tile`: they are logged there and the
/// tile resolves to the "no data" state instead.
#[derive(Debug, Error)]
pub enum MimicError {
    #[error("tile {x}/{y} is outside the zoom {zoom} grid")]
    InvalidTile { zoom: u32, x: u32, y: u32 },

    #[error("cannot parse tile from {0:?}, expected z/x/y")]
    TileParse(String),

    #[error("fetch of {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    #[error("fetch of {url} returned HTTP {status}")]
    Http { url: String, status: u16 },

    #[error("raster decode failed: {0}")]
    Decode(String),

    #[error("invalid config: {0}")]
    Config(String),
}

impl From<image::ImageError> for MimicError {
    fn from(e: image::ImageError) -> Self {
        MimicError::Decode(e.to_string())
    }
}

impl From<serde_json::Error> for MimicError {
    fn from(e: serde_json::Error) -> Self {
        MimicError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MimicError>;
