pub mod cdf;
pub mod fbm;

pub use cdf::normal_cdf;
pub use fbm::{seed_from_str, Fbm};
