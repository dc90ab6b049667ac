//! Blocking HTTP source for live tile servers.
use std::time::Duration;

use mimic_core::error::{MimicError, Result};
use mimic_core::TileSource;

pub struct HttpTileSource {
    client: reqwest::blocking::Client,
}

impl HttpTileSource {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mimic-inspect/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl TileSource for HttpTileSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        log::info!("fetching {url}");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| MimicError::Fetch { url: url.to_string(), reason: e.to_string() })?;
        let status = response.status();
        if !status.is_success() {
            return Err(MimicError::Http { url: url.to_string(), status: status.as_u16() });
        }
        let bytes = response
            .bytes()
            .map_err(|e| MimicError::Fetch { url: url.to_string(), reason: e.to_string() })?;
        Ok(bytes.to_vec())
    }
}
