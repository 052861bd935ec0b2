//! Asset materializer
//!
//! Downloads an asset's payload and writes it to its mirrored path. The file
//! is written through `write_atomic`, so a crash mid-download never leaves a
//! truncated asset where the skip check would mistake it for a finished one.

use crate::crawler::fetch_bytes;
use crate::storage::write_atomic;
use crate::MirrorError;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;

/// Fetches asset payloads and writes them into the mirror
#[derive(Debug, Clone)]
pub struct AssetMaterializer {
    client: Client,
    timeout: Duration,
}

impl AssetMaterializer {
    /// `timeout` bounds each whole download, independent of the client's
    /// page timeout
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Downloads `download_url` to `destination`
    ///
    /// Parent directories are created as needed.
    ///
    /// # Returns
    ///
    /// * `Ok(u64)` - Number of bytes written
    /// * `Err(MirrorError::Http | HttpStatus)` - Download failed; nothing written
    /// * `Err(MirrorError::Filesystem)` - Write failed; `destination` unchanged
    pub async fn materialize(
        &self,
        download_url: &str,
        destination: &Path,
    ) -> Result<u64, MirrorError> {
        let bytes = fetch_bytes(&self.client, download_url, self.timeout).await?;

        write_atomic(destination, &bytes)
            .map_err(|e| MirrorError::filesystem(destination, e))?;

        Ok(bytes.len() as u64)
    }
}
