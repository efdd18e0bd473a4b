use std::path::Path;

use futures_util::StreamExt;
use harvest_logging::{harvest_debug, harvest_warn};
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::fetch::{map_reqwest_error, ReqwestFetcher};
use crate::{Asset, FailureKind, FetchError};

/// Downloads one resource to a file. Callers decide whether failures matter.
#[async_trait::async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Returns the number of bytes written.
    async fn download(&self, url: &Url, dest: &Path) -> Result<u64, FetchError>;
}

#[async_trait::async_trait]
impl AssetFetcher for ReqwestFetcher {
    async fn download(&self, url: &Url, dest: &Path) -> Result<u64, FetchError> {
        let response = self
            .client()
            .get(url.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }

        let result = stream_to_file(response, dest).await;
        if result.is_err() {
            // Do not leave a truncated image behind.
            let _ = tokio::fs::remove_file(dest).await;
        }
        result
    }
}

async fn stream_to_file(response: reqwest::Response, dest: &Path) -> Result<u64, FetchError> {
    let mut file = tokio::fs::File::create(dest).await.map_err(io_error)?;
    let mut written = 0u64;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(map_reqwest_error)?;
        file.write_all(&chunk).await.map_err(io_error)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(io_error)?;
    Ok(written)
}

fn io_error(err: std::io::Error) -> FetchError {
    FetchError::new(FailureKind::Io, err.to_string())
}

/// Download every asset in order, one at a time. Failures are logged and
/// skipped; the statement text keeps pointing at the intended file either way.
/// Returns how many downloads succeeded.
pub async fn download_assets(fetcher: &dyn AssetFetcher, assets: &[Asset]) -> usize {
    let mut saved = 0;
    for asset in assets {
        match fetcher.download(&asset.source_url, &asset.saved_path).await {
            Ok(bytes) => {
                harvest_debug!(
                    "Saved image {} ({} bytes) to {:?}",
                    asset.source_url,
                    bytes,
                    asset.saved_path
                );
                saved += 1;
            }
            Err(err) => {
                harvest_warn!(
                    "Image {} not saved to {:?}: {}",
                    asset.source_url,
                    asset.saved_path,
                    err
                );
            }
        }
    }
    saved
}
