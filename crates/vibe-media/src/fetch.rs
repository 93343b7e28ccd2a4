//! Remote media download.

use std::path::Path;

use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Downloads remote media assets into local scratch files.
///
/// The body is streamed into a `.part` sibling and renamed into place once
/// the whole response has been written, so an interrupted fetch never
/// leaves a partial file at the destination path.
#[derive(Debug, Clone, Default)]
pub struct MediaFetcher {
    http: Client,
}

impl MediaFetcher {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    /// Fetch `url` into `dest`, overwriting an existing file.
    pub async fn fetch(&self, url: &str, dest: &Path) -> MediaResult<()> {
        debug!(%url, dest = %dest.display(), "fetching media");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| MediaError::download_failed(format!("GET {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(MediaError::download_failed(format!(
                "GET {url} returned {}",
                response.status()
            )));
        }

        let file_name = dest
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| MediaError::download_failed(format!("bad destination: {}", dest.display())))?;
        let tmp = dest.with_file_name(format!("{file_name}.part"));

        let result = Self::write_body(response, &tmp).await;
        if result.is_err() {
            tokio::fs::remove_file(&tmp).await.ok();
            return result;
        }

        tokio::fs::rename(&tmp, dest).await?;
        Ok(())
    }

    async fn write_body(mut response: reqwest::Response, tmp: &Path) -> MediaResult<()> {
        let mut file = File::create(tmp).await?;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| MediaError::download_failed(format!("read body: {e}")))?
        {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(())
    }
}
