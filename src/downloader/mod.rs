//! Streaming track downloads.
//!
//! A download always starts fresh: any existing file for the track is removed
//! before the request is made. Bytes are written to a hidden staging file and
//! renamed onto the final path only after the whole body has arrived, so a
//! transfer that fails midway never leaves a file that
//! [`LocalStore::is_complete`] would accept.

mod progress;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use progress::{NoProgress, ProgressSink};

use crate::config::HttpConfig;
use crate::error::{DownloadError, Error, Result};
use crate::store::{LocalStore, remove_if_present};
use crate::types::{Progress, Track};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Downloads tracks into a [`LocalStore`]
pub struct Downloader {
    /// HTTP client for streaming track bodies
    http_client: reqwest::Client,

    /// Where downloaded tracks are placed
    store: LocalStore,
}

impl Downloader {
    /// Create a downloader writing into `store`
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(store: LocalStore, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            http_client: http.download_client()?,
            store,
        })
    }

    /// The store downloads are written to
    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Download a track to its local path, reporting progress to `sink`
    ///
    /// This method:
    /// 1. Removes any existing file for the track (and any stale staging file)
    /// 2. Streams the remote body into the staging file, updating `sink` per chunk
    /// 3. Renames the staging file onto [`LocalStore::path_for`]
    ///
    /// No retry is attempted and an interrupted transfer is not resumed.
    ///
    /// # Returns
    /// The path of the completed file
    ///
    /// # Errors
    /// Returns [`Error::Download`] if the server answers with a non-success status,
    /// the connection fails, fewer bytes arrive than were declared, or the file
    /// cannot be written. The staging file is removed in every failure case.
    pub async fn fetch_to(&self, track: &Track, sink: &dyn ProgressSink) -> Result<PathBuf> {
        let final_path = self.store.path_for(track);
        let partial_path = self.store.partial_path_for(track);

        let replaced = self.store.is_complete(track);
        if replaced {
            info!(path = %final_path.display(), "Removing old file");
            self.store.remove(track).await?;
        }
        remove_if_present(&partial_path).await?;

        sink.started(&final_path, replaced);

        let result = self.stream_into(track, &partial_path, sink).await;
        sink.finish();

        match result {
            Ok(bytes) => {
                tokio::fs::rename(&partial_path, &final_path)
                    .await
                    .map_err(|source| DownloadError::Write {
                        path: final_path.clone(),
                        source,
                    })?;
                info!(path = %final_path.display(), bytes, "Downloaded track");
                Ok(final_path)
            }
            Err(e) => {
                if let Err(cleanup) = remove_if_present(&partial_path).await {
                    warn!(
                        path = %partial_path.display(),
                        error = %cleanup,
                        "Failed to remove partial download"
                    );
                }
                Err(e)
            }
        }
    }

    /// Stream the track body into `path`, returning the number of bytes written
    async fn stream_into(
        &self,
        track: &Track,
        path: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<u64> {
        let url = track.url();
        debug!("Requesting {}", url);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| transport(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let total = response.content_length();
        debug!(url, total = ?total, "Streaming track");

        let write_error = |source: std::io::Error| -> Error {
            DownloadError::Write {
                path: path.to_path_buf(),
                source,
            }
            .into()
        };

        let mut file = tokio::fs::File::create(path).await.map_err(write_error)?;
        let mut stream = response.bytes_stream();
        let mut received: u64 = 0;

        sink.update(Progress::from_bytes(received, total));

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| transport(url, &e))?;
            file.write_all(&chunk).await.map_err(write_error)?;
            received += chunk.len() as u64;
            sink.update(Progress::from_bytes(received, total));
        }

        file.flush().await.map_err(write_error)?;
        file.sync_all().await.map_err(write_error)?;
        drop(file);

        // A body shorter than its declared length is a truncated transfer
        if let Some(total) = total
            && received < total
        {
            return Err(DownloadError::Transport {
                url: url.to_string(),
                reason: format!("connection closed after {} of {} bytes", received, total),
            }
            .into());
        }

        Ok(received)
    }
}

fn transport(url: &str, e: &reqwest::Error) -> Error {
    let reason = if e.is_timeout() {
        "timed out".to_string()
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    };

    DownloadError::Transport {
        url: url.to_string(),
        reason,
    }
    .into()
}
