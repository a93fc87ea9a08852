//! Error types for mfp
//!
//! This module provides the error taxonomy of the episode pipeline:
//! - Feed errors (transport failures, entries missing required fields)
//! - Index errors (unparseable titles, episode numbers out of range)
//! - Store and download errors (directory creation, streaming, writing)

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for mfp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for mfp
///
/// Every variant is surfaced to the user as a printed message. None of them are
/// retried automatically.
#[derive(Debug, Error)]
pub enum Error {
    /// The feed could not be retrieved (network error, timeout, non-success status)
    #[error("feed unavailable at {url}: {reason}")]
    FeedUnavailable {
        /// URL of the feed that was requested
        url: String,
        /// Human-readable description of the transport failure
        reason: String,
    },

    /// The feed was retrieved but could not be turned into tracks
    #[error("malformed feed: {0}")]
    FeedMalformed(String),

    /// A track title does not follow the `Episode <N>: <Name>` pattern
    #[error("title {title:?} does not match \"Episode <N>: <Name>\"")]
    TitleFormat {
        /// The offending title
        title: String,
    },

    /// The requested episode number does not exist in the feed
    #[error("episode {index} is out of range (the feed has {count} episodes)")]
    IndexOutOfRange {
        /// The 1-based episode number that was requested
        index: usize,
        /// Number of episodes in the feed
        count: usize,
    },

    /// Two tracks would be stored under the same local filename
    #[error("tracks {first} and {second} would both be stored as {filename}")]
    FilenameCollision {
        /// The shared filename
        filename: String,
        /// Identifier of the first track claiming the filename
        first: String,
        /// Identifier of the second track claiming the filename
        second: String,
    },

    /// The download directory could not be created or accessed
    #[error("track store unavailable at {}: {source}", path.display())]
    StoreUnavailable {
        /// The directory that could not be created
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Download-related error
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "tracks_path")
        key: Option<String>,
    },

    /// The audio player could not be started or exited unsuccessfully
    #[error("playback error: {0}")]
    Playback(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Download-related errors
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The server answered with a non-success status
    #[error("HTTP {status} fetching {url}")]
    Http {
        /// URL of the track
        url: String,
        /// HTTP status code returned by the server
        status: u16,
    },

    /// The connection failed before or while streaming the body
    #[error("transfer of {url} failed: {reason}")]
    Transport {
        /// URL of the track
        url: String,
        /// Description of the transport failure
        reason: String,
    },

    /// Received bytes could not be written to disk
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Path that was being written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a configuration error attributed to a specific key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}
