//! Core types for mfp

use crate::error::{Error, Result};
use crate::store::PARTIAL_SUFFIX;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One feed entry: a downloadable and playable episode
///
/// A `Track` is created fresh from every feed fetch and never mutated. Whether
/// it has been downloaded is not stored here; ask the
/// [`LocalStore`](crate::store::LocalStore) instead.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTrack")]
pub struct Track {
    title: String,
    url: String,
}

impl Track {
    /// Create a track from a feed title and remote identifier
    ///
    /// The identifier doubles as the download URL and as the source of the local
    /// filename (its last `/`-separated segment).
    ///
    /// # Errors
    ///
    /// Returns [`Error::FeedMalformed`] if the title or identifier is empty, or if
    /// the identifier's last segment cannot be used as a filename. Names shaped
    /// like a download staging file (`.<name>.part`) are refused so that no track
    /// can be stored where another track's download is in progress.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Result<Self> {
        let title = title.into();
        let url = url.into();

        if title.trim().is_empty() {
            return Err(Error::FeedMalformed(format!(
                "entry {} has an empty title",
                url
            )));
        }
        if url.trim().is_empty() {
            return Err(Error::FeedMalformed(format!(
                "entry {:?} has an empty identifier",
                title
            )));
        }

        let filename = last_segment(&url);
        if filename.is_empty() || filename == "." || filename == ".." {
            return Err(Error::FeedMalformed(format!(
                "identifier {} does not end in a usable filename",
                url
            )));
        }

        if filename.starts_with('.') && filename.ends_with(PARTIAL_SUFFIX) {
            return Err(Error::FeedMalformed(format!(
                "identifier {} ends in a reserved staging filename",
                url
            )));
        }

        Ok(Self { title, url })
    }

    /// Raw feed title, e.g. `"Episode 3: Datassette"`
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Remote identifier, used both as unique id and as the fetch source
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Local filename: the last `/`-separated segment of the identifier
    pub fn filename(&self) -> &str {
        last_segment(&self.url)
    }
}

#[derive(Deserialize)]
struct RawTrack {
    title: String,
    url: String,
}

impl TryFrom<RawTrack> for Track {
    type Error = Error;

    fn try_from(raw: RawTrack) -> Result<Self> {
        Track::new(raw.title, raw.url)
    }
}

fn last_segment(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Progress of a single download
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Progress {
    /// Fraction of the declared length received so far, in `[0, 1]`
    Fraction(f64),
    /// The server did not declare a length; only the byte count is known
    Indeterminate {
        /// Bytes received so far
        bytes_received: u64,
    },
}

impl Progress {
    /// Build a progress value from a byte count and an optional declared total
    pub fn from_bytes(bytes_received: u64, total: Option<u64>) -> Self {
        match total {
            Some(0) => Self::Fraction(1.0),
            Some(total) => Self::Fraction((bytes_received as f64 / total as f64).clamp(0.0, 1.0)),
            None => Self::Indeterminate { bytes_received },
        }
    }
}

/// Display order for listings
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListOrder {
    /// Episode 1 first
    #[default]
    OldestFirst,
    /// Latest episode first (the feed's own order)
    NewestFirst,
}

/// What to hand to the audio player
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlaybackSource {
    /// A completely downloaded file
    Local(PathBuf),
    /// Stream directly from the remote URL
    Remote(String),
}

impl std::fmt::Display for PlaybackSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => write!(f, "{}", url),
        }
    }
}
