//! Human-readable track lines.

use crate::error::Result;
use crate::index::{display_index, display_name};
use crate::store::LocalStore;
use crate::types::Track;
use serde::Serialize;

/// Whether a track is available locally; a hint for how to style its line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackStatus {
    /// A complete file exists in the store
    Downloaded,
    /// The track would have to be streamed or downloaded
    NotDownloaded,
}

/// A track formatted for display
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderedTrack {
    /// `"[<episode>] <name>"`
    pub line: String,
    /// Styling hint; the line itself carries no status marker
    pub status: TrackStatus,
}

/// Format a track as `"[<episode>] <name>"` with its download status
///
/// # Errors
///
/// Returns [`Error::TitleFormat`](crate::Error::TitleFormat) if the title does
/// not follow `Episode <N>: <Name>`.
pub fn render(track: &Track, store: &LocalStore) -> Result<RenderedTrack> {
    let line = format!("[{}] {}", display_index(track)?, display_name(track)?);
    let status = if store.is_complete(track) {
        TrackStatus::Downloaded
    } else {
        TrackStatus::NotDownloaded
    };

    Ok(RenderedTrack { line, status })
}
