//! Progress reporting for downloads.

use crate::types::Progress;
use std::path::Path;

/// Receives progress updates while a track downloads
///
/// Updates for one download arrive in order and never go backwards in bytes
/// received. Rendering is entirely up to the implementation.
pub trait ProgressSink: Send + Sync {
    /// Called once before the request is made
    ///
    /// `replaced` is true when an existing download of the track was removed.
    fn started(&self, _path: &Path, _replaced: bool) {}

    /// Called after every chunk written to disk, and once before the first
    fn update(&self, progress: Progress);

    /// Called once when the download has ended, successfully or not
    fn finish(&self) {}
}

/// Discards all progress updates
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn update(&self, _progress: Progress) {}
}
