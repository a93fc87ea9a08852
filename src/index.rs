//! Episode numbering.
//!
//! The feed lists episodes newest first, but users refer to episodes by their
//! publication number where the oldest episode is 1. [`TrackIndex`] keeps the
//! tracks in feed-native order and translates between the two.

use crate::error::{Error, Result};
use crate::types::{ListOrder, Track};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static EPISODE_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"Episode (\d+):").expect("episode title pattern is valid")
});

/// Numbered, user-addressable collection of tracks from one feed fetch
#[derive(Clone, Debug)]
pub struct TrackIndex {
    /// Tracks in feed-native order (newest first)
    tracks: Vec<Track>,
}

impl TrackIndex {
    /// Build an index from tracks in feed-native (newest-first) order
    ///
    /// # Errors
    ///
    /// Returns [`Error::FilenameCollision`] if two tracks would be stored under
    /// the same local filename. Downloading either of them would otherwise
    /// silently replace the other.
    pub fn new(tracks: Vec<Track>) -> Result<Self> {
        let mut seen: HashMap<&str, &Track> = HashMap::with_capacity(tracks.len());
        for track in &tracks {
            if let Some(first) = seen.insert(track.filename(), track) {
                return Err(Error::FilenameCollision {
                    filename: track.filename().to_string(),
                    first: first.url().to_string(),
                    second: track.url().to_string(),
                });
            }
        }

        Ok(Self { tracks })
    }

    /// Number of episodes
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the feed had no episodes
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Oldest episode first
    pub fn ascending(&self) -> impl DoubleEndedIterator<Item = &Track> + ExactSizeIterator {
        self.tracks.iter().rev()
    }

    /// Newest episode first (the feed's own order)
    pub fn descending(&self) -> impl DoubleEndedIterator<Item = &Track> + ExactSizeIterator {
        self.tracks.iter()
    }

    /// Tracks in the requested display order
    pub fn ordered(&self, order: ListOrder) -> Box<dyn Iterator<Item = &Track> + '_> {
        match order {
            ListOrder::OldestFirst => Box::new(self.ascending()),
            ListOrder::NewestFirst => Box::new(self.descending()),
        }
    }

    /// Look up an episode by its 1-based number, where 1 is the oldest episode
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] unless `1 <= episode <= len()`.
    pub fn resolve(&self, episode: usize) -> Result<&Track> {
        let count = self.tracks.len();
        if episode < 1 || episode > count {
            return Err(Error::IndexOutOfRange {
                index: episode,
                count,
            });
        }

        Ok(&self.tracks[count - episode])
    }
}

/// Episode number embedded in a track title (`"Episode 42: Name"` gives 42)
///
/// # Errors
///
/// Returns [`Error::TitleFormat`] if the title has no `Episode <N>:` part or the
/// number does not fit in a `u32`.
pub fn display_index(track: &Track) -> Result<u32> {
    let title = track.title();
    EPISODE_TITLE
        .captures(title)
        .and_then(|caps| caps.get(1))
        .and_then(|n| n.as_str().parse().ok())
        .ok_or_else(|| Error::TitleFormat {
            title: title.to_string(),
        })
}

/// Episode name: everything after the first `:` of the title, trimmed
///
/// # Errors
///
/// Returns [`Error::TitleFormat`] if the title has no `:`.
pub fn display_name(track: &Track) -> Result<&str> {
    track
        .title()
        .split_once(':')
        .map(|(_, name)| name.trim())
        .ok_or_else(|| Error::TitleFormat {
            title: track.title().to_string(),
        })
}
