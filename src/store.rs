//! Local track storage.
//!
//! The store is a flat directory of files named after the last path segment of
//! each track's identifier. There is no manifest: a file at the deterministic
//! path means the track has been downloaded. Downloads are staged in a hidden
//! `.part` file next to the final path so an unfinished transfer is never
//! mistaken for a complete one.

use crate::error::{Error, Result};
use crate::types::Track;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffix of the staging file a download is written to before it completes
pub const PARTIAL_SUFFIX: &str = ".part";

/// Maps tracks to files below a fixed root directory
#[derive(Clone, Debug)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Open the store, creating the root directory if it does not exist
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] if the directory cannot be created.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|source| Error::StoreUnavailable {
                path: root.clone(),
                source,
            })?;

        debug!(root = %root.display(), "Opened track store");
        Ok(Self { root })
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the track is (or would be) stored
    pub fn path_for(&self, track: &Track) -> PathBuf {
        self.root.join(track.filename())
    }

    /// Staging path an in-progress download is written to
    pub fn partial_path_for(&self, track: &Track) -> PathBuf {
        self.root.join(format!(".{}{}", track.filename(), PARTIAL_SUFFIX))
    }

    /// Whether a completed download of the track exists
    ///
    /// Only existence is checked. Because downloads are renamed into place
    /// after the last byte arrives, an existing file is a finished one unless
    /// it was put there by something other than this crate.
    pub fn is_complete(&self, track: &Track) -> bool {
        self.path_for(track).is_file()
    }

    /// Delete the track's file; succeeds if it is already absent
    pub async fn remove(&self, track: &Track) -> Result<()> {
        remove_if_present(&self.path_for(track)).await
    }
}

/// Remove a file, treating "not found" as success
pub(crate) async fn remove_if_present(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!(path = %path.display(), "Removed file");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Io(e)),
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn track(url: &str) -> Track {
        Track::new("Episode 1: A", url).unwrap()
    }

    #[tokio::test]
    async fn test_open_creates_nested_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("a").join("b").join(".mfp");

        let store = LocalStore::open(&root).await.unwrap();
        assert!(root.is_dir());
        assert_eq!(store.root(), root);
    }

    #[tokio::test]
    async fn test_open_fails_when_root_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        match LocalStore::open(blocker.join("tracks")).await {
            Err(Error::StoreUnavailable { path, .. }) => {
                assert_eq!(path, blocker.join("tracks"));
            }
            other => panic!("Expected StoreUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_path_for_uses_last_segment() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::open(temp_dir.path()).await.unwrap();

        let t = track("https://datashat.net/music_for_programming_1-datassette.mp3");
        assert_eq!(
            store.path_for(&t),
            temp_dir.path().join("music_for_programming_1-datassette.mp3")
        );
    }

    #[tokio::test]
    async fn test_path_for_depends_only_on_identifier() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::open(temp_dir.path()).await.unwrap();

        let a = Track::new("Episode 1: A", "https://example.com/x/a.mp3").unwrap();
        let b = Track::new("Episode 1: Renamed", "https://example.com/x/a.mp3").unwrap();
        assert_eq!(store.path_for(&a), store.path_for(&a));
        assert_eq!(store.path_for(&a), store.path_for(&b));
    }

    #[tokio::test]
    async fn test_partial_path_is_hidden_sibling() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::open(temp_dir.path()).await.unwrap();

        let t = track("https://example.com/a.mp3");
        assert_eq!(
            store.partial_path_for(&t),
            temp_dir.path().join(".a.mp3.part")
        );
    }

    #[tokio::test]
    async fn test_is_complete_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::open(temp_dir.path()).await.unwrap();
        let t = track("https://example.com/a.mp3");

        assert!(!store.is_complete(&t));

        std::fs::write(store.path_for(&t), b"audio").unwrap();
        assert!(store.is_complete(&t));

        store.remove(&t).await.unwrap();
        assert!(!store.is_complete(&t));
        assert!(!store.path_for(&t).exists());
    }

    #[tokio::test]
    async fn test_remove_absent_file_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::open(temp_dir.path()).await.unwrap();
        let t = track("https://example.com/never-downloaded.mp3");

        store.remove(&t).await.unwrap();
        store.remove(&t).await.unwrap();
    }

    #[tokio::test]
    async fn test_partial_file_does_not_count_as_complete() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::open(temp_dir.path()).await.unwrap();
        let t = track("https://example.com/a.mp3");

        std::fs::write(store.partial_path_for(&t), b"half").unwrap();
        assert!(!store.is_complete(&t));
    }
}
