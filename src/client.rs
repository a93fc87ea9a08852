//! One feed fetch, one episode lookup, one action per call.
//!
//! [`Client`] exposes one entry point per command. Every call performs exactly
//! one feed fetch, resolves the requested episode against it, and then runs a
//! single dependent operation. Nothing is cached between calls.

use crate::config::Config;
use crate::downloader::{Downloader, ProgressSink};
use crate::error::Result;
use crate::feed::{FeedFetcher, FeedSource};
use crate::index::TrackIndex;
use crate::player::Player;
use crate::presenter::{RenderedTrack, render};
use crate::store::LocalStore;
use crate::types::{ListOrder, PlaybackSource, Track};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Entry points for listing, downloading, locating and playing episodes
pub struct Client {
    /// Where the episode list comes from
    feed: Arc<dyn FeedSource>,

    /// Downloads into (and owns) the local store
    downloader: Downloader,
}

impl Client {
    /// Create a client from its collaborators
    pub fn new(feed: Arc<dyn FeedSource>, downloader: Downloader) -> Self {
        Self { feed, downloader }
    }

    /// Build a client reading the configured feed and storing tracks in `tracks_path`
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`](crate::Error::StoreUnavailable) if the
    /// download directory cannot be created, or a configuration error if the
    /// HTTP clients cannot be built.
    pub async fn from_config(config: &Config, tracks_path: impl AsRef<Path>) -> Result<Self> {
        let store = LocalStore::open(tracks_path).await?;
        let feed = FeedFetcher::new(config.feed_url.clone(), &config.http)?;
        let downloader = Downloader::new(store, &config.http)?;
        Ok(Self::new(Arc::new(feed), downloader))
    }

    /// The local store tracks are downloaded to
    pub fn store(&self) -> &LocalStore {
        self.downloader.store()
    }

    /// Fetch the feed and number its episodes
    pub async fn index(&self) -> Result<TrackIndex> {
        let tracks = self.feed.fetch().await?;
        debug!(count = tracks.len(), "Fetched tracks");
        TrackIndex::new(tracks)
    }

    /// Render every episode in the requested order
    ///
    /// A single title that does not follow `Episode <N>: <Name>` fails the whole
    /// listing rather than showing a wrong number.
    pub async fn list(&self, order: ListOrder) -> Result<Vec<RenderedTrack>> {
        let index = self.index().await?;
        index
            .ordered(order)
            .map(|track| render(track, self.store()))
            .collect()
    }

    /// Download episode `episode` (1 = oldest), replacing any existing file
    pub async fn download(&self, episode: usize, sink: &dyn ProgressSink) -> Result<PathBuf> {
        let index = self.index().await?;
        let track = index.resolve(episode)?;
        info!(episode, url = track.url(), "Downloading episode");
        self.downloader.fetch_to(track, sink).await
    }

    /// Local path of episode `episode`, whether or not it has been downloaded
    pub async fn path(&self, episode: usize) -> Result<PathBuf> {
        let index = self.index().await?;
        let track = index.resolve(episode)?;
        Ok(self.store().path_for(track))
    }

    /// Play episode `episode`
    ///
    /// A downloaded file is preferred. Otherwise the episode is streamed, unless
    /// `save` is set, in which case it is downloaded first and played locally.
    ///
    /// # Returns
    /// The source that was handed to the player
    pub async fn play(
        &self,
        episode: usize,
        save: bool,
        sink: &dyn ProgressSink,
        player: &dyn Player,
    ) -> Result<PlaybackSource> {
        let index = self.index().await?;
        let track = index.resolve(episode)?;
        let source = self.playback_source(track, save, sink).await?;

        info!(episode, player = player.name(), %source, "Starting playback");
        player.play(&source).await?;
        Ok(source)
    }

    /// Decide what to play for `track`, downloading it first when `save` is set
    pub async fn playback_source(
        &self,
        track: &Track,
        save: bool,
        sink: &dyn ProgressSink,
    ) -> Result<PlaybackSource> {
        if self.store().is_complete(track) {
            return Ok(PlaybackSource::Local(self.store().path_for(track)));
        }

        if save {
            let path = self.downloader.fetch_to(track, sink).await?;
            return Ok(PlaybackSource::Local(path));
        }

        Ok(PlaybackSource::Remote(track.url().to_string()))
    }
}
