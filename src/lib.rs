//! # mfp
//!
//! List, download and play the episodes of an RSS media feed, by default
//! [musicForProgramming();](https://musicforprogramming.net).
//!
//! ## Episode numbers
//!
//! The feed lists episodes newest first, but episodes are addressed by their
//! publication number: episode 1 is the oldest. [`TrackIndex::resolve`] maps
//! such a number onto the feed.
//!
//! ## Quick Start
//!
//! ```no_run
//! use mfp::{Client, Config, ListOrder, NoProgress};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let client = Client::from_config(&config, "/tmp/mfp").await?;
//!
//!     for track in client.list(ListOrder::OldestFirst).await? {
//!         println!("{}", track.line);
//!     }
//!
//!     let path = client.download(1, &NoProgress).await?;
//!     println!("Downloaded to {}", path.display());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Command entry points
pub mod client;
/// Configuration types
pub mod config;
/// Streaming downloads
pub mod downloader;
/// Error types
pub mod error;
/// Feed fetching and parsing
pub mod feed;
/// Episode numbering
pub mod index;
/// Audio playback
pub mod player;
/// Track display formatting
pub mod presenter;
/// Local track storage
pub mod store;
/// Core types
pub mod types;

// Re-export commonly used types
pub use client::Client;
pub use config::{Config, HttpConfig, PlayerConfig, TracksPathSources, resolve_tracks_path};
pub use downloader::{Downloader, NoProgress, ProgressSink};
pub use error::{DownloadError, Error, Result};
pub use feed::{FeedFetcher, FeedSource, StaticFeed};
pub use index::{TrackIndex, display_index, display_name};
pub use player::{CommandPlayer, Player};
pub use presenter::{RenderedTrack, TrackStatus, render};
pub use store::LocalStore;
pub use types::{ListOrder, PlaybackSource, Progress, Track};
