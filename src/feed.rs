//! Feed retrieval and parsing.
//!
//! Fetches the episode feed over HTTP and turns its entries into [`Track`]s in
//! feed-native order. RSS 2.0 is tried first with Atom as a fallback. Only the
//! title and identifier of each entry are extracted; everything else in the
//! document is ignored.

use crate::config::HttpConfig;
use crate::error::{Error, Result};
use crate::types::Track;
use async_trait::async_trait;
use tracing::debug;

/// Source of the feed's tracks
///
/// Implementations perform at most one fetch per call and never retry; callers
/// decide whether to try again.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch all tracks in feed-native order (newest first for a typical feed)
    async fn fetch(&self) -> Result<Vec<Track>>;
}

/// Fetches a feed document over HTTP
pub struct FeedFetcher {
    /// HTTP client for fetching the feed
    http_client: reqwest::Client,

    /// URL of the feed
    url: String,
}

impl FeedFetcher {
    /// Create a fetcher for the given feed URL
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(url: impl Into<String>, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            http_client: http.feed_client()?,
            url: url.into(),
        })
    }

    /// URL this fetcher reads from
    pub fn url(&self) -> &str {
        &self.url
    }

    fn unavailable(&self, reason: impl Into<String>) -> Error {
        Error::FeedUnavailable {
            url: self.url.clone(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl FeedSource for FeedFetcher {
    async fn fetch(&self) -> Result<Vec<Track>> {
        debug!("Fetching feed: {}", self.url);

        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.unavailable("request timed out")
                } else {
                    self.unavailable(e.to_string())
                }
            })?;

        // Check HTTP status before trying to parse the response body
        let status = response.status();
        if !status.is_success() {
            return Err(self.unavailable(format!("HTTP {}", status.as_u16())));
        }

        let content = response
            .text()
            .await
            .map_err(|e| self.unavailable(format!("failed to read feed body: {}", e)))?;

        let tracks = parse_feed(&content)?;
        debug!(url = %self.url, count = tracks.len(), "Parsed feed");
        Ok(tracks)
    }
}

/// Parse a feed document, trying RSS first and then Atom
///
/// # Errors
///
/// Returns [`Error::FeedMalformed`] if the document is neither RSS nor Atom, or if
/// any entry lacks a title or identifier.
pub fn parse_feed(content: &str) -> Result<Vec<Track>> {
    match content.parse::<rss::Channel>() {
        Ok(channel) => tracks_from_rss(&channel),
        Err(rss_err) => {
            debug!("Failed to parse as RSS: {}, trying Atom", rss_err);
            match atom_syndication::Feed::read_from(content.as_bytes()) {
                Ok(feed) => tracks_from_atom(&feed),
                Err(atom_err) => Err(Error::FeedMalformed(format!(
                    "not an RSS or Atom document. RSS error: {}. Atom error: {}",
                    rss_err, atom_err
                ))),
            }
        }
    }
}

fn tracks_from_rss(channel: &rss::Channel) -> Result<Vec<Track>> {
    channel
        .items()
        .iter()
        .enumerate()
        .map(|(position, item)| {
            let title = item
                .title()
                .ok_or_else(|| missing("title", position))?;

            // The guid is the canonical identifier; fall back to the enclosure
            let url = item
                .guid()
                .map(|g| g.value())
                .filter(|v| !v.trim().is_empty())
                .or_else(|| item.enclosure().map(|enc| enc.url()))
                .ok_or_else(|| missing("identifier", position))?;

            Track::new(title.trim(), url.trim())
        })
        .collect()
}

fn tracks_from_atom(feed: &atom_syndication::Feed) -> Result<Vec<Track>> {
    feed.entries()
        .iter()
        .enumerate()
        .map(|(position, entry)| {
            let title = entry.title().as_str();
            if title.trim().is_empty() {
                return Err(missing("title", position));
            }

            // Atom ids are often URNs, so prefer an enclosure link
            let url = entry
                .links()
                .iter()
                .find(|link| link.rel() == "enclosure")
                .map(|link| link.href())
                .or_else(|| Some(entry.id()).filter(|id| !id.trim().is_empty()))
                .ok_or_else(|| missing("identifier", position))?;

            Track::new(title.trim(), url.trim())
        })
        .collect()
}

fn missing(field: &str, position: usize) -> Error {
    Error::FeedMalformed(format!("entry {} has no {}", position + 1, field))
}

/// A fixed list of tracks, served without any network access
#[derive(Clone, Debug, Default)]
pub struct StaticFeed {
    tracks: Vec<Track>,
}

impl StaticFeed {
    /// Serve the given tracks, in feed-native order
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }
}

#[async_trait]
impl FeedSource for StaticFeed {
    async fn fetch(&self) -> Result<Vec<Track>> {
        Ok(self.tracks.clone())
    }
}
