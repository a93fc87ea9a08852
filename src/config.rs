//! Configuration types for mfp
//!
//! Configuration is an explicit value handed to each component at construction.
//! Nothing in the library reads the process environment; the binary gathers
//! flags, environment variables and the home directory and passes them to
//! [`resolve_tracks_path`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Feed used when nothing else is configured
pub const DEFAULT_FEED_URL: &str = "https://musicforprogramming.net/rss.php";

/// Environment variable naming the download directory
pub const TRACKS_PATH_ENV: &str = "MFP_DOWNLOAD_PATH";

/// Alternative environment variable name, as advertised by older help text
pub const TRACKS_PATH_ENV_ALIAS: &str = "MFP_TRACKS_PATH";

/// Directory below `$HOME` used when no download directory is configured
pub const HOME_SUBDIR: &str = ".mfp";

/// HTTP client settings shared by feed fetching and downloads
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Timeout for establishing a connection (default: 30s)
    #[serde(default = "default_connect_timeout", with = "duration_secs")]
    pub connect_timeout: Duration,

    /// Timeout for fetching the feed document (default: 30s)
    ///
    /// Episode downloads are not bounded by this; they may legitimately take
    /// much longer than any single request timeout.
    #[serde(default = "default_feed_timeout", with = "duration_secs")]
    pub feed_timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            feed_timeout: default_feed_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpConfig {
    /// Build a reqwest client for streaming downloads
    pub(crate) fn download_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent.clone())
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e), "http"))
    }

    /// Build a reqwest client for fetching the feed
    pub(crate) fn feed_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.feed_timeout)
            .user_agent(self.user_agent.clone())
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e), "http"))
    }
}

/// External audio player settings
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Player executable (auto-detected `mpg123` if None)
    #[serde(default)]
    pub command: Option<PathBuf>,

    /// Extra arguments placed before the file path or URL
    #[serde(default)]
    pub args: Vec<String>,
}

/// Main configuration for mfp
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Feed listing the episodes
    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    /// Download directory (falls back to environment or `$HOME/.mfp/`)
    #[serde(default)]
    pub tracks_path: Option<PathBuf>,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Audio player settings
    #[serde(default)]
    pub player: PlayerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            tracks_path: None,
            http: HttpConfig::default(),
            player: PlayerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// Missing fields take their defaults, so `{}` is a valid configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read, is not valid JSON, or
    /// fails [`Config::validate`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("cannot read {}: {}", path.display(), e),
            key: None,
        })?;

        let config: Config = serde_json::from_str(&content).map_err(|e| Error::Config {
            message: format!("invalid configuration in {}: {}", path.display(), e),
            key: None,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Check that the configured values are usable
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.feed_url).map_err(|e| {
            Error::config(format!("invalid feed URL {:?}: {}", self.feed_url, e), "feed_url")
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(
                format!("feed URL must use http or https, got {}", url.scheme()),
                "feed_url",
            ));
        }

        Ok(())
    }
}

/// Sources consulted when choosing the download directory, highest priority first
#[derive(Clone, Debug, Default)]
pub struct TracksPathSources {
    /// `--tracks-path` flag
    pub flag: Option<PathBuf>,
    /// `MFP_DOWNLOAD_PATH` or its alias
    pub env: Option<PathBuf>,
    /// `tracks_path` from the configuration file
    pub config: Option<PathBuf>,
    /// The user's home directory
    pub home: Option<PathBuf>,
}

/// Pick the download directory
///
/// Precedence: explicit flag, environment variable, configuration file, then
/// `$HOME/.mfp/`. Empty values are treated as unset.
///
/// # Errors
///
/// Returns [`Error::Config`] when none of the sources yields a path.
pub fn resolve_tracks_path(sources: TracksPathSources) -> Result<PathBuf> {
    let non_empty = |p: Option<PathBuf>| p.filter(|p| !p.as_os_str().is_empty());

    non_empty(sources.flag)
        .or_else(|| non_empty(sources.env))
        .or_else(|| non_empty(sources.config))
        .or_else(|| non_empty(sources.home).map(|home| home.join(HOME_SUBDIR)))
        .ok_or_else(|| {
            Error::config(
                format!(
                    "neither HOME nor {} is set, cannot guess a path to download tracks to",
                    TRACKS_PATH_ENV
                ),
                "tracks_path",
            )
        })
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_feed_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("mfp/", env!("CARGO_PKG_VERSION")).to_string()
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}
