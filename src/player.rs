//! Audio playback through an external player.

use crate::config::PlayerConfig;
use crate::error::{Error, Result};
use crate::types::PlaybackSource;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

/// Player used when none is configured
pub const DEFAULT_PLAYER: &str = "mpg123";

/// Something that can play a local file or stream a URL
#[async_trait]
pub trait Player: Send + Sync {
    /// Play the source, returning once playback has ended
    async fn play(&self, source: &PlaybackSource) -> Result<()>;

    /// Name of the player for logging
    fn name(&self) -> &str;
}

/// Plays audio by running an external program such as `mpg123`
///
/// The program is invoked as `<binary> <args...> <path-or-url>` and must be
/// able to handle both local files and HTTP URLs.
#[derive(Clone, Debug)]
pub struct CommandPlayer {
    binary_path: PathBuf,
    args: Vec<String>,
}

impl CommandPlayer {
    /// Create a player with an explicit binary path and leading arguments
    pub fn new(binary_path: PathBuf, args: Vec<String>) -> Self {
        Self { binary_path, args }
    }

    /// Attempt to find `mpg123` in PATH
    pub fn from_path() -> Option<Self> {
        which::which(DEFAULT_PLAYER)
            .ok()
            .map(|path| Self::new(path, Vec::new()))
    }

    /// Build the player described by the configuration
    ///
    /// An explicit `command` wins; otherwise `mpg123` is looked up in PATH.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Playback`] if no command is configured and `mpg123` is
    /// not installed.
    pub fn from_config(config: &PlayerConfig) -> Result<Self> {
        match &config.command {
            Some(command) => Ok(Self::new(command.clone(), config.args.clone())),
            None => Self::from_path()
                .map(|player| Self {
                    args: config.args.clone(),
                    ..player
                })
                .ok_or_else(|| {
                    Error::Playback(format!(
                        "no audio player configured and {} was not found in PATH",
                        DEFAULT_PLAYER
                    ))
                }),
        }
    }
}

#[async_trait]
impl Player for CommandPlayer {
    async fn play(&self, source: &PlaybackSource) -> Result<()> {
        let mut command = Command::new(&self.binary_path);
        command.args(&self.args);
        match source {
            PlaybackSource::Local(path) => command.arg(path),
            PlaybackSource::Remote(url) => command.arg(url),
        };

        debug!(player = %self.binary_path.display(), %source, "Starting playback");

        let status = command.status().await.map_err(|e| {
            Error::Playback(format!(
                "failed to execute {}: {}",
                self.binary_path.display(),
                e
            ))
        })?;

        if !status.success() {
            return Err(Error::Playback(format!(
                "{} exited with {}",
                self.binary_path.display(),
                status
            )));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        self.binary_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(DEFAULT_PLAYER)
    }
}
