// src/bin/mfp/app.rs
use crate::args::{Args, Command};
use crate::output::{AnnouncingPlayer, OutputHandler};
use clap::CommandFactory;
use color_eyre::Result;
use mfp::config::{TRACKS_PATH_ENV, TRACKS_PATH_ENV_ALIAS};
use mfp::{Client, CommandPlayer, Config, ListOrder, TracksPathSources, resolve_tracks_path};
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_FILE: &str = "config.json";

pub struct App {
    args: Args,
    output: OutputHandler,
}

impl App {
    pub fn new(args: Args) -> Self {
        let output = OutputHandler::new(args.verbose);
        Self { args, output }
    }

    pub async fn run(&self) -> Result<()> {
        let verb = self.args.verb();
        if verb == Command::Help {
            Args::command().print_help()?;
            return Ok(());
        }

        let config = self.resolved_config()?;
        let tracks_path = resolve_tracks_path(TracksPathSources {
            flag: self.args.tracks_path.clone(),
            env: tracks_path_from_env(),
            config: config.tracks_path.clone(),
            home: dirs::home_dir(),
        })?;
        debug!(tracks_path = %tracks_path.display(), feed_url = %config.feed_url, "Resolved configuration");

        let client = Client::from_config(&config, &tracks_path).await?;

        match verb {
            Command::List { reverse, json } => {
                let order = if reverse {
                    ListOrder::NewestFirst
                } else {
                    ListOrder::OldestFirst
                };
                let tracks = client.list(order).await?;
                self.output.print_tracks(&tracks, json)?;
            }
            Command::Download { episode } => {
                let progress = self.output.download_progress();
                let path = client.download(episode, &progress).await?;
                self.output.print_download_complete(&path);
            }
            Command::Path { episode } => {
                let path = client.path(episode).await?;
                self.output.print_path(&path);
            }
            Command::Play { episode, save } => {
                let player = AnnouncingPlayer::new(CommandPlayer::from_config(&config.player)?);
                let progress = self.output.download_progress();
                client.play(episode, save, &progress, &player).await?;
            }
            Command::Help => {}
        }

        Ok(())
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        self.output.print_error(error);
    }

    fn resolved_config(&self) -> Result<Config> {
        Ok(load_config(
            self.args.config.as_deref(),
            default_config_path(),
            self.args.feed_url.as_deref(),
        )?)
    }
}

/// Load the configuration and apply the `--feed-url` override
///
/// An explicit file must exist; the per-user `default_path` is optional.
fn load_config(
    explicit: Option<&Path>,
    default_path: Option<PathBuf>,
    feed_url: Option<&str>,
) -> mfp::Result<Config> {
    let mut config = match explicit {
        Some(path) => Config::load(path)?,
        None => match default_path.filter(|path| path.is_file()) {
            Some(path) => {
                debug!(path = %path.display(), "Loading configuration");
                Config::load(&path)?
            }
            None => Config::default(),
        },
    };

    if let Some(feed_url) = feed_url {
        config.feed_url = feed_url.to_string();
        config.validate()?;
    }

    Ok(config)
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mfp").join(CONFIG_FILE))
}

fn tracks_path_from_env() -> Option<PathBuf> {
    [TRACKS_PATH_ENV, TRACKS_PATH_ENV_ALIAS]
        .into_iter()
        .filter_map(std::env::var_os)
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
}
