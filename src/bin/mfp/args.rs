// src/bin/mfp/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// List, download and play musicforprogramming.net episodes
#[derive(Parser, Debug)]
#[command(
    name = "mfp",
    author,
    version,
    about,
    long_about = None,
    disable_help_subcommand = true,
    after_help = "Episodes are numbered oldest first: episode 1 is the first mix ever published.\n\
                  The download directory defaults to $MFP_DOWNLOAD_PATH, then $HOME/.mfp/."
)]
pub struct Args {
    /// Directory to download tracks to (created if it doesn't exist)
    #[arg(long, global = true, value_name = "DIR")]
    pub tracks_path: Option<PathBuf>,

    /// Feed to read episodes from
    #[arg(long, global = true, value_name = "URL")]
    pub feed_url: Option<String>,

    /// JSON configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List all episodes (default)
    #[command(visible_alias = "l")]
    List {
        /// List newest first
        #[arg(short, long)]
        reverse: bool,

        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show this help text
    #[command(visible_alias = "h")]
    Help,

    /// Download episode NUM
    #[command(visible_alias = "dl")]
    Download {
        /// Episode number
        #[arg(value_name = "NUM")]
        episode: usize,
    },

    /// Print the path of episode NUM ("mpg123 $(mfp path 20)" plays episode 20)
    Path {
        /// Episode number
        #[arg(value_name = "NUM")]
        episode: usize,
    },

    /// Play episode NUM (plays the downloaded file if present, streams otherwise)
    #[command(visible_alias = "p")]
    Play {
        /// Episode number
        #[arg(value_name = "NUM")]
        episode: usize,

        /// Download the episode first if it is not present
        #[arg(short, long)]
        save: bool,
    },
}

impl Args {
    /// The verb to run; listing when none was given
    pub fn verb(&self) -> Command {
        self.command.clone().unwrap_or(Command::List {
            reverse: false,
            json: false,
        })
    }
}
