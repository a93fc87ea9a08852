// src/bin/mfp/output.rs
use async_trait::async_trait;
use console::style;
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use mfp::{PlaybackSource, Player, Progress, ProgressSink, RenderedTrack, TrackStatus};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct OutputHandler {
    verbose: bool,
}

impl OutputHandler {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn print_tracks(&self, tracks: &[RenderedTrack], json: bool) -> color_eyre::Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(tracks)?);
            return Ok(());
        }

        for track in tracks {
            match track.status {
                TrackStatus::Downloaded => println!("{}", style(&track.line).green()),
                TrackStatus::NotDownloaded => println!("{}", style(&track.line).red()),
            }
        }
        Ok(())
    }

    pub fn print_path(&self, path: &Path) {
        println!("{}", path.display());
    }

    pub fn print_download_complete(&self, path: &Path) {
        if self.verbose {
            println!("Saved {}", path.display());
        }
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        eprintln!("{} {}", style("Error:").red().bold(), style(error).red());

        if self.verbose {
            eprintln!("\nError details:");
            error.chain().skip(1).for_each(|cause| {
                eprintln!("  caused by: {}", cause);
            });
        }
    }

    /// A progress bar for one download
    pub fn download_progress(&self) -> DownloadProgress {
        DownloadProgress::new()
    }
}

/// Renders download progress as a bar, or a byte counter when the size is unknown
pub struct DownloadProgress {
    bar: ProgressBar,
    indeterminate: AtomicBool,
}

impl DownloadProgress {
    fn new() -> Self {
        Self::with_bar(ProgressBar::new(100))
    }

    fn with_bar(bar: ProgressBar) -> Self {
        if let Ok(bar_style) = ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos:>3}%") {
            bar.set_style(bar_style.progress_chars("=> "));
        }
        Self {
            bar,
            indeterminate: AtomicBool::new(false),
        }
    }
}

impl ProgressSink for DownloadProgress {
    fn started(&self, path: &Path, replaced: bool) {
        // Printed even when the bar is hidden
        self.bar.suspend(|| {
            for line in started_lines(path, replaced) {
                println!("{}", line);
            }
        });
    }

    fn update(&self, progress: Progress) {
        match progress {
            Progress::Fraction(fraction) => {
                self.bar.set_position((fraction * 100.0).floor() as u64);
            }
            Progress::Indeterminate { bytes_received } => {
                if !self.indeterminate.swap(true, Ordering::Relaxed)
                    && let Ok(spinner) = ProgressStyle::with_template("{spinner:.cyan} {msg}")
                {
                    self.bar.set_style(spinner);
                }
                self.bar
                    .set_message(format!("{} received", HumanBytes(bytes_received)));
                self.bar.tick();
            }
        }
    }

    fn finish(&self) {
        self.bar.abandon();
    }
}

fn started_lines(path: &Path, replaced: bool) -> Vec<String> {
    let mut lines = Vec::with_capacity(2);
    if replaced {
        lines.push(format!("Removing old file at {}", path.display()));
    }
    lines.push(format!("Downloading track to {}", path.display()));
    lines
}

/// Announces what is about to be played, then hands over to the real player
pub struct AnnouncingPlayer<P> {
    inner: P,
}

impl<P: Player> AnnouncingPlayer<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<P: Player> Player for AnnouncingPlayer<P> {
    async fn play(&self, source: &PlaybackSource) -> mfp::Result<()> {
        match source {
            PlaybackSource::Local(path) => println!("Playing {}...", path.display()),
            PlaybackSource::Remote(url) => println!("Streaming {}", url),
        }
        self.inner.play(source).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
