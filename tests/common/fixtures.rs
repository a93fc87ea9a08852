//! Feed fixtures and a mock feed server

use async_trait::async_trait;
use mfp::{Client, Config, PlaybackSource, Player};
use std::sync::Mutex;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Episode audio served by the mock server, oldest first
pub const EPISODES: [(&str, &str, &[u8]); 3] = [
    ("Episode 1: Datassette", "music_for_programming_1-datassette.mp3", b"first mix"),
    ("Episode 2: Sunjammer", "music_for_programming_2-sunjammer.mp3", b"second mix"),
    ("Episode 3: Datassette", "music_for_programming_3-datassette.mp3", b"third mix"),
];

/// Build an RSS document listing [`EPISODES`] newest first, with guids under `base`
pub fn rss_feed(base: &str) -> String {
    let items: String = EPISODES
        .iter()
        .rev()
        .map(|(title, filename, _)| {
            format!(
                "<item><title>{}</title><guid>{}/{}</guid></item>",
                title, base, filename
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
    <channel>
        <title>musicForProgramming();</title>
        <link>https://musicforprogramming.net</link>
        <description>Mixes for programming</description>
        {}
    </channel>
</rss>"#,
        items
    )
}

/// Start a mock server serving the feed at `/rss.php` and every episode's audio
pub async fn start_feed_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rss.php"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/rss+xml")
                .set_body_string(rss_feed(&server.uri())),
        )
        .mount(&server)
        .await;

    for (_, filename, body) in EPISODES {
        Mock::given(method("GET"))
            .and(path(format!("/{}", filename)))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
            .mount(&server)
            .await;
    }

    server
}

/// A client reading the mock server's feed and storing tracks in a temp dir
pub async fn create_client(server: &MockServer) -> (Client, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = Config {
        feed_url: format!("{}/rss.php", server.uri()),
        ..Default::default()
    };
    let client = Client::from_config(&config, temp_dir.path())
        .await
        .expect("Failed to create client");
    (client, temp_dir)
}

/// Player that remembers what it was asked to play
#[derive(Default)]
pub struct RecordingPlayer {
    pub played: Mutex<Vec<PlaybackSource>>,
}

#[async_trait]
impl Player for RecordingPlayer {
    async fn play(&self, source: &PlaybackSource) -> mfp::Result<()> {
        self.played
            .lock()
            .expect("player mutex poisoned")
            .push(source.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}
