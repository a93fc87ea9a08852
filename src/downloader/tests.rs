use super::*;
use std::sync::Mutex;
use tempfile::TempDir;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Records every update so tests can inspect ordering
#[derive(Default)]
struct RecordingSink {
    started: Mutex<Option<(PathBuf, bool)>>,
    updates: Mutex<Vec<Progress>>,
    finished: Mutex<u32>,
}

impl RecordingSink {
    fn started_with(&self) -> Option<(PathBuf, bool)> {
        self.started.lock().unwrap().clone()
    }

    fn updates(&self) -> Vec<Progress> {
        self.updates.lock().unwrap().clone()
    }

    fn finished(&self) -> u32 {
        *self.finished.lock().unwrap()
    }
}

impl ProgressSink for RecordingSink {
    fn started(&self, path: &Path, replaced: bool) {
        *self.started.lock().unwrap() = Some((path.to_path_buf(), replaced));
    }

    fn update(&self, progress: Progress) {
        self.updates.lock().unwrap().push(progress);
    }

    fn finish(&self) {
        *self.finished.lock().unwrap() += 1;
    }
}

fn audio_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

async fn create_test_downloader() -> (Downloader, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = LocalStore::open(temp_dir.path()).await.unwrap();
    let downloader = Downloader::new(store, &HttpConfig::default()).unwrap();
    (downloader, temp_dir)
}

/// Serve a single hand-written HTTP response, then close the connection
///
/// Used for responses wiremock cannot produce: bodies cut short of their
/// declared length and bodies without a declared length.
async fn serve_raw_once(response: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        // Consume the request head before answering
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        socket.write_all(&response).await.unwrap();
        socket.flush().await.unwrap();
        socket.shutdown().await.ok();
    });

    format!("http://{}", addr)
}

fn assert_monotonic(updates: &[Progress]) {
    let mut last = 0.0f64;
    for update in updates {
        let value = match update {
            Progress::Fraction(f) => *f,
            Progress::Indeterminate { bytes_received } => *bytes_received as f64,
        };
        assert!(value >= last, "progress went backwards: {:?}", updates);
        last = value;
    }
}

#[tokio::test]
async fn test_fetch_to_writes_file_and_reports_progress() {
    let (downloader, temp_dir) = create_test_downloader().await;
    let mock_server = MockServer::start().await;
    let body = audio_bytes(64 * 1024);

    Mock::given(method("GET"))
        .and(path("/music_for_programming_1-a.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let track = Track::new(
        "Episode 1: A",
        format!("{}/music_for_programming_1-a.mp3", mock_server.uri()),
    )
    .unwrap();
    let sink = RecordingSink::default();

    let path = downloader.fetch_to(&track, &sink).await.unwrap();

    assert_eq!(path, temp_dir.path().join("music_for_programming_1-a.mp3"));
    assert_eq!(std::fs::read(&path).unwrap(), body);
    assert!(downloader.store().is_complete(&track));
    assert!(!downloader.store().partial_path_for(&track).exists());

    assert_eq!(sink.started_with(), Some((path.clone(), false)));

    let updates = sink.updates();
    assert_eq!(updates.first(), Some(&Progress::Fraction(0.0)));
    assert_eq!(updates.last(), Some(&Progress::Fraction(1.0)));
    assert_monotonic(&updates);
    assert_eq!(sink.finished(), 1);
}

#[tokio::test]
async fn test_fetch_to_replaces_existing_file() {
    let (downloader, _temp_dir) = create_test_downloader().await;
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/a.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fresh audio".to_vec()))
        .mount(&mock_server)
        .await;

    let track = Track::new("Episode 1: A", format!("{}/a.mp3", mock_server.uri())).unwrap();
    let existing = downloader.store().path_for(&track);
    std::fs::write(&existing, b"stale audio that is longer than the fresh one").unwrap();

    let sink = RecordingSink::default();
    downloader.fetch_to(&track, &sink).await.unwrap();

    assert_eq!(std::fs::read(&existing).unwrap(), b"fresh audio");
    assert_eq!(sink.started_with(), Some((existing, true)));
}

#[tokio::test]
async fn test_fetch_to_discards_stale_partial_file() {
    let (downloader, _temp_dir) = create_test_downloader().await;
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
        .mount(&mock_server)
        .await;

    let track = Track::new("Episode 1: A", format!("{}/a.mp3", mock_server.uri())).unwrap();
    std::fs::write(
        downloader.store().partial_path_for(&track),
        b"leftover from a crashed run",
    )
    .unwrap();

    let path = downloader.fetch_to(&track, &NoProgress).await.unwrap();
    assert_eq!(std::fs::read(path).unwrap(), b"abc");
}

#[tokio::test]
async fn test_fetch_to_http_error_leaves_nothing_behind() {
    let (downloader, _temp_dir) = create_test_downloader().await;
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let track = Track::new("Episode 1: A", format!("{}/a.mp3", mock_server.uri())).unwrap();
    let sink = RecordingSink::default();

    match downloader.fetch_to(&track, &sink).await {
        Err(Error::Download(DownloadError::Http { status, url })) => {
            assert_eq!(status, 404);
            assert_eq!(url, track.url());
        }
        other => panic!("Expected Http error, got {:?}", other),
    }

    assert!(!downloader.store().is_complete(&track));
    assert!(!downloader.store().partial_path_for(&track).exists());
    assert!(sink.updates().is_empty());
    assert_eq!(sink.finished(), 1);
}

#[tokio::test]
async fn test_fetch_to_connection_refused_is_transport_error() {
    let (downloader, _temp_dir) = create_test_downloader().await;
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let track = Track::new(
        "Episode 1: A",
        format!("http://127.0.0.1:{}/a.mp3", port),
    )
    .unwrap();

    assert!(matches!(
        downloader.fetch_to(&track, &NoProgress).await,
        Err(Error::Download(DownloadError::Transport { .. }))
    ));
}

#[tokio::test]
async fn test_interrupted_download_is_not_complete() {
    let (downloader, _temp_dir) = create_test_downloader().await;

    // Declare 1000 bytes, deliver 400 (40%), then hang up
    let mut response = b"HTTP/1.1 200 OK\r\n\
Content-Type: audio/mpeg\r\n\
Content-Length: 1000\r\n\
Connection: close\r\n\
\r\n"
        .to_vec();
    response.extend(audio_bytes(400));
    let base = serve_raw_once(response).await;

    let track = Track::new("Episode 1: A", format!("{}/a.mp3", base)).unwrap();

    // A previous complete download exists and must not survive as "complete"
    std::fs::write(downloader.store().path_for(&track), b"old episode").unwrap();

    let sink = RecordingSink::default();
    let result = downloader.fetch_to(&track, &sink).await;

    assert!(
        matches!(result, Err(Error::Download(DownloadError::Transport { .. }))),
        "Expected Transport error, got {:?}",
        result
    );
    assert!(!downloader.store().is_complete(&track));
    assert!(!downloader.store().path_for(&track).exists());
    assert!(!downloader.store().partial_path_for(&track).exists());

    let updates = sink.updates();
    assert_monotonic(&updates);
    assert!(
        updates
            .iter()
            .all(|p| matches!(p, Progress::Fraction(f) if *f <= 0.4)),
        "progress should stop at 40%: {:?}",
        updates
    );
    assert_eq!(sink.finished(), 1);
}

#[tokio::test]
async fn test_missing_content_length_reports_indeterminate_progress() {
    let (downloader, _temp_dir) = create_test_downloader().await;

    let response = b"HTTP/1.1 200 OK\r\n\
Content-Type: audio/mpeg\r\n\
Transfer-Encoding: chunked\r\n\
Connection: close\r\n\
\r\n\
5\r\nhello\r\n\
6\r\n world\r\n\
0\r\n\r\n"
        .to_vec();
    let base = serve_raw_once(response).await;

    let track = Track::new("Episode 1: A", format!("{}/a.mp3", base)).unwrap();
    let sink = RecordingSink::default();

    let path = downloader.fetch_to(&track, &sink).await.unwrap();
    assert_eq!(std::fs::read(path).unwrap(), b"hello world");

    let updates = sink.updates();
    assert_eq!(
        updates.first(),
        Some(&Progress::Indeterminate { bytes_received: 0 })
    );
    assert_eq!(
        updates.last(),
        Some(&Progress::Indeterminate { bytes_received: 11 })
    );
    assert_monotonic(&updates);
}
