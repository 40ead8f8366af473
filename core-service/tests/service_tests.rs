//! Integration tests for the `PlayerService` façade.

use bridge_desktop::TokioFileSystem;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    FileStoreClient, FileStoreConnector, HttpClient, HttpRequest, HttpResponse,
};
use bytes::Bytes;
use core_runtime::config::PlayerConfig;
use core_schedule::ScheduleError;
use core_service::{CoreError, PlayerDependencies, PlayerService};
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

const SCHEDULE: &str = "<it.zerounorabbit.spotlivescreen.SchermoXml>\
    <schermo><nome>Lobby</nome></schermo>\
    <mediaFinestre>\
    <it.zerounorabbit.spotlivescreen.MediaFinestra><media><video>intro.mp4</video></media></it.zerounorabbit.spotlivescreen.MediaFinestra>\
    <it.zerounorabbit.spotlivescreen.MediaFinestra><media><immagine>2024/menu.jpg</immagine></media></it.zerounorabbit.spotlivescreen.MediaFinestra>\
    </mediaFinestre>\
    </it.zerounorabbit.spotlivescreen.SchermoXml>";

struct CannedScheduleServer {
    status: u16,
}

#[async_trait::async_trait]
impl HttpClient for CannedScheduleServer {
    async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
        Ok(HttpResponse {
            status: self.status,
            headers: HashMap::new(),
            body: Bytes::from_static(SCHEDULE.as_bytes()),
        })
    }
}

/// Hands out a few bytes, then breaks.
struct TruncatedTransfer {
    sent: bool,
}

impl AsyncRead for TruncatedTransfer {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if self.sent {
            Poll::Ready(Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset",
            )))
        } else {
            self.sent = true;
            buf.put_slice(b"half a video");
            Poll::Ready(Ok(()))
        }
    }
}

/// Shared state of every session a [`RecordingConnector`] opens.
#[derive(Default)]
struct RemoteFiles {
    files: HashMap<String, Vec<u8>>,
    truncated: Vec<String>,
    sessions: AtomicUsize,
    closes: AtomicUsize,
    retrievals: Mutex<Vec<String>>,
}

#[derive(Default)]
struct RecordingConnector {
    remote: Arc<RemoteFiles>,
}

impl RecordingConnector {
    fn with_files(paths: &[&str]) -> Self {
        Self {
            remote: Arc::new(RemoteFiles {
                files: paths
                    .iter()
                    .map(|path| (path.to_string(), format!("content of {}", path).into_bytes()))
                    .collect(),
                ..Default::default()
            }),
        }
    }

    fn with_truncated(path: &str) -> Self {
        Self {
            remote: Arc::new(RemoteFiles {
                truncated: vec![path.to_string()],
                ..Default::default()
            }),
        }
    }
}

impl FileStoreConnector for RecordingConnector {
    fn open_session(&self) -> Box<dyn FileStoreClient> {
        self.remote.sessions.fetch_add(1, Ordering::SeqCst);
        Box::new(RecordingSession {
            remote: Arc::clone(&self.remote),
        })
    }
}

struct RecordingSession {
    remote: Arc<RemoteFiles>,
}

#[async_trait::async_trait]
impl FileStoreClient for RecordingSession {
    async fn connect(&self) -> BridgeResult<()> {
        Ok(())
    }

    async fn retrieve(&self, remote_path: &str) -> BridgeResult<Box<dyn AsyncRead + Send + Unpin>> {
        self.remote
            .retrievals
            .lock()
            .unwrap()
            .push(remote_path.to_string());

        if self.remote.truncated.iter().any(|p| p == remote_path) {
            return Ok(Box::new(TruncatedTransfer { sent: false }));
        }
        match self.remote.files.get(remote_path) {
            Some(data) => Ok(Box::new(io::Cursor::new(data.clone()))),
            None => Err(BridgeError::remote(format!(
                "550 {}: No such file or directory",
                remote_path
            ))),
        }
    }

    async fn list(&self, _path: &str) -> BridgeResult<Vec<String>> {
        Ok(self.remote.files.keys().cloned().collect())
    }

    async fn close(&self) -> BridgeResult<()> {
        self.remote.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn config(data_dir: &Path) -> PlayerConfig {
    PlayerConfig {
        server_url: "http://schedule.test".to_string(),
        username: "player".to_string(),
        password: "secret".to_string(),
        monitor_id: "567".to_string(),
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    }
}

fn service_with(config: PlayerConfig, status: u16, connector: &RecordingConnector) -> PlayerService {
    let deps = PlayerDependencies::new(
        Arc::new(CannedScheduleServer { status }),
        Arc::new(TokioFileSystem::new()),
        Arc::new(RecordingConnector {
            remote: Arc::clone(&connector.remote),
        }),
    );
    PlayerService::new(config, deps)
}

fn service(data_dir: &Path, connector: &RecordingConnector) -> PlayerService {
    service_with(config(data_dir), 200, connector)
}

#[tokio::test]
async fn test_bare_name_is_retrieved_from_upload_directory() {
    let dir = tempfile::tempdir().unwrap();
    let connector = RecordingConnector::with_files(&["upload/clip.mp4"]);
    let service = service(dir.path(), &connector);

    let mut stream = service.retrieve_asset("clip.mp4").await.unwrap();
    assert_eq!(stream.remote_path(), "upload/clip.mp4");
    assert_eq!(stream.content_type(), "video/mp4");

    let mut body = Vec::new();
    stream.read_to_end(&mut body).await.unwrap();
    assert_eq!(body, b"content of upload/clip.mp4");

    stream.finish().await;
    assert_eq!(connector.remote.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_nested_path_is_retrieved_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let connector = RecordingConnector::with_files(&["2024/clip.mp4"]);
    let service = service(dir.path(), &connector);

    let stream = service.retrieve_asset("2024/clip.mp4").await.unwrap();
    stream.finish().await;

    assert_eq!(
        *connector.remote.retrievals.lock().unwrap(),
        vec!["2024/clip.mp4".to_string()]
    );
}

#[tokio::test]
async fn test_missing_asset_closes_its_session() {
    let dir = tempfile::tempdir().unwrap();
    let connector = RecordingConnector::default();
    let service = service(dir.path(), &connector);

    let result = service.retrieve_asset("ghost.mp4").await;
    assert!(matches!(
        result,
        Err(CoreError::FileStore(BridgeError::Remote { .. }))
    ));
    assert_eq!(connector.remote.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_empty_asset_name_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let connector = RecordingConnector::default();
    let service = service(dir.path(), &connector);

    let result = service.retrieve_asset("  ").await;
    assert!(matches!(result, Err(CoreError::InvalidArgument(_))));
    assert_eq!(connector.remote.sessions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_stream_asset_copies_everything() {
    let dir = tempfile::tempdir().unwrap();
    let connector = RecordingConnector::with_files(&["upload/logo.png"]);
    let service = service(dir.path(), &connector);

    let mut out: Vec<u8> = Vec::new();
    let bytes = service.stream_asset("logo.png", &mut out).await.unwrap();

    assert_eq!(out, b"content of upload/logo.png");
    assert_eq!(bytes, out.len() as u64);
    assert_eq!(connector.remote.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_stream_asset_reports_interruption_after_partial_write() {
    let dir = tempfile::tempdir().unwrap();
    let connector = RecordingConnector::with_truncated("upload/clip.mp4");
    let service = service(dir.path(), &connector);

    let mut out: Vec<u8> = Vec::new();
    let err = service.stream_asset("clip.mp4", &mut out).await.unwrap_err();

    match err {
        CoreError::StreamInterrupted {
            path,
            bytes_written,
            ..
        } => {
            assert_eq!(path, "upload/clip.mp4");
            assert_eq!(bytes_written, 12);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(out, b"half a video");
    assert_eq!(connector.remote.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cache_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let connector = RecordingConnector::default();
    let service = service(dir.path(), &connector);

    assert!(!service.cache_has("poster.jpg").await.unwrap());

    let mut source = io::Cursor::new(b"poster bytes".to_vec());
    let path = service
        .cache_write("remote/poster.jpg", &mut source)
        .await
        .unwrap();
    assert_eq!(path, dir.path().join("cache").join("poster.jpg"));
    assert!(service.cache_has("poster.jpg").await.unwrap());

    let mut reader = service.cache_read("poster.jpg").await.unwrap();
    let mut body = Vec::new();
    reader.read_to_end(&mut body).await.unwrap();
    assert_eq!(body, b"poster bytes");

    // The cache lives apart from synchronized media.
    assert_eq!(service.status().await.unwrap().media_count, 0);
}

#[tokio::test]
async fn test_status_counts_synchronized_media() {
    let dir = tempfile::tempdir().unwrap();
    let connector = RecordingConnector::with_files(&["intro.mp4", "2024/menu.jpg"]);
    let service = service(dir.path(), &connector);

    let before = service.status().await.unwrap();
    assert!(before.configured);
    assert_eq!(before.monitor_id, "567");
    assert_eq!(before.media_count, 0);
    assert_eq!(before.version, "6.0.0");

    let report = service.sync_all_media().await.unwrap();
    assert!(report.success);
    assert_eq!(report.downloaded, 2);
    assert_eq!(connector.remote.sessions.load(Ordering::SeqCst), 1);
    assert!(dir.path().join("media").join("menu.jpg").exists());

    let after = service.status().await.unwrap();
    assert_eq!(after.media_count, 2);

    let json = serde_json::to_value(&after).unwrap();
    assert_eq!(json["idMonitor"], "567");
    assert_eq!(json["mediaCount"], 2);
    assert_eq!(json["configured"], true);
}

#[tokio::test]
async fn test_unconfigured_player_still_reports_status() {
    let dir = tempfile::tempdir().unwrap();
    let connector = RecordingConnector::default();
    let config = PlayerConfig {
        data_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    let service = service_with(config, 200, &connector);

    let status = service.status().await.unwrap();
    assert!(!status.configured);
    assert_eq!(status.monitor_id, "");
}

#[tokio::test]
async fn test_connection_reports_screen_name() {
    let dir = tempfile::tempdir().unwrap();
    let connector = RecordingConnector::default();
    let service = service(dir.path(), &connector);

    assert_eq!(service.test_connection().await.unwrap(), "Lobby");
}

#[tokio::test]
async fn test_schedule_rejection_is_surfaced() {
    let dir = tempfile::tempdir().unwrap();
    let connector = RecordingConnector::default();
    let service = service_with(config(dir.path()), 503, &connector);

    let result = service.fetch_schedule().await;
    assert!(matches!(
        result,
        Err(CoreError::Schedule(ScheduleError::Remote { status: 503 }))
    ));

    let heartbeat = service.send_heartbeat().await;
    assert!(matches!(
        heartbeat,
        Err(CoreError::Schedule(ScheduleError::Remote { status: 503 }))
    ));
}
