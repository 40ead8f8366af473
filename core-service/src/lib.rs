//! Player service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, filesystem,
//! remote file store) into the player core and exposes the operations a host
//! needs: fetching the schedule, heartbeats, media synchronization, on-demand
//! retrieval for the local proxy, and the ad-hoc cache. Desktop hosts
//! typically enable the `desktop-shims` feature (which depends on
//! `bridge-desktop`).

pub mod error;
pub mod media;

pub use error::{CoreError, Result};
pub use media::{content_type_for, AssetStream};

use std::path::PathBuf;
use std::sync::Arc;

use bridge_traits::{
    file_store::{resolve_media_path, FileStoreClient, FileStoreConnector},
    http::HttpClient,
    storage::FileSystemAccess,
};
use core_runtime::{events::EventBus, PlayerConfig, PLAYER_VERSION};
use core_schedule::{Schedule, ScheduleFetcher};
use core_sync::{MediaStore, MediaSyncCoordinator, SyncReport};
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, instrument, warn};

const PROXY_CHUNK_SIZE: usize = 64 * 1024;

/// Aggregated handle to all bridge dependencies the core requires.
pub struct PlayerDependencies {
    pub http_client: Arc<dyn HttpClient>,
    pub filesystem: Arc<dyn FileSystemAccess>,
    pub file_store: Arc<dyn FileStoreConnector>,
}

impl PlayerDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        filesystem: Arc<dyn FileSystemAccess>,
        file_store: Arc<dyn FileStoreConnector>,
    ) -> Self {
        Self {
            http_client,
            filesystem,
            file_store,
        }
    }

    /// Desktop bridges: `reqwest`, `tokio::fs` and FTP with the file store
    /// settings from `config`.
    #[cfg(feature = "desktop-shims")]
    pub fn desktop(config: &PlayerConfig) -> Result<Self> {
        use bridge_desktop::{FtpConnector, ReqwestHttpClient, TokioFileSystem};

        let http_client = ReqwestHttpClient::new()
            .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;

        Ok(Self::new(
            Arc::new(http_client),
            Arc::new(TokioFileSystem::new()),
            Arc::new(FtpConnector::new(config.file_store_settings())),
        ))
    }
}

/// Snapshot reported by the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerStatus {
    pub configured: bool,
    #[serde(rename = "idMonitor")]
    pub monitor_id: String,
    #[serde(rename = "mediaCount")]
    pub media_count: usize,
    pub version: String,
}

/// Primary façade exposed to host applications.
///
/// Cheap to clone; clones share the same bridges and event bus.
#[derive(Clone)]
pub struct PlayerService {
    config: Arc<PlayerConfig>,
    deps: Arc<PlayerDependencies>,
    fetcher: Arc<ScheduleFetcher>,
    coordinator: Arc<MediaSyncCoordinator>,
    cache: MediaStore,
    event_bus: EventBus,
}

impl PlayerService {
    /// Create a new service from the provided configuration and bridges.
    ///
    /// The configuration is not validated here so that an unconfigured
    /// player can still answer [`status`](Self::status).
    pub fn new(config: PlayerConfig, deps: PlayerDependencies) -> Self {
        let event_bus = EventBus::default();
        let fetcher = Arc::new(
            ScheduleFetcher::new(Arc::clone(&deps.http_client), &config)
                .with_event_bus(event_bus.clone()),
        );
        let media = MediaStore::new(Arc::clone(&deps.filesystem), config.media_dir());
        let cache = MediaStore::new(Arc::clone(&deps.filesystem), config.cache_dir());
        let coordinator = Arc::new(
            MediaSyncCoordinator::new(Arc::clone(&fetcher), media)
                .with_event_bus(event_bus.clone()),
        );

        Self {
            config: Arc::new(config),
            deps: Arc::new(deps),
            fetcher,
            coordinator,
            cache,
            event_bus,
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Access the bridge dependencies being used by the service.
    pub fn dependencies(&self) -> Arc<PlayerDependencies> {
        Arc::clone(&self.deps)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub async fn fetch_schedule(&self) -> Result<Schedule> {
        Ok(self.fetcher.fetch_schedule().await?)
    }

    pub async fn send_heartbeat(&self) -> Result<()> {
        Ok(self.fetcher.send_heartbeat().await?)
    }

    /// Fetch the schedule and report the screen name it was issued for.
    pub async fn test_connection(&self) -> Result<String> {
        let schedule = self.fetcher.fetch_schedule().await?;
        Ok(schedule.screen.name)
    }

    /// Run one media synchronization over a fresh file store session.
    pub async fn sync_all_media(&self) -> Result<SyncReport> {
        let session = self.deps.file_store.open_session();
        let report = self.coordinator.sync_all_media(session.as_ref()).await?;
        info!(summary = %report.message(), "Media sync report");
        Ok(report)
    }

    /// Open `name` on the remote file store.
    ///
    /// Bare file names are looked up in the upload directory; names with a
    /// directory component are used as given.
    #[instrument(skip(self))]
    pub async fn retrieve_asset(&self, name: &str) -> Result<AssetStream> {
        if name.trim().is_empty() {
            return Err(CoreError::InvalidArgument("asset name is empty".to_string()));
        }

        let remote_path = resolve_media_path(name);
        let session = self.deps.file_store.open_session();

        if let Err(e) = session.connect().await {
            close_session(session.as_ref()).await;
            return Err(e.into());
        }

        match session.retrieve(&remote_path).await {
            Ok(reader) => {
                debug!(path = %remote_path, "Asset opened");
                Ok(AssetStream::new(remote_path, reader, session))
            }
            Err(e) => {
                close_session(session.as_ref()).await;
                Err(e.into())
            }
        }
    }

    /// Proxy `name` into `writer` chunk by chunk, returning the byte count.
    ///
    /// # Errors
    ///
    /// Failures before the first byte surface as the retrieval error. Once
    /// copying has begun, any read or write failure is reported as
    /// [`CoreError::StreamInterrupted`]; the bytes already written stay
    /// written.
    pub async fn stream_asset<W>(&self, name: &str, writer: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let mut stream = self.retrieve_asset(name).await?;
        let copied = copy_incrementally(&mut stream, writer).await;
        let path = stream.remote_path().to_string();
        stream.finish().await;

        match copied {
            Ok(bytes) => {
                debug!(path = %path, bytes, "Asset streamed");
                Ok(bytes)
            }
            Err((bytes_written, e)) => {
                warn!(path = %path, bytes_written, error = %e, "Asset stream interrupted");
                Err(CoreError::StreamInterrupted {
                    path,
                    bytes_written,
                    message: e.to_string(),
                })
            }
        }
    }

    pub async fn cache_has(&self, name: &str) -> Result<bool> {
        Ok(self.cache.exists(name).await?)
    }

    pub async fn cache_read(&self, name: &str) -> Result<Box<dyn AsyncRead + Send + Unpin>> {
        Ok(self.cache.read(name).await?)
    }

    /// Store `reader` in the cache under the base name of `name`.
    pub async fn cache_write(
        &self,
        name: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<PathBuf> {
        let stored = self.cache.write(name, reader).await?;
        Ok(stored.path)
    }

    pub async fn status(&self) -> Result<PlayerStatus> {
        let media_count = self.coordinator.store().count_entries().await?;
        Ok(PlayerStatus {
            configured: self.config.is_configured(),
            monitor_id: self.config.monitor_id.clone(),
            media_count,
            version: PLAYER_VERSION.to_string(),
        })
    }
}

async fn copy_incrementally<R, W>(
    reader: &mut R,
    writer: &mut W,
) -> std::result::Result<u64, (u64, std::io::Error)>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = vec![0u8; PROXY_CHUNK_SIZE];
    let mut written = 0u64;

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => return Err((written, e)),
        };
        writer
            .write_all(&buf[..n])
            .await
            .map_err(|e| (written, e))?;
        written += n as u64;
    }

    writer.flush().await.map_err(|e| (written, e))?;
    Ok(written)
}

async fn close_session(session: &dyn FileStoreClient) {
    if let Err(e) = session.close().await {
        debug!(error = %e, "File store close failed");
    }
}
