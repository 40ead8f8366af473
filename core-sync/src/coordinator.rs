//! # Media Sync Coordinator
//!
//! Brings the local media directory in line with the current schedule.
//!
//! ## Workflow
//!
//! 1. Fetch the schedule (failure aborts the run with that error)
//! 2. Resolve the required asset set
//! 3. Connect one file store session for the whole run (failure aborts with
//!    [`SyncError::NotConnected`])
//! 4. For each asset, in order: skip it when the store already has its base
//!    name, otherwise retrieve and store it. A failing asset is counted and
//!    the loop moves on
//! 5. Close the session, whatever happened, and return the [`SyncReport`]
//!
//! Every step is sequential. There is no overall timeout; only the network
//! calls carry one. Assets are never deleted, so files dropped from the
//! schedule stay on disk.
//!
//! ```rust,ignore
//! let coordinator = MediaSyncCoordinator::new(fetcher, media_store)
//!     .with_event_bus(event_bus.clone());
//! let session = connector.open_session();
//! let report = coordinator.sync_all_media(session.as_ref()).await?;
//! println!("{}", report.message());
//! ```

use crate::error::{Result, SyncError};
use crate::report::SyncReport;
use crate::store::MediaStore;
use bridge_traits::file_store::FileStoreClient;
use bridge_traits::time::{Clock, SystemClock};
use core_runtime::events::{CoreEvent, EventBus, SyncEvent};
use core_runtime::logging::strip_path;
use core_schedule::{resolve_required_assets, ScheduleFetcher};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// What happened to a single asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssetOutcome {
    Skipped,
    Downloaded { bytes: u64 },
}

pub struct MediaSyncCoordinator {
    fetcher: Arc<ScheduleFetcher>,
    store: MediaStore,
    event_bus: Option<EventBus>,
    clock: Arc<dyn Clock>,
}

impl MediaSyncCoordinator {
    pub fn new(fetcher: Arc<ScheduleFetcher>, store: MediaStore) -> Self {
        Self {
            fetcher,
            store,
            event_bus: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &MediaStore {
        &self.store
    }

    /// Run one synchronization against `file_store`.
    ///
    /// The caller owns the session; it is connected and closed here.
    ///
    /// # Errors
    ///
    /// Only failures that prevent iterating the assets are returned: the
    /// schedule fetch, creating the media directory, or connecting the file
    /// store. Per-asset failures end up in the report.
    #[instrument(skip(self, file_store), fields(monitor_id = %self.fetcher.monitor_id()))]
    pub async fn sync_all_media(&self, file_store: &dyn FileStoreClient) -> Result<SyncReport> {
        let mut report = SyncReport::begin(self.clock.now());

        let schedule = match self.fetcher.fetch_schedule().await {
            Ok(schedule) => schedule,
            Err(e) => return Err(self.abort(SyncError::from(e))),
        };
        let assets = resolve_required_assets(&schedule);
        info!(assets = assets.len(), "Resolved required assets");

        if let Err(e) = self.store.ensure_root().await {
            return Err(self.abort(e));
        }

        if let Err(e) = file_store.connect().await {
            close_session(file_store).await;
            return Err(self.abort(match SyncError::from(e) {
                SyncError::NotConnected(msg) => SyncError::NotConnected(msg),
                other => SyncError::NotConnected(other.to_string()),
            }));
        }

        self.emit(SyncEvent::Started {
            total_assets: u32::try_from(assets.len()).unwrap_or(u32::MAX),
        });

        for path in &assets {
            match self.sync_asset(file_store, path).await {
                Ok(AssetOutcome::Skipped) => {
                    report.skipped += 1;
                    self.emit(SyncEvent::AssetSkipped { path: path.clone() });
                }
                Ok(AssetOutcome::Downloaded { bytes }) => {
                    report.downloaded += 1;
                    self.emit(SyncEvent::AssetDownloaded {
                        path: path.clone(),
                        bytes,
                    });
                }
                Err(e) => {
                    warn!(asset = strip_path(path), error = %e, "Asset sync failed");
                    report.record_failure(path, e.to_string());
                    self.emit(SyncEvent::AssetFailed {
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        close_session(file_store).await;

        report.success = true;
        report.finished_at = self.clock.now();

        info!(
            downloaded = report.downloaded,
            skipped = report.skipped,
            failed = report.failed,
            "Media sync finished"
        );
        self.emit(SyncEvent::Completed {
            downloaded: report.downloaded,
            skipped: report.skipped,
            failed: report.failed,
            duration_ms: u64::try_from(report.duration().as_millis()).unwrap_or(u64::MAX),
        });

        Ok(report)
    }

    async fn sync_asset(
        &self,
        file_store: &dyn FileStoreClient,
        path: &str,
    ) -> Result<AssetOutcome> {
        let name = MediaStore::sanitize(path)?;
        if self.store.exists(name).await? {
            debug!(asset = name, "Already present");
            return Ok(AssetOutcome::Skipped);
        }

        let mut reader = file_store.retrieve(path).await?;
        let stored = self.store.write(name, reader.as_mut()).await?;
        debug!(asset = name, bytes = stored.bytes, "Downloaded");
        Ok(AssetOutcome::Downloaded {
            bytes: stored.bytes,
        })
    }

    fn abort(&self, err: SyncError) -> SyncError {
        warn!(error = %err, "Media sync aborted");
        self.emit(SyncEvent::Failed {
            message: err.to_string(),
        });
        err
    }

    fn emit(&self, event: SyncEvent) {
        if let Some(bus) = &self.event_bus {
            let _ = bus.emit(CoreEvent::Sync(event));
        }
    }
}

async fn close_session(file_store: &dyn FileStoreClient) {
    if let Err(e) = file_store.close().await {
        debug!(error = %e, "File store close failed");
    }
}
