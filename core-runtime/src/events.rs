//! # Event Bus
//!
//! Typed, broadcast-based events shared between the schedule fetcher, the
//! media sync orchestrator and whoever hosts them (a status page, a tray
//! icon, a log shipper).
//!
//! ```text
//! ┌────────────────┐   emit    ┌───────────┐  subscribe  ┌────────────┐
//! │ ScheduleFetch  ├──────────>│           ├────────────>│ Subscriber │
//! └────────────────┘           │ EventBus  │             └────────────┘
//! ┌────────────────┐   emit    │ (broadcast│  subscribe  ┌────────────┐
//! │ MediaSync      ├──────────>│  channel) ├────────────>│ Subscriber │
//! └────────────────┘           └───────────┘             └────────────┘
//! ```
//!
//! Emission is best-effort: publishers ignore the "no subscribers" error and a
//! slow subscriber sees `RecvError::Lagged` instead of blocking anyone.
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, SyncEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(CoreEvent::Sync(SyncEvent::AssetSkipped {
//!     path: "a.jpg".to_string(),
//! }))
//! .ok();
//!
//! assert!(matches!(rx.recv().await, Ok(CoreEvent::Sync(_))));
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default channel capacity.
///
/// A full sync of a large schedule emits one event per asset, so this should
/// comfortably exceed the typical asset count.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 256;

/// Top-level event published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Schedule(ScheduleEvent),
    Sync(SyncEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Schedule(e) => e.description(),
            CoreEvent::Sync(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Schedule(ScheduleEvent::FetchFailed { .. }) => EventSeverity::Error,
            CoreEvent::Sync(SyncEvent::Failed { .. }) => EventSeverity::Error,
            CoreEvent::Sync(SyncEvent::AssetFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Sync(SyncEvent::Completed { failed, .. }) if *failed > 0 => {
                EventSeverity::Warning
            }
            CoreEvent::Schedule(ScheduleEvent::Fetched { .. }) => EventSeverity::Info,
            CoreEvent::Sync(SyncEvent::Completed { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Schedule Events
// ============================================================================

/// Events raised while talking to the schedule server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum ScheduleEvent {
    /// A schedule document was fetched and parsed.
    Fetched {
        monitor_id: String,
        screen_name: String,
        /// Number of window/media links in the document.
        links: u32,
    },
    /// The schedule could not be fetched or parsed.
    FetchFailed { monitor_id: String, message: String },
    /// The server acknowledged a heartbeat.
    HeartbeatSent { monitor_id: String },
}

impl ScheduleEvent {
    fn description(&self) -> &str {
        match self {
            ScheduleEvent::Fetched { .. } => "Schedule fetched",
            ScheduleEvent::FetchFailed { .. } => "Schedule fetch failed",
            ScheduleEvent::HeartbeatSent { .. } => "Heartbeat acknowledged",
        }
    }
}

// ============================================================================
// Sync Events
// ============================================================================

/// Events raised by a media synchronization run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SyncEvent {
    /// The required asset set is known and the run is about to iterate it.
    Started { total_assets: u32 },
    /// The asset is already in the local store.
    AssetSkipped { path: String },
    /// The asset was retrieved and stored.
    AssetDownloaded { path: String, bytes: u64 },
    /// Retrieving or storing the asset failed; the run continues.
    AssetFailed { path: String, reason: String },
    /// The run visited every asset.
    Completed {
        downloaded: u32,
        skipped: u32,
        failed: u32,
        duration_ms: u64,
    },
    /// The run aborted before iterating assets.
    Failed { message: String },
}

impl SyncEvent {
    fn description(&self) -> &str {
        match self {
            SyncEvent::Started { .. } => "Media sync started",
            SyncEvent::AssetSkipped { .. } => "Asset already cached",
            SyncEvent::AssetDownloaded { .. } => "Asset downloaded",
            SyncEvent::AssetFailed { .. } => "Asset download failed",
            SyncEvent::Completed { .. } => "Media sync completed",
            SyncEvent::Failed { .. } => "Media sync failed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central broadcast channel. Cloning shares the underlying channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a bus that buffers up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if nobody is listening.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates an independent receiver for all future events.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A `broadcast::Receiver` with an optional predicate.
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned from `recv`/`try_recv`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// `RecvError::Lagged(n)` if this subscriber fell behind by `n` events,
    /// `RecvError::Closed` once every sender is gone.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Non-blocking receive. `None` when nothing is queued.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(failed: u32) -> CoreEvent {
        CoreEvent::Sync(SyncEvent::Completed {
            downloaded: 4,
            skipped: 2,
            failed,
            duration_ms: 1200,
        })
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_is_error() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
        assert!(bus.emit(completed(0)).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = CoreEvent::Sync(SyncEvent::Started { total_assets: 5 });
        assert_eq!(bus.emit(event.clone()).unwrap(), 2);

        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| matches!(event, CoreEvent::Schedule(_)));

        bus.emit(completed(0)).ok();
        let fetched = CoreEvent::Schedule(ScheduleEvent::Fetched {
            monitor_id: "42".to_string(),
            screen_name: "Lobby".to_string(),
            links: 3,
        });
        bus.emit(fetched.clone()).ok();

        assert_eq!(stream.recv().await.unwrap(), fetched);
        assert!(stream.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for i in 0..5 {
            bus.emit(CoreEvent::Sync(SyncEvent::AssetSkipped {
                path: format!("asset-{}.jpg", i),
            }))
            .ok();
        }

        assert!(matches!(sub.recv().await, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_severity() {
        assert_eq!(completed(0).severity(), EventSeverity::Info);
        assert_eq!(completed(1).severity(), EventSeverity::Warning);
        assert_eq!(
            CoreEvent::Sync(SyncEvent::Failed {
                message: "boom".to_string()
            })
            .severity(),
            EventSeverity::Error
        );
        assert_eq!(
            CoreEvent::Sync(SyncEvent::AssetSkipped {
                path: "a.jpg".to_string()
            })
            .severity(),
            EventSeverity::Debug
        );
    }

    #[test]
    fn test_event_serialization() {
        let event = CoreEvent::Sync(SyncEvent::AssetFailed {
            path: "upload/clip.mp4".to_string(),
            reason: "550 No such file".to_string(),
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"Sync\""));
        assert!(json.contains("AssetFailed"));

        let back: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.description(), "Asset download failed");
    }
}
