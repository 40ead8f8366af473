//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the player core and platform-specific
//! implementations. Each trait represents a capability that the core requires but
//! that is provided differently per host (desktop service, Android player).
//!
//! ## Traits
//!
//! ### Networking & I/O
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations for the schedule endpoint
//! - [`FileStoreClient`](file_store::FileStoreClient) - Sessions with the remote media repository
//! - [`FileSystemAccess`](storage::FileSystemAccess) - Local file I/O backing the media cache
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Platform
//! implementations should:
//!
//! - Report unreachable endpoints as `Transport`
//! - Report failed file store logins as `NotConnected`
//! - Report refusals from the remote side as `Remote`
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds so implementations can be
//! shared across async tasks behind an `Arc`.

pub mod error;
pub mod file_store;
pub mod http;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use file_store::{
    resolve_media_path, FileStoreClient, FileStoreConnector, FileStoreSettings, UPLOAD_DIRECTORY,
};
pub use http::{HttpClient, HttpRequest, HttpResponse};
pub use storage::FileSystemAccess;
pub use time::{Clock, ConsoleLogger, FixedClock, LogEntry, LogLevel, LoggerSink, SystemClock};
