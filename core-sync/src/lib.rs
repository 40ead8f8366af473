//! # Media Sync
//!
//! Keeps the local media directory in line with the remote schedule.
//!
//! ## Components
//!
//! - **Media Store** (`store`): local directory of retrieved assets with
//!   write-then-rename semantics
//! - **Sync Report** (`report`): counts and per-asset failures of one run
//! - **Media Sync Coordinator** (`coordinator`): fetch, resolve, and retrieve
//!   what is missing, tolerating per-asset failures
//!
//! Re-running a sync over an unchanged schedule downloads nothing: every
//! asset already in the store is skipped by base name.

pub mod coordinator;
pub mod error;
pub mod report;
pub mod store;

pub use coordinator::MediaSyncCoordinator;
pub use error::{Result, SyncError};
pub use report::{AssetFailure, SyncReport};
pub use store::{MediaStore, StoredAsset};
