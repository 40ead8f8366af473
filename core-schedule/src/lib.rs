//! # Core Schedule
//!
//! The remote schedule: what a screen shows and which media files it needs.
//!
//! - [`model`]: typed view of the XML document, wire names preserved
//! - [`parser`]: root-checked, lenient decoding
//! - [`fetcher`]: [`ScheduleFetcher`] for the schedule and heartbeat requests
//! - [`resolver`]: [`resolve_required_assets`], the deduplicated download list
//! - [`playlist`]: playable items and playback order

pub mod error;
pub mod fetcher;
pub mod lenient;
pub mod model;
pub mod parser;
pub mod playlist;
pub mod resolver;

pub use error::{Result, ScheduleError};
pub use fetcher::ScheduleFetcher;
pub use model::{
    Category, MediaItem, Schedule, Screen, TimeSlot, Uninterpreted, Window, WindowMediaLink,
};
pub use parser::parse_schedule;
pub use playlist::{PlaybackOrder, Playlist};
pub use resolver::{resolve_required_assets, RequiredAssetSet};
