//! # Core Runtime
//!
//! Shared runtime infrastructure for the signage player core:
//! - [`config`]: the [`PlayerConfig`](config::PlayerConfig) passed into every component
//! - [`logging`]: `tracing` subscriber setup and host log forwarding
//! - [`events`]: the broadcast [`EventBus`](events::EventBus) for schedule and sync progress

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{PlayerConfig, PlayerConfigBuilder, PLAYER_VERSION};
pub use error::{Error, Result};
