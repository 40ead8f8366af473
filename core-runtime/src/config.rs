//! # Player Configuration
//!
//! [`PlayerConfig`] is the read-only configuration consumed by the core: the
//! schedule server, the monitor identity, the file store credentials and the
//! local directories. It is passed by value into the fetcher, the file store
//! and the cache store constructors; there is no global instance.
//!
//! Two ways to obtain one:
//!
//! ```ignore
//! use core_runtime::config::PlayerConfig;
//!
//! // From code, with fail-fast validation
//! let config = PlayerConfig::builder()
//!     .server_url("http://schedule.example.net")
//!     .monitor_id("567")
//!     .credentials("player", "secret")
//!     .ftp_server("files.example.net")
//!     .data_dir("/var/lib/player")
//!     .build()?;
//!
//! // From the player's `config.json`
//! let config = PlayerConfig::load(Path::new("/var/lib/player/config.json"))?;
//! ```
//!
//! The JSON layout uses the same camelCase keys as the device configuration
//! file (`serverUrl`, `idMonitor`, `userSchermo`, `ftpServer`, ...). Reading
//! the encrypted form of that file is the host's job; this module only sees
//! plaintext JSON.

use crate::error::{Error, Result};
use bridge_traits::file_store::FileStoreSettings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_FTP_PORT: u16 = 21;
pub const MEDIA_SUBDIR: &str = "media";
pub const CACHE_SUBDIR: &str = "cache";

/// Reported by the status endpoint.
pub const PLAYER_VERSION: &str = "6.0.0";

/// Player configuration.
///
/// Fields mirror the keys of the device `config.json`. Passwords never appear
/// in `Debug` output.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerConfig {
    /// Schedule server base address, e.g. `http://host:80`
    #[serde(rename = "serverUrl")]
    pub server_url: String,

    pub username: String,
    pub password: String,

    /// Monitor identity sent as `idSchermo`
    #[serde(rename = "idMonitor")]
    pub monitor_id: String,

    /// Screen-user label sent as `userschermo` when non-empty
    #[serde(rename = "userSchermo")]
    pub screen_user: String,

    #[serde(rename = "ftpServer")]
    pub ftp_server: String,
    #[serde(rename = "ftpPort")]
    pub ftp_port: u16,
    #[serde(rename = "ftpUsername")]
    pub ftp_username: String,
    #[serde(rename = "ftpPassword")]
    pub ftp_password: String,
    /// Directory on the file store that holds `upload/`
    #[serde(rename = "ftpDirectory")]
    pub ftp_directory: String,

    /// Playback tuning, carried for the host player and not read by the core.
    pub connection_mode: i32,
    pub video_quality: i32,
    #[serde(rename = "delay")]
    pub delay_ms: u64,
    #[serde(rename = "secondiCache")]
    pub cache_seconds: u32,
    #[serde(rename = "secondiTolleranza")]
    pub tolerance_seconds: u32,

    pub data_dir: PathBuf,
    /// Synchronized media. Defaults to `<dataDir>/media`.
    pub media_dir: PathBuf,
    /// Ad-hoc cache. Defaults to `<dataDir>/cache`.
    pub cache_dir: PathBuf,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            username: String::new(),
            password: String::new(),
            monitor_id: String::new(),
            screen_user: String::new(),
            ftp_server: String::new(),
            ftp_port: DEFAULT_FTP_PORT,
            ftp_username: String::new(),
            ftp_password: String::new(),
            ftp_directory: "/".to_string(),
            connection_mode: 3,
            video_quality: 34,
            delay_ms: 20_000,
            cache_seconds: 5,
            tolerance_seconds: 12,
            data_dir: PathBuf::new(),
            media_dir: PathBuf::new(),
            cache_dir: PathBuf::new(),
        }
    }
}

impl fmt::Debug for PlayerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerConfig")
            .field("server_url", &self.server_url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("monitor_id", &self.monitor_id)
            .field("screen_user", &self.screen_user)
            .field("ftp_server", &self.ftp_server)
            .field("ftp_port", &self.ftp_port)
            .field("ftp_username", &self.ftp_username)
            .field("ftp_password", &"***")
            .field("ftp_directory", &self.ftp_directory)
            .field("media_dir", &self.media_dir())
            .field("cache_dir", &self.cache_dir())
            .finish()
    }
}

impl PlayerConfig {
    pub fn builder() -> PlayerConfigBuilder {
        PlayerConfigBuilder::default()
    }

    /// Parse the plaintext JSON layout of `config.json`.
    ///
    /// Missing keys take their defaults; the result is not validated so a
    /// freshly provisioned device can still be loaded and inspected.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid player configuration: {}", e)))
    }

    /// Read and parse a plaintext configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Cannot read configuration {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&raw)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::Internal(format!("Cannot serialize configuration: {}", e)))
    }

    /// Username, password and monitor id are all set.
    pub fn is_configured(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty() && !self.monitor_id.is_empty()
    }

    /// Directory that receives synchronized media.
    pub fn media_dir(&self) -> PathBuf {
        if self.media_dir.as_os_str().is_empty() {
            self.data_dir.join(MEDIA_SUBDIR)
        } else {
            self.media_dir.clone()
        }
    }

    /// Directory backing the ad-hoc cache operations.
    pub fn cache_dir(&self) -> PathBuf {
        if self.cache_dir.as_os_str().is_empty() {
            self.data_dir.join(CACHE_SUBDIR)
        } else {
            self.cache_dir.clone()
        }
    }

    /// Settings for the remote file store session.
    pub fn file_store_settings(&self) -> FileStoreSettings {
        FileStoreSettings {
            host: self.ftp_server.clone(),
            port: self.ftp_port,
            username: self.ftp_username.clone(),
            password: self.ftp_password.clone(),
            base_directory: self.ftp_directory.clone(),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Check that everything a sync run needs is present and well formed.
    pub fn validate(&self) -> Result<()> {
        if self.server_url.is_empty() {
            return Err(Error::Config(
                "Server URL is required. Use .server_url() to set it.".to_string(),
            ));
        }
        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "Server URL must start with http:// or https://, got {}",
                self.server_url
            )));
        }
        if self.monitor_id.is_empty() {
            return Err(Error::Config(
                "Monitor id is required. Use .monitor_id() to set it.".to_string(),
            ));
        }
        if self.ftp_server.is_empty() {
            return Err(Error::CapabilityMissing {
                capability: "FileStore".to_string(),
                message: "File store host is required to synchronize media. \
                          Use .ftp_server() to set it."
                    .to_string(),
            });
        }
        if self.ftp_port == 0 {
            return Err(Error::Config("File store port must be non-zero".to_string()));
        }
        if self.data_dir.as_os_str().is_empty()
            && (self.media_dir.as_os_str().is_empty() || self.cache_dir.as_os_str().is_empty())
        {
            return Err(Error::Config(
                "Either a data directory or both media and cache directories are required"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`PlayerConfig`].
#[derive(Default)]
pub struct PlayerConfigBuilder {
    config: PlayerConfig,
}

impl PlayerConfigBuilder {
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.config.server_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn monitor_id(mut self, id: impl Into<String>) -> Self {
        self.config.monitor_id = id.into();
        self
    }

    pub fn screen_user(mut self, label: impl Into<String>) -> Self {
        self.config.screen_user = label.into();
        self
    }

    /// Player account credentials.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.username = username.into();
        self.config.password = password.into();
        self
    }

    pub fn ftp_server(mut self, host: impl Into<String>) -> Self {
        self.config.ftp_server = host.into();
        self
    }

    pub fn ftp_port(mut self, port: u16) -> Self {
        self.config.ftp_port = port;
        self
    }

    pub fn ftp_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.config.ftp_username = username.into();
        self.config.ftp_password = password.into();
        self
    }

    pub fn ftp_directory(mut self, dir: impl Into<String>) -> Self {
        self.config.ftp_directory = dir.into();
        self
    }

    /// Sets the data directory; media and cache default beneath it.
    pub fn data_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.data_dir = path.into();
        self
    }

    pub fn media_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.media_dir = path.into();
        self
    }

    pub fn cache_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.cache_dir = path.into();
        self
    }

    /// Validate and produce the configuration.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] or [`Error::CapabilityMissing`] naming the first
    /// missing or malformed setting.
    pub fn build(self) -> Result<PlayerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
