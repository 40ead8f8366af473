//! Remote File Store Abstraction
//!
//! The remote file repository holding the media referenced by the schedule.
//! The reference deployment serves it over FTP; the core only depends on the
//! [`FileStoreClient`] contract below.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

use crate::error::Result;

/// Directory that holds uploaded media on the remote store.
pub const UPLOAD_DIRECTORY: &str = "upload";

/// Connection settings for the remote file store.
#[derive(Clone, PartialEq, Eq)]
pub struct FileStoreSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Directory entered after login. Empty or `/` means the login directory.
    pub base_directory: String,
    pub connect_timeout: Duration,
}

impl FileStoreSettings {
    /// `host:port` as used for dialing.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The directory to change into after login, if any.
    pub fn working_directory(&self) -> Option<&str> {
        match self.base_directory.as_str() {
            "" | "/" => None,
            dir => Some(dir),
        }
    }
}

impl Default for FileStoreSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 21,
            username: String::new(),
            password: String::new(),
            base_directory: "/".to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl fmt::Debug for FileStoreSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStoreSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("base_directory", &self.base_directory)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Resolve a caller-supplied media name to its remote path.
///
/// Bare file names live in the upload directory; anything that already
/// carries a directory component is used unchanged.
pub fn resolve_media_path(name: &str) -> String {
    if name.contains('/') || name.contains('\\') {
        name.to_string()
    } else {
        format!("{}/{}", UPLOAD_DIRECTORY, name)
    }
}

/// Session with a remote file repository.
///
/// A session connects lazily: `retrieve` and `list` establish the
/// connection themselves when `connect` was never called. One session may
/// serve many sequential retrievals over a single connection.
///
/// # Errors
///
/// - [`BridgeError::NotConnected`](crate::BridgeError::NotConnected) when the
///   connection or login fails
/// - [`BridgeError::Remote`](crate::BridgeError::Remote) when the store
///   rejects the request (missing file, refused transfer)
///
/// Failures after a transfer has started surface as read errors on the
/// returned stream.
#[async_trait]
pub trait FileStoreClient: Send + Sync {
    /// Establish the connection if it is not already open.
    async fn connect(&self) -> Result<()>;

    /// Open a remote file for streaming reads.
    async fn retrieve(
        &self,
        remote_path: &str,
    ) -> Result<Box<dyn tokio::io::AsyncRead + Send + Unpin>>;

    /// List the names of the files in a remote directory.
    async fn list(&self, path: &str) -> Result<Vec<String>>;

    /// Release the connection. Closing an idle or closed session is a no-op.
    async fn close(&self) -> Result<()>;
}

/// Factory for independent file store sessions.
///
/// Each sync run and each on-demand retrieval owns its own session.
pub trait FileStoreConnector: Send + Sync {
    fn open_session(&self) -> Box<dyn FileStoreClient>;
}
