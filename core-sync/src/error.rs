use bridge_traits::BridgeError;
use core_schedule::ScheduleError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// Fetching or parsing the schedule failed; the run did not start.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("File store not connected: {0}")]
    NotConnected(String),

    /// The file store refused a retrieval or the transfer broke off.
    #[error("File store error: {0}")]
    Remote(String),

    #[error("Local store I/O error: {0}")]
    Io(String),

    #[error("Invalid asset name: {0:?}")]
    InvalidAssetName(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;

impl From<BridgeError> for SyncError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::NotConnected(message) => SyncError::NotConnected(message),
            BridgeError::Io(e) => SyncError::Io(e.to_string()),
            other => SyncError::Remote(other.to_string()),
        }
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Io(err.to_string())
    }
}
