use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("Schedule error: {0}")]
    Schedule(#[from] core_schedule::ScheduleError),

    #[error("Sync error: {0}")]
    Sync(#[from] core_sync::SyncError),

    /// File store failures outside a sync run (connect, retrieve).
    #[error("File store error: {0}")]
    FileStore(#[from] bridge_traits::BridgeError),

    /// A proxied asset broke off after part of it was already written.
    #[error("Stream of {path} interrupted after {bytes_written} bytes: {message}")]
    StreamInterrupted {
        path: String,
        bytes_written: u64,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;
