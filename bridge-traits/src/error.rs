use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// The remote endpoint could not be reached (DNS, refused, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote endpoint answered but refused the operation.
    #[error("Remote error: {message}")]
    Remote {
        status: Option<u16>,
        message: String,
    },

    /// A file store session could not be established.
    #[error("Not connected: {0}")]
    NotConnected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            status: None,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
