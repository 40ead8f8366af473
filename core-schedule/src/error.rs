use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScheduleError {
    /// The schedule server could not be reached or timed out.
    #[error("Schedule transport error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("Schedule server returned HTTP {status}")]
    Remote { status: u16 },

    /// The body is not a schedule document.
    #[error("Schedule parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;

impl From<bridge_traits::BridgeError> for ScheduleError {
    fn from(err: bridge_traits::BridgeError) -> Self {
        use bridge_traits::BridgeError;
        match err {
            BridgeError::Remote {
                status: Some(status),
                ..
            } => ScheduleError::Remote { status },
            other => ScheduleError::Transport(other.to_string()),
        }
    }
}
