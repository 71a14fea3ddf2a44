use thiserror::Error;

/// Errors raised by the decay engine
#[derive(Debug, Error)]
pub enum BeamError {
    /// Non-positive or non-finite input to a kinematics computation
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Rejected before any sampling takes place
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A chunked run was stopped by its progress callback
    #[error("run cancelled after {completed} events")]
    Cancelled { completed: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BeamError {
    pub fn parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }
}

pub type BeamResult<T> = Result<T, BeamError>;
