use thiserror::Error;

/// Error returned by a [`super::ClusterClient`] implementation.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("api error {code} ({reason}): {message}")]
    Api {
        code: u16,
        reason: String,
        message: String,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ClusterError {
    /// Returns `true` for an API "not found" response.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClusterError::Api { code: 404, .. })
    }
}
