use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid job spec: {0}")]
    Invalid(String),

    #[error("failed to decode job spec: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type ModelResult<T> = Result<T, ModelError>;
