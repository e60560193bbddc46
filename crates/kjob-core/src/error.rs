use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid runner configuration: {0}")]
    InvalidConfig(String),
}
