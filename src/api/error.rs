use crate::datelit::DateLiteralError;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{0}")]
    Connectivity(String),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(
        "It seems that you are not connected to the internet or the endpoint is not available: {0}"
    )]
    Connectivity(String),
    #[error("Request to Abak failed: {0}")]
    Transport(String),
    #[error("{0}")]
    Remote(String),
    #[error("No {0} stored, please login first")]
    MissingSession(&'static str),
    #[error("Abak returned an unexpected response: {0}")]
    Unexpected(String),
    #[error(transparent)]
    DateLiteral(#[from] DateLiteralError),
    #[error("Failed to parse Abak response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Connectivity(msg) => ApiError::Connectivity(msg),
            TransportError::Other(msg) => ApiError::Transport(msg),
        }
    }
}
