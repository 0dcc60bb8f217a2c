use crate::config::ConfigError;
use crate::secret::SecretError;
use thiserror::Error;

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(
        "It seems that you are not connected to the internet or the endpoint is not available: {0}"
    )]
    Connectivity(String),
    #[error("Authentication failed: {0}")]
    Authentication(String),
    #[error("Please login first!")]
    NotLoggedIn,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Secret(#[from] SecretError),
}
