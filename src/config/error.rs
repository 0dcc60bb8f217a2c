use std::path::PathBuf;
use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to determine configuration directory")]
    MissingConfigDir,
    #[error("Configuration file {path} could not be accessed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Configuration file {path} is not a JSON object")]
    NotAnObject { path: PathBuf },
    #[error("Configuration file {path} is not valid JSON: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
    #[error("Context name cannot be empty")]
    EmptyContextName,
    #[error("Context '{0}' does not exist")]
    UnknownContext(String),
    #[error("Price '{0}' is not a non-negative number")]
    InvalidPrice(String),
    #[error("Stored contexts are malformed: {0}")]
    MalformedContexts(String),
}
