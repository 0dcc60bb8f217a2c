use std::path::PathBuf;
use thiserror::Error;

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Problems caught locally, before anything is sent to Abak.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("description ('--description', '-d') is a required parameter")]
    MissingDescription,
    #[error("description of the timesheet entry must not be larger than {0} characters")]
    DescriptionTooLong(usize),
    #[error("every entry needs a date")]
    MissingDate,
    #[error("date needs to be in the format {0}")]
    DateFormat(String),
    #[error("{0} is required, pass it explicitly or select a default first")]
    MissingId(&'static str),
    #[error("hours must be a positive number, got {0}")]
    InvalidHours(String),
    #[error("files of the format '.{0}' are not supported")]
    UnsupportedFormat(String),
    #[error("Could not read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not parse {path}: {message}")]
    ParseFile { path: PathBuf, message: String },
}
