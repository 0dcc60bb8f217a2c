use crate::api::ApiError;
use crate::config::ConfigError;
use crate::secret::SecretError;
use crate::session::SessionError;
use crate::timesheet::ValidationError;
use inquire::InquireError;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Secret(#[from] SecretError),
    #[error("Prompt failed: {0}")]
    Prompt(#[from] InquireError),
    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to write YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Could not open {url} in the browser: {source}")]
    Browser {
        url: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Sorry, {0}")]
    Sorry(String),
    #[error("Aborted")]
    Aborted,
}

impl AppError {
    /// Process exit status. Scripts rely on 127 to detect a missing login.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Session(SessionError::NotLoggedIn) => 127,
            AppError::Session(SessionError::Authentication(_)) => 10,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_single_out_login_problems() {
        assert_eq!(AppError::from(SessionError::NotLoggedIn).exit_code(), 127);
        assert_eq!(
            AppError::from(SessionError::Authentication("bad password".into())).exit_code(),
            10
        );
        assert_eq!(AppError::Aborted.exit_code(), 1);
        assert_eq!(
            AppError::from(ApiError::Remote("Period is closed".into())).exit_code(),
            1
        );
    }
}
