use inquire::{Confirm, InquireError, Password, PasswordDisplayMode, Select, Text};

pub type PromptResult<T> = Result<T, InquireError>;

/// Fuzzy picker. `None` when the user backs out.
pub fn pick(message: &str, options: Vec<String>) -> PromptResult<Option<String>> {
    match Select::new(message, options).prompt() {
        Ok(choice) => Ok(Some(choice)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err),
    }
}

pub fn confirm(message: &str) -> PromptResult<bool> {
    Confirm::new(message).with_default(false).prompt()
}

pub fn text(message: &str) -> PromptResult<String> {
    Text::new(message).prompt()
}

pub fn password(message: &str) -> PromptResult<String> {
    Password::new(message)
        .with_display_mode(PasswordDisplayMode::Hidden)
        .without_confirmation()
        .prompt()
}
