use super::{AppError, AppResult, ConfigCommand, DocumentFormat};
use crate::config::{ConfigStore, DERIVED_KEYS};
use crate::output::{self, text};
use owo_colors::OwoColorize;

pub fn handle(store: &ConfigStore, action: ConfigCommand) -> AppResult<()> {
    match action {
        ConfigCommand::Show { key, output } => show(store, key.as_deref(), output),
        ConfigCommand::Set { key, value } => {
            if DERIVED_KEYS.contains(&key.as_str()) {
                return Err(AppError::Sorry(format!("'{key}' is computed and cannot be set")));
            }
            store.set_key(&key, value.as_str())?;
            println!("{}", format!("Set '{key}' to '{value}'.").green());
            Ok(())
        }
        ConfigCommand::Remove { key } => {
            store.remove_key(&key)?;
            println!("{}", format!("Removed '{key}'.").green());
            Ok(())
        }
    }
}

fn show(store: &ConfigStore, key: Option<&str>, format: DocumentFormat) -> AppResult<()> {
    let view = store.redacted_view()?;

    let Some(key) = key else {
        match format {
            DocumentFormat::Json => output::print_json(&view)?,
            DocumentFormat::Yaml => output::print_yaml(&view)?,
        }
        return Ok(());
    };

    match view.get(key).map(text).filter(|value| !value.is_empty()) {
        Some(value) => println!("{value}"),
        None => log::info!("'{key}' is not set"),
    }
    Ok(())
}
