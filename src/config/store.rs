use super::error::{ConfigError, ConfigResult};
use super::{Configuration, TOKEN_MASK};
use directories::ProjectDirs;
use serde_json::{Map, Value};
use std::io::Write;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

const CONFIG_FILE: &str = "config.json";

/// Owns the configuration file. Every operation reads the file afresh; there
/// is no locking, so concurrent invocations race and the last write wins.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new() -> ConfigResult<Self> {
        ProjectDirs::from("com", "abakctl", "abakctl")
            .map(|dirs| Self::at(dirs.config_dir().join(CONFIG_FILE)))
            .ok_or(ConfigError::MissingConfigDir)
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn app_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    fn io_error(&self, source: std::io::Error) -> ConfigError {
        ConfigError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Reads the whole document, creating an empty one first if the file
    /// does not exist yet. An existing file is never rewritten.
    pub fn load(&self) -> ConfigResult<Configuration> {
        if !self.path.exists() {
            log::debug!("Creating empty configuration at {:?}", self.path);
            self.save(&Configuration::default())?;
        }

        log::trace!("Reading configuration at {:?}", self.path);
        let contents = fs::read_to_string(&self.path).map_err(|err| self.io_error(err))?;

        if contents.trim().is_empty() {
            return Ok(Configuration::default());
        }

        let value: Value =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Malformed {
                path: self.path.clone(),
                source,
            })?;

        match value {
            Value::Object(map) => Ok(Configuration::from_map(map)),
            _ => Err(ConfigError::NotAnObject {
                path: self.path.clone(),
            }),
        }
    }

    /// Replaces the file with `config`, minus the derived keys. The document
    /// goes to a temporary file in the same directory which is then renamed
    /// over the old one.
    pub fn save(&self, config: &Configuration) -> ConfigResult<()> {
        let mut config = config.clone();
        if config.strip_derived() {
            log::trace!("Dropped derived keys before writing configuration");
        }

        let payload = serde_json::to_string(config.as_map())?;
        let dir = self.app_dir();
        fs::create_dir_all(dir).map_err(|err| self.io_error(err))?;

        let mut file = NamedTempFile::new_in(dir).map_err(|err| self.io_error(err))?;
        file.write_all(payload.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|err| self.io_error(err))?;
        file.persist(&self.path)
            .map_err(|err| self.io_error(err.error))?;

        Ok(())
    }

    pub fn set_key(&self, key: &str, value: impl Into<Value>) -> ConfigResult<()> {
        let mut config = self.load()?;
        config.set(key, value);
        self.save(&config)
    }

    /// Removes `key`. Leaves the file alone when the key is absent.
    pub fn remove_key(&self, key: &str) -> ConfigResult<()> {
        let mut config = self.load()?;
        if config.remove(key).is_none() {
            log::debug!("Key '{key}' not present in configuration");
            return Ok(());
        }
        self.save(&config)
    }

    /// The configuration as shown to the user: derived keys filled in, the
    /// session token masked and request headers left out.
    pub fn redacted_view(&self) -> ConfigResult<Map<String, Value>> {
        let mut view = self.load()?.into_map();

        if view.contains_key("token") {
            view.insert("token".into(), Value::String(TOKEN_MASK.into()));
        }
        view.remove("headers");
        view.insert("authenticated".into(), Value::Bool(true));
        view.insert(
            "app_dir".into(),
            Value::String(self.app_dir().display().to_string()),
        );
        view.insert(
            "config_file_path".into(),
            Value::String(self.path.display().to_string()),
        );

        Ok(view)
    }
}
