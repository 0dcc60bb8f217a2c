use super::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Keys computed at load time. They are never written to disk.
pub const DERIVED_KEYS: [&str; 4] = ["authenticated", "headers", "app_dir", "config_file_path"];

pub const TOKEN_MASK: &str = "**********";

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// A named binding of client, project and hourly price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    #[serde(rename = "Project", default)]
    pub project_id: String,
    #[serde(rename = "Client", default)]
    pub client_id: String,
    #[serde(rename = "Price", default)]
    pub price: f64,
}

/// The persisted configuration document.
///
/// Values are kept as raw JSON so keys written by `config set` survive a
/// round trip even when nothing in the program knows about them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    values: Map<String, Value>,
}

impl Configuration {
    pub fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.values
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Drops every derived key. Returns true if anything was removed.
    pub fn strip_derived(&mut self) -> bool {
        let mut stripped = false;
        for key in DERIVED_KEYS {
            stripped |= self.values.remove(key).is_some();
        }
        stripped
    }

    /// Scalar values rendered as text. Null, empty strings and nested
    /// structures read as absent.
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.values.get(key)? {
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<String> {
        self.get_str("token")
    }

    pub fn endpoint(&self) -> Option<String> {
        self.get_str("endpoint")
    }

    pub fn username(&self) -> Option<String> {
        self.get_str("username")
    }

    pub fn user_id(&self) -> Option<String> {
        self.get_str("user_id")
    }

    pub fn date_format(&self) -> String {
        self.get_str("date_format")
            .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string())
    }

    pub fn abak_date_format(&self) -> Option<String> {
        self.get_str("abak_date_format")
    }

    pub fn current_context(&self) -> Option<String> {
        self.get_str("current_context")
    }

    pub fn contexts(&self) -> ConfigResult<BTreeMap<String, Context>> {
        match self.values.get("contexts") {
            None | Some(Value::Null) => Ok(BTreeMap::new()),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|err| ConfigError::MalformedContexts(err.to_string())),
        }
    }

    pub fn set_contexts(&mut self, contexts: &BTreeMap<String, Context>) -> ConfigResult<()> {
        let value = serde_json::to_value(contexts)?;
        self.values.insert("contexts".to_string(), value);
        Ok(())
    }
}
