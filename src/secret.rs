//! Password storage. Passwords never go into the configuration file.

use thiserror::Error;

pub const SERVICE: &str = "abakctl";

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Could not access the system keyring: {0}")]
    Keyring(#[from] keyring::Error),
}

pub type SecretResult<T> = Result<T, SecretError>;

pub trait SecretStore {
    fn get_password(&self, account: &str) -> SecretResult<Option<String>>;
    fn set_password(&self, account: &str, password: &str) -> SecretResult<()>;
}

/// The platform keyring, under a fixed service name.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE.to_string(),
        }
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for KeyringStore {
    fn get_password(&self, account: &str) -> SecretResult<Option<String>> {
        let entry = keyring::Entry::new(&self.service, account)?;
        match entry.get_password() {
            Ok(password) => Ok(Some(password)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set_password(&self, account: &str, password: &str) -> SecretResult<()> {
        keyring::Entry::new(&self.service, account)?.set_password(password)?;
        Ok(())
    }
}
