use super::{AppError, AppResult, LoginArgs, spinner};
use crate::api::Transport;
use crate::config::ConfigStore;
use crate::prompt;
use crate::secret::SecretStore;
use crate::session::{SessionError, authenticate};
use owo_colors::OwoColorize;

fn or_prompt(value: Option<String>, stored: Option<String>, message: &str) -> AppResult<String> {
    match value.or(stored) {
        Some(value) => Ok(value),
        None => Ok(prompt::text(message)?),
    }
}

fn stored_password(secrets: &dyn SecretStore, username: &str) -> Option<String> {
    secrets.get_password(username).unwrap_or_else(|err| {
        log::warn!("{err}");
        None
    })
}

pub fn handle(
    store: &ConfigStore,
    transport: &dyn Transport,
    secrets: &dyn SecretStore,
    args: LoginArgs,
) -> AppResult<()> {
    let config = store.load()?;

    let username = or_prompt(args.username, config.username(), "Username:")?;
    let endpoint = or_prompt(args.endpoint, config.endpoint(), "Endpoint:")?;
    let password = match args.password.or_else(|| stored_password(secrets, &username)) {
        Some(password) => password,
        None => prompt::password("Password:")?,
    };

    spinner("Logging in", || {
        authenticate(store, transport, &username, &password, &endpoint)
    })?;

    if let Err(err) = secrets.set_password(&username, &password) {
        log::warn!("Password was not saved, automatic login will not work: {err}");
    }

    println!("{}", "Login successful!".green());
    Ok(())
}

pub fn open(store: &ConfigStore) -> AppResult<()> {
    let endpoint = store.load()?.endpoint().ok_or(SessionError::NotLoggedIn)?;

    log::debug!("Opening {endpoint}");
    open::that(&endpoint).map_err(|source| AppError::Browser {
        url: endpoint,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeTransport;
    use crate::secret::memory::MemoryStore;

    const COOKIE: &str = "AbakUsername=alice; AbakDateFormat=Format={yyyy-MM-dd}; path=/";

    fn args(password: Option<&str>) -> LoginArgs {
        LoginArgs {
            username: Some("alice".into()),
            password: password.map(str::to_string),
            endpoint: Some("https://host".into()),
        }
    }

    #[test]
    fn login_stores_the_password_for_later() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at(dir.path().join("config.json"));
        let transport = FakeTransport::default().reply(200, &[("Set-Cookie", COOKIE)], "{}");
        let secrets = MemoryStore::default();

        handle(&store, &transport, &secrets, args(Some("secret"))).unwrap();

        assert_eq!(
            secrets.get_password("alice").unwrap().as_deref(),
            Some("secret")
        );
        assert_eq!(store.load().unwrap().token().as_deref(), Some(COOKIE));
    }

    #[test]
    fn keyring_password_is_used_when_none_is_given() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at(dir.path().join("config.json"));
        let transport = FakeTransport::default().reply(200, &[("Set-Cookie", COOKIE)], "{}");
        let secrets = MemoryStore::with("alice", "from-keyring");

        handle(&store, &transport, &secrets, args(None)).unwrap();

        assert!(matches!(
            &transport.sent()[0].body,
            crate::api::Body::Form(fields)
                if fields.contains(&("password".into(), "from-keyring".into()))
        ));
    }

    #[test]
    fn rejected_login_keeps_the_old_password() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at(dir.path().join("config.json"));
        let transport = FakeTransport::default().reply(401, &[], "");
        let secrets = MemoryStore::with("alice", "old");

        let err = handle(&store, &transport, &secrets, args(Some("new"))).unwrap_err();

        assert_eq!(err.exit_code(), 10);
        assert_eq!(secrets.get_password("alice").unwrap().as_deref(), Some("old"));
    }

    #[test]
    fn open_needs_an_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at(dir.path().join("config.json"));
        assert_eq!(open(&store).unwrap_err().exit_code(), 127);
    }
}
