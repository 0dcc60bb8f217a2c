use super::auth::authenticate;
use super::error::{SessionError, SessionResult};
use crate::api::{AbakClient, ApiError, Transport};
use crate::config::{ConfigStore, Configuration, dateformat};
use crate::secret::SecretStore;

/// Values commands fall back on when a flag is not given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Defaults {
    pub client_id: Option<String>,
    pub project_id: Option<String>,
    pub current_context: Option<String>,
}

impl Defaults {
    pub fn from_config(config: &Configuration) -> Self {
        Self {
            client_id: config.get_str("client_id"),
            project_id: config.get_str("project_id"),
            current_context: config.current_context(),
        }
    }
}

/// Everything an authenticated command needs.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub endpoint: String,
    pub token: String,
    pub user_id: String,
    pub date_format: String,
    pub abak_date_format: Option<String>,
    pub defaults: Defaults,
}

impl SessionContext {
    pub fn client<'a>(&self, transport: &'a dyn Transport) -> AbakClient<'a> {
        AbakClient::new(transport, &self.endpoint, &self.token)
    }

    /// Pattern for dates sent to the server. Falls back to the user's
    /// pattern when the server's locale is unknown.
    pub fn server_date_format(&self) -> String {
        self.abak_date_format
            .as_deref()
            .and_then(dateformat::pattern_for)
            .map(str::to_string)
            .unwrap_or_else(|| self.date_format.clone())
    }
}

#[derive(Debug)]
pub enum SessionOutcome {
    Ready(SessionContext),
    /// The stored session had expired and a new one was obtained. The
    /// command has to be run again.
    Reauthenticated,
}

fn probe(config: &Configuration, transport: &dyn Transport) -> Result<SessionContext, ApiError> {
    let endpoint = config.endpoint().ok_or(ApiError::MissingSession("endpoint"))?;
    let token = config.token().ok_or(ApiError::MissingSession("token"))?;

    let user_id = AbakClient::new(transport, &endpoint, &token).employee_id()?;
    let user_id = match user_id {
        serde_json::Value::String(id) => id,
        other => other.to_string(),
    };

    Ok(SessionContext {
        endpoint,
        token,
        user_id,
        date_format: config.date_format(),
        abak_date_format: config.abak_date_format(),
        defaults: Defaults::from_config(config),
    })
}

/// Checks the stored session with a cheap request and logs in again with
/// the stored credentials when it has expired.
pub fn ensure_session(
    store: &ConfigStore,
    transport: &dyn Transport,
    secrets: &dyn SecretStore,
) -> SessionResult<SessionOutcome> {
    let mut config = store.load()?;

    match probe(&config, transport) {
        Ok(session) => {
            if config.user_id().as_deref() != Some(session.user_id.as_str()) {
                config.set("user_id", session.user_id.clone());
                store.save(&config)?;
            }
            Ok(SessionOutcome::Ready(session))
        }
        Err(ApiError::Connectivity(msg)) => Err(SessionError::Connectivity(msg)),
        Err(err) => {
            log::info!("Stored session is not usable ({err}), logging in again");

            let username = config.username().ok_or(SessionError::NotLoggedIn)?;
            let endpoint = config.endpoint().ok_or(SessionError::NotLoggedIn)?;
            let password = secrets
                .get_password(&username)?
                .ok_or(SessionError::NotLoggedIn)?;

            authenticate(store, transport, &username, &password, &endpoint)?;
            Ok(SessionOutcome::Reauthenticated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TransportError;
    use crate::api::fake::FakeTransport;
    use crate::secret::memory::MemoryStore;
    use tempfile::TempDir;

    const EMPLOYEE: &str = r#"{"data":[{"Id":"E-77","Name":"Alice"}],"success":true}"#;
    const COOKIE: &str = "AbakUsername=alice; AbakDateFormat=Format={yyyy-MM-dd}; path=/";

    fn logged_in_store() -> (TempDir, ConfigStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at(dir.path().join("config.json"));
        let mut config = store.load().unwrap();
        config.set("token", "old-cookie");
        config.set("endpoint", "https://host");
        config.set("username", "alice");
        config.set("client_id", "C-1");
        store.save(&config).unwrap();
        (dir, store)
    }

    #[test]
    fn valid_session_caches_the_user_id() {
        let (_dir, store) = logged_in_store();
        let transport = FakeTransport::default().reply(200, &[], EMPLOYEE);

        let outcome = ensure_session(&store, &transport, &MemoryStore::default()).unwrap();
        let SessionOutcome::Ready(session) = outcome else {
            panic!("expected a ready session");
        };

        assert_eq!(session.user_id, "E-77");
        assert_eq!(session.defaults.client_id.as_deref(), Some("C-1"));
        assert_eq!(store.load().unwrap().user_id().as_deref(), Some("E-77"));
        assert!(
            transport.sent()[0]
                .headers
                .contains(&("Cookie".into(), "old-cookie".into()))
        );
    }

    #[test]
    fn connectivity_failure_stops_without_logging_in() {
        let (_dir, store) = logged_in_store();
        let transport =
            FakeTransport::default().fail(TransportError::Connectivity("refused".into()));

        let secrets = MemoryStore::with("alice", "secret");
        assert!(matches!(
            ensure_session(&store, &transport, &secrets),
            Err(SessionError::Connectivity(_))
        ));
        assert_eq!(transport.sent().len(), 1);
    }

    #[test]
    fn expired_session_logs_in_again_with_the_stored_password() {
        let (_dir, store) = logged_in_store();
        let transport = FakeTransport::default()
            .reply(500, &[], "<title>Session expired</title>")
            .reply(200, &[("Set-Cookie", COOKIE)], "{}");

        let secrets = MemoryStore::with("alice", "secret");
        let outcome = ensure_session(&store, &transport, &secrets).unwrap();

        assert!(matches!(outcome, SessionOutcome::Reauthenticated));
        assert_eq!(store.load().unwrap().token().as_deref(), Some(COOKIE));
        assert_eq!(transport.sent().len(), 2);
    }

    #[test]
    fn missing_password_means_not_logged_in() {
        let (_dir, store) = logged_in_store();
        let transport = FakeTransport::default().reply(401, &[], "");

        assert!(matches!(
            ensure_session(&store, &transport, &MemoryStore::default()),
            Err(SessionError::NotLoggedIn)
        ));
    }

    #[test]
    fn empty_store_means_not_logged_in() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at(dir.path().join("config.json"));
        let transport = FakeTransport::default();

        assert!(matches!(
            ensure_session(&store, &transport, &MemoryStore::default()),
            Err(SessionError::NotLoggedIn)
        ));
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn server_dates_prefer_the_announced_locale() {
        let session = SessionContext {
            endpoint: "https://host".into(),
            token: "t".into(),
            user_id: "1".into(),
            date_format: "%Y-%m-%d".into(),
            abak_date_format: Some("dd/MM/yyyy".into()),
            defaults: Defaults::default(),
        };
        assert_eq!(session.server_date_format(), "%d/%m/%Y");

        let unknown = SessionContext {
            abak_date_format: Some("???".into()),
            ..session
        };
        assert_eq!(unknown.server_date_format(), "%Y-%m-%d");
    }
}
