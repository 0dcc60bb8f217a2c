use super::error::{SessionError, SessionResult};
use crate::api::{HttpRequest, HttpResponse, Method, Transport, TransportError, page_title};
use crate::config::{ConfigStore, dateformat};
use regex::Regex;
use std::sync::LazyLock;

/// Only a successful login sets this cookie.
const SESSION_MARKER: &str = "AbakUsername";

static DATE_FORMAT_COOKIE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"AbakDateFormat=([^;]*);").expect("Could not parse Regex"));
static LOCALE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^}]*)\}").expect("Could not parse Regex"));

/// Pulls the locale date format out of the session cookie: first the
/// `AbakDateFormat=...;` attribute, then the `{...}` token inside it.
pub fn date_format_token(cookie: &str) -> Option<String> {
    let attribute = DATE_FORMAT_COOKIE.captures(cookie)?;
    let token = LOCALE_TOKEN.captures(&attribute[1])?;
    Some(token[1].to_string())
}

fn rejection_message(response: &HttpResponse) -> String {
    serde_json::from_str::<serde_json::Value>(&response.body)
        .ok()
        .and_then(|body| body["errorMessage"].as_str().map(str::to_string))
        .or_else(|| page_title(&response.body))
        .unwrap_or_else(|| format!("login rejected with HTTP {}", response.status))
}

/// Logs in and stores the session cookie along with everything needed to
/// log in again. Nothing is written when the login fails.
pub fn authenticate(
    store: &ConfigStore,
    transport: &dyn Transport,
    username: &str,
    password: &str,
    endpoint: &str,
) -> SessionResult<()> {
    let mut config = store.load()?;

    let endpoint = endpoint.trim_end_matches('/');
    let request = HttpRequest::new(Method::Post, format!("{endpoint}/Abak/Account/Authenticate"))
        .header("Content-Type", "application/x-www-form-urlencoded")
        .form(vec![
            ("username".into(), username.into()),
            ("password".into(), password.into()),
            ("device".into(), "W".into()),
        ]);

    log::debug!("Authenticating {username} against {endpoint}");
    let response = transport.send(&request).map_err(|err| match err {
        TransportError::Connectivity(msg) => SessionError::Connectivity(msg),
        TransportError::Other(msg) => SessionError::Authentication(msg),
    })?;

    if !response.is_success() {
        return Err(SessionError::Authentication(rejection_message(&response)));
    }

    let cookie = response.header("Set-Cookie").unwrap_or_default();
    if !cookie.contains(SESSION_MARKER) {
        return Err(SessionError::Authentication(rejection_message(&response)));
    }

    let token = date_format_token(&cookie);
    if token.as_deref().and_then(dateformat::pattern_for).is_none() {
        log::warn!("Unrecognised date format {token:?} announced by Abak");
    }
    let date_format = dateformat::resolve(token.as_deref(), config.get_str("date_format").as_deref());

    config.set("token", cookie);
    config.set("endpoint", endpoint);
    config.set("username", username);
    config.set("date_format", date_format);
    match token {
        Some(token) => config.set("abak_date_format", token),
        None => {
            config.remove("abak_date_format");
        }
    }
    store.save(&config)?;

    log::info!("Logged in to {endpoint} as {username}");
    Ok(())
}
