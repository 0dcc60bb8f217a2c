use super::{AppResult, ClientCommand, ListFormat, choose_id, spinner};
use crate::api::Transport;
use crate::config::ConfigStore;
use crate::output::{self, text};
use crate::session::SessionContext;
use owo_colors::OwoColorize;
use serde_json::Value;

/// Prints rows as a two column table or as the raw JSON array.
pub fn print_rows(rows: &[Value], columns: [&str; 2], format: ListFormat) -> AppResult<()> {
    match format {
        ListFormat::Table => output::print_table(
            &columns,
            rows.iter()
                .map(|row| columns.iter().map(|column| text(&row[*column])).collect())
                .collect(),
        ),
        ListFormat::Json => output::print_json(rows)?,
    }
    Ok(())
}

pub fn handle(
    store: &ConfigStore,
    transport: &dyn Transport,
    session: &SessionContext,
    action: ClientCommand,
) -> AppResult<()> {
    let api = session.client(transport);

    match action {
        ClientCommand::List { output, query_text } => {
            let clients = spinner("Fetching clients", || {
                api.clients(&session.user_id, &query_text)
            })?;
            print_rows(&clients, ["Id", "DisplayName"], output)
        }
        ClientCommand::Select => {
            let clients = spinner("Fetching clients", || api.clients(&session.user_id, ""))?;
            let Some(selected) = choose_id("Client", &clients, "DisplayName")? else {
                return Ok(());
            };
            select(store, &selected)?;
            println!("{}", format!("Client {selected} selected as default!").green());
            Ok(())
        }
    }
}

/// A new client invalidates the default project.
fn select(store: &ConfigStore, client_id: &str) -> AppResult<()> {
    let mut config = store.load()?;
    config.set("client_id", client_id);
    config.remove("project_id");
    store.save(&config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeTransport;
    use crate::session::Defaults;

    fn session() -> SessionContext {
        SessionContext {
            endpoint: "https://host".into(),
            token: "t".into(),
            user_id: "42".into(),
            date_format: "%Y-%m-%d".into(),
            abak_date_format: None,
            defaults: Defaults::default(),
        }
    }

    #[test]
    fn selecting_a_client_drops_the_default_project() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at(dir.path().join("config.json"));
        store.set_key("project_id", "P-9").unwrap();

        let transport = FakeTransport::default().reply(
            200,
            &[],
            r#"{"data":[{"Id":"C-1","DisplayName":"Acme"}]}"#,
        );
        handle(&store, &transport, &session(), ClientCommand::Select).unwrap();

        let config = store.load().unwrap();
        assert_eq!(config.get_str("client_id").as_deref(), Some("C-1"));
        assert_eq!(config.get("project_id"), None);
        assert!(
            transport.sent()[0]
                .query
                .contains(&("employeeId".into(), "42".into()))
        );
    }
}
