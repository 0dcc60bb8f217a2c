use super::client::print_rows;
use super::{AppResult, ProjectCommand, choose_id, spinner};
use crate::api::Transport;
use crate::config::ConfigStore;
use crate::session::SessionContext;
use owo_colors::OwoColorize;

/// The client to filter by: the flag, else the selected client, unless all
/// projects were asked for.
fn client_filter(session: &SessionContext, client_id: Option<String>, all: bool) -> Option<String> {
    if all {
        return None;
    }
    client_id.or_else(|| session.defaults.client_id.clone())
}

pub fn handle(
    store: &ConfigStore,
    transport: &dyn Transport,
    session: &SessionContext,
    action: ProjectCommand,
) -> AppResult<()> {
    let api = session.client(transport);

    match action {
        ProjectCommand::List {
            output,
            client_id,
            all_projects,
            query_text,
        } => {
            let client_id = client_filter(session, client_id, all_projects);
            let projects = spinner("Fetching projects", || {
                api.projects(&session.user_id, client_id.as_deref(), &query_text)
            })?;
            print_rows(&projects, ["Id", "Display"], output)
        }
        ProjectCommand::Select {
            client_id,
            all_projects,
        } => {
            let client_id = client_filter(session, client_id, all_projects);
            let projects = spinner("Fetching projects", || {
                api.projects(&session.user_id, client_id.as_deref(), "")
            })?;
            let Some(selected) = choose_id("Project", &projects, "Display")? else {
                return Ok(());
            };
            store.set_key("project_id", selected.as_str())?;
            println!("{}", format!("Project {selected} selected as default!").green());
            Ok(())
        }
    }
}
