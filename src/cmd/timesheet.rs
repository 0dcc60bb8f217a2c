use super::{
    AppError, AppResult, ApplyArgs, ApproveArgs, DocumentFormat, ListArgs, SetArgs,
    TimesheetCommand, TimesheetFormat, spinner,
};
use crate::api::{AbakClient, Transport};
use crate::buzzword;
use crate::config::{ConfigStore, Context};
use crate::output;
use crate::prompt;
use crate::session::SessionContext;
use crate::timesheet::{
    ApplyFile, ApprovalRange, Columns, EntryRequest, ListQuery, QueryRange, context_names,
    entry_rows, parse_date, previous_period, require_id, resolve_entry_date, totals,
    validate_description, validate_hours,
};
use chrono::{Local, NaiveDate};
use owo_colors::OwoColorize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn handle(
    store: &ConfigStore,
    transport: &dyn Transport,
    session: &SessionContext,
    action: TimesheetCommand,
) -> AppResult<()> {
    let api = session.client(transport);

    match action {
        TimesheetCommand::List(args) => list(store, &api, session, args),
        TimesheetCommand::Set(args) => set(store, &api, session, args),
        TimesheetCommand::Apply(ApplyArgs { file, .. }) => match file {
            Some(file) => apply(&api, session, &file),
            None => Err(AppError::Sorry("a file ('--file', '-f') is required".into())),
        },
        TimesheetCommand::Delete { id } => {
            spinner("Deleting entry", || api.delete_entry(&id))?;
            println!("{}", format!("Timesheet entry {id} deleted successfully!").green());
            Ok(())
        }
        TimesheetCommand::Approve(args) => approve(&api, session, args),
    }
}

fn period_label(date: NaiveDate, range: QueryRange, date_format: &str) -> String {
    match range {
        QueryRange::Monthly => format!("month of {}", date.format("%B")),
        QueryRange::Daily => format!("day of {}", date.format(date_format)),
        QueryRange::Weekly => format!("week of {}", date.format(date_format)),
    }
}

fn list(
    store: &ConfigStore,
    api: &AbakClient,
    session: &SessionContext,
    args: ListArgs,
) -> AppResult<()> {
    let mut date = match args.date.as_deref() {
        Some(date) => parse_date(date, &session.date_format)?,
        None => today(),
    };
    if args.previous {
        date = previous_period(date, args.query_range);
    }

    let query = ListQuery {
        user_id: session.user_id.clone(),
        date,
        range: args.query_range,
    };
    let rows = spinner("Fetching timesheet", || {
        api.entries(&query, &session.server_date_format())
    })?;

    if args.output == TimesheetFormat::Json {
        output::print_json(&rows)?;
        return Ok(());
    }

    if args.show_totals {
        println!(
            "For the {}, here are the totals:",
            period_label(date, args.query_range, &session.date_format)
        );
        let rows = totals(&rows)
            .into_iter()
            .map(|(project, hours)| vec![project, hours.to_string()])
            .collect();
        output::print_table(&["ProjectName", "Quantity"], rows);
        return Ok(());
    }

    let contexts = store.load()?.contexts()?;
    let names = if contexts.is_empty() {
        HashMap::new()
    } else {
        let projects = spinner("Fetching projects", || {
            api.projects(&session.user_id, None, "")
        })?;
        context_names(&projects, &contexts)
    };

    let columns = Columns {
        weekday: true,
        id: args.show_id || args.output == TimesheetFormat::Wide,
    };
    output::print_table(
        &columns.headers(),
        entry_rows(&rows, columns, &names, &session.date_format),
    );
    Ok(())
}

/// Client and project for a new entry. Flags win over the context, which
/// wins over the selected defaults.
fn entry_target(
    session: &SessionContext,
    contexts: &BTreeMap<String, Context>,
    args: &SetArgs,
) -> AppResult<(String, String)> {
    let context = match (&args.context, &session.defaults.current_context) {
        (Some(name), _) => Some(
            contexts
                .get(name)
                .ok_or_else(|| AppError::Sorry(format!("context {name} does not exist")))?,
        ),
        (None, Some(name)) => {
            let context = contexts.get(name);
            if context.is_none() {
                log::warn!("Selected context '{name}' does not exist, ignoring it");
            }
            context
        }
        (None, None) => None,
    };

    let client_id = args
        .client_id
        .clone()
        .or_else(|| context.map(|ctx| ctx.client_id.clone()))
        .or_else(|| session.defaults.client_id.clone());
    let project_id = args
        .project_id
        .clone()
        .or_else(|| context.map(|ctx| ctx.project_id.clone()))
        .or_else(|| session.defaults.project_id.clone());

    Ok((
        require_id("client id", client_id.as_deref())?,
        require_id("project id", project_id.as_deref())?,
    ))
}

fn set(
    store: &ConfigStore,
    api: &AbakClient,
    session: &SessionContext,
    args: SetArgs,
) -> AppResult<()> {
    let contexts = store.load()?.contexts()?;
    let (client_id, project_id) = entry_target(session, &contexts, &args)?;
    let date = resolve_entry_date(
        args.date.as_deref(),
        args.yesterday,
        today(),
        &session.date_format,
    )?;
    let hours = validate_hours(args.hours)?;

    let description = if args.bs {
        let phrase = buzzword::generate(&mut rand::rng());
        if !prompt::confirm(&format!(
            "Are you sure you would like to add '{phrase}' to your timesheet?"
        ))? {
            return Err(AppError::Aborted);
        }
        phrase
    } else {
        validate_description(args.description.as_deref())?
    };

    let entry = EntryRequest {
        user_id: session.user_id.clone(),
        client_id,
        project_id,
        date,
        description,
        hours,
    };
    let id = spinner("Creating entry", || {
        api.create_entry(&entry, &session.server_date_format())
    })?;
    println!("{}", format!("Timesheet entry {id} created successfully!").green());
    Ok(())
}

fn apply(api: &AbakClient, session: &SessionContext, file: &Path) -> AppResult<()> {
    let planned = ApplyFile::load(file)?.plan(today(), &session.date_format)?;
    log::info!("Applying {} entries from {}", planned.len(), file.display());

    let server_format = session.server_date_format();
    for entry in planned {
        let request = EntryRequest {
            user_id: session.user_id.clone(),
            client_id: entry.client_id,
            project_id: entry.project_id,
            date: entry.date,
            description: entry.description,
            hours: entry.hours,
        };
        let id = spinner("Creating entry", || {
            api.create_entry(&request, &server_format)
        })?;
        println!("{}", format!("Timesheet entry {id} created successfully!").green());
    }
    Ok(())
}

/// Prints a sample apply file. Needs no session.
pub fn example(store: &ConfigStore, format: DocumentFormat) -> AppResult<()> {
    let sample = ApplyFile::example(today(), &store.load()?.date_format());
    match format {
        DocumentFormat::Json => output::print_json(&sample)?,
        DocumentFormat::Yaml => output::print_yaml(&sample)?,
    }
    Ok(())
}

fn approve(api: &AbakClient, session: &SessionContext, args: ApproveArgs) -> AppResult<()> {
    let range = ApprovalRange {
        user_id: session.user_id.clone(),
        start: parse_date(&args.start_date, &session.date_format)?,
        end: parse_date(&args.end_date, &session.date_format)?,
    };
    let server_format = session.server_date_format();

    let rows = spinner("Fetching approvals", || api.approvals(&range, &server_format))?;
    let verb = if args.remove { "Unapproved" } else { "approved" };
    println!("Here are the timesheet entries to be {verb}:");
    let columns = Columns::default();
    output::print_table(
        &columns.headers(),
        entry_rows(&rows, columns, &HashMap::new(), &session.date_format),
    );

    if !args.yes {
        let question = if args.remove {
            format!(
                "Are you sure that you want to remove the approval for these timesheets from {} to {}?",
                args.start_date, args.end_date
            )
        } else {
            format!(
                "Are you sure that you want to approve these timesheets from {} to {}?",
                args.start_date, args.end_date
            )
        };
        if !prompt::confirm(&question)? {
            return Err(AppError::Aborted);
        }
    }

    if args.remove {
        spinner("Removing approval", || api.unapprove(&range, &server_format))?;
        println!("{}", "Timesheets unapproved successfully!".green());
    } else {
        spinner("Approving", || api.approve(&range, &server_format))?;
        println!("{}", "Timesheets approved successfully!".green());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeTransport;
    use crate::api::Body;
    use crate::session::Defaults;

    fn session(defaults: Defaults) -> SessionContext {
        SessionContext {
            endpoint: "https://host".into(),
            token: "t".into(),
            user_id: "42".into(),
            date_format: "%Y-%m-%d".into(),
            abak_date_format: Some("dd/MM/yyyy".into()),
            defaults,
        }
    }

    fn set_args() -> SetArgs {
        SetArgs {
            date: Some("2024-03-05".into()),
            yesterday: false,
            description: Some("Code review".into()),
            context: None,
            hours: 8.0,
            client_id: None,
            project_id: None,
            bs: false,
        }
    }

    fn contexts() -> BTreeMap<String, Context> {
        let mut contexts = BTreeMap::new();
        contexts.insert(
            "moon".to_string(),
            Context {
                project_id: "P-ctx".into(),
                client_id: "C-ctx".into(),
                price: 0.0,
            },
        );
        contexts
    }

    fn field<'a>(body: &'a Body, key: &str) -> &'a str {
        let Body::Form(fields) = body else {
            panic!("expected a form body");
        };
        fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
            .unwrap()
    }

    #[test]
    fn flags_beat_context_and_context_beats_defaults() {
        let session = session(Defaults {
            client_id: Some("C-def".into()),
            project_id: Some("P-def".into()),
            current_context: Some("moon".into()),
        });

        let (client, project) = entry_target(&session, &contexts(), &set_args()).unwrap();
        assert_eq!((client.as_str(), project.as_str()), ("C-ctx", "P-ctx"));

        let args = SetArgs {
            client_id: Some("C-flag".into()),
            ..set_args()
        };
        let (client, project) = entry_target(&session, &contexts(), &args).unwrap();
        assert_eq!((client.as_str(), project.as_str()), ("C-flag", "P-ctx"));
    }

    #[test]
    fn defaults_apply_without_a_context() {
        let session = session(Defaults {
            client_id: Some("C-def".into()),
            project_id: Some("P-def".into()),
            current_context: None,
        });
        let (client, project) = entry_target(&session, &contexts(), &set_args()).unwrap();
        assert_eq!((client.as_str(), project.as_str()), ("C-def", "P-def"));
    }

    #[test]
    fn unknown_named_context_is_an_error() {
        let args = SetArgs {
            context: Some("mars".into()),
            ..set_args()
        };
        assert!(entry_target(&session(Defaults::default()), &contexts(), &args).is_err());
    }

    #[test]
    fn missing_ids_are_reported_before_any_request() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at(dir.path().join("config.json"));
        let transport = FakeTransport::default();
        let session = session(Defaults::default());

        let err = set(&store, &session.client(&transport), &session, set_args()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn set_posts_the_date_in_the_server_format() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at(dir.path().join("config.json"));
        let transport = FakeTransport::default().reply(
            200,
            &[],
            r#"{"success":true,"extraParams":{"newID":"T-1"}}"#,
        );
        let session = session(Defaults::default());
        let args = SetArgs {
            client_id: Some("C-1".into()),
            project_id: Some("P-1".into()),
            hours: 7.5,
            ..set_args()
        };

        set(&store, &session.client(&transport), &session, args).unwrap();

        let sent = transport.sent();
        assert_eq!(sent[0].url, "https://host/Abak/Timesheet/Edit");
        assert_eq!(field(&sent[0].body, "fieldDate"), "05/03/2024");
        assert_eq!(field(&sent[0].body, "fieldQuantity"), "7.5 hrs");
        assert_eq!(field(&sent[0].body, "fieldClientId_Value"), "C-1");
    }

    #[test]
    fn apply_sends_nothing_when_one_entry_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("entries.yaml");
        std::fs::write(
            &file,
            "clients:\n  - clientId: C-1\n    projects:\n      - projectId: P-1\n        entries:\n          - date: 2024-03-04\n            hours: 8\n            description: Fine\n          - date: 2024-03-05\n            hours: 8\n",
        )
        .unwrap();
        let transport = FakeTransport::default();
        let session = session(Defaults::default());

        let err = apply(&session.client(&transport), &session, &file).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn period_labels_name_the_range() {
        let date = NaiveDate::from_ymd_opt(2024, 4, 3).unwrap();
        assert_eq!(period_label(date, QueryRange::Monthly, "%Y-%m-%d"), "month of April");
        assert_eq!(
            period_label(date, QueryRange::Weekly, "%d/%m/%Y"),
            "week of 03/04/2024"
        );
    }
}
