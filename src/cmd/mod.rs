pub mod client;
pub mod config;
pub mod context;
mod error;
pub mod login;
pub mod project;
pub mod timesheet;

pub use error::*;

use crate::api::{Transport, UreqTransport};
use crate::config::ConfigStore;
use crate::output::text;
use crate::prompt;
use crate::secret::{KeyringStore, SecretStore};
use crate::session::{SessionContext, SessionOutcome, ensure_session};
use crate::timesheet::QueryRange;
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::ProgressBar;
use owo_colors::OwoColorize;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "abakctl",
    version,
    about = "Abak from the command line",
    long_about = "Log timesheet entries, browse clients and projects and approve timesheets in Abak without touching its web UI."
)]
pub struct Cli {
    /// increase the verbosity
    ///
    /// Can be used multiple times to show more of what abakctl is doing.
    #[arg(global = true, short, long, action = clap::ArgAction::Count, help_heading = "Logging")]
    pub verbose: u8,

    /// output no logging
    #[arg(global = true, long, action = clap::ArgAction::SetTrue, help_heading = "Logging")]
    pub quiet: bool,

    /// use this configuration file instead of the per-user one
    #[arg(global = true, long, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in to Abak and remember the session
    Login(LoginArgs),
    /// Open Abak in the browser
    Open,
    /// Inspect and edit the stored configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Named client/project bindings used as defaults
    #[command(subcommand)]
    Context(ContextCommand),
    /// Find clients to assign timesheet entries to
    #[command(subcommand)]
    Client(ClientCommand),
    /// Find projects to assign timesheet entries to
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Manage timesheet entries
    #[command(subcommand, alias = "ts")]
    Timesheet(TimesheetCommand),
}

#[derive(Args)]
pub struct LoginArgs {
    /// the username to use for login
    #[arg(short, long)]
    pub username: Option<String>,
    /// the password to use for login, read from the keyring when omitted
    #[arg(short, long)]
    pub password: Option<String>,
    /// the endpoint where Abak is hosted
    #[arg(short, long)]
    pub endpoint: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DocumentFormat {
    Json,
    #[value(alias = "yml")]
    Yaml,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ContextFormat {
    Table,
    Json,
    #[value(alias = "yml")]
    Yaml,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    Table,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TimesheetFormat {
    Table,
    Wide,
    Json,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the configuration, or a single key of it
    Show {
        key: Option<String>,
        #[arg(short, long, value_enum, default_value = "json")]
        output: DocumentFormat,
    },
    /// Set a key to be used by all commands
    Set { key: String, value: String },
    /// Remove a key
    Remove { key: String },
}

#[derive(Subcommand)]
pub enum ContextCommand {
    /// List the available contexts
    List {
        #[arg(short, long, value_enum, default_value = "table")]
        output: ContextFormat,
    },
    /// Show the current or the named context
    Show {
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Create or overwrite a context
    Set {
        #[arg(short, long)]
        name: String,
        #[arg(short = 'c', long)]
        client_id: String,
        #[arg(short = 'p', long)]
        project_id: String,
        /// hourly price
        #[arg(long)]
        price: Option<String>,
    },
    /// Select the context to use by default
    Select {
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Remove a context
    Remove {
        #[arg(short, long)]
        name: String,
    },
    /// Show the name of the selected context
    Current,
}

#[derive(Subcommand)]
pub enum ClientCommand {
    /// List the clients available
    List {
        #[arg(short, long, value_enum, default_value = "table")]
        output: ListFormat,
        /// text to search for in the client name
        #[arg(short, long, default_value = "")]
        query_text: String,
    },
    /// Select the default client
    Select,
}

#[derive(Subcommand)]
pub enum ProjectCommand {
    /// List the projects available for a client
    List {
        #[arg(short, long, value_enum, default_value = "table")]
        output: ListFormat,
        /// client to search projects for, defaults to the selected client
        #[arg(short = 'c', long)]
        client_id: Option<String>,
        /// ignore the selected client
        #[arg(long)]
        all_projects: bool,
        /// text to search for in the project name
        #[arg(short, long, default_value = "")]
        query_text: String,
    },
    /// Select the default project
    Select {
        #[arg(short = 'c', long)]
        client_id: Option<String>,
        #[arg(long)]
        all_projects: bool,
    },
}

#[derive(Subcommand)]
pub enum TimesheetCommand {
    /// List timesheet entries
    List(ListArgs),
    /// Create a timesheet entry
    Set(SetArgs),
    /// Create every entry of a JSON or YAML file
    Apply(ApplyArgs),
    /// Delete a timesheet entry
    Delete { id: String },
    /// Approve (or unapprove) a range of timesheet entries
    Approve(ApproveArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// reference date, in the configured date_format
    #[arg(short, long)]
    pub date: Option<String>,
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: TimesheetFormat,
    #[arg(short = 'r', long, value_enum, default_value = "Weekly")]
    pub query_range: QueryRange,
    /// summarise hours per project
    #[arg(long)]
    pub show_totals: bool,
    /// show the id of each entry
    #[arg(long)]
    pub show_id: bool,
    /// show the period before the one containing the date
    #[arg(long)]
    pub previous: bool,
}

#[derive(Args)]
pub struct SetArgs {
    /// date of the entry, or a weekday of the current week; defaults to today
    #[arg(long)]
    pub date: Option<String>,
    /// use yesterday's date
    #[arg(long)]
    pub yesterday: bool,
    /// what was done, at most 100 characters
    #[arg(short, long)]
    pub description: Option<String>,
    /// context to take client and project from, defaults to the selected one
    #[arg(long)]
    pub context: Option<String>,
    #[arg(short = 'H', long, default_value_t = 8.0)]
    pub hours: f64,
    #[arg(short = 'c', long)]
    pub client_id: Option<String>,
    #[arg(short = 'p', long)]
    pub project_id: Option<String>,
    /// for when you need to dazzle
    #[arg(long)]
    pub bs: bool,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// file to read the entries from
    #[arg(short, long, required_unless_present = "example")]
    pub file: Option<PathBuf>,
    /// print an example file instead
    #[arg(long, value_enum)]
    pub example: Option<DocumentFormat>,
}

#[derive(Args)]
pub struct ApproveArgs {
    #[arg(short, long)]
    pub start_date: String,
    #[arg(short, long)]
    pub end_date: String,
    /// remove the approval instead
    #[arg(long)]
    pub remove: bool,
    /// do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// Runs `work` behind a spinner on stderr.
pub fn spinner<T>(message: &str, work: impl FnOnce() -> T) -> T {
    let bar = ProgressBar::new_spinner();
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    let result = work();
    bar.finish_and_clear();
    result
}

/// Picks one row by `Id`, asking only when there is a choice to make.
pub fn choose_id(message: &str, rows: &[Value], label: &str) -> AppResult<Option<String>> {
    match rows {
        [] => Err(AppError::Sorry("there is nothing to choose from".into())),
        [only] => Ok(Some(text(&only["Id"]))),
        _ => {
            let options = rows
                .iter()
                .map(|row| format!("{} - {}", text(&row["Id"]), text(&row[label])))
                .collect();
            Ok(prompt::pick(message, options)?
                .and_then(|choice| choice.split(" - ").next().map(str::to_string)))
        }
    }
}

fn with_session(
    store: &ConfigStore,
    transport: &dyn Transport,
    secrets: &dyn SecretStore,
    command: impl FnOnce(&SessionContext) -> AppResult<()>,
) -> AppResult<()> {
    match spinner("Checking session", || ensure_session(store, transport, secrets))? {
        SessionOutcome::Ready(session) => command(&session),
        SessionOutcome::Reauthenticated => {
            println!(
                "{}",
                "Your session had expired and was renewed, run the command again.".yellow()
            );
            Ok(())
        }
    }
}

pub fn run(cli: Cli) -> AppResult<()> {
    let store = match cli.config_file {
        Some(path) => ConfigStore::at(path),
        None => ConfigStore::new()?,
    };
    log::debug!("Using configuration at {:?}", store.path());

    let transport = UreqTransport::new();
    let secrets = KeyringStore::new();

    match cli.command {
        Command::Login(args) => login::handle(&store, &transport, &secrets, args),
        Command::Open => login::open(&store),
        Command::Config(action) => config::handle(&store, action),
        Command::Context(action) => context::handle(&store, action),
        Command::Client(action) => with_session(&store, &transport, &secrets, |session| {
            client::handle(&store, &transport, session, action)
        }),
        Command::Project(action) => with_session(&store, &transport, &secrets, |session| {
            project::handle(&store, &transport, session, action)
        }),
        Command::Timesheet(TimesheetCommand::Apply(ApplyArgs {
            example: Some(format),
            ..
        })) => timesheet::example(&store, format),
        Command::Timesheet(action) => with_session(&store, &transport, &secrets, |session| {
            timesheet::handle(&store, &transport, session, action)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_timesheet_set_flags() {
        let cli = Cli::parse_from([
            "abakctl", "timesheet", "set", "--date", "monday", "-d", "Review", "-H", "7.5", "-c",
            "C-1", "-p", "P-1",
        ]);
        let Command::Timesheet(TimesheetCommand::Set(args)) = cli.command else {
            panic!("expected timesheet set");
        };
        assert_eq!(args.hours, 7.5);
        assert_eq!(args.date.as_deref(), Some("monday"));
        assert_eq!(args.client_id.as_deref(), Some("C-1"));
    }

    #[test]
    fn list_range_uses_server_spelling() {
        let cli = Cli::parse_from(["abakctl", "ts", "list", "-r", "Monthly", "--previous"]);
        let Command::Timesheet(TimesheetCommand::List(args)) = cli.command else {
            panic!("expected timesheet list");
        };
        assert_eq!(args.query_range, QueryRange::Monthly);
        assert!(args.previous);
    }

    #[test]
    fn apply_needs_a_file_or_an_example() {
        assert!(Cli::try_parse_from(["abakctl", "timesheet", "apply"]).is_err());
        assert!(Cli::try_parse_from(["abakctl", "timesheet", "apply", "--example", "yml"]).is_ok());
    }

    #[test]
    fn single_row_is_chosen_without_asking() {
        let rows = vec![serde_json::json!({"Id": "C-1", "DisplayName": "Acme"})];
        assert_eq!(
            choose_id("Client", &rows, "DisplayName").unwrap().as_deref(),
            Some("C-1")
        );
        assert!(choose_id("Client", &[], "DisplayName").is_err());
    }
}
