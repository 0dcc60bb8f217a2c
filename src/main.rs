mod api;
mod buzzword;
mod cmd;
mod config;
mod datelit;
mod output;
mod prompt;
mod secret;
mod session;
mod timesheet;

use clap::Parser;
use cmd::Cli;

fn main() {
    let cli = Cli::parse();

    if let Err(err) = stderrlog::new()
        .module(module_path!())
        .quiet(cli.quiet)
        .verbosity(cli.verbose as usize + 2)
        .init()
    {
        eprintln!("Could not set up logging: {err}");
    }

    if let Err(err) = cmd::run(cli) {
        log::error!("{err}");
        std::process::exit(err.exit_code());
    }
}
