//! data-seed CLI
//!
//! Syncs the artifacts named by a manifest from a repository manager into a
//! local data folder.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;
use clap::error::ErrorKind;
use colored::Colorize;

use cli::Cli;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help is not a successful run
            let code = match e.kind() {
                ErrorKind::DisplayVersion => 0,
                ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 1,
                _ => 2,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: failed to initialize logging: {}", "warning".yellow().bold(), e);
    }
    tracing::debug!("Verbose mode enabled");

    if let Err(e) = commands::run_sync(&cli) {
        eprintln!("{}: {}", "error".red().bold(), e);
        if e.exit_code() == 2 {
            eprintln!("Run {} for usage.", "seed --help".cyan());
        }
        std::process::exit(e.exit_code());
    }
}
