//! The sync command

use std::io::{self, Write};

use colored::Colorize;

use seed_core::{Driver, Manifest, Settings, SyncEngine, SyncOptions};
use seed_fs::NormalizedPath;

use crate::cli::Cli;
use crate::error::Result;
use crate::output;

/// Resolve configuration, sync every manifest entry and print the report.
pub fn run_sync(cli: &Cli) -> Result<()> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(&NormalizedPath::new(path))?,
        None => Settings::default(),
    };
    settings.merge(cli.settings());
    tracing::debug!(?settings, "Resolved settings");

    let config = settings.resolve()?;
    let manifest = Manifest::load(&config.manifest)?;

    if !cli.json {
        let action = if cli.dry_run { "Planning" } else { "Syncing" };
        println!(
            "{} {} {} artifact(s) from {} into {}",
            "=>".blue().bold(),
            action,
            manifest.len(),
            config.remote.repository.cyan(),
            config.data_folder.to_string().cyan()
        );
    }

    let engine = SyncEngine::from_config(&config).with_options(SyncOptions {
        dry_run: cli.dry_run,
    });
    let report = Driver::new(engine).run(&manifest)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        output::write_json(&mut out, &report)?;
    } else {
        output::write_summary(&mut out, &report)?;
    }
    out.flush()?;
    Ok(())
}
