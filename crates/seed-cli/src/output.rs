//! Rendering of the run report

use std::io::Write;

use colored::Colorize;

use seed_core::{RunReport, SyncOutcome, SyncResult};

use crate::error::Result;

/// Write the report as pretty JSON.
pub fn write_json(out: &mut impl Write, report: &RunReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}

/// Write a coloured human-readable summary.
pub fn write_summary(out: &mut impl Write, report: &RunReport) -> Result<()> {
    for result in &report.results {
        writeln!(out, "   {}", result_line(result))?;
    }
    if !report.results.is_empty() {
        writeln!(out)?;
    }
    writeln!(out, "{}", summary_line(report))?;
    Ok(())
}

fn result_line(result: &SyncResult) -> String {
    let path = result.entry.path.cyan();
    let collection = if result.entry.collection.is_empty() {
        String::new()
    } else {
        format!(" ({})", result.entry.collection.dimmed())
    };

    let status = match result.outcome {
        SyncOutcome::Downloaded => format!(
            "{} {}",
            "downloaded".green(),
            human_bytes(result.bytes_fetched.unwrap_or_default())
        ),
        SyncOutcome::UpToDate => "up to date".normal().to_string(),
        SyncOutcome::WouldDownload => "would download".yellow().to_string(),
    };

    let marker = match result.outcome {
        SyncOutcome::Downloaded => "+".green(),
        SyncOutcome::UpToDate => "=".normal(),
        SyncOutcome::WouldDownload => "~".yellow(),
    };

    format!("{marker} {path}{collection}: {status}")
}

fn summary_line(report: &RunReport) -> String {
    let total = report.results.len();
    let elapsed = report.elapsed().num_milliseconds().max(0) as f64 / 1000.0;

    if report.dry_run {
        format!(
            "{} {} of {} artifact(s) would be downloaded, {} up to date",
            "DRY RUN".yellow().bold(),
            report.would_download(),
            total,
            report.up_to_date()
        )
    } else {
        format!(
            "{} Synced {} artifact(s): {} downloaded ({}), {} up to date in {:.1}s",
            "OK".green().bold(),
            total,
            report.downloaded(),
            human_bytes(report.bytes_fetched()),
            report.up_to_date(),
            elapsed
        )
    }
}

fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
