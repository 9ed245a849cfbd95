//! CLI command handler for CSV import
//!
//! Stages the file, prints one line per row, then commits the chosen rows
//! unless this is a dry run.

use std::fs::File;
use std::path::PathBuf;

use clap::Args;

use super::today;
use crate::config::Settings;
use crate::display::{format_commit_result, format_import_report};
use crate::error::{PocketError, PocketResult};
use crate::services::{ImportReport, ImportService};
use crate::storage::Storage;

/// Arguments of `pocket import`
#[derive(Args)]
pub struct ImportArgs {
    /// CSV file: date,amount,category,description,account_type,payment_method
    pub file: PathBuf,

    /// Rows to commit, e.g. "1,3,5-8"; may include flagged duplicates
    #[arg(short, long, conflicts_with_all = ["all", "dry_run"])]
    pub select: Option<String>,

    /// Commit every row that passed validation, duplicates included
    #[arg(long, conflicts_with = "dry_run")]
    pub all: bool,

    /// Show the report without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Handle the import command
pub fn handle_import_command(
    storage: &Storage,
    settings: &Settings,
    args: ImportArgs,
) -> PocketResult<()> {
    let service = ImportService::new(storage, settings);
    let symbol = settings.currency_symbol.as_str();

    let source = File::open(&args.file).map_err(|e| {
        PocketError::Import(format!("Failed to open {}: {}", args.file.display(), e))
    })?;
    let mut report = service.stage(source, today())?;
    print!("{}", format_import_report(&report, symbol));

    if args.dry_run {
        service.discard(&mut report)?;
        println!("Dry run: nothing was written.");
        return Ok(());
    }

    let selected = match &args.select {
        Some(selection) => parse_row_selection(selection, report.len())?,
        None if args.all => candidate_rows(&report),
        None => report.valid_rows(),
    };
    if selected.is_empty() {
        service.discard(&mut report)?;
        println!("No rows to import.");
        return Ok(());
    }

    let result = service.commit(&selected, &mut report)?;
    println!();
    print!("{}", format_commit_result(&result));

    if let Some(failed) = result.failed {
        return Err(PocketError::Store(failed.error));
    }
    Ok(())
}

/// Every row that has a candidate transaction
fn candidate_rows(report: &ImportReport) -> Vec<usize> {
    report
        .rows()
        .iter()
        .filter(|r| r.outcome.candidate().is_some())
        .map(|r| r.row_number)
        .collect()
}

/// Parse a row list such as `1,3,5-8`; ranges stop at `max_row`
fn parse_row_selection(selection: &str, max_row: usize) -> PocketResult<Vec<usize>> {
    let invalid = |part: &str| PocketError::Import(format!("Invalid row selection: '{}'", part));

    let mut rows = Vec::new();
    for part in selection.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((first, last)) => {
                let first: usize = first.trim().parse().map_err(|_| invalid(part))?;
                let last: usize = last.trim().parse().map_err(|_| invalid(part))?;
                if first == 0 || first > last {
                    return Err(invalid(part));
                }
                rows.extend(first..=last.min(max_row));
            }
            None => {
                let row: usize = part.parse().map_err(|_| invalid(part))?;
                if row == 0 {
                    return Err(invalid(part));
                }
                rows.push(row);
            }
        }
    }

    rows.sort_unstable();
    rows.dedup();
    Ok(rows)
}
