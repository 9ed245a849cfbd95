//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod category;
pub mod import;
pub mod report;
pub mod transaction;

pub use category::{handle_category_command, CategoryCommands};
pub use import::{handle_import_command, ImportArgs};
pub use report::{handle_report_command, ReportCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};

use chrono::{Local, NaiveDate};

use crate::error::PocketResult;
use crate::models::{PeriodSelector, PeriodWindow};

/// The reference date for every command: the local calendar day
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Resolve a `--period` argument against `today`
pub(crate) fn resolve_period(period: &str, today: NaiveDate) -> PocketResult<PeriodWindow> {
    Ok(PeriodSelector::parse(period)?.window(today)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_period() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let window = resolve_period("month", today).unwrap();
        assert_eq!(window.start, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(window.end, NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());

        let err = resolve_period("fortnight", today).unwrap_err();
        assert!(err.is_validation());
    }
}
