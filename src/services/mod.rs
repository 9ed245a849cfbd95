//! Service layer for pocketledger
//!
//! The reconciliation engine (validation, duplicate detection, CSV import)
//! plus the storage-bound services the CLI drives.

pub mod category;
pub mod dedup;
pub mod import;
pub mod transaction;
pub mod validator;

pub use category::{CategoryDeletion, CategoryImport, CategoryService};
pub use dedup::{DuplicateDetector, DuplicateMatches};
pub use import::{
    parse_csv, CommitResult, CsvLayout, CsvRow, CsvRows, ImportPipeline, ImportReport, ImportRow,
    ImportService, ImportStage, RowOutcome,
};
pub use transaction::TransactionService;
pub use validator::{parse_date, ValidationResult, Validator};
