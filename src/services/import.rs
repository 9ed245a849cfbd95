//! CSV import pipeline
//!
//! A batch moves through `Parsed -> Validated -> DuplicateChecked -> Staged`
//! inside [`ImportPipeline::run`], then ends as `Committed` or `Discarded`
//! on an explicit call. Bad rows are reported, never fatal; only the store
//! can fail a commit.
//!
//! Rows are numbered from 1, counting data rows only (a header is not
//! numbered).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::Read;

use chrono::NaiveDate;
use csv::StringRecord;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::audit::{AuditEntry, EntityType};
use crate::config::Settings;
use crate::error::{Field, PocketError, PocketResult, StoreError, ValidationError};
use crate::models::{
    AccountType, CategoryRegistry, Money, NewTransaction, PaymentMethod, RawTransaction,
    Transaction, TransactionId,
};
use crate::storage::{Storage, TransactionFilter, TransactionStore};

use super::dedup::DuplicateDetector;
use super::validator::{parse_date, ValidationResult, Validator};

/// Header of the id-prefixed export layout
const ID_COLUMN: &str = "transaction_id";

/// Lifecycle of an import batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStage {
    Parsed,
    Validated,
    DuplicateChecked,
    Staged,
    Committed,
    Discarded,
}

impl ImportStage {
    /// Whether `next` may follow this stage
    pub fn can_advance_to(self, next: ImportStage) -> bool {
        use ImportStage::*;
        matches!(
            (self, next),
            (Parsed, Validated)
                | (Validated, DuplicateChecked)
                | (DuplicateChecked, Staged)
                | (Staged, Committed)
                | (Staged, Discarded)
        )
    }

    pub fn is_final(self) -> bool {
        matches!(self, Self::Committed | Self::Discarded)
    }
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parsed => "parsed",
            Self::Validated => "validated",
            Self::DuplicateChecked => "duplicate-checked",
            Self::Staged => "staged",
            Self::Committed => "committed",
            Self::Discarded => "discarded",
        };
        f.write_str(name)
    }
}

/// Column layout of an import file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CsvLayout {
    /// `date,amount,category,description,account_type,payment_method`
    Standard,
    /// The same six columns after a leading `transaction_id`, which is ignored
    WithId,
}

impl CsvLayout {
    fn width(self) -> usize {
        match self {
            Self::Standard => RawTransaction::FIELD_COUNT,
            Self::WithId => RawTransaction::FIELD_COUNT + 1,
        }
    }
}

/// One record as read from the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvRow {
    Fields(Vec<String>),
    /// The reader could not decode the record (bad UTF-8, broken quoting)
    Unreadable(String),
}

/// Records of a CSV file, header removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRows {
    pub header: Option<Vec<String>>,
    pub layout: CsvLayout,
    pub rows: Vec<CsvRow>,
}

impl CsvRows {
    /// Build from already-split records, detecting header and layout
    ///
    /// The first record is a header when none of its cells reads as a date,
    /// an amount, an account type or a payment method, so a data row with a
    /// broken date is still kept as a row. The id-prefixed layout is chosen
    /// when that header starts with
    /// `transaction_id`, or, without a header, when the first record has
    /// seven fields and a date in the second one.
    pub fn from_records(records: Vec<CsvRow>) -> Self {
        let mut records = records.into_iter().peekable();

        let has_header = matches!(
            records.peek(),
            Some(CsvRow::Fields(first)) if looks_like_header(first)
        );
        let header = match records.next_if(|_| has_header) {
            Some(CsvRow::Fields(fields)) => Some(fields),
            _ => None,
        };

        let layout = match (&header, records.peek()) {
            (Some(header), _) => {
                let first = header.first().map(|h| strip_bom(h).trim().to_lowercase());
                if first.as_deref() == Some(ID_COLUMN) {
                    CsvLayout::WithId
                } else {
                    CsvLayout::Standard
                }
            }
            (None, Some(CsvRow::Fields(first)))
                if first.len() == CsvLayout::WithId.width() && starts_with_date(first, 1) =>
            {
                CsvLayout::WithId
            }
            _ => CsvLayout::Standard,
        };

        Self {
            header,
            layout,
            rows: records.collect(),
        }
    }
}

fn strip_bom(s: &str) -> &str {
    s.strip_prefix('\u{feff}').unwrap_or(s)
}

fn looks_like_header(fields: &[String]) -> bool {
    fields.iter().map(|f| strip_bom(f)).all(|cell| {
        parse_date(cell).is_none()
            && Money::parse(cell).is_err()
            && AccountType::parse(cell).is_none()
            && PaymentMethod::parse(cell).is_none()
    })
}

fn starts_with_date(fields: &[String], index: usize) -> bool {
    fields
        .get(index)
        .and_then(|f| parse_date(strip_bom(f)))
        .is_some()
}

/// Read every record of a CSV source
///
/// Undecodable records become [`CsvRow::Unreadable`]; only an I/O failure of
/// the source is an error.
pub fn parse_csv<R: Read>(source: R) -> PocketResult<CsvRows> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let mut records = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => records.push(CsvRow::Fields(record_fields(&record))),
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                return Err(PocketError::Import(format!("Failed to read CSV: {}", e)))
            }
            Err(e) => records.push(CsvRow::Unreadable(format!("Error reading CSV record: {}", e))),
        }
    }

    // A trailing blank line comes back as a single empty field
    while matches!(records.last(), Some(CsvRow::Fields(f)) if f.iter().all(|s| s.is_empty())) {
        records.pop();
    }

    Ok(CsvRows::from_records(records))
}

fn record_fields(record: &StringRecord) -> Vec<String> {
    record.iter().map(str::to_string).collect()
}

/// Per-row result of an import run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Valid(NewTransaction),
    Invalid(ValidationError),
    /// Valid, but probably repeats stored transactions or other rows of the
    /// batch; only committed when selected explicitly
    DuplicateOf {
        candidate: NewTransaction,
        existing: BTreeSet<TransactionId>,
        batch_rows: BTreeSet<usize>,
    },
}

impl RowOutcome {
    /// The transaction this row would create, if it passed validation
    pub fn candidate(&self) -> Option<&NewTransaction> {
        match self {
            Self::Valid(txn) | Self::DuplicateOf { candidate: txn, .. } => Some(txn),
            Self::Invalid(_) => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateOf { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    pub row_number: usize,
    /// Fields as read, for display
    pub fields: Vec<String>,
    pub outcome: RowOutcome,
}

/// Staged result of [`ImportPipeline::run`]
#[derive(Debug, Clone)]
pub struct ImportReport {
    stage: ImportStage,
    layout: CsvLayout,
    header_skipped: bool,
    rows: Vec<ImportRow>,
    committed: BTreeMap<usize, TransactionId>,
}

impl ImportReport {
    pub fn stage(&self) -> ImportStage {
        self.stage
    }

    pub fn layout(&self) -> CsvLayout {
        self.layout
    }

    pub fn header_skipped(&self) -> bool {
        self.header_skipped
    }

    pub fn rows(&self) -> &[ImportRow] {
        &self.rows
    }

    pub fn row(&self, row_number: usize) -> Option<&ImportRow> {
        row_number
            .checked_sub(1)
            .and_then(|index| self.rows.get(index))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn valid_count(&self) -> usize {
        self.rows.iter().filter(|r| r.outcome.is_valid()).count()
    }

    pub fn invalid_count(&self) -> usize {
        self.rows.iter().filter(|r| r.outcome.is_invalid()).count()
    }

    pub fn duplicate_count(&self) -> usize {
        self.rows.iter().filter(|r| r.outcome.is_duplicate()).count()
    }

    /// Row numbers of clean rows; the selection used when the caller picks none
    pub fn valid_rows(&self) -> Vec<usize> {
        self.rows
            .iter()
            .filter(|r| r.outcome.is_valid())
            .map(|r| r.row_number)
            .collect()
    }

    /// Rows already written by an earlier commit of this report
    pub fn committed(&self) -> &BTreeMap<usize, TransactionId> {
        &self.committed
    }

    fn enter(&mut self, next: ImportStage) -> PocketResult<()> {
        if !self.stage.can_advance_to(next) {
            return Err(PocketError::Import(format!(
                "cannot move an import batch from {} to {}",
                self.stage, next
            )));
        }
        debug!(from = %self.stage, to = %next, "import stage");
        self.stage = next;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommittedRow {
    pub row_number: usize,
    pub id: TransactionId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    pub row_number: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedRow {
    pub row_number: usize,
    pub error: StoreError,
}

/// What [`ImportPipeline::commit`] wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitResult {
    pub committed: Vec<CommittedRow>,
    /// The row the store failed on
    pub failed: Option<FailedRow>,
    /// Selected rows after the failure that were not written
    pub not_attempted: Vec<usize>,
    /// Selected rows that were never eligible (invalid, unknown, already committed)
    pub rejected: Vec<RejectedRow>,
    /// Set when the audit log could not record the rows; they are stored regardless
    pub audit_error: Option<String>,
}

impl CommitResult {
    pub fn is_complete(&self) -> bool {
        self.failed.is_none()
    }
}

/// Validates, checks and commits CSV batches
#[derive(Debug, Clone, Default)]
pub struct ImportPipeline {
    validator: Validator,
    detector: DuplicateDetector,
}

impl ImportPipeline {
    pub fn new(validator: Validator, detector: DuplicateDetector) -> Self {
        Self {
            validator,
            detector,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Validator::new(&settings.validation),
            DuplicateDetector::new(&settings.duplicates),
        )
    }

    /// Validate and duplicate-check every row, producing a staged report
    ///
    /// `existing` is the snapshot of stored transactions to compare with.
    pub fn run(
        &self,
        csv: &CsvRows,
        registry: &CategoryRegistry,
        existing: &[Transaction],
        today: NaiveDate,
    ) -> ImportReport {
        let mut report = ImportReport {
            stage: ImportStage::Parsed,
            layout: csv.layout,
            header_skipped: csv.header.is_some(),
            rows: Vec::with_capacity(csv.rows.len()),
            committed: BTreeMap::new(),
        };

        for (index, row) in csv.rows.iter().enumerate() {
            let row_number = index + 1;
            let (fields, outcome) = match row {
                CsvRow::Fields(fields) => (fields.clone(), self.validate_row(fields, csv.layout, registry, today)),
                CsvRow::Unreadable(reason) => (
                    Vec::new(),
                    RowOutcome::Invalid(ValidationError::new(Field::Row, reason.clone())),
                ),
            };
            report.rows.push(ImportRow {
                row_number,
                fields,
                outcome,
            });
        }
        self.advance(&mut report, ImportStage::Validated);

        let candidates: Vec<(usize, NewTransaction)> = report
            .rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| row.outcome.candidate().map(|c| (index, c.clone())))
            .collect();
        let batch: Vec<NewTransaction> = candidates.iter().map(|(_, c)| c.clone()).collect();

        for (position, matches) in self.detector.find_duplicates(&batch, existing) {
            let (index, candidate) = &candidates[position];
            let batch_rows = matches
                .batch
                .iter()
                .map(|peer| candidates[*peer].0 + 1)
                .collect();
            report.rows[*index].outcome = RowOutcome::DuplicateOf {
                candidate: candidate.clone(),
                existing: matches.existing,
                batch_rows,
            };
        }
        self.advance(&mut report, ImportStage::DuplicateChecked);
        self.advance(&mut report, ImportStage::Staged);

        info!(
            rows = report.len(),
            valid = report.valid_count(),
            invalid = report.invalid_count(),
            duplicates = report.duplicate_count(),
            "import batch staged"
        );
        report
    }

    fn advance(&self, report: &mut ImportReport, next: ImportStage) {
        // run() only walks the forward path from Parsed, which the guard always allows
        if let Err(e) = report.enter(next) {
            warn!(error = %e, "unexpected import stage transition");
        }
    }

    fn validate_row(
        &self,
        fields: &[String],
        layout: CsvLayout,
        registry: &CategoryRegistry,
        today: NaiveDate,
    ) -> RowOutcome {
        if fields.len() != layout.width() {
            return RowOutcome::Invalid(ValidationError::new(
                Field::Row,
                format!("expected {} fields, found {}", layout.width(), fields.len()),
            ));
        }
        let fields = match layout {
            CsvLayout::Standard => fields,
            CsvLayout::WithId => &fields[1..],
        };
        let Some(raw) = RawTransaction::from_fields(fields) else {
            return RowOutcome::Invalid(ValidationError::new(Field::Row, "unreadable row"));
        };
        match self.validator.validate(&raw, registry, today) {
            ValidationResult::Valid(txn) => RowOutcome::Valid(txn),
            ValidationResult::Invalid(e) => RowOutcome::Invalid(e),
        }
    }

    /// Write the selected rows as one batch
    ///
    /// Invalid, unknown and already-committed rows are skipped and listed in
    /// [`CommitResult::rejected`]. When every eligible row is written the
    /// report becomes `Committed`; after a store failure it stays `Staged`
    /// with the written rows remembered, so a retry does not write them twice.
    pub fn commit(
        &self,
        selected: &[usize],
        report: &mut ImportReport,
        store: &dyn TransactionStore,
    ) -> PocketResult<CommitResult> {
        if report.stage != ImportStage::Staged {
            return Err(PocketError::Import(format!(
                "cannot commit an import batch that is {}",
                report.stage
            )));
        }

        let mut result = CommitResult::default();
        let mut rows: Vec<usize> = Vec::new();
        let mut batch: Vec<NewTransaction> = Vec::new();

        let selection: BTreeSet<usize> = selected.iter().copied().collect();
        for row_number in selection {
            let reject = |reason: String| RejectedRow { row_number, reason };
            match report.row(row_number) {
                None => result.rejected.push(reject("no such row".into())),
                Some(_) if report.committed.contains_key(&row_number) => {
                    result.rejected.push(reject("already committed".into()))
                }
                Some(row) => match &row.outcome {
                    RowOutcome::Invalid(e) => result.rejected.push(reject(format!("invalid: {}", e))),
                    outcome => {
                        if let Some(candidate) = outcome.candidate() {
                            rows.push(row_number);
                            batch.push(candidate.clone());
                        }
                    }
                },
            }
        }

        let write = store.create_batch(batch);
        for (row_number, id) in rows.iter().zip(write.committed.iter()) {
            result.committed.push(CommittedRow {
                row_number: *row_number,
                id: *id,
            });
            report.committed.insert(*row_number, *id);
        }

        match write.failure {
            None => {
                report.enter(ImportStage::Committed)?;
                info!(committed = result.committed.len(), rejected = result.rejected.len(), "import batch committed");
            }
            Some((index, error)) => {
                let failed_row = rows.get(index).copied().unwrap_or_default();
                result.not_attempted = rows.iter().skip(index + 1).copied().collect();
                warn!(
                    row = failed_row,
                    committed = result.committed.len(),
                    not_attempted = result.not_attempted.len(),
                    error = %error,
                    "import commit failed"
                );
                result.failed = Some(FailedRow {
                    row_number: failed_row,
                    error,
                });
            }
        }

        Ok(result)
    }

    /// Abandon a staged batch without writing anything more
    pub fn discard(&self, report: &mut ImportReport) -> PocketResult<()> {
        report.enter(ImportStage::Discarded)?;
        info!(rows = report.len(), "import batch discarded");
        Ok(())
    }
}

/// Import files into the application's storage, with audit logging
pub struct ImportService<'a> {
    storage: &'a Storage,
    pipeline: ImportPipeline,
}

impl<'a> ImportService<'a> {
    pub fn new(storage: &'a Storage, settings: &Settings) -> Self {
        Self {
            storage,
            pipeline: ImportPipeline::from_settings(settings),
        }
    }

    /// Parse and stage a CSV source against the current categories and transactions
    pub fn stage<R: Read>(&self, source: R, today: NaiveDate) -> PocketResult<ImportReport> {
        let csv = parse_csv(source)?;
        let registry = self.storage.categories.snapshot()?;
        let existing = self.storage.transactions.list(&TransactionFilter::all())?;
        Ok(self.pipeline.run(&csv, &registry, &existing, today))
    }

    /// Commit the selected rows and record them in the audit log
    ///
    /// An audit failure does not hide what was written: it is logged and
    /// returned in [`CommitResult::audit_error`].
    pub fn commit(&self, selected: &[usize], report: &mut ImportReport) -> PocketResult<CommitResult> {
        let mut result = self
            .pipeline
            .commit(selected, report, &self.storage.transactions)?;
        if result.committed.is_empty() {
            return Ok(result);
        }

        let mut entries: Vec<AuditEntry> = result
            .committed
            .iter()
            .filter_map(|row| {
                let candidate = report.row(row.row_number)?.outcome.candidate()?;
                let stored = candidate.clone().with_id(row.id);
                Some(AuditEntry::create(EntityType::Transaction, row.id.to_string(), &stored))
            })
            .collect();
        let summary = serde_json::json!({
            "committed": result.committed,
            "rejected": result.rejected,
            "complete": result.is_complete(),
        });
        let batch_id = result
            .committed
            .first()
            .map(|row| row.id.short())
            .unwrap_or_default();
        entries.push(AuditEntry::create(EntityType::ImportBatch, batch_id, &summary));

        if let Err(e) = self.storage.audit().log_batch(&entries) {
            warn!(error = %e, committed = result.committed.len(), "import committed but audit log write failed");
            result.audit_error = Some(e.to_string());
        }

        Ok(result)
    }

    pub fn discard(&self, report: &mut ImportReport) -> PocketResult<()> {
        self.pipeline.discard(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PocketPaths;
    use crate::models::Category;
    use crate::storage::MemoryTransactionStore;
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()
    }

    fn registry() -> CategoryRegistry {
        CategoryRegistry::from_categories(vec![
            Category::new("Food", Money::from_units(400, 0)),
            Category::new("Dining", Money::from_units(150, 0)),
        ])
        .unwrap()
    }

    fn stage(csv_data: &str, existing: &[Transaction]) -> ImportReport {
        let csv = parse_csv(csv_data.as_bytes()).unwrap();
        ImportPipeline::default().run(&csv, &registry(), existing, today())
    }

    /// Store that accepts `limit` creates and then fails
    struct FlakyStore {
        inner: MemoryTransactionStore,
        limit: std::cell::Cell<usize>,
    }

    impl TransactionStore for FlakyStore {
        fn create(&self, txn: NewTransaction) -> Result<TransactionId, StoreError> {
            if self.limit.get() == 0 {
                return Err(StoreError::new("create", "disk full"));
            }
            self.limit.set(self.limit.get() - 1);
            self.inner.create(txn)
        }

        fn get(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
            self.inner.get(id)
        }

        fn list(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, StoreError> {
            self.inner.list(filter)
        }

        fn update(&self, id: TransactionId, txn: NewTransaction) -> Result<Option<Transaction>, StoreError> {
            self.inner.update(id, txn)
        }

        fn delete(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
            self.inner.delete(id)
        }
    }

    const THREE_ROWS: &str = "\
date,amount,category,description,account_type,payment_method
2025-03-01,12.50,Food,Market,checking,card
2025-03-02,$40.00,Dining,Bistro,credit,credit card
2025-03-03,7,Food,Bakery,checking,cash
";

    #[test]
    fn test_header_detection_and_row_numbers() {
        let report = stage(THREE_ROWS, &[]);
        assert!(report.header_skipped());
        assert_eq!(report.layout(), CsvLayout::Standard);
        assert_eq!(report.stage(), ImportStage::Staged);
        let numbers: Vec<_> = report.rows().iter().map(|r| r.row_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(report.valid_count(), 3);

        let headerless = stage("2025-03-01,12.50,Food,Market,checking,card\n", &[]);
        assert!(!headerless.header_skipped());
        assert_eq!(headerless.valid_count(), 1);
    }

    #[test]
    fn test_malformed_row_resilience() {
        let csv_data = "\
2025-03-01,12.50,Food,Market,checking,card
bad-date,10,Food,,cash,card
2025-03-03,7,Food,Bakery,checking,cash
";
        let mut report = stage(csv_data, &[]);
        assert_eq!(report.len(), 3);
        assert_eq!(report.invalid_count(), 1);
        assert_eq!(report.valid_count(), 2);
        match &report.row(2).unwrap().outcome {
            RowOutcome::Invalid(e) => assert_eq!(e.field, Field::Date),
            other => panic!("unexpected {:?}", other),
        }

        let store = MemoryTransactionStore::new();
        let result = ImportPipeline::default()
            .commit(&[1, 3], &mut report, &store)
            .unwrap();
        assert!(result.is_complete());
        assert_eq!(result.committed.len(), 2);
        assert_eq!(report.stage(), ImportStage::Committed);
        assert_eq!(store.list(&TransactionFilter::all()).unwrap().len(), 2);
    }

    #[test]
    fn test_headerless_file_keeps_bad_first_row() {
        let csv_data = "\
bad-date,10,Food,,cash,card
2025-03-01,12.50,Food,Market,checking,card
2025-03-03,7,Food,Bakery,checking,cash
";
        let report = stage(csv_data, &[]);
        assert!(!report.header_skipped());
        assert_eq!(report.len(), 3);
        assert_eq!(report.invalid_count(), 1);
        match &report.row(1).unwrap().outcome {
            RowOutcome::Invalid(e) => assert_eq!(e.field, Field::Date),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_wrong_field_count_is_invalid() {
        let report = stage("2025-03-01,12.50,Food\n2025-03-01,1,Food,a,checking,cash,extra\n", &[]);
        assert_eq!(report.invalid_count(), 2);
        match &report.row(1).unwrap().outcome {
            RowOutcome::Invalid(e) => {
                assert_eq!(e.field, Field::Row);
                assert!(e.reason.contains("expected 6 fields, found 3"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_id_prefixed_export_layout() {
        let csv_data = "\
transaction_id,date,amount,category,description,account_type,payment_method
17,2025-03-01,12.50,Food,Market,checking,card
";
        let report = stage(csv_data, &[]);
        assert_eq!(report.layout(), CsvLayout::WithId);
        assert_eq!(report.valid_count(), 1);

        let headerless = stage("17,2025-03-01,12.50,Food,Market,checking,card\n", &[]);
        assert_eq!(headerless.layout(), CsvLayout::WithId);
        assert_eq!(headerless.valid_count(), 1);
    }

    #[test]
    fn test_category_case_mismatch_is_invalid() {
        let report = stage("2025-03-01,12.50,food,Market,checking,card\n", &[]);
        match &report.row(1).unwrap().outcome {
            RowOutcome::Invalid(e) => assert!(e.is_category_not_found()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_in_batch_duplicates_are_flagged_both_ways() {
        let csv_data = "\
2025-03-01,12.50,Food,Market,checking,card
2025-03-02,3,Food,Coffee,checking,card
2025-03-01,12.50,Food,market,checking,card
";
        let report = stage(csv_data, &[]);
        assert_eq!(report.duplicate_count(), 2);
        match &report.row(1).unwrap().outcome {
            RowOutcome::DuplicateOf { batch_rows, existing, .. } => {
                assert_eq!(batch_rows, &BTreeSet::from([3]));
                assert!(existing.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(report.valid_rows(), vec![2]);
    }

    #[test]
    fn test_import_idempotence() {
        let store = MemoryTransactionStore::new();
        let pipeline = ImportPipeline::default();

        let mut first = stage(THREE_ROWS, &[]);
        let result = pipeline.commit(&first.valid_rows(), &mut first, &store).unwrap();
        let first_ids: Vec<_> = result.committed.iter().map(|c| c.id).collect();

        let existing = store.list(&TransactionFilter::all()).unwrap();
        let second = stage(THREE_ROWS, &existing);
        assert_eq!(second.duplicate_count(), 3);
        for (row, id) in second.rows().iter().zip(first_ids) {
            match &row.outcome {
                RowOutcome::DuplicateOf { existing, .. } => assert!(existing.contains(&id)),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_round_trip() {
        let store = MemoryTransactionStore::new();
        let mut report = stage(THREE_ROWS, &[]);
        let expected: BTreeSet<_> = report
            .rows()
            .iter()
            .filter_map(|r| r.outcome.candidate().cloned())
            .map(|t| (t.date, t.amount, t.category, t.description))
            .collect();

        ImportPipeline::default()
            .commit(&[1, 2, 3], &mut report, &store)
            .unwrap();

        let listed: BTreeSet<_> = store
            .list(&TransactionFilter::all())
            .unwrap()
            .into_iter()
            .map(|t| (t.date, t.amount, t.category, t.description))
            .collect();
        assert_eq!(listed, expected);
    }

    #[test]
    fn test_commit_rejects_ineligible_rows() {
        let store = MemoryTransactionStore::new();
        let mut report = stage("2025-03-01,12.50,Food,Market,checking,card\nnope\n", &[]);

        let result = ImportPipeline::default()
            .commit(&[1, 2, 9], &mut report, &store)
            .unwrap();
        assert_eq!(result.committed.len(), 1);
        let rejected: Vec<_> = result.rejected.iter().map(|r| r.row_number).collect();
        assert_eq!(rejected, vec![2, 9]);
    }

    #[test]
    fn test_partial_failure_reports_rows_and_keeps_report() {
        let store = FlakyStore {
            inner: MemoryTransactionStore::new(),
            limit: std::cell::Cell::new(1),
        };
        let pipeline = ImportPipeline::default();
        let mut report = stage(THREE_ROWS, &[]);

        let result = pipeline.commit(&[1, 2, 3], &mut report, &store).unwrap();
        assert!(!result.is_complete());
        assert_eq!(result.committed.len(), 1);
        assert_eq!(result.committed[0].row_number, 1);
        assert_eq!(result.failed.as_ref().unwrap().row_number, 2);
        assert_eq!(result.not_attempted, vec![3]);
        assert_eq!(report.stage(), ImportStage::Staged);

        // Retry once the store recovers; row 1 is not written twice
        store.limit.set(10);
        let retry = pipeline.commit(&[1, 2, 3], &mut report, &store).unwrap();
        assert!(retry.is_complete());
        assert_eq!(retry.committed.len(), 2);
        assert_eq!(retry.rejected[0].reason, "already committed");
        assert_eq!(store.list(&TransactionFilter::all()).unwrap().len(), 3);
    }

    #[test]
    fn test_stage_guard() {
        let store = MemoryTransactionStore::new();
        let pipeline = ImportPipeline::default();
        let mut report = stage(THREE_ROWS, &[]);

        pipeline.discard(&mut report).unwrap();
        assert_eq!(report.stage(), ImportStage::Discarded);
        assert!(pipeline.commit(&[1], &mut report, &store).is_err());
        assert!(pipeline.discard(&mut report).is_err());
        assert!(store.list(&TransactionFilter::all()).unwrap().is_empty());
    }

    #[test]
    fn test_unreadable_record_is_reported() {
        let mut bytes = b"2025-03-01,12.50,Food,Market,checking,card\n".to_vec();
        bytes.extend_from_slice(b"2025-03-02,1,Food,\xff\xfe,checking,card\n");
        let csv = parse_csv(bytes.as_slice()).unwrap();
        let report = ImportPipeline::default().run(&csv, &registry(), &[], today());

        assert_eq!(report.len(), 2);
        assert!(report.row(2).unwrap().outcome.is_invalid());
    }

    #[test]
    fn test_service_commit_writes_audit() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::new(PocketPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        storage.categories.replace(registry()).unwrap();
        storage.load_all().unwrap();

        let service = ImportService::new(&storage, &Settings::default());
        let mut report = service.stage(THREE_ROWS.as_bytes(), today()).unwrap();
        let result = service.commit(&report.valid_rows(), &mut report).unwrap();
        assert_eq!(result.committed.len(), 3);

        let entries = storage.audit().read_all().unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[3].entity_type, EntityType::ImportBatch);
        assert!(result.audit_error.is_none());
    }

    #[test]
    fn test_service_commit_reports_rows_when_audit_fails() {
        let temp_dir = TempDir::new().unwrap();
        let paths = PocketPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths.clone()).unwrap();
        storage.categories.replace(registry()).unwrap();
        storage.load_all().unwrap();
        // A directory where the log file should be makes every append fail
        std::fs::create_dir_all(paths.audit_log()).unwrap();

        let service = ImportService::new(&storage, &Settings::default());
        let mut report = service.stage(THREE_ROWS.as_bytes(), today()).unwrap();
        let result = service.commit(&report.valid_rows(), &mut report).unwrap();

        assert_eq!(result.committed.len(), 3);
        assert!(result.is_complete());
        assert!(result.audit_error.is_some());
        assert_eq!(report.stage(), ImportStage::Committed);
        assert_eq!(storage.transactions.len().unwrap(), 3);
    }
}
