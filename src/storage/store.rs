//! The transaction store contract
//!
//! The engine only talks to persistence through [`TransactionStore`]. Ids are
//! handed out by the store and are opaque to callers.

use tracing::warn;

use crate::error::StoreError;
use crate::models::{NewTransaction, PeriodWindow, Transaction, TransactionId};

/// Selection applied by [`TransactionStore::list`]
///
/// Results are ordered most recent first; `limit` is applied after ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub category: Option<String>,
    pub window: Option<PeriodWindow>,
    pub limit: Option<usize>,
}

impl TransactionFilter {
    /// Every stored transaction
    pub fn all() -> Self {
        Self::default()
    }

    pub fn in_window(window: PeriodWindow) -> Self {
        Self {
            window: Some(window),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        self.category.as_deref().map_or(true, |c| txn.category == c)
            && self.window.map_or(true, |w| w.contains(txn.date))
    }

    /// Filter, order and truncate a snapshot
    ///
    /// The sort is stable, so same-day transactions keep their stored order.
    pub fn apply<'a>(&self, transactions: impl IntoIterator<Item = &'a Transaction>) -> Vec<Transaction> {
        let mut selected: Vec<Transaction> = transactions
            .into_iter()
            .filter(|t| self.matches(t))
            .cloned()
            .collect();
        selected.sort_by(|a, b| b.date.cmp(&a.date));
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

/// Outcome of [`TransactionStore::create_batch`]
#[derive(Debug, Default)]
pub struct BatchWrite {
    /// Ids of the written records, in input order
    pub committed: Vec<TransactionId>,

    /// Input index of the record that failed and why; later records were not
    /// attempted
    pub failure: Option<(usize, StoreError)>,
}

impl BatchWrite {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Persistence for transactions
///
/// Methods take `&self`; implementations guard their state with interior
/// locking so a store can be shared behind a plain reference.
pub trait TransactionStore {
    /// Store a new record and return its id
    fn create(&self, txn: NewTransaction) -> Result<TransactionId, StoreError>;

    fn get(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError>;

    fn list(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, StoreError>;

    /// Replace a record, returning the previous version (`None` if the id is unknown)
    fn update(
        &self,
        id: TransactionId,
        txn: NewTransaction,
    ) -> Result<Option<Transaction>, StoreError>;

    /// Remove a record, returning it (`None` if the id is unknown)
    fn delete(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError>;

    /// Store several records
    ///
    /// The default writes one by one and stops at the first failure. Stores
    /// that can write atomically override this so a batch lands all or nothing.
    fn create_batch(&self, txns: Vec<NewTransaction>) -> BatchWrite {
        let mut result = BatchWrite::default();
        for (index, txn) in txns.into_iter().enumerate() {
            match self.create(txn) {
                Ok(id) => result.committed.push(id),
                Err(e) => {
                    result.failure = Some((index, e));
                    break;
                }
            }
        }
        result
    }

    /// Remove every record the filter selects and return the removed records
    ///
    /// `limit` is ignored.
    fn delete_matching(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, StoreError> {
        let filter = TransactionFilter {
            limit: None,
            ..filter.clone()
        };
        let mut removed = Vec::new();
        for txn in self.list(&filter)? {
            if let Some(gone) = self.delete(txn.id)? {
                removed.push(gone);
            }
        }
        Ok(removed)
    }

    /// Refile every record under `from` as `to`, returning the records as
    /// they were before the move
    ///
    /// Either every record moves or none does. The default updates one by
    /// one and, when a write fails, puts the records it already moved back
    /// before returning the error.
    fn reassign_category(&self, from: &str, to: &str) -> Result<Vec<Transaction>, StoreError> {
        let mut moved = Vec::new();
        for txn in self.list(&TransactionFilter::all().with_category(from))? {
            let mut next = txn.to_new();
            next.category = to.to_string();
            match self.update(txn.id, next) {
                Ok(Some(previous)) => moved.push(previous),
                Ok(None) => {}
                Err(e) => {
                    for previous in moved.iter().rev() {
                        if let Err(undo) = self.update(previous.id, previous.to_new()) {
                            warn!(id = %previous.id, error = %undo, "could not restore category");
                        }
                    }
                    return Err(e);
                }
            }
        }
        Ok(moved)
    }
}
