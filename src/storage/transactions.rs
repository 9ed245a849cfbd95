//! JSON file transaction store
//!
//! All records live in memory behind an `RwLock` and are written to
//! `transactions.json` on every mutation. A mutation builds the next state,
//! persists it, and only then swaps it in, so a failed write leaves memory
//! and disk unchanged.

use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::error::StoreError;
use crate::models::{NewTransaction, Transaction, TransactionId};

use super::file_io::{read_json, write_json_atomic};
use super::store::{BatchWrite, TransactionFilter, TransactionStore};

/// Serializable transaction data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

/// Transaction store persisted as a single JSON document
pub struct JsonTransactionStore {
    path: PathBuf,
    data: RwLock<Vec<Transaction>>,
}

impl JsonTransactionStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(Vec::new()),
        }
    }

    /// Load transactions from disk, replacing the in-memory state
    pub fn load(&self) -> Result<(), StoreError> {
        let file_data: TransactionData = read_json(&self.path)?;
        let mut data = self.write_lock("load")?;
        debug!(count = file_data.transactions.len(), path = %self.path.display(), "loaded transactions");
        *data = file_data.transactions;
        Ok(())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read_lock("len")?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn read_lock(&self, operation: &'static str) -> Result<RwLockReadGuard<'_, Vec<Transaction>>, StoreError> {
        self.data
            .read()
            .map_err(|e| StoreError::new(operation, format!("Failed to acquire read lock: {}", e)))
    }

    fn write_lock(&self, operation: &'static str) -> Result<RwLockWriteGuard<'_, Vec<Transaction>>, StoreError> {
        self.data
            .write()
            .map_err(|e| StoreError::new(operation, format!("Failed to acquire write lock: {}", e)))
    }

    /// Persist `next` and install it as the current state
    fn commit(
        &self,
        operation: &'static str,
        data: &mut Vec<Transaction>,
        next: Vec<Transaction>,
    ) -> Result<(), StoreError> {
        let file_data = TransactionData { transactions: next };
        write_json_atomic(&self.path, &file_data).map_err(|e| StoreError::new(operation, e.cause))?;
        *data = file_data.transactions;
        Ok(())
    }
}

impl TransactionStore for JsonTransactionStore {
    fn create(&self, txn: NewTransaction) -> Result<TransactionId, StoreError> {
        let mut data = self.write_lock("create")?;
        let id = TransactionId::new();
        let mut next = data.clone();
        next.push(txn.with_id(id));
        self.commit("create", &mut data, next)?;
        Ok(id)
    }

    fn get(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        Ok(self.read_lock("get")?.iter().find(|t| t.id == id).cloned())
    }

    fn list(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, StoreError> {
        Ok(filter.apply(self.read_lock("list")?.iter()))
    }

    fn update(
        &self,
        id: TransactionId,
        txn: NewTransaction,
    ) -> Result<Option<Transaction>, StoreError> {
        let mut data = self.write_lock("update")?;
        let Some(index) = data.iter().position(|t| t.id == id) else {
            return Ok(None);
        };
        let mut next = data.clone();
        let previous = std::mem::replace(&mut next[index], txn.with_id(id));
        self.commit("update", &mut data, next)?;
        Ok(Some(previous))
    }

    fn delete(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        let mut data = self.write_lock("delete")?;
        let Some(index) = data.iter().position(|t| t.id == id) else {
            return Ok(None);
        };
        let mut next = data.clone();
        let removed = next.remove(index);
        self.commit("delete", &mut data, next)?;
        Ok(Some(removed))
    }

    /// One file write for the whole batch; on failure nothing is committed
    fn create_batch(&self, txns: Vec<NewTransaction>) -> BatchWrite {
        let mut data = match self.write_lock("create_batch") {
            Ok(data) => data,
            Err(e) => {
                return BatchWrite {
                    committed: Vec::new(),
                    failure: Some((0, e)),
                }
            }
        };

        let mut next = data.clone();
        let ids: Vec<TransactionId> = txns
            .into_iter()
            .map(|txn| {
                let id = TransactionId::new();
                next.push(txn.with_id(id));
                id
            })
            .collect();

        match self.commit("create_batch", &mut data, next) {
            Ok(()) => BatchWrite {
                committed: ids,
                failure: None,
            },
            Err(e) => BatchWrite {
                committed: Vec::new(),
                failure: Some((0, e)),
            },
        }
    }

    fn delete_matching(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, StoreError> {
        let mut data = self.write_lock("delete")?;
        let (removed, kept): (Vec<Transaction>, Vec<Transaction>) =
            data.iter().cloned().partition(|t| filter.matches(t));
        if removed.is_empty() {
            return Ok(removed);
        }
        self.commit("delete", &mut data, kept)?;
        Ok(removed)
    }

    /// One file write for every moved record
    fn reassign_category(&self, from: &str, to: &str) -> Result<Vec<Transaction>, StoreError> {
        let mut data = self.write_lock("reassign")?;
        let mut next = data.clone();
        let mut previous = Vec::new();
        for txn in next.iter_mut().filter(|t| t.category == from) {
            previous.push(txn.clone());
            txn.category = to.to_string();
        }
        if previous.is_empty() {
            return Ok(previous);
        }
        self.commit("reassign", &mut data, next)?;
        Ok(previous)
    }
}
