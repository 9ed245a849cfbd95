//! Transaction service
//!
//! Single-entry add, edit and delete. Every add and edit goes through the
//! [`Validator`] against the current registry before reaching the store.

use chrono::NaiveDate;
use tracing::info;

use crate::audit::{AuditEntry, EntityType};
use crate::config::Settings;
use crate::error::{PocketError, PocketResult};
use crate::models::{PeriodWindow, RawTransaction, Transaction, TransactionId};
use crate::storage::{Storage, TransactionFilter, TransactionStore};

use super::validator::Validator;

/// Service for transaction management
pub struct TransactionService<'a> {
    storage: &'a Storage,
    validator: Validator,
}

impl<'a> TransactionService<'a> {
    pub fn new(storage: &'a Storage, settings: &Settings) -> Self {
        Self {
            storage,
            validator: Validator::new(&settings.validation),
        }
    }

    /// Validate and store a new transaction
    pub fn add(&self, raw: &RawTransaction, today: NaiveDate) -> PocketResult<Transaction> {
        let registry = self.storage.categories.snapshot()?;
        let txn = self.validator.validate(raw, &registry, today).into_result()?;

        let id = self.storage.transactions.create(txn.clone())?;
        let stored = txn.with_id(id);

        self.storage
            .log_create(EntityType::Transaction, id.to_string(), &stored)?;
        info!(id = %id.short(), category = %stored.category, amount = %stored.amount, "transaction added");
        Ok(stored)
    }

    pub fn get(&self, id: TransactionId) -> PocketResult<Option<Transaction>> {
        Ok(self.storage.transactions.get(id)?)
    }

    /// Find a transaction by full id or by a unique id prefix (`txn-1a2b3c4d`)
    pub fn find(&self, identifier: &str) -> PocketResult<Transaction> {
        if let Ok(id) = identifier.parse::<TransactionId>() {
            return self
                .get(id)?
                .ok_or_else(|| PocketError::transaction_not_found(identifier));
        }

        let prefix = identifier.trim();
        let prefix = prefix.strip_prefix("txn-").unwrap_or(prefix).to_lowercase();
        if prefix.is_empty() {
            return Err(PocketError::transaction_not_found(identifier));
        }

        let mut matches = self
            .storage
            .transactions
            .list(&TransactionFilter::all())?
            .into_iter()
            .filter(|t| t.id.to_string().starts_with(&prefix));

        match (matches.next(), matches.next()) {
            (Some(txn), None) => Ok(txn),
            (Some(_), Some(_)) => Err(PocketError::Duplicate {
                entity_type: "Transaction id prefix",
                identifier: identifier.to_string(),
            }),
            _ => Err(PocketError::transaction_not_found(identifier)),
        }
    }

    pub fn list(&self, filter: &TransactionFilter) -> PocketResult<Vec<Transaction>> {
        Ok(self.storage.transactions.list(filter)?)
    }

    /// Replace every field of a stored transaction, keeping its id
    pub fn edit(
        &self,
        id: TransactionId,
        raw: &RawTransaction,
        today: NaiveDate,
    ) -> PocketResult<Transaction> {
        let registry = self.storage.categories.snapshot()?;
        let txn = self.validator.validate(raw, &registry, today).into_result()?;

        let before = self
            .storage
            .transactions
            .update(id, txn.clone())?
            .ok_or_else(|| PocketError::transaction_not_found(id.to_string()))?;
        let after = txn.with_id(id);

        self.storage
            .log_update(EntityType::Transaction, id.to_string(), &before, &after)?;
        Ok(after)
    }

    pub fn delete(&self, id: TransactionId) -> PocketResult<Transaction> {
        let txn = self
            .storage
            .transactions
            .delete(id)?
            .ok_or_else(|| PocketError::transaction_not_found(id.to_string()))?;

        self.storage
            .log_delete(EntityType::Transaction, id.to_string(), &txn)?;
        Ok(txn)
    }

    /// Delete every transaction dated inside `window`; returns how many went
    pub fn clear_range(&self, window: PeriodWindow) -> PocketResult<usize> {
        self.clear(&TransactionFilter::in_window(window))
    }

    /// Delete every transaction; returns how many went
    pub fn clear_all(&self) -> PocketResult<usize> {
        self.clear(&TransactionFilter::all())
    }

    fn clear(&self, filter: &TransactionFilter) -> PocketResult<usize> {
        let removed = self.storage.transactions.delete_matching(filter)?;
        let entries: Vec<_> = removed
            .iter()
            .map(|txn| AuditEntry::delete(EntityType::Transaction, txn.id.to_string(), txn))
            .collect();
        self.storage.audit().log_batch(&entries)?;
        info!(count = removed.len(), "transactions cleared");
        Ok(removed.len())
    }
}
