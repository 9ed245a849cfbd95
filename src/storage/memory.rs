//! In-memory transaction store
//!
//! Nothing is persisted. Batches go through the sequential `create_batch`
//! fallback of the trait.

use std::sync::RwLock;

use crate::error::StoreError;
use crate::models::{NewTransaction, Transaction, TransactionId};

use super::store::{TransactionFilter, TransactionStore};

#[derive(Debug, Default)]
pub struct MemoryTransactionStore {
    data: RwLock<Vec<Transaction>>,
}

impl MemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with already-identified records
    pub fn with_transactions(transactions: Vec<Transaction>) -> Self {
        Self {
            data: RwLock::new(transactions),
        }
    }
}

fn poisoned(operation: &'static str) -> StoreError {
    StoreError::new(operation, "lock poisoned")
}

impl TransactionStore for MemoryTransactionStore {
    fn create(&self, txn: NewTransaction) -> Result<TransactionId, StoreError> {
        let id = TransactionId::new();
        self.data
            .write()
            .map_err(|_| poisoned("create"))?
            .push(txn.with_id(id));
        Ok(id)
    }

    fn get(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        let data = self.data.read().map_err(|_| poisoned("get"))?;
        Ok(data.iter().find(|t| t.id == id).cloned())
    }

    fn list(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, StoreError> {
        let data = self.data.read().map_err(|_| poisoned("list"))?;
        Ok(filter.apply(data.iter()))
    }

    fn update(
        &self,
        id: TransactionId,
        txn: NewTransaction,
    ) -> Result<Option<Transaction>, StoreError> {
        let mut data = self.data.write().map_err(|_| poisoned("update"))?;
        Ok(data
            .iter_mut()
            .find(|t| t.id == id)
            .map(|slot| std::mem::replace(slot, txn.with_id(id))))
    }

    fn delete(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        let mut data = self.data.write().map_err(|_| poisoned("delete"))?;
        Ok(data
            .iter()
            .position(|t| t.id == id)
            .map(|index| data.remove(index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountType, Money, PaymentMethod};
    use chrono::NaiveDate;

    fn new_txn(cents: i64) -> NewTransaction {
        NewTransaction {
            date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            amount: Money::from_cents(cents),
            category: "Dining".into(),
            description: "Lunch".into(),
            account_type: AccountType::Credit,
            payment_method: PaymentMethod::CreditCard,
        }
    }

    #[test]
    fn test_crud() {
        let store = MemoryTransactionStore::new();
        let id = store.create(new_txn(500)).unwrap();
        assert_eq!(store.get(id).unwrap().unwrap().amount, Money::from_cents(500));

        store.update(id, new_txn(700)).unwrap();
        assert_eq!(store.get(id).unwrap().unwrap().amount, Money::from_cents(700));

        assert!(store.delete(id).unwrap().is_some());
        assert!(store.get(id).unwrap().is_none());
    }

    #[test]
    fn test_sequential_batch_fallback() {
        let store = MemoryTransactionStore::new();
        let result = store.create_batch(vec![new_txn(1), new_txn(2), new_txn(3)]);
        assert!(result.is_complete());
        assert_eq!(result.committed.len(), 3);
        assert_eq!(store.list(&TransactionFilter::all()).unwrap().len(), 3);
    }

    #[test]
    fn test_default_delete_matching() {
        let store = MemoryTransactionStore::new();
        store.create(new_txn(1)).unwrap();
        store.create(new_txn(2)).unwrap();

        let removed = store
            .delete_matching(&TransactionFilter::all().with_limit(1))
            .unwrap();
        assert_eq!(removed.len(), 2);
        assert!(store.list(&TransactionFilter::all()).unwrap().is_empty());
    }
}
