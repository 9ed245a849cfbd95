//! Category service
//!
//! Registry maintenance on top of storage: add, budget edits, deletion with
//! reassignment of referencing transactions, and CSV import.

use std::io::Read;

use tracing::{info, warn};

use crate::audit::EntityType;
use crate::error::{Field, PocketError, PocketResult, ValidationError};
use crate::models::{Category, CategoryRegistry, CategoryValidationError, Money, Transaction};
use crate::storage::{Storage, TransactionFilter, TransactionStore};

/// Service for category management
pub struct CategoryService<'a> {
    storage: &'a Storage,
}

/// Result of deleting a category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDeletion {
    pub category: Category,
    /// Transactions moved to the replacement category
    pub reassigned: usize,
}

/// Result of a category CSV import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryImport {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    /// (line number in the file, reason)
    pub errors: Vec<(usize, String)>,
}

fn invalid_category(e: CategoryValidationError) -> PocketError {
    ValidationError::new(Field::Category, e.to_string()).into()
}

impl<'a> CategoryService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// The current registry
    pub fn registry(&self) -> PocketResult<CategoryRegistry> {
        Ok(self.storage.categories.snapshot()?)
    }

    pub fn get(&self, name: &str) -> PocketResult<Category> {
        self.registry()?
            .get(name)
            .cloned()
            .ok_or_else(|| PocketError::category_not_found(name))
    }

    /// Add a new category at the end of the registry
    pub fn add(&self, name: &str, monthly_budget: Money) -> PocketResult<Category> {
        let mut registry = self.registry()?;
        let name = name.trim();
        if registry.contains(name) {
            return Err(PocketError::Duplicate {
                entity_type: "Category",
                identifier: name.to_string(),
            });
        }

        let category = Category::new(name, monthly_budget);
        registry.upsert(category.clone()).map_err(invalid_category)?;
        self.storage.categories.replace(registry)?;

        self.storage
            .log_create(EntityType::Category, &category.name, &category)?;
        info!(category = %category.name, budget = %category.monthly_budget, "category added");
        Ok(category)
    }

    /// Change a category's monthly budget; returns the updated category
    pub fn set_budget(&self, name: &str, monthly_budget: Money) -> PocketResult<Category> {
        let mut registry = self.registry()?;
        let before = registry
            .get(name)
            .cloned()
            .ok_or_else(|| PocketError::category_not_found(name))?;

        let after = Category::new(name, monthly_budget);
        registry.upsert(after.clone()).map_err(invalid_category)?;
        self.storage.categories.replace(registry)?;

        self.storage
            .log_update(EntityType::Category, name, &before, &after)?;
        Ok(after)
    }

    /// Number of stored transactions filed under `name`
    pub fn usage_count(&self, name: &str) -> PocketResult<usize> {
        let filter = TransactionFilter::all().with_category(name);
        Ok(self.storage.transactions.list(&filter)?.len())
    }

    /// Remove a category
    ///
    /// A category that transactions still reference is only removed when
    /// `reassign_to` names another registered category; those transactions
    /// are moved there first, all of them or none. If the registry cannot be
    /// saved afterwards, the moved transactions are put back.
    pub fn delete(&self, name: &str, reassign_to: Option<&str>) -> PocketResult<CategoryDeletion> {
        let mut registry = self.registry()?;
        if !registry.contains(name) {
            return Err(PocketError::category_not_found(name));
        }

        let in_use = self.usage_count(name)?;
        let mut moved = Vec::new();
        if in_use > 0 {
            let target = match reassign_to {
                None => {
                    return Err(PocketError::CategoryInUse {
                        category: name.to_string(),
                        count: in_use,
                    })
                }
                Some(target) if target == name => {
                    return Err(ValidationError::new(
                        Field::Category,
                        "cannot reassign transactions to the category being deleted",
                    )
                    .into())
                }
                Some(target) if !registry.contains(target) => {
                    return Err(PocketError::category_not_found(target))
                }
                Some(target) => target,
            };
            moved = self.storage.transactions.reassign_category(name, target)?;
        }

        let category = registry
            .remove(name)
            .ok_or_else(|| PocketError::category_not_found(name))?;
        if let Err(e) = self.storage.categories.replace(registry) {
            self.restore(&moved);
            return Err(e.into());
        }

        if let Some(target) = reassign_to {
            for before in &moved {
                let after = Transaction {
                    category: target.to_string(),
                    ..before.clone()
                };
                self.storage
                    .log_update(EntityType::Transaction, before.id.to_string(), before, &after)?;
            }
        }
        self.storage
            .log_delete(EntityType::Category, &category.name, &category)?;

        info!(category = %category.name, reassigned = moved.len(), "category deleted");
        Ok(CategoryDeletion {
            category,
            reassigned: moved.len(),
        })
    }

    /// Put reassigned transactions back under their original category
    fn restore(&self, moved: &[Transaction]) {
        for previous in moved {
            if let Err(e) = self.storage.transactions.update(previous.id, previous.to_new()) {
                warn!(id = %previous.id, error = %e, "could not restore category");
            }
        }
    }

    /// Add or update categories from CSV
    ///
    /// Without a header, each line is `name,monthly_budget`. With a header,
    /// the `name` (or `category_name`) and `monthly_budget` (or `budget`)
    /// columns are used and any others ignored. Existing categories get the
    /// new budget; unreadable lines are reported and skipped.
    pub fn import_csv<R: Read>(&self, source: R) -> PocketResult<CategoryImport> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(source);

        let mut registry = self.registry()?;
        let mut result = CategoryImport::default();
        let mut columns = (0usize, 1usize);
        let mut before_all = Vec::new();

        for (index, record) in reader.records().enumerate() {
            let line = index + 1;
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    result.errors.push((line, e.to_string()));
                    continue;
                }
            };

            if line == 1 {
                if let Some(found) = header_columns(&record) {
                    columns = found;
                    continue;
                }
            }

            let name = record.get(columns.0).unwrap_or_default();
            let budget = match record.get(columns.1).map(Money::parse) {
                Some(Ok(budget)) => budget,
                Some(Err(e)) => {
                    result.errors.push((line, e.to_string()));
                    continue;
                }
                None => {
                    result.errors.push((line, "missing monthly budget".into()));
                    continue;
                }
            };

            let previous = registry.get(name).cloned();
            let category = Category::new(name, budget);
            if let Err(e) = registry.upsert(category.clone()) {
                result.errors.push((line, e.to_string()));
                continue;
            }
            match previous {
                Some(before) => {
                    result.updated.push(category.name.clone());
                    before_all.push((Some(before), category));
                }
                None => {
                    result.added.push(category.name.clone());
                    before_all.push((None, category));
                }
            }
        }

        if !before_all.is_empty() {
            self.storage.categories.replace(registry)?;
            for (before, after) in &before_all {
                match before {
                    Some(before) => {
                        self.storage
                            .log_update(EntityType::Category, &after.name, before, after)?
                    }
                    None => self
                        .storage
                        .log_create(EntityType::Category, &after.name, after)?,
                }
            }
        }

        info!(
            added = result.added.len(),
            updated = result.updated.len(),
            errors = result.errors.len(),
            "categories imported"
        );
        Ok(result)
    }
}

/// Name and budget column positions when `record` is a header
fn header_columns(record: &csv::StringRecord) -> Option<(usize, usize)> {
    let position = |names: &[&str]| {
        record
            .iter()
            .position(|h| names.contains(&h.to_lowercase().as_str()))
    };
    let name = position(&["name", "category_name", "category"])?;
    let budget = position(&["monthly_budget", "budget"])?;
    Some((name, budget))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Operation;
    use crate::config::PocketPaths;
    use crate::models::{AccountType, NewTransaction, PaymentMethod};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = PocketPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.initialize().unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn add_txn(storage: &Storage, category: &str) {
        storage
            .transactions
            .create(NewTransaction {
                date: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
                amount: Money::from_cents(1000),
                category: category.into(),
                description: "test".into(),
                account_type: AccountType::Checking,
                payment_method: PaymentMethod::Cash,
            })
            .unwrap();
    }

    #[test]
    fn test_add_category() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);

        let category = service.add("Pets", Money::from_units(80, 0)).unwrap();
        assert_eq!(category.name, "Pets");

        let registry = service.registry().unwrap();
        assert_eq!(registry.list().last().unwrap().name, "Pets");

        let err = service.add("Pets", Money::zero()).unwrap_err();
        assert!(matches!(err, PocketError::Duplicate { .. }));

        let err = service.add("Toys", Money::from_cents(-1)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_set_budget_is_audited() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);

        let updated = service.set_budget("Dining", Money::from_units(350, 0)).unwrap();
        assert_eq!(updated.monthly_budget, Money::from_units(350, 0));
        assert_eq!(
            service.get("Dining").unwrap().monthly_budget,
            Money::from_units(350, 0)
        );

        let last = storage.audit().read_recent(1).unwrap().pop().unwrap();
        assert_eq!(last.operation, Operation::Update);
        assert!(last.changes.unwrap().contains("monthly_budget"));

        assert!(service.set_budget("Nope", Money::zero()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_requires_reassignment_when_referenced() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        add_txn(&storage, "Dining");
        add_txn(&storage, "Dining");

        let err = service.delete("Dining", None).unwrap_err();
        assert!(matches!(err, PocketError::CategoryInUse { count: 2, .. }));
        assert!(service.delete("Dining", Some("Dining")).is_err());
        assert!(service.delete("Dining", Some("Nope")).unwrap_err().is_not_found());

        let deletion = service.delete("Dining", Some("Groceries")).unwrap();
        assert_eq!(deletion.reassigned, 2);
        assert!(service.get("Dining").is_err());
        assert_eq!(service.usage_count("Groceries").unwrap(), 2);
    }

    #[test]
    fn test_failed_reassignment_moves_nothing() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        add_txn(&storage, "Dining");
        add_txn(&storage, "Dining");
        add_txn(&storage, "Dining");

        // A directory where the data file should be makes the write fail
        let path = storage.paths().transactions_file();
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir_all(path.join("blocker")).unwrap();

        let err = service.delete("Dining", Some("Groceries")).unwrap_err();
        assert!(matches!(err, PocketError::Store(_)));
        assert!(service.get("Dining").is_ok());
        assert_eq!(service.usage_count("Dining").unwrap(), 3);
        assert_eq!(service.usage_count("Groceries").unwrap(), 0);
    }

    #[test]
    fn test_registry_save_failure_restores_transactions() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        add_txn(&storage, "Dining");
        add_txn(&storage, "Dining");

        let path = storage.paths().categories_file();
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir_all(path.join("blocker")).unwrap();

        assert!(service.delete("Dining", Some("Groceries")).is_err());
        assert!(service.get("Dining").is_ok());
        assert_eq!(service.usage_count("Dining").unwrap(), 2);
        assert_eq!(service.usage_count("Groceries").unwrap(), 0);
    }

    #[test]
    fn test_delete_unreferenced() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let deletion = service.delete("Education", None).unwrap();
        assert_eq!(deletion.reassigned, 0);
        assert_eq!(service.registry().unwrap().len(), 9);
    }

    #[test]
    fn test_import_headerless() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);

        let csv_data = "Pets,75\nDining,320.50\n,10\nGifts,abc\n";
        let result = service.import_csv(csv_data.as_bytes()).unwrap();

        assert_eq!(result.added, vec!["Pets"]);
        assert_eq!(result.updated, vec!["Dining"]);
        let lines: Vec<_> = result.errors.iter().map(|(line, _)| *line).collect();
        assert_eq!(lines, vec![3, 4]);
        assert_eq!(
            service.get("Dining").unwrap().monthly_budget,
            Money::from_cents(32050)
        );
    }

    #[test]
    fn test_import_exported_category_layout() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);

        let csv_data = "\
category_id,category_name,monthly_budget,priority_level,icon
1,Travel,250.0,Medium,plane
2,Housing,1200,High,house
";
        let result = service.import_csv(csv_data.as_bytes()).unwrap();
        assert_eq!(result.added, vec!["Travel"]);
        assert_eq!(result.updated, vec!["Housing"]);
        assert!(result.errors.is_empty());
    }
}
