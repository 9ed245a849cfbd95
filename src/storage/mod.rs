//! Storage layer for pocketledger
//!
//! JSON files with atomic writes behind the [`TransactionStore`] contract, a
//! category repository, and the audit log, tied together by [`Storage`].

pub mod categories;
pub mod file_io;
pub mod memory;
pub mod store;
pub mod transactions;

pub use categories::CategoryRepository;
pub use memory::MemoryTransactionStore;
pub use store::{BatchWrite, TransactionFilter, TransactionStore};
pub use transactions::JsonTransactionStore;

use serde::Serialize;
use tracing::info;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::PocketPaths;
use crate::error::PocketResult;
use crate::models::CategoryRegistry;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: PocketPaths,
    pub categories: CategoryRepository,
    pub transactions: JsonTransactionStore,
    audit: AuditLogger,
}

impl Storage {
    /// Open storage under `paths`, creating directories as needed
    ///
    /// Nothing is read until [`Storage::load_all`].
    pub fn new(paths: PocketPaths) -> PocketResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            categories: CategoryRepository::new(paths.categories_file()),
            transactions: JsonTransactionStore::new(paths.transactions_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    pub fn paths(&self) -> &PocketPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&self) -> PocketResult<()> {
        self.categories.load()?;
        self.transactions.load()?;
        Ok(())
    }

    /// Check if storage has been initialized (category file exists)
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    /// First-run setup: write the default categories unless a category file
    /// already exists
    ///
    /// Returns whether anything was created.
    pub fn initialize(&self) -> PocketResult<bool> {
        if self.is_initialized() {
            return Ok(false);
        }

        let registry = CategoryRegistry::with_defaults();
        self.categories.replace(registry.clone())?;
        for category in registry.list() {
            self.log_create(EntityType::Category, &category.name, category)?;
        }
        info!(categories = registry.len(), "initialized storage with default categories");
        Ok(true)
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity: &T,
    ) -> PocketResult<()> {
        self.audit
            .log(&AuditEntry::create(entity_type, entity_id, entity))
    }

    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        before: &T,
        after: &T,
    ) -> PocketResult<()> {
        self.audit
            .log(&AuditEntry::update(entity_type, entity_id, before, after))
    }

    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity: &T,
    ) -> PocketResult<()> {
        self.audit
            .log(&AuditEntry::delete(entity_type, entity_id, entity))
    }
}
