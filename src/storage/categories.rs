//! Category repository for JSON storage
//!
//! Manages loading and saving the category registry to categories.json

use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::StoreError;
use crate::models::{Category, CategoryRegistry};

use super::file_io::{read_json, write_json_atomic};

/// Serializable category data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct CategoryData {
    categories: Vec<Category>,
}

/// Repository for category persistence
pub struct CategoryRepository {
    path: PathBuf,
    registry: RwLock<CategoryRegistry>,
}

impl CategoryRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            registry: RwLock::new(CategoryRegistry::new()),
        }
    }

    /// Load categories from disk
    ///
    /// Entries are re-validated; a hand-edited file with a negative budget or a
    /// repeated name is rejected rather than half-loaded.
    pub fn load(&self) -> Result<(), StoreError> {
        let file_data: CategoryData = read_json(&self.path)?;
        let loaded = CategoryRegistry::from_categories(file_data.categories)
            .map_err(|e| StoreError::new("read", format!("{}: {}", self.path.display(), e)))?;

        let mut registry = self
            .registry
            .write()
            .map_err(|e| StoreError::new("load", format!("Failed to acquire write lock: {}", e)))?;
        *registry = loaded;
        Ok(())
    }

    /// A copy of the current registry
    pub fn snapshot(&self) -> Result<CategoryRegistry, StoreError> {
        self.registry
            .read()
            .map(|r| r.clone())
            .map_err(|e| StoreError::new("list", format!("Failed to acquire read lock: {}", e)))
    }

    /// Replace the registry and persist it
    ///
    /// The in-memory registry changes only once the file write succeeded.
    pub fn replace(&self, next: CategoryRegistry) -> Result<(), StoreError> {
        let mut registry = self
            .registry
            .write()
            .map_err(|e| StoreError::new("save", format!("Failed to acquire write lock: {}", e)))?;

        let file_data = CategoryData {
            categories: next.list().to_vec(),
        };
        write_json_atomic(&self.path, &file_data)?;
        *registry = next;
        Ok(())
    }
}
