//! Category model and the ordered category registry
//!
//! A category is a named spending bucket with a monthly budget. The registry
//! keeps categories in insertion order; that order is the order budget
//! reports are produced in.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// Bucket name used for spending whose category is no longer registered
pub const UNKNOWN_CATEGORY: &str = "UNKNOWN";

/// Starter categories and monthly budgets (in whole units) for a fresh install
const DEFAULT_CATEGORIES: &[(&str, i64)] = &[
    ("Groceries", 500),
    ("Dining", 300),
    ("Entertainment", 200),
    ("Utilities", 350),
    ("Transportation", 250),
    ("Shopping", 200),
    ("Housing", 1000),
    ("Healthcare", 200),
    ("Education", 100),
    ("Personal Care", 100),
];

/// A spending category with its monthly budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique category name (case-sensitive)
    pub name: String,

    /// Budget per calendar month, never negative
    pub monthly_budget: Money,
}

impl Category {
    pub fn new(name: impl Into<String>, monthly_budget: Money) -> Self {
        Self {
            name: name.into(),
            monthly_budget,
        }
    }

    /// Validate the category
    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CategoryValidationError::EmptyName);
        }
        if name != self.name {
            return Err(CategoryValidationError::UntrimmedName(self.name.clone()));
        }
        if name.chars().count() > 50 {
            return Err(CategoryValidationError::NameTooLong(name.chars().count()));
        }
        if name == UNKNOWN_CATEGORY {
            return Err(CategoryValidationError::ReservedName);
        }
        if self.monthly_budget.is_negative() {
            return Err(CategoryValidationError::NegativeBudget(self.monthly_budget));
        }
        Ok(())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/month)", self.name, self.monthly_budget)
    }
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CategoryValidationError {
    #[error("Category name cannot be empty")]
    EmptyName,
    #[error("Category name has leading or trailing whitespace: '{0}'")]
    UntrimmedName(String),
    #[error("Category name too long ({0} chars, max 50)")]
    NameTooLong(usize),
    #[error("'UNKNOWN' is reserved for spending in deleted categories")]
    ReservedName,
    #[error("Monthly budget cannot be negative: {0}")]
    NegativeBudget(Money),
    #[error("Category '{0}' is listed more than once")]
    DuplicateName(String),
}

/// Ordered set of valid categories, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
}

impl CategoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry, rejecting invalid or repeated entries
    pub fn from_categories(
        categories: impl IntoIterator<Item = Category>,
    ) -> Result<Self, CategoryValidationError> {
        let mut registry = Self::new();
        for category in categories {
            if registry.contains(&category.name) {
                return Err(CategoryValidationError::DuplicateName(category.name));
            }
            registry.upsert(category)?;
        }
        Ok(registry)
    }

    /// The starter category set
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (name, budget) in DEFAULT_CATEGORIES {
            registry
                .categories
                .push(Category::new(*name, Money::from_units(*budget, 0)));
        }
        registry
    }

    /// All categories in registry order
    pub fn list(&self) -> &[Category] {
        &self.categories
    }

    /// Look up a category by exact name
    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert a new category at the end, or replace the budget of an existing one
    /// in place
    pub fn upsert(&mut self, category: Category) -> Result<(), CategoryValidationError> {
        category.validate()?;
        match self.categories.iter_mut().find(|c| c.name == category.name) {
            Some(existing) => existing.monthly_budget = category.monthly_budget,
            None => self.categories.push(category),
        }
        Ok(())
    }

    /// Remove a category from the registry
    ///
    /// This does not check for referencing transactions; go through
    /// `CategoryService::delete` for that.
    pub fn remove(&mut self, name: &str) -> Option<Category> {
        let index = self.categories.iter().position(|c| c.name == name)?;
        Some(self.categories.remove(index))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    /// Sum of all monthly budgets
    pub fn total_monthly_budget(&self) -> Money {
        self.categories.iter().map(|c| c.monthly_budget).sum()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
