//! pocketledger - personal transaction tracking against monthly budgets
//!
//! This library provides the reconciliation engine behind the `pocket`
//! command: transactions are validated, checked for duplicates, stored, and
//! aggregated per category and period to compare spend with each category's
//! monthly budget.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Money, categories, transactions and periods
//! - `storage`: JSON file storage behind the `TransactionStore` trait
//! - `services`: Validation, duplicate detection, CSV import, maintenance
//! - `reports`: Aggregation, budget usage and spending trend
//! - `audit`: Audit logging system
//! - `display`: Terminal formatting
//! - `cli`: Command handlers for the `pocket` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use pocketledger::config::{PocketPaths, Settings};
//! use pocketledger::storage::Storage;
//!
//! let paths = PocketPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::new(paths)?;
//! storage.load_all()?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{PocketError, PocketResult};
