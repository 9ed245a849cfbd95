//! Configuration module for pocketledger
//!
//! - Platform path resolution
//! - User settings persistence, including engine tunables

pub mod paths;
pub mod settings;

pub use paths::PocketPaths;
pub use settings::{DuplicateSettings, Settings, ValidationSettings};
