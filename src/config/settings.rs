//! User settings for pocketledger
//!
//! Holds display preferences plus the tunables of the engine: how far into the
//! future a transaction date may be, how long descriptions may get, and how
//! loosely duplicate detection matches.

use serde::{Deserialize, Serialize};

use super::paths::PocketPaths;
use crate::error::PocketError;

/// One billion currency units
pub const DEFAULT_MAX_AMOUNT_CENTS: i64 = 100_000_000_000;

/// Limits applied by the validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Dates later than today plus this many days are rejected
    pub future_days: u32,

    /// Maximum description length in characters, after trimming
    pub max_description_len: usize,

    /// Largest accepted amount, in cents
    pub max_amount_cents: i64,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            future_days: 1,
            max_description_len: 500,
            max_amount_cents: DEFAULT_MAX_AMOUNT_CENTS,
        }
    }
}

/// Duplicate-detection tolerances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicateSettings {
    /// Amounts within this many cents count as equal (0 = exact)
    pub amount_epsilon_cents: i64,

    /// Normalized Levenshtein similarity at or above which two descriptions match
    pub similarity_threshold: f64,
}

impl Default for DuplicateSettings {
    fn default() -> Self {
        Self {
            amount_epsilon_cents: 0,
            similarity_threshold: 0.9,
        }
    }
}

/// User settings for pocketledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol used when printing amounts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format for display (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Default `tracing` filter when `POCKETLEDGER_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    #[serde(default)]
    pub validation: ValidationSettings,

    #[serde(default)]
    pub duplicates: DuplicateSettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_log_filter() -> String {
    "pocketledger=warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            log_filter: default_log_filter(),
            validation: ValidationSettings::default(),
            duplicates: DuplicateSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &PocketPaths) -> Result<Self, PocketError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Don't save yet - let caller decide when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| PocketError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| PocketError::Config(format!("Failed to parse settings file: {}", e)))?;

        settings.check()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &PocketPaths) -> Result<(), PocketError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| PocketError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| PocketError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Reject values the engine cannot work with
    pub fn check(&self) -> Result<(), PocketError> {
        let threshold = self.duplicates.similarity_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(PocketError::Config(format!(
                "duplicates.similarity_threshold must be between 0 and 1, got {}",
                threshold
            )));
        }
        if self.duplicates.amount_epsilon_cents < 0 {
            return Err(PocketError::Config(
                "duplicates.amount_epsilon_cents cannot be negative".into(),
            ));
        }
        if self.validation.max_amount_cents <= 0 {
            return Err(PocketError::Config(
                "validation.max_amount_cents must be positive".into(),
            ));
        }
        if self.validation.max_description_len == 0 {
            return Err(PocketError::Config(
                "validation.max_description_len must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.validation.future_days, 1);
        assert_eq!(settings.validation.max_description_len, 500);
        assert_eq!(settings.validation.max_amount_cents, DEFAULT_MAX_AMOUNT_CENTS);
        assert_eq!(settings.duplicates.amount_epsilon_cents, 0);
        assert!(settings.check().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = PocketPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.validation.future_days = 3;
        settings.duplicates.similarity_threshold = 0.75;
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = PocketPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(
            paths.settings_file(),
            r#"{"currency_symbol": "€", "validation": {"future_days": 0}}"#,
        )
        .unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.currency_symbol, "€");
        assert_eq!(loaded.validation.future_days, 0);
        assert_eq!(loaded.validation.max_description_len, 500);
        assert_eq!(loaded.duplicates, DuplicateSettings::default());
    }

    #[test]
    fn test_out_of_range_threshold_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let paths = PocketPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(
            paths.settings_file(),
            r#"{"duplicates": {"similarity_threshold": 1.5}}"#,
        )
        .unwrap();

        let err = Settings::load_or_create(&paths).unwrap_err();
        assert!(matches!(err, PocketError::Config(_)));
    }
}
