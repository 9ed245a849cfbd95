//! Transaction validation
//!
//! Turns a [`RawTransaction`] into a normalized [`NewTransaction`] or the
//! first field that is wrong with it. Checks run in a fixed order and stop
//! at the first failure: amount, date, category, account type, payment
//! method, description.

use chrono::{Duration, NaiveDate};

use crate::config::ValidationSettings;
use crate::error::{Field, ValidationError};
use crate::models::{
    AccountType, CategoryRegistry, Money, MoneyParseError, NewTransaction, PaymentMethod,
    RawTransaction,
};

/// Accepted date layouts, tried in order
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y", "%Y/%m/%d"];

/// Parse a date in any of [`DATE_FORMATS`]
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
}

/// Outcome of validating one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid(NewTransaction),
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn into_result(self) -> Result<NewTransaction, ValidationError> {
        match self {
            Self::Valid(txn) => Ok(txn),
            Self::Invalid(e) => Err(e),
        }
    }
}

impl From<Result<NewTransaction, ValidationError>> for ValidationResult {
    fn from(result: Result<NewTransaction, ValidationError>) -> Self {
        match result {
            Ok(txn) => Self::Valid(txn),
            Err(e) => Self::Invalid(e),
        }
    }
}

/// Field and cross-field checks for candidate transactions
#[derive(Debug, Clone)]
pub struct Validator {
    future_days: u32,
    max_description_len: usize,
    max_amount: Money,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(&ValidationSettings::default())
    }
}

impl Validator {
    pub fn new(settings: &ValidationSettings) -> Self {
        Self {
            future_days: settings.future_days,
            max_description_len: settings.max_description_len,
            max_amount: Money::from_cents(settings.max_amount_cents),
        }
    }

    /// Validate a candidate against the registry as of `today`
    pub fn validate(
        &self,
        raw: &RawTransaction,
        registry: &CategoryRegistry,
        today: NaiveDate,
    ) -> ValidationResult {
        self.check(raw, registry, today).into()
    }

    fn check(
        &self,
        raw: &RawTransaction,
        registry: &CategoryRegistry,
        today: NaiveDate,
    ) -> Result<NewTransaction, ValidationError> {
        let amount = self.check_amount(&raw.amount)?;
        let date = self.check_date(&raw.date, today)?;

        let category = raw.category.trim();
        if category.is_empty() {
            return Err(ValidationError::new(Field::Category, "is required"));
        }
        if !registry.contains(category) {
            return Err(ValidationError::category_not_found(category));
        }

        let account_type = AccountType::parse(&raw.account_type).ok_or_else(|| {
            ValidationError::new(
                Field::AccountType,
                format!("unknown account type '{}'", raw.account_type.trim()),
            )
        })?;
        let payment_method = PaymentMethod::parse(&raw.payment_method).ok_or_else(|| {
            ValidationError::new(
                Field::PaymentMethod,
                format!("unknown payment method '{}'", raw.payment_method.trim()),
            )
        })?;

        let description = raw.description.trim();
        let length = description.chars().count();
        if length > self.max_description_len {
            return Err(ValidationError::new(
                Field::Description,
                format!(
                    "is {} characters long (max {})",
                    length, self.max_description_len
                ),
            ));
        }

        Ok(NewTransaction {
            date,
            amount,
            category: category.to_string(),
            description: description.to_string(),
            account_type,
            payment_method,
        })
    }

    fn check_amount(&self, input: &str) -> Result<Money, ValidationError> {
        let amount = Money::parse(input).map_err(|e| {
            let reason = match e {
                MoneyParseError::Empty => "is required".to_string(),
                MoneyParseError::TooPrecise(_) => {
                    format!("'{}' has more than two decimal places", input.trim())
                }
                other => other.to_string(),
            };
            ValidationError::new(Field::Amount, reason)
        })?;

        if !amount.is_positive() {
            return Err(ValidationError::new(
                Field::Amount,
                "must be greater than zero",
            ));
        }
        if amount > self.max_amount {
            return Err(ValidationError::new(
                Field::Amount,
                format!("must not exceed {}", self.max_amount.to_decimal_string()),
            ));
        }
        Ok(amount)
    }

    fn check_date(&self, input: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
        if input.trim().is_empty() {
            return Err(ValidationError::new(Field::Date, "is required"));
        }
        let date = parse_date(input).ok_or_else(|| {
            ValidationError::new(
                Field::Date,
                format!(
                    "unrecognized date '{}' (expected YYYY-MM-DD, MM/DD/YYYY, DD.MM.YYYY or YYYY/MM/DD)",
                    input.trim()
                ),
            )
        })?;

        let latest = today + Duration::days(i64::from(self.future_days));
        if date > latest {
            return Err(ValidationError::new(
                Field::Date,
                format!("{} is later than {}", date, latest),
            ));
        }
        Ok(date)
    }
}
