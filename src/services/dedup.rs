//! Duplicate detection
//!
//! Flags candidates that probably repeat a stored transaction or another
//! candidate in the same batch. Nothing is dropped here; the caller decides.
//!
//! Two records match when all of these hold:
//! - same date
//! - amounts differ by at most the configured epsilon
//! - same category (exact)
//! - descriptions match: equal ignoring case and surrounding whitespace,
//!   one contains the other (both non-empty), or their normalized
//!   Levenshtein similarity reaches the threshold

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use strsim::normalized_levenshtein;

use crate::config::DuplicateSettings;
use crate::models::{Money, NewTransaction, Transaction, TransactionId};

/// What a candidate may duplicate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateMatches {
    /// Stored transactions
    pub existing: BTreeSet<TransactionId>,

    /// Other candidates in the same batch, by index
    pub batch: BTreeSet<usize>,
}

impl DuplicateMatches {
    pub fn is_empty(&self) -> bool {
        self.existing.is_empty() && self.batch.is_empty()
    }
}

/// The fields that take part in matching
struct MatchKey<'a> {
    date: NaiveDate,
    amount: Money,
    category: &'a str,
    description: String,
}

impl<'a> MatchKey<'a> {
    fn of_new(txn: &'a NewTransaction) -> Self {
        Self {
            date: txn.date,
            amount: txn.amount,
            category: &txn.category,
            description: txn.description.trim().to_lowercase(),
        }
    }

    fn of_stored(txn: &'a Transaction) -> Self {
        Self {
            date: txn.date,
            amount: txn.amount,
            category: &txn.category,
            description: txn.description.trim().to_lowercase(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DuplicateDetector {
    amount_epsilon: Money,
    similarity_threshold: f64,
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self::new(&DuplicateSettings::default())
    }
}

impl DuplicateDetector {
    pub fn new(settings: &DuplicateSettings) -> Self {
        Self {
            amount_epsilon: Money::from_cents(settings.amount_epsilon_cents.max(0)),
            similarity_threshold: settings.similarity_threshold,
        }
    }

    /// Whether two descriptions count as the same
    pub fn descriptions_match(&self, a: &str, b: &str) -> bool {
        let a = a.trim().to_lowercase();
        let b = b.trim().to_lowercase();
        self.normalized_descriptions_match(&a, &b)
    }

    fn normalized_descriptions_match(&self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        if !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a)) {
            return true;
        }
        normalized_levenshtein(a, b) >= self.similarity_threshold
    }

    fn keys_match(&self, a: &MatchKey<'_>, b: &MatchKey<'_>) -> bool {
        a.date == b.date
            && a.category == b.category
            && a.amount.abs_diff(b.amount) <= self.amount_epsilon
            && self.normalized_descriptions_match(&a.description, &b.description)
    }

    /// Whether a candidate probably repeats a stored transaction
    pub fn is_duplicate(&self, candidate: &NewTransaction, stored: &Transaction) -> bool {
        self.keys_match(&MatchKey::of_new(candidate), &MatchKey::of_stored(stored))
    }

    /// Map each flagged candidate index to what it may duplicate
    ///
    /// Candidates without any match are absent from the result. Matches
    /// within the batch are recorded on both candidates.
    pub fn find_duplicates(
        &self,
        candidates: &[NewTransaction],
        existing: &[Transaction],
    ) -> BTreeMap<usize, DuplicateMatches> {
        let mut stored_by_date: HashMap<NaiveDate, Vec<(TransactionId, MatchKey<'_>)>> =
            HashMap::new();
        for txn in existing {
            stored_by_date
                .entry(txn.date)
                .or_default()
                .push((txn.id, MatchKey::of_stored(txn)));
        }

        let keys: Vec<MatchKey<'_>> = candidates.iter().map(MatchKey::of_new).collect();
        let mut found: BTreeMap<usize, DuplicateMatches> = BTreeMap::new();

        for (index, key) in keys.iter().enumerate() {
            if let Some(same_day) = stored_by_date.get(&key.date) {
                for (id, stored) in same_day {
                    if self.keys_match(key, stored) {
                        found.entry(index).or_default().existing.insert(*id);
                    }
                }
            }

            for (peer, other) in keys.iter().enumerate().skip(index + 1) {
                if self.keys_match(key, other) {
                    found.entry(index).or_default().batch.insert(peer);
                    found.entry(peer).or_default().batch.insert(index);
                }
            }
        }

        found
    }
}
