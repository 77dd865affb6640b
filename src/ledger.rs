use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::warn;

/// Day-keyed record of how many ounces were logged on each calendar date.
///
/// Keys are always canonical `YYYY-MM-DD` dates so the same day maps to the
/// same entry regardless of where the data was written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeLedger {
    days: BTreeMap<NaiveDate, u64>,
}

impl IntakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from raw persisted entries, dropping any whose key is
    /// not an ISO calendar date.
    pub fn from_entries(entries: BTreeMap<String, u64>) -> Self {
        let mut days = BTreeMap::new();
        for (key, amount) in entries {
            match parse_date_key(&key) {
                Some(date) => {
                    days.insert(date, amount);
                }
                None => warn!("dropping history entry with invalid date key {key:?}"),
            }
        }
        Self { days }
    }

    pub fn record_intake(&mut self, date: NaiveDate, amount: u64) {
        self.days.insert(date, amount);
    }

    pub fn get_intake(&self, date: NaiveDate) -> u64 {
        self.days.get(&date).copied().unwrap_or_default()
    }

    pub fn clear_all(&mut self) {
        self.days.clear();
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Flat string-keyed table in the persisted form.
    pub fn to_entries(&self) -> BTreeMap<String, u64> {
        self.days
            .iter()
            .map(|(date, amount)| (date_key(*date), *amount))
            .collect()
    }
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), "%Y-%m-%d").ok()
}
