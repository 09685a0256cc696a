//! Transaction sources
//!
//! The detector never fetches anything itself. A `TransactionSource` hands it
//! a snapshot of raw transaction records for a user.
//!
//! # Architecture
//!
//! - `TransactionSource` trait defines the interface for history providers
//! - `JsonFileSource` reads an exported JSON file
//! - `CsvFileSource` reads an exported CSV file
//! - `SampleSource` manufactures deterministic synthetic history
//!
//! Sources return raw JSON records. Decoding into `TransactionRecord` happens
//! per record in the tool adapter, so one malformed record never sinks a fetch.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::models::TransactionRecord;

mod file;
mod sample;

pub use file::{CsvFileSource, JsonFileSource};
pub use sample::SampleSource;

/// Filter passed to a transaction source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionQuery {
    pub user_id: String,
    /// Only records on or after this date
    pub start_date: Option<NaiveDate>,
    /// Maximum number of records to return
    pub limit: usize,
}

impl TransactionQuery {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            start_date: None,
            limit: 500,
        }
    }

    pub fn since(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Whether a record falls inside the start-date filter.
    ///
    /// Records whose date can't be parsed are kept; the detector decides what
    /// to do with them.
    pub fn admits(&self, record: &TransactionRecord) -> bool {
        match (self.start_date, record.parsed_date()) {
            (Some(start), Some(date)) => date.date_naive() >= start,
            _ => true,
        }
    }
}

/// Trait for transaction history providers
///
/// Implementations handle fetching history from different places:
/// - Exported files
/// - Synthetic generators
/// - Banking APIs
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Human-readable name for this source
    fn name(&self) -> &str;

    /// Fetch raw transaction records matching the query
    async fn fetch(&self, query: &TransactionQuery) -> Result<Vec<serde_json::Value>>;
}

/// Apply the start-date filter and limit to raw records
pub(crate) fn apply_query(
    records: Vec<serde_json::Value>,
    query: &TransactionQuery,
) -> Vec<serde_json::Value> {
    records
        .into_iter()
        .filter(|value| match query.start_date {
            None => true,
            Some(_) => serde_json::from_value::<TransactionRecord>(value.clone())
                .map(|record| query.admits(&record))
                .unwrap_or(true),
        })
        .take(query.limit)
        .collect()
}
