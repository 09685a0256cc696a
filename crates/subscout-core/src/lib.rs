//! Subscout Core Library
//!
//! Recurring payment detection over a snapshot of transaction history:
//! - Payment grouping by merchant and exact amount
//! - Interval regularity testing and cadence classification
//! - Monthly cost normalization and advisory warnings
//! - Pluggable transaction sources (JSON/CSV exports, synthetic history)
//! - Tool adapter returning structured results for agent callers
//! - Layered detection config (override file or embedded defaults)

pub mod config;
pub mod detect;
pub mod error;
pub mod models;
pub mod source;
pub mod tools;

pub use config::DetectionConfig;
pub use detect::{DetectionParams, SubscriptionDetector};
pub use error::{Error, Result};
pub use models::{
    AnalysisReport, Confidence, Frequency, Subscription, TransactionRecord, TransactionType,
};
pub use source::{
    CsvFileSource, JsonFileSource, SampleSource, TransactionQuery, TransactionSource,
};
pub use tools::{AnalyzeSubscriptionsParams, ToolRequest, ToolResult};
