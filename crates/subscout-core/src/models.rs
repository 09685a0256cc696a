//! Domain models for Subscout

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a transaction as reported by the transaction source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Outbound payment (the only kind considered for subscriptions)
    Send,
    Receive,
    Deposit,
    Withdrawal,
    /// Anything the source reports that we don't recognize
    #[default]
    #[serde(other)]
    Other,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::Receive => "receive",
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::Other => "other",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "send" => Ok(Self::Send),
            "receive" => Ok(Self::Receive),
            "deposit" => Ok(Self::Deposit),
            "withdrawal" => Ok(Self::Withdrawal),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A transaction as returned by a transaction source
///
/// Dates stay as raw strings: a record whose date does not parse is skipped
/// during detection rather than rejected at decode time. Fields the detector
/// never reads (`id`, `currency`, `status`, `created_at`) accept any JSON
/// value, so an odd bookkeeping field never costs a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient::tx_type")]
    pub tx_type: TransactionType,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub amount: f64,
    #[serde(
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub description: Option<String>,
    /// Counterparty of the payment (also accepted as `counterparty`)
    #[serde(default, alias = "counterparty", deserialize_with = "lenient::opt_text")]
    pub recipient: Option<String>,
    /// ISO-8601 timestamp, e.g. `2024-03-01T09:30:00Z`
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<String>,
}

impl TransactionRecord {
    /// Minimal outbound payment, mostly useful for tests and fixtures
    pub fn send(description: &str, amount: f64, date: &str) -> Self {
        Self {
            id: None,
            tx_type: TransactionType::Send,
            amount,
            currency: None,
            description: Some(description.to_string()),
            recipient: None,
            date: date.to_string(),
            status: "completed".to_string(),
            created_at: None,
        }
    }

    /// Merchant label: description, then recipient, then "Unknown"
    pub fn merchant(&self) -> &str {
        [self.description.as_deref(), self.recipient.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or("Unknown")
    }

    /// Parse the date under RFC 3339; `None` if it doesn't parse
    pub fn parsed_date(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.date)
            .ok()
            .map(|d| d.with_timezone(&Utc))
    }
}

/// Billing cadence of a detected subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
    /// Recurring but matching no known cadence
    Irregular,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::SemiAnnual => "semi-annual",
            Self::Annual => "annual",
            Self::Irregular => "irregular",
        }
    }

    /// Multiplier turning one payment into a monthly-equivalent amount.
    ///
    /// Irregular payments are listed but don't count toward the monthly total.
    pub fn monthly_factor(&self) -> f64 {
        match self {
            Self::Monthly => 1.0,
            Self::Quarterly => 1.0 / 3.0,
            Self::SemiAnnual => 1.0 / 6.0,
            Self::Annual => 1.0 / 12.0,
            Self::Biweekly => 2.167,
            Self::Weekly => 4.333,
            Self::Irregular => 0.0,
        }
    }

    /// Expected date of the payment after `last`, if the cadence is known
    pub fn next_after(&self, last: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Monthly => last.checked_add_months(Months::new(1)),
            Self::Quarterly => last.checked_add_months(Months::new(3)),
            Self::SemiAnnual => last.checked_add_months(Months::new(6)),
            Self::Annual => last.checked_add_months(Months::new(12)),
            Self::Biweekly => last.checked_add_days(chrono::Days::new(14)),
            Self::Weekly => last.checked_add_days(chrono::Days::new(7)),
            Self::Irregular => None,
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "semi-annual" | "semiannual" => Ok(Self::SemiAnnual),
            "annual" | "yearly" => Ok(Self::Annual),
            "irregular" => Ok(Self::Irregular),
            _ => Err(format!("Unknown frequency: {}", s)),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How much to trust a detected subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Tier from the number of payments seen and whether their gaps are regular
    pub fn assess(occurrences: usize, regular: bool) -> Self {
        if occurrences >= 4 && regular {
            Self::High
        } else if occurrences >= 3 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A detected recurring payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub merchant: String,
    /// Amount of a single payment
    pub amount: f64,
    pub frequency: Frequency,
    /// Number of payments in the series (always >= 2)
    pub occurrences: usize,
    pub last_occurrence: NaiveDate,
    /// Serialized as `YYYY-MM-DD`, or `"unknown"` for irregular cadences
    #[serde(with = "estimated_next")]
    pub estimated_next: Option<NaiveDate>,
    pub total_paid: f64,
    pub confidence: Confidence,
}

/// Output of a detection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Human-readable lookback window, e.g. "6 months"
    pub analysis_period: String,
    pub total_transactions_scanned: usize,
    pub subscriptions_found: usize,
    pub subscriptions: Vec<Subscription>,
    pub total_monthly_cost: f64,
    pub warnings: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// Field decoders that coerce instead of failing
///
/// Scalars become text (`1001` reads as `"1001"`); `null`, arrays and objects
/// read as absent. Only an amount that is present but not numeric is an error.
mod lenient {
    use serde::{de::Error, Deserialize, Deserializer};
    use serde_json::Value;

    use super::TransactionType;

    fn scalar_text(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
    }

    pub fn opt_text<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(scalar_text(Value::deserialize(deserializer)?).filter(|s| !s.is_empty()))
    }

    pub fn tx_type<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<TransactionType, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => s.parse().unwrap_or(TransactionType::Other),
            _ => TransactionType::Other,
        })
    }

    pub fn amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(0.0),
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| D::Error::custom("amount out of range")),
            Value::String(s) => s
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("amount is not a number: {:?}", s))),
            other => Err(D::Error::custom(format!("amount is not a number: {}", other))),
        }
    }
}

mod estimated_next {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";
    const UNKNOWN: &str = "unknown";

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_str(UNKNOWN),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s == UNKNOWN {
            return Ok(None);
        }
        NaiveDate::parse_from_str(&s, FORMAT)
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}
