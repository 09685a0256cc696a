//! File-backed transaction sources

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{apply_query, TransactionQuery, TransactionSource};
use crate::error::{Error, Result};
use crate::models::TransactionRecord;

/// Transaction history exported as JSON
///
/// Accepts either `{"transactions": [...]}` or a bare array of records.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TransactionSource for JsonFileSource {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn fetch(&self, query: &TransactionQuery) -> Result<Vec<serde_json::Value>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let records = parse_json_records(&content)?;
        debug!(
            "Read {} records from {}",
            records.len(),
            self.path.display()
        );
        Ok(apply_query(records, query))
    }
}

/// Extract the record array from a JSON document
pub fn parse_json_records(content: &str) -> Result<Vec<serde_json::Value>> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    match value {
        serde_json::Value::Array(records) => Ok(records),
        serde_json::Value::Object(mut map) => match map.remove("transactions") {
            Some(serde_json::Value::Array(records)) => Ok(records),
            _ => Err(Error::InvalidData(
                "expected a \"transactions\" array".to_string(),
            )),
        },
        _ => Err(Error::InvalidData(
            "expected a JSON array or object of transactions".to_string(),
        )),
    }
}

/// Transaction history exported as CSV
///
/// Expected header: `type,amount,description,recipient,date,status`
/// (extra columns such as `id` or `currency` are fine). Rows that fail to
/// decode are skipped.
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TransactionSource for CsvFileSource {
    fn name(&self) -> &str {
        "csv-file"
    }

    async fn fetch(&self, query: &TransactionQuery) -> Result<Vec<serde_json::Value>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let records = parse_csv_records(content.as_bytes())?;
        Ok(apply_query(records, query))
    }
}

/// Parse CSV rows into raw JSON records
pub fn parse_csv_records<R: std::io::Read>(reader: R) -> Result<Vec<serde_json::Value>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    // Fail early on an unreadable header
    rdr.headers()?;

    let mut records = Vec::new();
    for (row, result) in rdr.deserialize::<TransactionRecord>().enumerate() {
        match result {
            Ok(record) => records.push(serde_json::to_value(record)?),
            Err(e) => debug!("Skipping CSV row {}: {}", row + 2, e),
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_json_wrapped_and_bare() {
        let wrapped = r#"{"transactions": [{"type": "send", "amount": 1.5}], "total": 1}"#;
        assert_eq!(parse_json_records(wrapped).unwrap().len(), 1);

        let bare = r#"[{"type": "send"}, {"type": "receive"}]"#;
        assert_eq!(parse_json_records(bare).unwrap().len(), 2);

        assert!(matches!(
            parse_json_records(r#"{"items": []}"#),
            Err(Error::InvalidData(_))
        ));
        assert!(matches!(parse_json_records("42"), Err(Error::InvalidData(_))));
        assert!(matches!(parse_json_records("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_parse_csv_skips_bad_rows() {
        let csv = "type,amount,description,recipient,date,status\n\
                   send,15.99,Netflix,,2024-01-01T00:00:00Z,completed\n\
                   send,not-a-number,Broken,,2024-01-01T00:00:00Z,completed\n\
                   receive,100.00,,@alice,2024-01-02T00:00:00Z,completed\n";
        let records = parse_csv_records(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);

        let first: TransactionRecord = serde_json::from_value(records[0].clone()).unwrap();
        assert_eq!(first.merchant(), "Netflix");
        assert_eq!(first.amount, 15.99);

        let second: TransactionRecord = serde_json::from_value(records[1].clone()).unwrap();
        assert_eq!(second.merchant(), "@alice");
    }

    #[tokio::test]
    async fn test_json_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"transactions": [
                {{"type": "send", "amount": 9.99, "description": "Old", "date": "2023-06-01T00:00:00Z"}},
                {{"type": "send", "amount": 9.99, "description": "New", "date": "2024-06-01T00:00:00Z"}}
            ]}}"#
        )
        .unwrap();

        let source = JsonFileSource::new(file.path());
        assert_eq!(source.name(), "json-file");

        let query = TransactionQuery::new("u")
            .since(chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let records = source.fetch(&query).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["description"], "New");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let source = JsonFileSource::new("/definitely/not/here.json");
        let err = source.fetch(&TransactionQuery::new("u")).await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn test_csv_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,type,amount,description,recipient,date,status").unwrap();
        writeln!(file, "t1,send,10.99,Spotify,,2024-03-01T00:00:00Z,completed").unwrap();
        writeln!(file, "t2,send,10.99,Spotify,,2024-04-01T00:00:00Z,completed").unwrap();

        let source = CsvFileSource::new(file.path());
        let records = source.fetch(&TransactionQuery::new("u").limit(1)).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["id"], "t1");
    }
}
