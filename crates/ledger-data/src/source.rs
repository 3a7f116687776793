//! Raw record sources: where a session's sheet rows come from.
//!
//! A source hands back the rows as untyped JSON values exactly as it got
//! them; all interpretation happens in the normalizer.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use ledger_core::error::{LedgerError, Result};
use ledger_core::settings::SourceConfig;
use serde_json::Value;
use tracing::{debug, warn};

/// Keys under which a wrapped payload may carry its rows.
const WRAPPER_KEYS: [&str; 2] = ["data", "records"];

// ── RawRecordSource ───────────────────────────────────────────────────────────

/// Supplies the ordered raw records for one session.
#[async_trait]
pub trait RawRecordSource: Send + Sync {
    /// Fetch every record. Called once per session.
    async fn fetch(&self) -> Result<Vec<Value>>;

    /// Short human-readable origin, used in logs.
    fn describe(&self) -> String;
}

/// Build the source selected by the settings, or `None` when nothing usable
/// was configured.
pub fn from_config(config: &SourceConfig) -> Result<Option<Box<dyn RawRecordSource>>> {
    let source: Box<dyn RawRecordSource> = match config {
        SourceConfig::Http { url, timeout } => Box::new(HttpSource::new(url.clone(), *timeout)?),
        SourceConfig::File(path) => Box::new(FileSource::new(path.clone())),
        SourceConfig::Unconfigured => return Ok(None),
    };
    Ok(Some(source))
}

// ── HttpSource ────────────────────────────────────────────────────────────────

/// GETs a JSON array of rows from a published sheet web app.
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    /// The URL is fixed at construction; requests give up after `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::Fetch {
                url: url.clone(),
                message: e.to_string(),
            })?;
        Ok(Self { url, client })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn fetch_error(&self, e: reqwest::Error) -> LedgerError {
        LedgerError::Fetch {
            url: self.url.clone(),
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl RawRecordSource for HttpSource {
    async fn fetch(&self) -> Result<Vec<Value>> {
        debug!(url = %self.url, "requesting sheet records");

        let payload: Value = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.fetch_error(e))?
            .error_for_status()
            .map_err(|e| self.fetch_error(e))?
            .json()
            .await
            .map_err(|e| self.fetch_error(e))?;

        records_from_payload(payload)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

// ── FileSource ────────────────────────────────────────────────────────────────

/// Reads rows from a local export: a `.jsonl` file with one record per line,
/// or any other file holding a single JSON payload.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_jsonl(&self) -> bool {
        self.path
            .extension()
            .map(|ext| ext == "jsonl")
            .unwrap_or(false)
    }
}

#[async_trait]
impl RawRecordSource for FileSource {
    async fn fetch(&self) -> Result<Vec<Value>> {
        let content =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|source| LedgerError::FileRead {
                    path: self.path.clone(),
                    source,
                })?;

        if self.is_jsonl() {
            return Ok(parse_jsonl(&content, &self.path));
        }

        records_from_payload(serde_json::from_str(&content)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ── StaticSource ──────────────────────────────────────────────────────────────

/// Records held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<Value>,
}

impl StaticSource {
    pub fn new(records: Vec<Value>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl RawRecordSource for StaticSource {
    async fn fetch(&self) -> Result<Vec<Value>> {
        Ok(self.records.clone())
    }

    fn describe(&self) -> String {
        format!("{} in-memory records", self.records.len())
    }
}

// ── Payload helpers ───────────────────────────────────────────────────────────

/// Pull the row list out of a decoded payload.
///
/// Accepts a bare array, or an object carrying the array under `data` or
/// `records`.
pub fn records_from_payload(payload: Value) -> Result<Vec<Value>> {
    match payload {
        Value::Array(records) => Ok(records),
        Value::Object(mut map) => {
            for key in WRAPPER_KEYS {
                if let Some(Value::Array(records)) = map.remove(key) {
                    return Ok(records);
                }
            }
            Err(LedgerError::UnexpectedShape(
                "object without a data or records array".to_string(),
            ))
        }
        other => Err(LedgerError::UnexpectedShape(format!(
            "expected an array of records, got {}",
            kind_of(&other)
        ))),
    }
}

/// One record per non-blank line; malformed lines are skipped.
fn parse_jsonl(content: &str, path: &Path) -> Vec<Value> {
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (line_no, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str(trimmed) {
            Ok(value) => records.push(value),
            Err(e) => {
                skipped += 1;
                debug!(
                    "Skipping malformed line {} in {}: {}",
                    line_no + 1,
                    path.display(),
                    e
                );
            }
        }
    }

    if skipped > 0 {
        warn!(
            "{} malformed line(s) skipped in {}",
            skipped,
            path.display()
        );
    }

    records
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).expect("create file");
        file.write_all(content.as_bytes()).expect("write file");
        path
    }

    #[test]
    fn test_records_from_bare_array() {
        let records = records_from_payload(json!([{"a": 1}, {"b": 2}])).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_records_from_wrapped_object() {
        let records = records_from_payload(json!({"data": [{"a": 1}]})).unwrap();
        assert_eq!(records.len(), 1);

        let records = records_from_payload(json!({"records": []})).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_records_from_unexpected_payload() {
        let err = records_from_payload(json!("oops")).unwrap_err();
        assert!(err.to_string().contains("got a string"));

        let err = records_from_payload(json!({"rows": []})).unwrap_err();
        assert!(matches!(err, LedgerError::UnexpectedShape(_)));
    }

    #[tokio::test]
    async fn test_file_source_reads_json_array() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "records.json",
            r#"[{"month": "1월", "금액": 3}, {"month": "2월"}]"#,
        );

        let records = FileSource::new(&path).fetch().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["금액"], 3);
    }

    #[tokio::test]
    async fn test_file_source_reads_jsonl_and_skips_malformed() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "records.jsonl",
            "{\"month\": \"1월\"}\n{broken\n\n{\"month\": \"2월\"}\n",
        );

        let records = FileSource::new(&path).fetch().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["month"], "2월");
    }

    #[tokio::test]
    async fn test_file_source_missing_file_is_file_read_error() {
        let dir = TempDir::new().unwrap();
        let source = FileSource::new(dir.path().join("absent.json"));

        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, LedgerError::FileRead { .. }));
        assert!(source.describe().ends_with("absent.json"));
    }

    #[tokio::test]
    async fn test_file_source_invalid_json_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "records.json", "[{");

        let err = FileSource::new(&path).fetch().await.unwrap_err();
        assert!(matches!(err, LedgerError::JsonParse(_)));
    }

    #[tokio::test]
    async fn test_static_source_returns_records() {
        let source = StaticSource::new(vec![json!({"a": 1})]);
        assert_eq!(source.fetch().await.unwrap().len(), 1);
        assert_eq!(source.describe(), "1 in-memory records");
    }

    #[tokio::test]
    async fn test_http_source_unreachable_is_fetch_error() {
        let source = HttpSource::new("http://127.0.0.1:9/exec", Duration::from_secs(2)).unwrap();
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, LedgerError::Fetch { .. }));
        assert_eq!(source.url(), "http://127.0.0.1:9/exec");
    }

    #[test]
    fn test_from_config() {
        assert!(from_config(&SourceConfig::Unconfigured).unwrap().is_none());

        let source = from_config(&SourceConfig::File(PathBuf::from("a.json")))
            .unwrap()
            .expect("file source");
        assert_eq!(source.describe(), "a.json");

        let source = from_config(&SourceConfig::Http {
            url: "https://example.com/exec".to_string(),
            timeout: Duration::from_secs(3),
        })
        .unwrap()
        .expect("http source");
        assert_eq!(source.describe(), "https://example.com/exec");
    }
}
