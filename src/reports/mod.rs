use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ReportError;

pub mod export;
pub mod processors;
pub mod queries;

pub use export::{run_export, ExportSummary, TabExport};
pub use queries::ReportQuery;

/// One report row: named fields such as `metrics.clicks`. A missing field
/// is simply absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportRow {
    fields: Map<String, Value>,
}

impl ReportRow {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

impl From<Map<String, Value>> for ReportRow {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// Where report rows come from.
#[async_trait]
pub trait ReportSource: Send + Sync {
    async fn rows(&self, query: &ReportQuery) -> Result<Vec<ReportRow>, ReportError>;
}

/// Reads previously exported reports from `<dir>/<query name>.json`, each a
/// JSON array of objects keyed by field name. The file is expected to hold
/// the rows the query selects; conditions are not re-applied.
pub struct FileReportSource {
    dir: PathBuf,
}

impl FileReportSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, query: &ReportQuery) -> PathBuf {
        self.dir.join(format!("{}.json", query.name))
    }
}

#[async_trait]
impl ReportSource for FileReportSource {
    async fn rows(&self, query: &ReportQuery) -> Result<Vec<ReportRow>, ReportError> {
        let path = self.path_for(query);
        debug!("Reading report {} from {}", query.name, path.display());

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ReportError::Io {
                name: query.name.clone(),
                source,
            })?;
        let rows: Vec<Map<String, Value>> =
            serde_json::from_str(&content).map_err(|source| ReportError::Decode {
                name: query.name.clone(),
                source,
            })?;

        Ok(rows.into_iter().map(ReportRow::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportConfig;
    use std::fs;

    #[tokio::test]
    async fn reads_rows_from_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let query = queries::daily_query(&ReportConfig::default());
        fs::write(
            dir.path().join("daily.json"),
            r#"[{"campaign.id": "7", "metrics.clicks": "12"}, {"campaign.id": 8}]"#,
        )
        .unwrap();

        let rows = FileReportSource::new(dir.path()).rows(&query).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("metrics.clicks"), Some(&Value::from("12")));
        assert_eq!(rows[1].get("metrics.clicks"), None);
    }

    #[tokio::test]
    async fn missing_and_malformed_files_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileReportSource::new(dir.path());
        let query = queries::daily_query(&ReportConfig::default());

        assert!(matches!(source.rows(&query).await, Err(ReportError::Io { .. })));

        fs::write(dir.path().join("daily.json"), r#"{"error": "quota"}"#).unwrap();
        assert!(matches!(source.rows(&query).await, Err(ReportError::Decode { .. })));
    }
}
