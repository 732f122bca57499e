use std::sync::Arc;

use rusqlite::{params, OptionalExtension};
use serde::Serialize;
use serde_json::Value;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::config::NamedValues;
use crate::error::StoreError;
use crate::sheets::tabs::{named_values_from_tab, named_values_table, TabRow, TabTable};

/// Local stand-in for the spreadsheet: named tabs of rows under ordered
/// headers, persisted in SQLite.
#[derive(Clone)]
pub struct TabStore {
    db: Arc<Connection>,
}

impl TabStore {
    pub fn new(db: Arc<Connection>) -> Self {
        Self { db }
    }

    /// Every row of the tab in written order. A tab that was never written
    /// reads as empty.
    pub async fn read_tab(&self, name: &str) -> Result<Vec<TabRow>, StoreError> {
        let tab = name.to_string();
        let (headers, cells) = self
            .db
            .call(move |conn| {
                let headers: Option<String> = conn
                    .query_row(
                        "SELECT headers FROM tabs WHERE name = ?1",
                        params![tab],
                        |row| row.get(0),
                    )
                    .optional()?;

                let mut stmt =
                    conn.prepare("SELECT cells FROM tab_rows WHERE tab = ?1 ORDER BY position")?;
                let cells = stmt
                    .query_map(params![tab], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;

                Ok((headers, cells))
            })
            .await?;

        let Some(headers) = headers else {
            return Ok(Vec::new());
        };
        let headers: Vec<String> = serde_json::from_str(&headers)?;

        cells
            .iter()
            .map(|raw| -> Result<TabRow, StoreError> {
                let values: Vec<Value> = serde_json::from_str(raw)?;
                Ok(headers
                    .iter()
                    .cloned()
                    .zip(values)
                    .collect::<TabRow>())
            })
            .collect()
    }

    pub async fn tab_headers(&self, name: &str) -> Result<Option<Vec<String>>, StoreError> {
        let tab = name.to_string();
        let headers: Option<String> = self
            .db
            .call(move |conn| {
                Ok(conn
                    .query_row(
                        "SELECT headers FROM tabs WHERE name = ?1",
                        params![tab],
                        |row| row.get(0),
                    )
                    .optional()?)
            })
            .await?;

        match headers {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Replaces the tab's headers and rows in one transaction. Cells are
    /// stored in header order; columns a row lacks are written as null.
    pub async fn replace_tab(&self, name: &str, table: &TabTable) -> Result<usize, StoreError> {
        let tab = name.to_string();
        let headers = serde_json::to_string(table.headers)?;
        let cells = table
            .rows
            .iter()
            .map(|row| {
                let ordered: Vec<&Value> = table
                    .headers
                    .iter()
                    .map(|header| row.get(*header).unwrap_or(&Value::Null))
                    .collect();
                serde_json::to_string(&ordered)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let written = self
            .db
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM tab_rows WHERE tab = ?1", params![tab])?;
                tx.execute(
                    "INSERT INTO tabs (name, headers, updated_at) VALUES (?1, ?2, unixepoch())
                     ON CONFLICT(name) DO UPDATE
                     SET headers = excluded.headers, updated_at = excluded.updated_at",
                    params![tab, headers],
                )?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO tab_rows (tab, position, cells) VALUES (?1, ?2, ?3)",
                    )?;
                    for (position, row) in cells.iter().enumerate() {
                        stmt.execute(params![tab, position as i64, row])?;
                    }
                }
                tx.commit()?;
                Ok(cells.len())
            })
            .await?;

        debug!("Replaced tab {} with {} rows", name, written);
        Ok(written)
    }

    pub async fn named_values(&self, tab: &str) -> Result<NamedValues, StoreError> {
        let rows = self.read_tab(tab).await?;
        Ok(named_values_from_tab(&rows))
    }

    pub async fn set_named_values(
        &self,
        tab: &str,
        values: &NamedValues,
    ) -> Result<usize, StoreError> {
        self.replace_tab(tab, &named_values_table(values)).await
    }

    pub async fn record_export(
        &self,
        tabs_written: usize,
        tabs_failed: usize,
        warnings: &[String],
    ) -> Result<(), StoreError> {
        let warnings = serde_json::to_string(warnings)?;
        self.db
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO export_runs (started_at, tabs_written, tabs_failed, warnings)
                     VALUES (unixepoch(), ?1, ?2, ?3)",
                    params![tabs_written as i64, tabs_failed as i64, warnings],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    pub async fn latest_export(&self) -> Result<Option<ExportRun>, StoreError> {
        let row = self
            .db
            .call(|conn| {
                Ok(conn
                    .query_row(
                        "SELECT started_at, tabs_written, tabs_failed, warnings
                         FROM export_runs ORDER BY id DESC LIMIT 1",
                        [],
                        |row| {
                            Ok((
                                row.get::<_, i64>(0)?,
                                row.get::<_, i64>(1)?,
                                row.get::<_, i64>(2)?,
                                row.get::<_, String>(3)?,
                            ))
                        },
                    )
                    .optional()?)
            })
            .await?;

        match row {
            Some((started_at, written, failed, warnings)) => Ok(Some(ExportRun {
                started_at,
                tabs_written: written.max(0) as usize,
                tabs_failed: failed.max(0) as usize,
                warnings: serde_json::from_str(&warnings)?,
            })),
            None => Ok(None),
        }
    }
}

/// Outcome of the most recent export, as recorded by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRun {
    pub started_at: i64,
    pub tabs_written: usize,
    pub tabs_failed: usize,
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::initialize_database;
    use crate::sheets::tabs::DAILY_HEADERS;
    use serde_json::json;

    async fn store() -> TabStore {
        let db = Connection::open_in_memory().await.unwrap();
        initialize_database(&db).await.unwrap();
        TabStore::new(Arc::new(db))
    }

    fn daily_row(campaign: &str, cost: f64) -> TabRow {
        json!({"campaign": campaign, "campaignId": "1", "cost": cost, "date": "2024-05-01"})
            .as_object()
            .cloned()
            .unwrap()
    }

    #[tokio::test]
    async fn unknown_tab_reads_empty() {
        let store = store().await;
        assert!(store.read_tab("daily").await.unwrap().is_empty());
        assert_eq!(store.tab_headers("daily").await.unwrap(), None);
    }

    #[tokio::test]
    async fn replace_tab_overwrites_previous_rows() {
        let store = store().await;
        let first = TabTable {
            headers: DAILY_HEADERS,
            rows: vec![daily_row("A", 1.0), daily_row("B", 2.0)],
        };
        let second = TabTable {
            headers: DAILY_HEADERS,
            rows: vec![daily_row("C", 3.0)],
        };

        assert_eq!(store.replace_tab("daily", &first).await.unwrap(), 2);
        assert_eq!(store.replace_tab("daily", &second).await.unwrap(), 1);

        let rows = store.read_tab("daily").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["campaign"], json!("C"));
        assert_eq!(rows[0]["cost"], json!(3.0));
        assert_eq!(rows[0]["impr"], Value::Null);

        let headers = store.tab_headers("daily").await.unwrap().unwrap();
        assert_eq!(headers, DAILY_HEADERS);
    }

    #[tokio::test]
    async fn tabs_are_isolated() {
        let store = store().await;
        let table = TabTable {
            headers: DAILY_HEADERS,
            rows: vec![daily_row("A", 1.0)],
        };
        store.replace_tab("daily", &table).await.unwrap();
        store.replace_tab("daily2", &table).await.unwrap();
        store
            .replace_tab("daily2", &TabTable { headers: DAILY_HEADERS, rows: vec![] })
            .await
            .unwrap();

        assert_eq!(store.read_tab("daily").await.unwrap().len(), 1);
        assert!(store.read_tab("daily2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn named_values_round_trip() {
        let store = store().await;
        let mut values = NamedValues::new();
        values.insert("apiKey".to_string(), "k-123".to_string());
        values.insert("website".to_string(), "https://shop.example.com".to_string());

        store.set_named_values("api", &values).await.unwrap();
        assert_eq!(store.named_values("api").await.unwrap(), values);
    }

    #[tokio::test]
    async fn records_latest_export() {
        let store = store().await;
        assert_eq!(store.latest_export().await.unwrap(), None);

        store.record_export(4, 0, &[]).await.unwrap();
        store
            .record_export(3, 1, &["daily2: no purchase conversions".to_string()])
            .await
            .unwrap();

        let run = store.latest_export().await.unwrap().unwrap();
        assert_eq!(run.tabs_written, 3);
        assert_eq!(run.tabs_failed, 1);
        assert_eq!(run.warnings, vec!["daily2: no purchase conversions".to_string()]);
    }
}
