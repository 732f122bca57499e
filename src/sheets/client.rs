use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::tabs::TabRow;
use super::FetchOutcome;
use crate::error::FetchError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Reads tabs from a remote sheet endpoint answering `GET <url>?tab=<name>`.
#[derive(Clone)]
pub struct SheetClient {
    http: Client,
    base: Url,
}

impl SheetClient {
    pub fn new(base: &str) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base: Url::parse(base)?,
        })
    }

    pub fn tab_url(&self, tab: &str) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut().append_pair("tab", tab);
        url
    }

    pub async fn fetch_tab(&self, tab: &str) -> Result<FetchOutcome, FetchError> {
        let url = self.tab_url(tab);
        debug!("Fetching tab {} from {}", tab, url);

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        Ok(match serde_json::from_str::<Value>(&body) {
            Ok(value) => classify_response(value),
            Err(e) => FetchOutcome::Malformed(format!("body is not JSON: {}", e)),
        })
    }
}

/// Accepts a bare array of row objects or an object wrapping one under
/// `data`. An `error` field or any other shape is malformed.
pub fn classify_response(value: Value) -> FetchOutcome {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut object) => {
            if let Some(error) = object.get("error") {
                let reason = match error {
                    Value::String(s) => s.clone(),
                    Value::Object(inner) => inner
                        .get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| error.to_string()),
                    other => other.to_string(),
                };
                return FetchOutcome::Malformed(format!("endpoint reported an error: {}", reason));
            }
            match object.remove("data") {
                Some(Value::Array(items)) => items,
                Some(_) => return FetchOutcome::Malformed("`data` is not an array".to_string()),
                None => return FetchOutcome::Malformed("unrecognized response shape".to_string()),
            }
        }
        _ => return FetchOutcome::Malformed("unrecognized response shape".to_string()),
    };

    if items.is_empty() {
        return FetchOutcome::Empty;
    }

    let mut rows: Vec<TabRow> = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(row) => rows.push(row),
            _ => return FetchOutcome::Malformed(format!("row {} is not an object", i)),
        }
    }
    FetchOutcome::Rows(rows)
}
