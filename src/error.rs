use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("invalid sheet url: {0}")]
    Url(#[from] url::ParseError),
    #[error("local tab store: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report {name} could not be read: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("report {name} is not a JSON array of rows: {source}")]
    Decode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),
    #[error("stored row is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(tokio_rusqlite::Error::Rusqlite(e))
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("title analysis service unavailable: {0}")]
    Unavailable(String),
    #[error("title analysis service returned an unusable response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid bind address {value:?}: {source}")]
    BindAddress {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("conversion actions unavailable: {0}")]
    Conversions(String),
    #[error("tab {0} is not produced by the export")]
    NotExported(String),
}
