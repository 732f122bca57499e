use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::config::{NamedValues, ReportConfig};
use crate::error::FetchError;
use crate::metrics::MetricRow;
use crate::store::TabStore;

pub mod client;
pub mod tabs;

pub use client::SheetClient;
pub use tabs::{TabRow, TabTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SheetTab {
    Daily,
    SearchTerms,
    Daily2,
    ProductPerformance,
    ConfigInfo,
    Api,
}

impl SheetTab {
    pub const ALL: [SheetTab; 6] = [
        SheetTab::Daily,
        SheetTab::SearchTerms,
        SheetTab::Daily2,
        SheetTab::ProductPerformance,
        SheetTab::ConfigInfo,
        SheetTab::Api,
    ];
}

/// What a tab read produced. Zero rows and an unrecognized payload are
/// different outcomes and callers can tell them apart.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Rows(Vec<TabRow>),
    Empty,
    Malformed(String),
}

/// Where the dashboard reads tabs from.
#[derive(Clone)]
pub enum TabSource {
    Http(SheetClient),
    Store(TabStore),
}

impl TabSource {
    pub async fn fetch_tab(&self, name: &str) -> Result<FetchOutcome, FetchError> {
        match self {
            TabSource::Http(client) => client.fetch_tab(name).await,
            TabSource::Store(store) => {
                let rows = store.read_tab(name).await?;
                Ok(if rows.is_empty() {
                    FetchOutcome::Empty
                } else {
                    FetchOutcome::Rows(rows)
                })
            }
        }
    }
}

/// Every tab the dashboard needs, parsed. Tabs that could not be read are
/// empty and described in `warnings`.
#[derive(Debug, Clone, Default)]
pub struct TabData {
    pub daily: Vec<MetricRow>,
    pub daily2: Vec<MetricRow>,
    pub search_terms: Vec<MetricRow>,
    pub products: Vec<MetricRow>,
    pub config_info: NamedValues,
    pub api: NamedValues,
    pub warnings: Vec<String>,
}

impl TabData {
    /// Campaign-day rows of the requested daily tab.
    pub fn campaign_days(&self, tab: SheetTab) -> &[MetricRow] {
        match tab {
            SheetTab::Daily2 => &self.daily2,
            _ => &self.daily,
        }
    }

    /// Config and API values merged; API entries win on conflicts.
    pub fn named_values(&self) -> NamedValues {
        let mut merged = self.config_info.clone();
        merged.extend(self.api.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}

/// Fetches all tabs concurrently and waits for every one of them before
/// returning. A failing tab never fails the others.
pub async fn fetch_all_tabs(source: &TabSource, config: &ReportConfig) -> TabData {
    let results = join_all(SheetTab::ALL.iter().map(|&tab| async move {
        let name = config.tab_name(tab);
        (tab, name, source.fetch_tab(name).await)
    }))
    .await;

    let mut data = TabData::default();
    for (tab, name, result) in results {
        let rows = match result {
            Ok(FetchOutcome::Rows(rows)) => rows,
            Ok(FetchOutcome::Empty) => {
                debug!("Tab {} has no rows", name);
                Vec::new()
            }
            Ok(FetchOutcome::Malformed(reason)) => {
                warn!("Tab {} returned an unrecognized response: {}", name, reason);
                data.warnings.push(format!("{}: {}", name, reason));
                Vec::new()
            }
            Err(e) => {
                warn!("Failed to fetch tab {}: {}", name, e);
                data.warnings.push(format!("{}: failed to load", name));
                Vec::new()
            }
        };

        match tab {
            SheetTab::Daily => {
                data.daily = rows.iter().map(tabs::campaign_day_from_tab).collect()
            }
            SheetTab::Daily2 => {
                data.daily2 = rows.iter().map(tabs::campaign_day_from_tab).collect()
            }
            SheetTab::SearchTerms => {
                data.search_terms = rows.iter().map(tabs::search_term_from_tab).collect()
            }
            SheetTab::ProductPerformance => {
                data.products = rows.iter().map(tabs::product_from_tab).collect()
            }
            SheetTab::ConfigInfo => data.config_info = tabs::named_values_from_tab(&rows),
            SheetTab::Api => data.api = tabs::named_values_from_tab(&rows),
        }
    }

    data
}
