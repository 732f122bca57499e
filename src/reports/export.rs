use serde::Serialize;
use tracing::{error, info, warn};

use super::processors;
use super::queries::{
    conversion_action_query, daily2_query, daily_query, product_performance_query,
    search_terms_query,
};
use super::ReportSource;
use crate::config::ReportConfig;
use crate::conversions::{build_conversion_index, ConversionIndex};
use crate::error::{ExportError, ReportError};
use crate::sheets::tabs::{daily2_table, daily_table, product_table, search_terms_table, TabTable};
use crate::sheets::SheetTab;
use crate::store::TabStore;

const EXPORTED_TABS: [SheetTab; 4] = [
    SheetTab::SearchTerms,
    SheetTab::Daily,
    SheetTab::Daily2,
    SheetTab::ProductPerformance,
];

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum TabStatus {
    Written,
    NoData,
    Failed(String),
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TabExport {
    pub tab: String,
    pub rows: usize,
    #[serde(flatten)]
    pub status: TabStatus,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct ExportSummary {
    pub tabs: Vec<TabExport>,
    pub warnings: Vec<String>,
}

impl ExportSummary {
    pub fn failed(&self) -> usize {
        self.tabs
            .iter()
            .filter(|t| matches!(t.status, TabStatus::Failed(_)))
            .count()
    }
}

/// Runs every report, turns each into tab rows and replaces the tab in the
/// store. A failing report leaves its tab untouched; the others continue.
pub async fn run_export(
    source: &dyn ReportSource,
    store: &TabStore,
    config: &ReportConfig,
) -> ExportSummary {
    let mut summary = ExportSummary::default();

    let index = load_conversion_index(source, config, &mut summary.warnings).await;

    for tab in EXPORTED_TABS {
        let name = config.tab_name(tab).to_string();
        let export = match export_tab(tab, source, store, config, &index).await {
            Ok(0) => {
                info!("No data for {}", name);
                TabExport {
                    tab: name,
                    rows: 0,
                    status: TabStatus::NoData,
                }
            }
            Ok(rows) => {
                info!("Wrote {} rows to {}", rows, name);
                TabExport {
                    tab: name,
                    rows,
                    status: TabStatus::Written,
                }
            }
            Err(e) => {
                error!("Export of {} failed: {}", name, e);
                TabExport {
                    tab: name,
                    rows: 0,
                    status: TabStatus::Failed(e.to_string()),
                }
            }
        };
        summary.tabs.push(export);
    }

    let written = summary.tabs.len() - summary.failed();
    if let Err(e) = store
        .record_export(written, summary.failed(), &summary.warnings)
        .await
    {
        warn!("Failed to record export run: {}", e);
    }

    summary
}

/// Purchase conversions keyed by campaign and date. Built before any tab so
/// the purchase tab can be joined against it. An unreadable report and a
/// report without purchases leave different warnings.
async fn load_conversion_index(
    source: &dyn ReportSource,
    config: &ReportConfig,
    warnings: &mut Vec<String>,
) -> Result<ConversionIndex, ReportError> {
    let rows = match source.rows(&conversion_action_query(config)).await {
        Ok(rows) => rows,
        Err(e) => {
            let message = format!(
                "{}: conversion actions failed to load ({}), tab left untouched",
                config.daily2_tab, e
            );
            error!("{}", message);
            warnings.push(message);
            return Err(e);
        }
    };

    let index =
        build_conversion_index(&processors::conversion_rows(&rows), &config.conversion_action);
    if index.is_empty() {
        let message = format!(
            "{}: no \"{}\" conversions found, purchase conversions and value are zero",
            config.daily2_tab, config.conversion_action
        );
        warn!("{}", message);
        warnings.push(message);
    } else {
        info!(
            "Loaded {} \"{}\" conversion entries",
            index.len(),
            config.conversion_action
        );
    }
    Ok(index)
}

async fn export_tab(
    tab: SheetTab,
    source: &dyn ReportSource,
    store: &TabStore,
    config: &ReportConfig,
    index: &Result<ConversionIndex, ReportError>,
) -> Result<usize, ExportError> {
    let table: TabTable = match tab {
        SheetTab::SearchTerms => {
            let rows = source.rows(&search_terms_query(config)).await?;
            search_terms_table(&processors::search_terms(&rows))
        }
        SheetTab::Daily => {
            let rows = source.rows(&daily_query(config)).await?;
            daily_table(&processors::campaign_days(&rows))
        }
        SheetTab::Daily2 => {
            let index = index
                .as_ref()
                .map_err(|e| ExportError::Conversions(e.to_string()))?;
            let rows = source.rows(&daily2_query(config)).await?;
            daily2_table(&processors::purchase_campaign_days(&rows, index))
        }
        SheetTab::ProductPerformance => {
            let rows = source.rows(&product_performance_query(config)).await?;
            product_table(&processors::products(&rows))
        }
        SheetTab::ConfigInfo | SheetTab::Api => {
            return Err(ExportError::NotExported(config.tab_name(tab).to_string()))
        }
    };

    Ok(store.replace_tab(config.tab_name(tab), &table).await?)
}
