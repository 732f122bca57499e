use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{AppState, DailyTab};
use crate::aggregators::{build_campaign_directory, totals, Campaign, DateMetricsAggregator};
use crate::analysis::{classify_performance, AnalysisResult, PerformanceFigures};
use crate::config::AnalysisConfig;
use crate::metrics::MetricRow;
use crate::sheets::{fetch_all_tabs, TabData};

#[derive(Deserialize, Default, Debug)]
pub struct OverviewParams {
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub tab: DailyTab,
}

#[derive(Serialize, Debug)]
pub struct Overview {
    pub campaigns: Vec<Campaign>,
    pub series: Vec<MetricRow>,
    pub totals: MetricRow,
    pub analysis: AnalysisResult,
    pub figures: PerformanceFigures,
    pub warnings: Vec<String>,
}

pub fn build_overview(
    data: &TabData,
    params: &OverviewParams,
    config: &AnalysisConfig,
) -> Overview {
    let rows = data.campaign_days(params.tab.sheet_tab());
    let campaign_id = params
        .campaign_id
        .as_deref()
        .filter(|id| !id.is_empty());

    let aggregator = DateMetricsAggregator::new();
    let series = match campaign_id {
        Some(id) => aggregator.campaign_series(rows, id),
        None => aggregator.series(rows),
    };
    let total = totals(&series, "Total");

    let view_through = data
        .daily2
        .iter()
        .filter(|row| campaign_id.map_or(true, |id| row.campaign_id() == id))
        .fold(0.0, |acc, row| acc + row.counters.view_through_conversions);

    Overview {
        campaigns: build_campaign_directory(rows),
        analysis: classify_performance(&total.counters, view_through, config),
        figures: PerformanceFigures::new(&total.counters, view_through),
        series,
        totals: total,
        warnings: data.warnings.clone(),
    }
}

pub async fn get_overview(
    State(state): State<AppState>,
    Query(params): Query<OverviewParams>,
) -> Json<Overview> {
    let data = fetch_all_tabs(&state.tabs, &state.config.report).await;
    Json(build_overview(&data, &params, &state.config.analysis))
}
