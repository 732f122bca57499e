use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;
use crate::aggregators::totals;
use crate::metrics::MetricRow;
use crate::sheets::{fetch_all_tabs, TabData};

#[derive(Serialize, Debug)]
pub struct SearchTermsView {
    pub terms: Vec<MetricRow>,
    pub totals: MetricRow,
    pub warnings: Vec<String>,
}

pub fn build_search_terms(data: &TabData) -> SearchTermsView {
    let mut terms = data.search_terms.clone();
    terms.sort_by(|a, b| b.counters.cost.total_cmp(&a.counters.cost));
    SearchTermsView {
        totals: totals(&terms, "Total"),
        terms,
        warnings: data.warnings.clone(),
    }
}

pub async fn get_search_terms(State(state): State<AppState>) -> Json<SearchTermsView> {
    let data = fetch_all_tabs(&state.tabs, &state.config.report).await;
    Json(build_search_terms(&data))
}
