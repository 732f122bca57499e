use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use super::{AppState, DailyTab};
use crate::aggregators::{build_campaign_directory, Campaign};
use crate::sheets::fetch_all_tabs;

#[derive(Deserialize, Default)]
pub struct CampaignParams {
    #[serde(default)]
    pub tab: DailyTab,
}

pub async fn get_campaigns(
    State(state): State<AppState>,
    Query(params): Query<CampaignParams>,
) -> Json<Vec<Campaign>> {
    let data = fetch_all_tabs(&state.tabs, &state.config.report).await;
    Json(build_campaign_directory(data.campaign_days(params.tab.sheet_tab())))
}
