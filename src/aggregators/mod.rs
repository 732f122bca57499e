use serde::{Deserialize, Serialize};

pub mod base_metrics_aggregator;
pub mod campaign_directory;
pub mod date_metrics_aggregator;
pub mod product_metrics_aggregator;

pub use base_metrics_aggregator::{aggregate_by_key, totals, BaseMetricsAggregator};
pub use campaign_directory::build_campaign_directory;
pub use date_metrics_aggregator::{DateMetricsAggregator, ALL_CAMPAIGNS};
pub use product_metrics_aggregator::ProductMetricsAggregator;

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChartMetric {
    #[default]
    Roas,
    ConversionValue,
    Conversions,
    Clicks,
    Impressions,
}

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProductSelection {
    #[default]
    Top10,
    Bottom10,
    Average10,
    All,
}

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortField {
    Title,
    Impressions,
    Clicks,
    #[default]
    Cost,
    Conversions,
    ConversionValue,
    Ctr,
    Roas,
    ConvRate,
    Cpa,
}

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    #[serde(rename = "totalCost")]
    pub total_cost: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ProductSummary {
    pub products: usize,
    pub total_conversions: f64,
    pub total_value: f64,
    pub total_cost: f64,
    pub overall_roas: f64,
}
