use std::ops::Deref;

use super::base_metrics_aggregator::{totals, BaseMetricsAggregator};
use super::{ChartMetric, ProductSelection, ProductSortField, ProductSummary, SortDirection};
use crate::metrics::MetricRow;

const SELECTION_SIZE: usize = 10;

/// Rolls product rows (one per product and date in the report) up per title.
pub struct ProductMetricsAggregator {
    base: BaseMetricsAggregator<String>,
}

impl Deref for ProductMetricsAggregator {
    type Target = BaseMetricsAggregator<String>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl Default for ProductMetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductMetricsAggregator {
    pub fn new() -> Self {
        let base = BaseMetricsAggregator::new(|row: &MetricRow| row.identity.name.clone())
            .with_identity(|_, first| {
                let mut identity = first.identity.clone();
                identity.date = None;
                identity
            });
        Self { base }
    }

    pub fn rollup(&self, rows: &[MetricRow]) -> Vec<MetricRow> {
        self.base
            .aggregate(rows)
            .into_iter()
            .map(|(_, row)| row)
            .collect()
    }
}

/// Products with at least one conversion and some conversion value.
pub fn converting_products(rows: &[MetricRow]) -> Vec<MetricRow> {
    rows.iter()
        .filter(|p| p.counters.conversions >= 1.0 && p.counters.conversion_value > 0.0)
        .cloned()
        .collect()
}

pub fn summarize(products: &[MetricRow]) -> ProductSummary {
    let total = totals(products, "All Products");
    ProductSummary {
        products: products.len(),
        total_conversions: total.counters.conversions,
        total_value: total.counters.conversion_value,
        total_cost: total.counters.cost,
        overall_roas: total.ratios.roas,
    }
}

/// Stable sort; rows comparing equal keep their relative order.
pub fn sort_products(
    products: &mut [MetricRow],
    field: ProductSortField,
    direction: SortDirection,
) {
    products.sort_by(|a, b| {
        let ordering = match field {
            ProductSortField::Title => a.identity.name.cmp(&b.identity.name),
            _ => sort_value(a, field).total_cmp(&sort_value(b, field)),
        };
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn sort_value(row: &MetricRow, field: ProductSortField) -> f64 {
    match field {
        ProductSortField::Title => 0.0,
        ProductSortField::Impressions => row.counters.impressions as f64,
        ProductSortField::Clicks => row.counters.clicks as f64,
        ProductSortField::Cost => row.counters.cost,
        ProductSortField::Conversions => row.counters.conversions,
        ProductSortField::ConversionValue => row.counters.conversion_value,
        ProductSortField::Ctr => row.ratios.ctr,
        ProductSortField::Roas => row.ratios.roas,
        ProductSortField::ConvRate => row.ratios.conv_rate,
        ProductSortField::Cpa => row.ratios.cpa,
    }
}

pub fn chart_value(row: &MetricRow, metric: ChartMetric) -> f64 {
    match metric {
        ChartMetric::Roas => row.ratios.roas,
        ChartMetric::ConversionValue => row.counters.conversion_value,
        ChartMetric::Conversions => row.counters.conversions,
        ChartMetric::Clicks => row.counters.clicks as f64,
        ChartMetric::Impressions => row.counters.impressions as f64,
    }
}

/// Picks the products to chart, ranked descending by `metric`.
pub fn select_products(
    products: &[MetricRow],
    metric: ChartMetric,
    selection: ProductSelection,
) -> Vec<MetricRow> {
    let mut sorted = products.to_vec();
    sorted.sort_by(|a, b| chart_value(b, metric).total_cmp(&chart_value(a, metric)));

    if sorted.len() <= SELECTION_SIZE {
        return sorted;
    }

    match selection {
        ProductSelection::All => sorted,
        ProductSelection::Top10 => sorted.into_iter().take(SELECTION_SIZE).collect(),
        ProductSelection::Bottom10 => {
            let start = sorted.len() - SELECTION_SIZE;
            sorted.into_iter().skip(start).rev().collect()
        }
        ProductSelection::Average10 => {
            let start = (sorted.len() / 2).saturating_sub(SELECTION_SIZE / 2);
            sorted.into_iter().skip(start).take(SELECTION_SIZE).collect()
        }
    }
}
