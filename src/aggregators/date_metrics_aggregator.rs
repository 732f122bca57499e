use std::cmp::Ordering;
use std::ops::Deref;

use chrono::NaiveDate;

use super::base_metrics_aggregator::BaseMetricsAggregator;
use crate::metrics::{MetricRow, RowIdentity};

pub const ALL_CAMPAIGNS: &str = "All Campaigns";

/// Rolls campaign-day rows up into one row per date across all campaigns.
pub struct DateMetricsAggregator {
    base: BaseMetricsAggregator<String>,
}

impl Deref for DateMetricsAggregator {
    type Target = BaseMetricsAggregator<String>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl Default for DateMetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl DateMetricsAggregator {
    pub fn new() -> Self {
        let base = BaseMetricsAggregator::new(|row: &MetricRow| row.date().to_string())
            .with_identity(|date: &String, _| RowIdentity {
                name: ALL_CAMPAIGNS.to_string(),
                date: Some(date.clone()),
                ..Default::default()
            });
        Self { base }
    }

    /// Per-date totals across every campaign, ascending by date.
    pub fn series(&self, rows: &[MetricRow]) -> Vec<MetricRow> {
        let mut series: Vec<MetricRow> = self
            .base
            .aggregate(rows)
            .into_iter()
            .map(|(_, row)| row)
            .collect();
        sort_by_date(&mut series);
        series
    }

    /// Rows of one campaign, ascending by date. Rows are not merged.
    pub fn campaign_series(&self, rows: &[MetricRow], campaign_id: &str) -> Vec<MetricRow> {
        let mut series: Vec<MetricRow> = rows
            .iter()
            .filter(|row| row.campaign_id() == campaign_id)
            .cloned()
            .collect();
        sort_by_date(&mut series);
        series
    }
}

/// Stable ascending sort on ISO dates. Unparseable dates sort after valid ones,
/// among themselves by their text.
pub fn sort_by_date(rows: &mut [MetricRow]) {
    rows.sort_by(|a, b| compare_dates(a.date(), b.date()));
}

fn compare_dates(a: &str, b: &str) -> Ordering {
    let parse = |s: &str| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok();
    match (parse(a), parse(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}
