use serde_json::Value;
use url::Url;

use super::ReportRow;
use crate::aggregators::ProductMetricsAggregator;
use crate::conversions::{join_conversions, ConversionIndex, RawConversionRow};
use crate::metrics::{coerce_string, derive_metrics, MetricRow, RawCounters, RowIdentity};

pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

fn counters(row: &ReportRow) -> RawCounters {
    RawCounters::from_values(
        row.get("metrics.impressions"),
        row.get("metrics.clicks"),
        row.get("metrics.cost_micros"),
        row.get("metrics.conversions"),
        row.get("metrics.conversions_value"),
        row.get("metrics.view_through_conversions"),
    )
}

pub fn search_terms(rows: &[ReportRow]) -> Vec<MetricRow> {
    rows.iter()
        .map(|row| {
            derive_metrics(&counters(row)).with_identity(RowIdentity {
                name: coerce_string(row.get("search_term_view.search_term")),
                campaign: Some(coerce_string(row.get("campaign.name"))),
                ad_group: Some(coerce_string(row.get("ad_group.name"))),
                ..Default::default()
            })
        })
        .collect()
}

pub fn campaign_days(rows: &[ReportRow]) -> Vec<MetricRow> {
    rows.iter()
        .map(|row| {
            derive_metrics(&counters(row)).with_identity(RowIdentity::campaign_day(
                coerce_string(row.get("campaign.name")),
                coerce_string(row.get("campaign.id")),
                coerce_string(row.get("segments.date")),
            ))
        })
        .collect()
}

/// Campaign days whose conversions come from the conversion-action index.
pub fn purchase_campaign_days(rows: &[ReportRow], index: &ConversionIndex) -> Vec<MetricRow> {
    join_conversions(&campaign_days(rows), index)
}

pub fn conversion_rows(rows: &[ReportRow]) -> Vec<RawConversionRow> {
    rows.iter().map(RawConversionRow::from_report_row).collect()
}

/// Product rows rolled up per title across the report's dates.
pub fn products(rows: &[ReportRow]) -> Vec<MetricRow> {
    let per_day: Vec<MetricRow> = rows
        .iter()
        .map(|row| {
            derive_metrics(&counters(row)).with_identity(RowIdentity {
                name: product_title(row),
                date: Some(coerce_string(row.get("segments.date"))),
                ..Default::default()
            })
        })
        .collect();
    ProductMetricsAggregator::new().rollup(&per_day)
}

/// The product title field when present, otherwise a title made from the
/// last path segment of the first final URL.
pub fn product_title(row: &ReportRow) -> String {
    let title = coerce_string(row.get("segments.product_title"));
    if !title.trim().is_empty() {
        return title.trim().to_string();
    }

    let first_url = match row.get("ad_group_ad.ad.final_urls") {
        Some(Value::Array(urls)) => urls.first().and_then(Value::as_str).map(str::to_string),
        Some(Value::String(url)) if !url.is_empty() => Some(url.clone()),
        _ => None,
    };

    first_url
        .and_then(|url| title_from_url(&url))
        .unwrap_or_else(|| UNKNOWN_PRODUCT.to_string())
}

pub fn title_from_url(raw: &str) -> Option<String> {
    let slug = match Url::parse(raw) {
        Ok(url) => url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_string),
        Err(_) => raw.rsplit('/').find(|s| !s.is_empty()).map(str::to_string),
    }?;

    let title = slug
        .split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}
