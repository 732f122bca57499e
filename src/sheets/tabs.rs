use serde_json::{Map, Value};

use crate::config::NamedValues;
use crate::metrics::{coerce_count, coerce_f64, coerce_string, Counters, MetricRow, RowIdentity};

/// One spreadsheet row keyed by column header.
pub type TabRow = Map<String, Value>;

pub const SEARCH_TERMS_HEADERS: &[&str] = &[
    "search_term",
    "campaign",
    "ad_group",
    "impressions",
    "clicks",
    "cost",
    "conversions",
    "conversion_value",
    "cpc",
    "ctr",
    "conv_rate",
    "cpa",
    "roas",
    "aov",
];

pub const DAILY_HEADERS: &[&str] = &[
    "campaign",
    "campaignId",
    "impr",
    "clicks",
    "value",
    "conv",
    "cost",
    "date",
];

pub const DAILY2_HEADERS: &[&str] = &[
    "campaign",
    "campaignId",
    "impr",
    "clicks",
    "value",
    "conv",
    "cost",
    "view_through_conv",
    "date",
];

pub const PRODUCT_HEADERS: &[&str] = &[
    "product_title",
    "impressions",
    "clicks",
    "cost",
    "conversions",
    "conversion_value",
    "ctr",
    "roas",
    "cvr",
    "cpa",
];

pub const NAMED_VALUE_HEADERS: &[&str] = &["Name", "Value"];

/// Rows ready to be written to a tab. Header order is column order.
#[derive(Debug, Clone, PartialEq)]
pub struct TabTable {
    pub headers: &'static [&'static str],
    pub rows: Vec<TabRow>,
}

impl TabTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

fn number(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or_else(|| Value::from(0))
}

fn row(pairs: Vec<(&str, Value)>) -> TabRow {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

pub fn search_terms_table(rows: &[MetricRow]) -> TabTable {
    let rows = rows
        .iter()
        .map(|r| {
            row(vec![
                ("search_term", Value::from(r.identity.name.clone())),
                ("campaign", Value::from(r.identity.campaign.clone().unwrap_or_default())),
                ("ad_group", Value::from(r.identity.ad_group.clone().unwrap_or_default())),
                ("impressions", Value::from(r.counters.impressions)),
                ("clicks", Value::from(r.counters.clicks)),
                ("cost", number(r.counters.cost)),
                ("conversions", number(r.counters.conversions)),
                ("conversion_value", number(r.counters.conversion_value)),
                ("cpc", number(r.ratios.cpc)),
                ("ctr", number(r.ratios.ctr)),
                ("conv_rate", number(r.ratios.conv_rate)),
                ("cpa", number(r.ratios.cpa)),
                ("roas", number(r.ratios.roas)),
                ("aov", number(r.ratios.aov)),
            ])
        })
        .collect();
    TabTable {
        headers: SEARCH_TERMS_HEADERS,
        rows,
    }
}

fn campaign_day_row(r: &MetricRow, view_through: bool) -> TabRow {
    let mut pairs = vec![
        ("campaign", Value::from(r.identity.name.clone())),
        ("campaignId", Value::from(r.campaign_id())),
        ("impr", Value::from(r.counters.impressions)),
        ("clicks", Value::from(r.counters.clicks)),
        ("value", number(r.counters.conversion_value)),
        ("conv", number(r.counters.conversions)),
        ("cost", number(r.counters.cost)),
    ];
    if view_through {
        pairs.push(("view_through_conv", number(r.counters.view_through_conversions)));
    }
    pairs.push(("date", Value::from(r.date())));
    row(pairs)
}

pub fn daily_table(rows: &[MetricRow]) -> TabTable {
    TabTable {
        headers: DAILY_HEADERS,
        rows: rows.iter().map(|r| campaign_day_row(r, false)).collect(),
    }
}

pub fn daily2_table(rows: &[MetricRow]) -> TabTable {
    TabTable {
        headers: DAILY2_HEADERS,
        rows: rows.iter().map(|r| campaign_day_row(r, true)).collect(),
    }
}

pub fn product_table(rows: &[MetricRow]) -> TabTable {
    let rows = rows
        .iter()
        .map(|r| {
            row(vec![
                ("product_title", Value::from(r.identity.name.clone())),
                ("impressions", Value::from(r.counters.impressions)),
                ("clicks", Value::from(r.counters.clicks)),
                ("cost", number(r.counters.cost)),
                ("conversions", number(r.counters.conversions)),
                ("conversion_value", number(r.counters.conversion_value)),
                ("ctr", number(r.ratios.ctr)),
                ("roas", number(r.ratios.roas)),
                ("cvr", number(r.ratios.conv_rate)),
                ("cpa", number(r.ratios.cpa)),
            ])
        })
        .collect();
    TabTable {
        headers: PRODUCT_HEADERS,
        rows,
    }
}

pub fn named_values_table(values: &NamedValues) -> TabTable {
    TabTable {
        headers: NAMED_VALUE_HEADERS,
        rows: values
            .iter()
            .map(|(name, value)| {
                row(vec![
                    ("Name", Value::from(name.clone())),
                    ("Value", Value::from(value.clone())),
                ])
            })
            .collect(),
    }
}

// Ratio columns written to a tab are never read back; they are recomputed
// from the counters so a hand-edited sheet stays consistent.

pub fn campaign_day_from_tab(row: &TabRow) -> MetricRow {
    MetricRow::new(
        RowIdentity::campaign_day(
            coerce_string(row.get("campaign")),
            coerce_string(row.get("campaignId")),
            coerce_string(row.get("date")),
        ),
        Counters {
            impressions: coerce_count(row.get("impr")),
            clicks: coerce_count(row.get("clicks")),
            cost: coerce_f64(row.get("cost")),
            conversions: coerce_f64(row.get("conv")),
            conversion_value: coerce_f64(row.get("value")),
            view_through_conversions: coerce_f64(row.get("view_through_conv")),
        },
    )
}

pub fn search_term_from_tab(row: &TabRow) -> MetricRow {
    MetricRow::new(
        RowIdentity {
            name: coerce_string(row.get("search_term")),
            campaign: Some(coerce_string(row.get("campaign"))),
            ad_group: Some(coerce_string(row.get("ad_group"))),
            ..Default::default()
        },
        Counters {
            impressions: coerce_count(row.get("impressions")),
            clicks: coerce_count(row.get("clicks")),
            cost: coerce_f64(row.get("cost")),
            conversions: coerce_f64(row.get("conversions")),
            conversion_value: coerce_f64(row.get("conversion_value")),
            view_through_conversions: 0.0,
        },
    )
}

pub fn product_from_tab(row: &TabRow) -> MetricRow {
    MetricRow::new(
        RowIdentity::named(coerce_string(row.get("product_title"))),
        Counters {
            impressions: coerce_count(row.get("impressions")),
            clicks: coerce_count(row.get("clicks")),
            cost: coerce_f64(row.get("cost")),
            conversions: coerce_f64(row.get("conversions")),
            conversion_value: coerce_f64(row.get("conversion_value")),
            view_through_conversions: 0.0,
        },
    )
}

/// Reads name/value pairs. Rows with a `Config Name` or `Name` column and a
/// `Value` column become one entry each; any other row contributes all of
/// its columns as entries.
pub fn named_values_from_tab(rows: &[TabRow]) -> NamedValues {
    let mut values = NamedValues::new();
    for row in rows {
        let name = row.get("Config Name").or_else(|| row.get("Name"));
        match (name, row.get("Value")) {
            (Some(name), Some(value)) => {
                let name = coerce_string(Some(name));
                if !name.is_empty() {
                    values.insert(name, coerce_string(Some(value)));
                }
            }
            _ => {
                for (key, value) in row {
                    values.insert(key.clone(), coerce_string(Some(value)));
                }
            }
        }
    }
    values
}
