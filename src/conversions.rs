use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::metrics::{coerce_f64, coerce_string, MetricRow};
use crate::reports::ReportRow;

/// Join key between the campaign-day stream and a conversion-action report:
/// campaign id and date separated by an underscore.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ConversionKey(String);

impl ConversionKey {
    pub fn new(campaign_id: &str, date: &str) -> Self {
        Self(format!("{}_{}", campaign_id, date))
    }

    pub fn for_row(row: &MetricRow) -> Self {
        Self::new(row.campaign_id(), row.date())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ConversionTotals {
    pub conversions: f64,
    pub value: f64,
}

/// One row of the conversion-action report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawConversionRow {
    pub campaign_id: String,
    pub date: String,
    pub action_name: String,
    pub conversions: f64,
    pub value: f64,
}

impl RawConversionRow {
    pub fn from_report_row(row: &ReportRow) -> Self {
        Self {
            campaign_id: coerce_string(row.get("campaign.id")),
            date: coerce_string(row.get("segments.date")),
            action_name: coerce_string(row.get("segments.conversion_action_name")),
            conversions: coerce_f64(row.get("metrics.conversions")),
            value: coerce_f64(row.get("metrics.conversions_value")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionIndex {
    entries: HashMap<ConversionKey, ConversionTotals>,
}

impl ConversionIndex {
    pub fn get(&self, key: &ConversionKey) -> Option<&ConversionTotals> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Indexes the rows whose conversion action name equals `action_name` exactly
/// (case-sensitive). Rows sharing a key are summed.
pub fn build_conversion_index(rows: &[RawConversionRow], action_name: &str) -> ConversionIndex {
    let mut entries: HashMap<ConversionKey, ConversionTotals> = HashMap::new();

    for row in rows.iter().filter(|r| r.action_name == action_name) {
        let totals = entries
            .entry(ConversionKey::new(&row.campaign_id, &row.date))
            .or_default();
        totals.conversions += row.conversions;
        totals.value += row.value;
    }

    debug!(
        "Indexed {} campaign-date combinations for conversion action {:?}",
        entries.len(),
        action_name
    );
    ConversionIndex { entries }
}

/// Builds the parallel series where each row's conversions and value are
/// replaced by the indexed ones, or zero when the key is absent.
pub fn join_conversions(primary_rows: &[MetricRow], index: &ConversionIndex) -> Vec<MetricRow> {
    primary_rows
        .iter()
        .map(|row| {
            let totals = index
                .get(&ConversionKey::for_row(row))
                .copied()
                .unwrap_or_default();
            let mut counters = row.counters;
            counters.conversions = totals.conversions;
            counters.conversion_value = totals.value;
            row.clone().with_counters(counters)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Counters, RowIdentity};

    const PURCHASE: &str = "Google Shopping App Purchase";

    fn conv(
        campaign: &str,
        date: &str,
        action: &str,
        conversions: f64,
        value: f64,
    ) -> RawConversionRow {
        RawConversionRow {
            campaign_id: campaign.to_string(),
            date: date.to_string(),
            action_name: action.to_string(),
            conversions,
            value,
        }
    }

    fn day(campaign: &str, date: &str, conversions: f64, value: f64) -> MetricRow {
        MetricRow::new(
            RowIdentity::campaign_day(format!("Campaign {}", campaign), campaign, date),
            Counters {
                impressions: 100,
                clicks: 10,
                cost: 20.0,
                conversions,
                conversion_value: value,
                view_through_conversions: 1.0,
            },
        )
    }

    #[test]
    fn sums_rows_sharing_a_key() {
        let index = build_conversion_index(
            &[
                conv("1", "2024-05-01", PURCHASE, 2.0, 40.0),
                conv("1", "2024-05-01", PURCHASE, 1.5, 10.0),
                conv("1", "2024-05-02", PURCHASE, 1.0, 5.0),
            ],
            PURCHASE,
        );

        assert_eq!(index.len(), 2);
        let totals = index.get(&ConversionKey::new("1", "2024-05-01")).unwrap();
        assert_eq!(totals.conversions, 3.5);
        assert_eq!(totals.value, 50.0);
    }

    #[test]
    fn filters_on_exact_action_name() {
        let index = build_conversion_index(
            &[
                conv("1", "2024-05-01", "google shopping app purchase", 9.0, 90.0),
                conv("1", "2024-05-01", "Google Shopping App Purchase (web)", 9.0, 90.0),
                conv("1", "2024-05-01", "Add to cart", 9.0, 90.0),
            ],
            PURCHASE,
        );
        assert!(index.is_empty());
    }

    #[test]
    fn join_replaces_instead_of_adding() {
        let index =
            build_conversion_index(&[conv("1", "2024-05-01", PURCHASE, 2.0, 80.0)], PURCHASE);
        let joined = join_conversions(
            &[day("1", "2024-05-01", 7.0, 300.0), day("2", "2024-05-01", 3.0, 90.0)],
            &index,
        );

        assert_eq!(joined[0].counters.conversions, 2.0);
        assert_eq!(joined[0].counters.conversion_value, 80.0);
        assert_eq!(joined[0].ratios.roas, 4.0);
        assert_eq!(joined[0].ratios.cpa, 10.0);
        assert_eq!(joined[0].counters.view_through_conversions, 1.0);

        assert_eq!(joined[1].counters.conversions, 0.0);
        assert_eq!(joined[1].counters.conversion_value, 0.0);
        assert_eq!(joined[1].ratios.roas, 0.0);
    }

    #[test]
    fn join_is_idempotent() {
        let index =
            build_conversion_index(&[conv("1", "2024-05-01", PURCHASE, 2.0, 80.0)], PURCHASE);
        let rows = vec![day("1", "2024-05-01", 7.0, 300.0), day("1", "2024-05-02", 1.0, 1.0)];

        let once = join_conversions(&rows, &index);
        let twice = join_conversions(&once, &index);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_index_zeroes_every_row() {
        let index = build_conversion_index(&[], PURCHASE);
        let joined = join_conversions(&[day("1", "2024-05-01", 7.0, 300.0)], &index);

        assert!(index.is_empty());
        assert_eq!(joined[0].counters.conversions, 0.0);
        assert_eq!(joined[0].counters.cost, 20.0);
    }

    #[test]
    fn key_joins_id_and_date() {
        assert_eq!(ConversionKey::new("123", "2024-01-31").as_str(), "123_2024-01-31");
    }
}
