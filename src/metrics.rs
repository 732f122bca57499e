use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MICROS_PER_UNIT: f64 = 1_000_000.0;

/// Counters exactly as a report hands them over. Cost is still in micro-units.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCounters {
    pub impressions: u64,
    pub clicks: u64,
    pub cost_micros: f64,
    pub conversions: f64,
    pub conversion_value: f64,
    pub view_through_conversions: f64,
}

impl RawCounters {
    /// Reads counters from loosely typed field values. Anything missing or
    /// unparseable becomes zero.
    pub fn from_values(
        impressions: Option<&Value>,
        clicks: Option<&Value>,
        cost_micros: Option<&Value>,
        conversions: Option<&Value>,
        conversion_value: Option<&Value>,
        view_through_conversions: Option<&Value>,
    ) -> Self {
        Self {
            impressions: coerce_count(impressions),
            clicks: coerce_count(clicks),
            cost_micros: coerce_f64(cost_micros),
            conversions: coerce_f64(conversions),
            conversion_value: coerce_f64(conversion_value),
            view_through_conversions: coerce_f64(view_through_conversions),
        }
    }
}

/// Additive counters in currency units. These are the only ground truth;
/// ratios are always recomputed from them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Counters {
    pub impressions: u64,
    pub clicks: u64,
    pub cost: f64,
    pub conversions: f64,
    pub conversion_value: f64,
    pub view_through_conversions: f64,
}

impl Counters {
    pub fn from_raw(raw: &RawCounters) -> Self {
        Self {
            impressions: raw.impressions,
            clicks: raw.clicks,
            cost: raw.cost_micros / MICROS_PER_UNIT,
            conversions: raw.conversions,
            conversion_value: raw.conversion_value,
            view_through_conversions: raw.view_through_conversions,
        }
    }

    pub fn add(&mut self, other: &Counters) {
        self.impressions += other.impressions;
        self.clicks += other.clicks;
        self.cost += other.cost;
        self.conversions += other.conversions;
        self.conversion_value += other.conversion_value;
        self.view_through_conversions += other.view_through_conversions;
    }
}

/// Ratio metrics. CTR and conversion rate are fractions in 0..=1, not percentages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Ratios {
    pub ctr: f64,
    pub cpc: f64,
    pub conv_rate: f64,
    pub cpa: f64,
    pub roas: f64,
    pub aov: f64,
}

impl Ratios {
    pub fn from_counters(c: &Counters) -> Self {
        let impressions = c.impressions as f64;
        let clicks = c.clicks as f64;
        Self {
            ctr: safe_div(clicks, impressions),
            cpc: safe_div(c.cost, clicks),
            conv_rate: safe_div(c.conversions, clicks),
            cpa: safe_div(c.cost, c.conversions),
            roas: safe_div(c.conversion_value, c.cost),
            aov: safe_div(c.conversion_value, c.conversions),
        }
    }
}

/// Who a row is about: a campaign-day, a search term or a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowIdentity {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_group: Option<String>,
}

impl RowIdentity {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Identity of a campaign-day row.
    pub fn campaign_day(
        name: impl Into<String>,
        id: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            id: Some(id.into()),
            date: Some(date.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    #[serde(flatten)]
    pub identity: RowIdentity,
    #[serde(flatten)]
    pub counters: Counters,
    #[serde(flatten)]
    pub ratios: Ratios,
}

impl MetricRow {
    pub fn new(identity: RowIdentity, counters: Counters) -> Self {
        Self {
            identity,
            ratios: Ratios::from_counters(&counters),
            counters,
        }
    }

    pub fn with_identity(mut self, identity: RowIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// Swaps in new counters and recomputes every ratio from them.
    pub fn with_counters(mut self, counters: Counters) -> Self {
        self.ratios = Ratios::from_counters(&counters);
        self.counters = counters;
        self
    }

    pub fn campaign_id(&self) -> &str {
        self.identity.id.as_deref().unwrap_or("")
    }

    pub fn date(&self) -> &str {
        self.identity.date.as_deref().unwrap_or("")
    }
}

/// Turns raw report counters into a row with cost in currency units and all
/// ratios derived. Identity is left empty for the caller to fill in.
pub fn derive_metrics(raw: &RawCounters) -> MetricRow {
    MetricRow::new(RowIdentity::default(), Counters::from_raw(raw))
}

/// Division that yields 0 instead of NaN or infinity.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let value = numerator / denominator;
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Lenient numeric read: numbers, numeric strings and nothing else.
pub fn coerce_f64(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().replace(',', "").parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if parsed.is_finite() && parsed > 0.0 {
        parsed
    } else {
        0.0
    }
}

pub fn coerce_count(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .unwrap_or_else(|| coerce_f64(value).trunc() as u64),
        _ => coerce_f64(value).trunc() as u64,
    }
}

pub fn coerce_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(impr: u64, clicks: u64, cost_micros: f64, conv: f64, value: f64) -> RawCounters {
        RawCounters {
            impressions: impr,
            clicks,
            cost_micros,
            conversions: conv,
            conversion_value: value,
            view_through_conversions: 0.0,
        }
    }

    #[test]
    fn derives_all_ratios_from_raw_counters() {
        let row = derive_metrics(&raw(1000, 100, 2_000_000.0, 5.0, 1500.0));

        assert_eq!(row.counters.cost, 2.0);
        assert!((row.ratios.ctr - 0.1).abs() < 1e-12);
        assert!((row.ratios.cpc - 0.02).abs() < 1e-12);
        assert!((row.ratios.conv_rate - 0.05).abs() < 1e-12);
        assert!((row.ratios.cpa - 0.4).abs() < 1e-12);
        assert!((row.ratios.roas - 750.0).abs() < 1e-9);
        assert!((row.ratios.aov - 300.0).abs() < 1e-9);
    }

    #[test]
    fn zero_denominators_yield_zero() {
        let row = derive_metrics(&RawCounters::default());
        assert_eq!(row.ratios, Ratios::default());

        let clicks_only = derive_metrics(&raw(0, 10, 0.0, 0.0, 50.0));
        assert_eq!(clicks_only.ratios.ctr, 0.0);
        assert_eq!(clicks_only.ratios.cpa, 0.0);
        assert_eq!(clicks_only.ratios.roas, 0.0);
        assert_eq!(clicks_only.ratios.aov, 0.0);
    }

    #[test]
    fn ratios_are_finite_and_non_negative() {
        let samples = [
            raw(0, 0, 0.0, 0.0, 0.0),
            raw(1, 1, 1.0, 0.5, 0.0),
            raw(10, 0, 5_000_000.0, 0.0, 0.0),
            raw(u32::MAX as u64, 3, 1e12, 1e-9, 1e9),
        ];
        for sample in samples {
            let r = derive_metrics(&sample).ratios;
            for value in [r.ctr, r.cpc, r.conv_rate, r.cpa, r.roas, r.aov] {
                assert!(value.is_finite());
                assert!(value >= 0.0);
            }
        }
    }

    #[test]
    fn missing_and_garbage_fields_read_as_zero() {
        let counters = RawCounters::from_values(
            Some(&json!("1200")),
            None,
            Some(&json!("not a number")),
            Some(&json!(null)),
            Some(&json!({"nested": 1})),
            Some(&json!(2.5)),
        );

        assert_eq!(counters.impressions, 1200);
        assert_eq!(counters.clicks, 0);
        assert_eq!(counters.cost_micros, 0.0);
        assert_eq!(counters.conversions, 0.0);
        assert_eq!(counters.conversion_value, 0.0);
        assert_eq!(counters.view_through_conversions, 2.5);

        let row = derive_metrics(&counters);
        assert_eq!(row.ratios.ctr, 0.0);
        assert_eq!(row.ratios.cpc, 0.0);
    }

    #[test]
    fn coerce_handles_fractional_and_negative_input() {
        assert_eq!(coerce_f64(Some(&json!("3.75"))), 3.75);
        assert_eq!(coerce_f64(Some(&json!(-4))), 0.0);
        assert_eq!(coerce_count(Some(&json!(12.9))), 12);
        assert_eq!(coerce_count(Some(&json!("1,024"))), 1024);
    }

    #[test]
    fn serializes_flat_row() {
        let row = MetricRow::new(
            RowIdentity::campaign_day("Brand", "42", "2024-05-01"),
            Counters {
                clicks: 2,
                impressions: 4,
                ..Default::default()
            },
        );
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["name"], "Brand");
        assert_eq!(value["id"], "42");
        assert_eq!(value["ctr"], 0.5);
        assert!(value.get("campaign").is_none());
    }
}
