use serde::Serialize;

use super::{AnalysisResult, Sentiment};
use crate::config::AnalysisConfig;
use crate::format::{format_count, format_currency, format_percent, format_roas};
use crate::metrics::{Counters, Ratios};

/// Buckets overall performance using ratios computed from the totals.
///
/// First match wins: ROAS below `min_roas` is negative, then CPA above
/// `max_cpa` is a warning, otherwise positive. Both comparisons are strict.
/// View-through conversions only appear in the text; they never feed ROAS
/// or CPA.
pub fn classify_performance(
    totals: &Counters,
    view_through_conversions: f64,
    config: &AnalysisConfig,
) -> AnalysisResult {
    let ratios = Ratios::from_counters(totals);
    let roas = format_roas(ratios.roas);
    let cpa = format_currency(ratios.cpa, &config.currency);

    let (sentiment, headline) = if ratios.roas < config.min_roas {
        (
            Sentiment::Negative,
            format!("Campaign performance shows concerning ROAS of {} with CPA at {}.", roas, cpa),
        )
    } else if ratios.cpa > config.max_cpa {
        (
            Sentiment::Warning,
            format!("Campaign achieving positive ROAS of {} but CPA is high at {}.", roas, cpa),
        )
    } else {
        (
            Sentiment::Positive,
            format!("Campaign performing well with ROAS at {} and CPA at {}.", roas, cpa),
        )
    };

    let text = format!(
        "{} Total conversions: {} (plus {} view-through), CTR: {}.",
        headline,
        format_count(totals.conversions),
        format_count(view_through_conversions),
        format_percent(ratios.ctr),
    );

    AnalysisResult { text, sentiment }
}

/// The figures behind a classification, for callers that render their own text.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PerformanceFigures {
    pub roas: f64,
    pub cpa: f64,
    pub ctr: f64,
    pub conversions: f64,
    pub view_through_conversions: f64,
}

impl PerformanceFigures {
    pub fn new(totals: &Counters, view_through_conversions: f64) -> Self {
        let ratios = Ratios::from_counters(totals);
        Self {
            roas: ratios.roas,
            cpa: ratios.cpa,
            ctr: ratios.ctr,
            conversions: totals.conversions,
            view_through_conversions,
        }
    }
}
