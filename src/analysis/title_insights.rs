use super::{InsightKind, ProductInsight};
use crate::config::AnalysisConfig;
use crate::metrics::MetricRow;

/// Comparative statements about product titles. Each comparison splits the
/// products into two groups, compares a per-group mean, and says something only
/// when the means differ by more than `comparison_threshold`.
pub fn title_comparisons(products: &[MetricRow], config: &AnalysisConfig) -> Vec<ProductInsight> {
    [
        title_length_insight(products, config),
        brand_position_insight(products, config),
        keyword_insight(products, config),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Short titles (< `short_title_words` words) against the rest, by mean ROAS.
pub fn title_length_insight(
    products: &[MetricRow],
    config: &AnalysisConfig,
) -> Option<ProductInsight> {
    let limit = config.short_title_words;
    let (short, long): (Vec<&MetricRow>, Vec<&MetricRow>) = products
        .iter()
        .partition(|p| word_count(&p.identity.name) < limit);

    let roas_short = mean(&short, |p| p.ratios.roas);
    let roas_long = mean(&long, |p| p.ratios.roas);

    if (roas_short - roas_long).abs() <= config.comparison_threshold {
        return None;
    }

    let content = if roas_short > roas_long {
        format!(
            "Shorter titles (under {} words) are performing better \
             with an average ROAS of {:.1}x vs {:.1}x for longer titles.",
            limit, roas_short, roas_long
        )
    } else {
        format!(
            "Longer titles ({}+ words) are performing better \
             with an average ROAS of {:.1}x vs {:.1}x for shorter titles.",
            limit, roas_long, roas_short
        )
    };

    Some(ProductInsight::new("Title Length Matters", content, InsightKind::Positive))
}

/// Titles starting with the brand against titles mentioning it later, by mean
/// CTR in percentage points. Needs both groups populated.
pub fn brand_position_insight(
    products: &[MetricRow],
    config: &AnalysisConfig,
) -> Option<ProductInsight> {
    let brand = config.brand.to_lowercase();
    if brand.is_empty() {
        return None;
    }

    let (first, elsewhere): (Vec<&MetricRow>, Vec<&MetricRow>) = products
        .iter()
        .filter(|p| p.identity.name.to_lowercase().contains(&brand))
        .partition(|p| p.identity.name.to_lowercase().starts_with(&brand));

    if first.is_empty() || elsewhere.is_empty() {
        return None;
    }

    let ctr_first = mean(&first, |p| p.ratios.ctr * 100.0);
    let ctr_elsewhere = mean(&elsewhere, |p| p.ratios.ctr * 100.0);

    if (ctr_first - ctr_elsewhere).abs() <= config.comparison_threshold {
        return None;
    }

    let display = capitalize(&config.brand);
    let content = if ctr_first > ctr_elsewhere {
        format!(
            "Products with brand name \"{}\" at the beginning have {} CTR.",
            display,
            describe_lift(ctr_first, ctr_elsewhere)
        )
    } else {
        format!(
            "Products with brand name \"{}\" not at the beginning perform better with {} CTR.",
            display,
            describe_lift(ctr_elsewhere, ctr_first)
        )
    };

    Some(ProductInsight::new("Brand Position Impact", content, InsightKind::Positive))
}

/// Titles containing the keyword against titles without it, by mean ROAS.
/// Needs both groups populated.
pub fn keyword_insight(products: &[MetricRow], config: &AnalysisConfig) -> Option<ProductInsight> {
    let keyword = config.keyword.to_lowercase();
    if keyword.is_empty() {
        return None;
    }

    let (with, without): (Vec<&MetricRow>, Vec<&MetricRow>) = products
        .iter()
        .partition(|p| p.identity.name.to_lowercase().contains(&keyword));

    if with.is_empty() || without.is_empty() {
        return None;
    }

    let roas_with = mean(&with, |p| p.ratios.roas);
    let roas_without = mean(&without, |p| p.ratios.roas);

    if (roas_with - roas_without).abs() <= config.comparison_threshold {
        return None;
    }

    let (title, content, kind) = if roas_with > roas_without {
        (
            "Keyword Messaging Works",
            format!(
                "Products with \"{}\" in the title have {} ROAS than those without.",
                keyword,
                describe_lift(roas_with, roas_without)
            ),
            InsightKind::Positive,
        )
    } else {
        (
            "Keyword Underperforms",
            format!(
                "Products without \"{}\" in the title have {} ROAS than those with it.",
                keyword,
                describe_lift(roas_without, roas_with)
            ),
            InsightKind::Negative,
        )
    };

    Some(ProductInsight::new(title, content, kind))
}

pub fn word_count(title: &str) -> usize {
    title.split_whitespace().count()
}

/// Mean over a group; an empty group divides by one and so yields zero.
fn mean(group: &[&MetricRow], value: impl Fn(&MetricRow) -> f64) -> f64 {
    let sum = group.iter().fold(0.0, |acc, &p| acc + value(p));
    sum / group.len().max(1) as f64
}

fn describe_lift(better: f64, worse: f64) -> String {
    if worse > 0.0 {
        format!("{:.0}% higher", better / worse * 100.0 - 100.0)
    } else {
        "a higher".to_string()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Counters, RowIdentity};

    fn product(title: &str, impressions: u64, clicks: u64, cost: f64, value: f64) -> MetricRow {
        MetricRow::new(
            RowIdentity::named(title),
            Counters {
                impressions,
                clicks,
                cost,
                conversions: 1.0,
                conversion_value: value,
                view_through_conversions: 0.0,
            },
        )
    }

    #[test]
    fn shorter_titles_win_when_their_roas_is_higher() {
        let products = vec![
            product("Soap Bar", 100, 10, 10.0, 50.0),
            product("Natural Lavender Hand Soap Refill Pack Large", 100, 10, 10.0, 20.0),
        ];
        let insight = title_length_insight(&products, &AnalysisConfig::default()).unwrap();
        assert_eq!(
            insight.content,
            "Shorter titles (under 6 words) are performing better \
             with an average ROAS of 5.0x vs 2.0x for longer titles."
        );
    }

    #[test]
    fn small_differences_stay_silent() {
        let products = vec![
            product("Soap Bar", 100, 10, 10.0, 20.0),
            product("Natural Lavender Hand Soap Refill Pack Large", 100, 10, 10.0, 24.0),
        ];
        assert!(title_length_insight(&products, &AnalysisConfig::default()).is_none());
    }

    #[test]
    fn empty_group_does_not_divide_by_zero() {
        let products = vec![product("Soap Bar", 100, 10, 10.0, 50.0)];
        let insight = title_length_insight(&products, &AnalysisConfig::default()).unwrap();
        assert!(insight.content.contains("5.0x vs 0.0x"));
        assert!(!insight.content.contains("-0.0x"));

        assert!(title_comparisons(&[], &AnalysisConfig::default()).is_empty());
    }

    #[test]
    fn brand_first_titles_compare_on_ctr() {
        let products = vec![
            product("Natulim Dish Soap", 100, 5, 1.0, 1.0),
            product("Dish Soap by Natulim", 100, 2, 1.0, 1.0),
            product("Generic Soap", 100, 50, 1.0, 1.0),
        ];
        let insight = brand_position_insight(&products, &AnalysisConfig::default()).unwrap();
        assert_eq!(
            insight.content,
            "Products with brand name \"Natulim\" at the beginning have 150% higher CTR."
        );
    }

    #[test]
    fn brand_comparison_needs_both_groups() {
        let products = vec![product("Natulim Dish Soap", 100, 5, 1.0, 1.0)];
        assert!(brand_position_insight(&products, &AnalysisConfig::default()).is_none());
    }

    #[test]
    fn keyword_presence_compares_roas() {
        let products = vec![
            product("Detergente Ecológico", 100, 10, 10.0, 60.0),
            product("Detergente Clásico", 100, 10, 10.0, 30.0),
        ];
        let insight = keyword_insight(&products, &AnalysisConfig::default()).unwrap();
        assert_eq!(insight.kind, InsightKind::Positive);
        assert!(insight.content.contains("100% higher ROAS"));

        let reversed = vec![
            product("Detergente Ecológico", 100, 10, 10.0, 10.0),
            product("Detergente Clásico", 100, 10, 10.0, 30.0),
        ];
        let insight = keyword_insight(&reversed, &AnalysisConfig::default()).unwrap();
        assert_eq!(insight.kind, InsightKind::Negative);
    }

    #[test]
    fn counts_words_on_whitespace() {
        assert_eq!(word_count("  Natulim   Soap 500ml "), 3);
        assert_eq!(capitalize("ñandú"), "Ñandú");
    }
}
