use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use super::title_insights::title_comparisons;
use super::{InsightKind, ProductInsight, TitleImprovement};
use crate::config::{AnalysisConfig, NamedValues};
use crate::error::AnalysisError;
use crate::metrics::MetricRow;

const HIGH_PERFORMER_ROAS: f64 = 4.0;
const IMPROVEMENT_MAX_ROAS: f64 = 3.0;
const DEFAULT_SIZE: &str = "500ml";

/// Title enrichment that may live behind a slow external API.
#[async_trait]
pub trait TitleAnalysisService: Send + Sync {
    async fn title_insights(
        &self,
        products: &[MetricRow],
        named: &NamedValues,
    ) -> Result<Vec<ProductInsight>, AnalysisError>;

    async fn improve_titles(
        &self,
        products: &[MetricRow],
        named: &NamedValues,
    ) -> Result<Vec<TitleImprovement>, AnalysisError>;
}

/// Local stand-in for an API-backed service. Works from the product metrics
/// alone and ignores the named values. Its insights are the title comparisons
/// followed by the suggestions.
pub struct HeuristicTitleService {
    config: AnalysisConfig,
}

impl HeuristicTitleService {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    fn improve(&self, original: &str) -> (String, Vec<&'static str>) {
        let brand = self.config.brand.to_lowercase();
        let keyword = self.config.keyword.to_lowercase();
        let label = &self.config.keyword_label;
        let mut improved = original.to_string();
        let mut changes = Vec::new();

        if !brand.is_empty() && !improved.to_lowercase().starts_with(&brand) {
            improved = format!("{} {}", capitalize(&self.config.brand), improved);
            changes.push("Added brand name to the start for better brand recognition");
        }

        if !has_size(&improved) && improved.chars().count() < 50 {
            improved = format!("{} {}", improved, DEFAULT_SIZE);
            changes.push("Added size information for clarity and customer expectations");
        }

        if !keyword.is_empty()
            && !improved.to_lowercase().contains(&keyword)
            && improved.chars().count() < 60
        {
            improved = format!("{} {}", improved, label);
            changes.push("Added the keyword to highlight what resonates with customers");
        }

        if !improved.to_lowercase().contains("natural")
            && improved.chars().count() < 65
            && improved.contains(label.as_str())
        {
            improved = improved.replacen(label.as_str(), &format!("Natural {}", label), 1);
            changes.push("Added \"Natural\" to emphasize product quality and ingredients");
        }

        let lower = improved.to_lowercase();
        if lower.contains("limpiador")
            && !lower.contains("concentrado")
            && improved.contains("Limpiador")
        {
            improved = improved.replacen("Limpiador", "Limpiador Concentrado", 1);
            changes.push("Added \"Concentrado\" to highlight product strength and value");
        }

        (improved, changes)
    }
}

#[async_trait]
impl TitleAnalysisService for HeuristicTitleService {
    async fn title_insights(
        &self,
        products: &[MetricRow],
        _named: &NamedValues,
    ) -> Result<Vec<ProductInsight>, AnalysisError> {
        let mut insights = title_comparisons(products, &self.config);

        let high_performers = high_performers(products);
        if high_performers.iter().any(|p| !has_size(&p.identity.name)) {
            insights.push(ProductInsight::new(
                "Consider Adding Product Sizes",
                "Some top-performing products don't include size information. \
                 Adding this could improve performance further.",
                InsightKind::Suggestion,
            ));
        }

        insights.push(ProductInsight::new(
            "Descriptive Attributes",
            "Add more descriptive attributes (like \"Concentrado\" or \"Ultra\") \
             for underperforming products to increase interest.",
            InsightKind::Suggestion,
        ));

        debug!(
            "Generated {} title insights for {} products",
            insights.len(),
            products.len()
        );
        Ok(insights)
    }

    async fn improve_titles(
        &self,
        products: &[MetricRow],
        _named: &NamedValues,
    ) -> Result<Vec<TitleImprovement>, AnalysisError> {
        let mut candidates: Vec<&MetricRow> = products
            .iter()
            .filter(|p| p.counters.conversions > 0.0 && p.ratios.roas < IMPROVEMENT_MAX_ROAS)
            .collect();
        candidates.sort_by(|a, b| a.ratios.roas.total_cmp(&b.ratios.roas));

        let improvements = candidates
            .into_iter()
            .take(3)
            .map(|product| {
                let original = &product.identity.name;
                let (improved, changes) = self.improve(original);
                let explanation = if changes.is_empty() {
                    "Minor improvements to align with successful product patterns \
                     while maintaining the original message."
                        .to_string()
                } else {
                    format!(
                        "{}. These changes align with patterns observed \
                         in top-performing products.",
                        changes.join(". ")
                    )
                };
                TitleImprovement {
                    original_title: original.clone(),
                    improved_title: improved,
                    explanation,
                    score: (7 + changes.len()).min(10) as u8,
                }
            })
            .collect();

        Ok(improvements)
    }
}

/// Top five products by ROAS among those above the high-performer line.
fn high_performers(products: &[MetricRow]) -> Vec<&MetricRow> {
    let mut high: Vec<&MetricRow> = products
        .iter()
        .filter(|p| p.ratios.roas > HIGH_PERFORMER_ROAS)
        .collect();
    high.sort_by(|a, b| b.ratios.roas.total_cmp(&a.ratios.roas));
    high.truncate(5);
    high
}

fn size_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\d+\s*(ml|g|kg|l|oz|unidades|uds)\b").expect("size pattern is valid")
    })
}

pub fn has_size(title: &str) -> bool {
    size_pattern().is_match(title)
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

    fn product(title: &str, cost: f64, conversions: f64, value: f64) -> MetricRow {
        MetricRow::new(
            RowIdentity::named(title),
            Counters {
                impressions: 1000,
                clicks: 50,
                cost,
                conversions,
                conversion_value: value,
                view_through_conversions: 0.0,
            },
        )
    }

    fn service() -> HeuristicTitleService {
        HeuristicTitleService::new(AnalysisConfig::default())
    }

    #[test]
    fn detects_size_tokens() {
        assert!(has_size("Jabón 500 ml"));
        assert!(has_size("Pack 12uds"));
        assert!(has_size("Detergent 2KG refill"));
        assert!(!has_size("Detergent refill"));
        assert!(!has_size("Model 3000"));
    }

    fn suggestions(insights: &[ProductInsight]) -> Vec<&str> {
        insights
            .iter()
            .filter(|i| i.kind == InsightKind::Suggestion)
            .map(|i| i.title.as_str())
            .collect()
    }

    #[tokio::test]
    async fn suggests_sizes_when_a_top_product_lacks_one() {
        let products = vec![product("Natulim Jabón", 10.0, 2.0, 100.0)];
        let insights = service()
            .title_insights(&products, &NamedValues::new())
            .await
            .unwrap();

        assert_eq!(
            suggestions(&insights),
            vec!["Consider Adding Product Sizes", "Descriptive Attributes"]
        );
    }

    #[tokio::test]
    async fn no_size_suggestion_when_top_products_have_sizes() {
        let products = vec![product("Natulim Jabón 500ml", 10.0, 2.0, 100.0)];
        let insights = service()
            .title_insights(&products, &NamedValues::new())
            .await
            .unwrap();
        assert_eq!(suggestions(&insights), vec!["Descriptive Attributes"]);
    }

    #[tokio::test]
    async fn insights_start_with_the_title_comparisons() {
        let products = vec![
            product("Natulim Jabón 500ml", 10.0, 2.0, 100.0),
            product("Limpiador Multiusos Para Cocina Y Baño Grande", 10.0, 1.0, 10.0),
        ];
        let config = AnalysisConfig::default();
        let comparisons = title_comparisons(&products, &config);
        assert!(!comparisons.is_empty());

        let insights = service()
            .title_insights(&products, &NamedValues::new())
            .await
            .unwrap();

        assert_eq!(&insights[..comparisons.len()], &comparisons[..]);
        assert_eq!(insights.len(), comparisons.len() + 1);
        assert_eq!(insights.last().unwrap().title, "Descriptive Attributes");
    }

    #[tokio::test]
    async fn improves_the_worst_three_low_performers() {
        let products = vec![
            product("Limpiador Multiusos", 10.0, 1.0, 5.0),
            product("Natulim Jabón Natural Ecológico 500ml", 10.0, 1.0, 20.0),
            product("Suavizante", 10.0, 1.0, 10.0),
            product("Detergente", 10.0, 1.0, 25.0),
            product("Bestseller", 10.0, 1.0, 90.0),
            product("Never sold", 10.0, 0.0, 0.0),
        ];
        let improvements = service().improve_titles(&products, &NamedValues::new()).await.unwrap();

        assert_eq!(improvements.len(), 3);
        assert_eq!(improvements[0].original_title, "Limpiador Multiusos");
        assert_eq!(
            improvements[0].improved_title,
            "Natulim Limpiador Concentrado Multiusos 500ml Natural Ecológico"
        );
        assert_eq!(improvements[0].score, 10);

        assert_eq!(improvements[2].original_title, "Natulim Jabón Natural Ecológico 500ml");
        assert_eq!(improvements[2].improved_title, improvements[2].original_title);
        assert_eq!(improvements[2].score, 7);
        assert!(improvements[2].explanation.starts_with("Minor improvements"));
        assert!(improvements.iter().all(|i| (1..=10).contains(&i.score)));
    }
}
