use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use super::AppState;
use crate::aggregators::product_metrics_aggregator::{
    chart_value, converting_products, select_products, sort_products, summarize,
};
use crate::aggregators::{
    ChartMetric, ProductSelection, ProductSortField, ProductSummary, SortDirection,
};
use crate::analysis::{title_comparisons, ProductInsight, TitleAnalysisService, TitleImprovement};
use crate::config::AnalysisConfig;
use crate::metrics::MetricRow;
use crate::sheets::{fetch_all_tabs, TabData};

#[derive(Deserialize, Default, Debug)]
#[serde(default)]
pub struct ProductParams {
    pub sort: ProductSortField,
    pub direction: SortDirection,
    pub metric: ChartMetric,
    pub selection: ProductSelection,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub title: String,
    pub value: f64,
}

#[derive(Serialize, Debug)]
pub struct ProductsView {
    pub summary: ProductSummary,
    pub products: Vec<MetricRow>,
    pub chart: Vec<ChartPoint>,
    pub insights: Vec<ProductInsight>,
    pub improvements: Vec<TitleImprovement>,
    pub warnings: Vec<String>,
}

pub async fn build_products_view(
    data: &TabData,
    params: &ProductParams,
    config: &AnalysisConfig,
    service: &dyn TitleAnalysisService,
) -> ProductsView {
    let mut products = converting_products(&data.products);
    let named = data.named_values();

    let chart = select_products(&products, params.metric, params.selection)
        .iter()
        .map(|p| ChartPoint {
            title: p.identity.name.clone(),
            value: chart_value(p, params.metric),
        })
        .collect();

    let insights = service
        .title_insights(&products, &named)
        .await
        .unwrap_or_else(|e| {
            error!("Title insights unavailable: {}", e);
            title_comparisons(&products, config)
        });

    let improvements = service
        .improve_titles(&products, &named)
        .await
        .unwrap_or_else(|e| {
            error!("Title improvements unavailable: {}", e);
            Vec::new()
        });

    sort_products(&mut products, params.sort, params.direction);

    ProductsView {
        summary: summarize(&products),
        products,
        chart,
        insights,
        improvements,
        warnings: data.warnings.clone(),
    }
}

pub async fn get_products(
    State(state): State<AppState>,
    Query(params): Query<ProductParams>,
) -> Json<ProductsView> {
    let data = fetch_all_tabs(&state.tabs, &state.config.report).await;
    Json(
        build_products_view(
            &data,
            &params,
            &state.config.analysis,
            state.title_service.as_ref(),
        )
        .await,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::HeuristicTitleService;
    use crate::config::NamedValues;
    use crate::error::AnalysisError;
    use crate::metrics::{Counters, RowIdentity};
    use async_trait::async_trait;

    struct DownService;

    #[async_trait]
    impl TitleAnalysisService for DownService {
        async fn title_insights(
            &self,
            _products: &[MetricRow],
            _named: &NamedValues,
        ) -> Result<Vec<ProductInsight>, AnalysisError> {
            Err(AnalysisError::Unavailable("timeout".to_string()))
        }

        async fn improve_titles(
            &self,
            _products: &[MetricRow],
            _named: &NamedValues,
        ) -> Result<Vec<TitleImprovement>, AnalysisError> {
            Err(AnalysisError::Unavailable("timeout".to_string()))
        }
    }

    fn product(title: &str, cost: f64, conversions: f64, value: f64) -> MetricRow {
        MetricRow::new(
            RowIdentity::named(title),
            Counters {
                impressions: 500,
                clicks: 20,
                cost,
                conversions,
                conversion_value: value,
                view_through_conversions: 0.0,
            },
        )
    }

    fn data() -> TabData {
        TabData {
            products: vec![
                product("Natulim Jabón 500ml", 10.0, 2.0, 60.0),
                product("Limpiador Multiusos Para Cocina Y Baño Grande", 20.0, 1.0, 20.0),
                product("No sales", 5.0, 0.0, 0.0),
                product("Half a sale", 5.0, 0.5, 10.0),
            ],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn only_converting_products_are_reported() {
        let service = HeuristicTitleService::new(AnalysisConfig::default());
        let view = build_products_view(
            &data(),
            &ProductParams::default(),
            &AnalysisConfig::default(),
            &service,
        )
        .await;

        assert_eq!(view.summary.products, 2);
        assert_eq!(view.summary.total_value, 80.0);
        assert_eq!(view.summary.overall_roas, 80.0 / 30.0);
        assert_eq!(
            view.products[0].identity.name,
            "Limpiador Multiusos Para Cocina Y Baño Grande"
        );
        assert_eq!(view.chart[0].title, "Natulim Jabón 500ml");
        assert_eq!(view.chart[0].value, 6.0);
        assert!(!view.insights.is_empty());
        assert_eq!(view.improvements.len(), 1);
    }

    #[tokio::test]
    async fn service_failure_degrades_to_comparisons_only() {
        let params = ProductParams {
            sort: ProductSortField::Roas,
            direction: SortDirection::Asc,
            ..Default::default()
        };
        let config = AnalysisConfig::default();
        let view = build_products_view(&data(), &params, &config, &DownService).await;

        assert!(view.improvements.is_empty());
        let products = converting_products(&data().products);
        assert_eq!(view.insights, title_comparisons(&products, &config));
        assert_eq!(view.products[0].ratios.roas, 1.0);
    }

    #[tokio::test]
    async fn insights_come_from_the_service_once() {
        let config = AnalysisConfig::default();
        let service = HeuristicTitleService::new(config.clone());
        let view = build_products_view(&data(), &ProductParams::default(), &config, &service).await;

        let products = converting_products(&data().products);
        let expected = service
            .title_insights(&products, &data().named_values())
            .await
            .unwrap();
        assert_eq!(view.insights, expected);

        let comparisons = title_comparisons(&products, &config);
        let repeated = view
            .insights
            .iter()
            .filter(|i| comparisons.contains(i))
            .count();
        assert_eq!(repeated, comparisons.len());
    }
}
