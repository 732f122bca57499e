use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde_json::{json, Value};
use tracing::info;

use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::reports::queries::{
    conversion_action_query, daily2_query, daily_query, product_performance_query,
    search_terms_query,
};
use crate::reports::ReportQuery;

const SAMPLE_CAMPAIGNS: &[(&str, &str)] = &[
    ("1001", "Shopping - Limpieza"),
    ("1002", "Search - Marca"),
    ("1003", "Shopping - Cuidado Personal"),
    ("1004", "Performance Max"),
];

const SAMPLE_SEARCH_TERMS: &[&str] = &[
    "limpiador ecologico",
    "detergente natural",
    "jabon lavavajillas eco",
    "natulim",
    "suavizante sin perfume",
    "limpiador multiusos",
];

const SAMPLE_AD_GROUPS: &[&str] = &["Genéricos", "Marca", "Competencia"];

/// Shopping products: some carry a title, some only a landing page.
const SAMPLE_PRODUCTS: &[(&str, &str)] = &[
    ("Natulim Limpiador Multiusos Ecológico 750ml", ""),
    ("Natulim Detergente Ropa 2L", ""),
    ("Jabón Lavavajillas", ""),
    ("", "https://shop.example.com/products/suavizante-concentrado-natural"),
    ("", "https://shop.example.com/products/limpiador-banos-ecologico/"),
    ("Natulim Friegasuelos Natural Ecológico Aroma Lavanda 1L", ""),
    ("Pack Ahorro Limpieza", ""),
];

/// Writes one JSON report per query into `dir`, shaped like a real export,
/// so the pipeline and dashboard can run without the ads platform. The same
/// seed always produces the same rows for the same day.
pub fn generate_sample_reports(
    dir: &Path,
    days: u32,
    seed: u64,
    config: &ReportConfig,
) -> Result<Vec<PathBuf>, ReportError> {
    let mut generator = ReportGenerator::new(seed, days, config.conversion_action.clone());

    // Both campaign tabs describe the same campaign days.
    let campaign_days = generator.campaign_days();
    let reports = [
        (search_terms_query(config), generator.search_terms()),
        (daily_query(config), campaign_days.clone()),
        (daily2_query(config), campaign_days),
        (conversion_action_query(config), generator.conversion_actions()),
        (product_performance_query(config), generator.products()),
    ];

    fs::create_dir_all(dir).map_err(|source| ReportError::Io {
        name: dir.display().to_string(),
        source,
    })?;

    let mut written = Vec::with_capacity(reports.len());
    for (query, rows) in reports {
        written.push(write_report(dir, &query, &rows)?);
    }

    info!("Wrote {} sample reports to {}", written.len(), dir.display());
    Ok(written)
}

fn write_report(dir: &Path, query: &ReportQuery, rows: &[Value]) -> Result<PathBuf, ReportError> {
    let path = dir.join(format!("{}.json", query.name));
    let body = serde_json::to_string_pretty(rows).map_err(|source| ReportError::Decode {
        name: query.name.clone(),
        source,
    })?;
    fs::write(&path, body).map_err(|source| ReportError::Io {
        name: query.name.clone(),
        source,
    })?;
    Ok(path)
}

struct ReportGenerator {
    rng: StdRng,
    dates: Vec<String>,
    conversion_action: String,
}

impl ReportGenerator {
    fn new(seed: u64, days: u32, conversion_action: String) -> Self {
        let today = Utc::now().date_naive();
        let dates = (1..=days.max(1))
            .map(|offset| (today - Duration::days(offset as i64)).format("%Y-%m-%d").to_string())
            .collect();
        Self {
            rng: StdRng::seed_from_u64(seed),
            dates,
            conversion_action,
        }
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.rng.gen_range(0..items.len())]
    }

    /// Impressions, clicks, cost in micros, conversions and value for one row.
    fn counters(&mut self, max_impressions: u64) -> (u64, u64, u64, f64, f64) {
        let impressions = self.rng.gen_range(30..=max_impressions);
        let clicks = self.rng.gen_range(0..=impressions / 10);
        let cpc_micros = self.rng.gen_range(80_000..600_000);
        let conversions = (clicks as f64 * self.rng.gen_range(0.0..0.12)).floor();
        let value = (conversions * self.rng.gen_range(8.0..45.0) * 100.0).round() / 100.0;
        (impressions, clicks, clicks * cpc_micros, conversions, value)
    }

    fn search_terms(&mut self) -> Vec<Value> {
        let mut rows = Vec::new();
        for term in SAMPLE_SEARCH_TERMS {
            let (_, campaign) = *self.pick(SAMPLE_CAMPAIGNS);
            let ad_group = *self.pick(SAMPLE_AD_GROUPS);
            let (impressions, clicks, cost, conversions, value) = self.counters(5_000);
            rows.push(json!({
                "search_term_view.search_term": term,
                "campaign.name": campaign,
                "ad_group.name": ad_group,
                "metrics.impressions": impressions,
                "metrics.clicks": clicks,
                "metrics.cost_micros": cost,
                "metrics.conversions": conversions,
                "metrics.conversions_value": value,
            }));
        }
        rows
    }

    fn campaign_days(&mut self) -> Vec<Value> {
        let mut rows = Vec::new();
        for date in self.dates.clone() {
            for (id, name) in SAMPLE_CAMPAIGNS {
                let (impressions, clicks, cost, conversions, value) = self.counters(20_000);
                let view_through = self.rng.gen_range(0..4);
                rows.push(json!({
                    "campaign.name": name,
                    "campaign.id": id,
                    "segments.date": date,
                    "metrics.impressions": impressions,
                    "metrics.clicks": clicks,
                    "metrics.cost_micros": cost,
                    "metrics.conversions": conversions,
                    "metrics.conversions_value": value,
                    "metrics.view_through_conversions": view_through,
                }));
            }
        }
        rows
    }

    fn conversion_actions(&mut self) -> Vec<Value> {
        let mut rows = Vec::new();
        for date in self.dates.clone() {
            for (id, _) in SAMPLE_CAMPAIGNS {
                if self.rng.gen_bool(0.3) {
                    continue;
                }
                let conversions = self.rng.gen_range(0..6) as f64;
                let value = (conversions * self.rng.gen_range(10.0..40.0) * 100.0).round() / 100.0;
                rows.push(json!({
                    "campaign.id": id,
                    "segments.date": date,
                    "segments.conversion_action_name": self.conversion_action,
                    "segments.conversion_action_category": "PURCHASE",
                    "metrics.conversions": conversions,
                    "metrics.conversions_value": value,
                }));
            }
        }
        rows
    }

    fn products(&mut self) -> Vec<Value> {
        let mut rows = Vec::new();
        for date in self.dates.clone() {
            for (title, url) in SAMPLE_PRODUCTS {
                let (impressions, clicks, cost, conversions, value) = self.counters(3_000);
                let mut row = json!({
                    "segments.date": date,
                    "metrics.impressions": impressions,
                    "metrics.clicks": clicks,
                    "metrics.cost_micros": cost,
                    "metrics.conversions": conversions,
                    "metrics.conversions_value": value,
                });
                if !title.is_empty() {
                    row["segments.product_title"] = json!(title);
                }
                if !url.is_empty() {
                    row["ad_group_ad.ad.final_urls"] = json!([url]);
                }
                rows.push(row);
            }
        }
        rows
    }
}
