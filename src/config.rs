use std::collections::BTreeMap;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::sheets::SheetTab;

pub const DEFAULT_CONVERSION_ACTION: &str = "Google Shopping App Purchase";

/// Single-cell configuration values looked up by name (API keys, prompts,
/// reference titles). Opaque strings, never parsed here.
pub type NamedValues = BTreeMap<String, String>;

/// Everything the service needs, read once at startup and passed down.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    /// Remote sheet endpoint. When unset, tabs are read from the local store.
    pub sheet_url: Option<String>,
    pub reports_dir: PathBuf,
    pub report: ReportConfig,
    pub analysis: AnalysisConfig,
}

/// Tab names and query parameters for the export.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub search_terms_tab: String,
    pub daily_tab: String,
    pub daily2_tab: String,
    pub product_performance_tab: String,
    pub config_info_tab: String,
    pub api_tab: String,
    pub date_range: String,
    pub search_min_impressions: u64,
    pub conversion_action: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            search_terms_tab: "searchTerms".to_string(),
            daily_tab: "daily".to_string(),
            daily2_tab: "daily2".to_string(),
            product_performance_tab: "productPerformance".to_string(),
            config_info_tab: "configInfo".to_string(),
            api_tab: "api".to_string(),
            date_range: "LAST_30_DAYS".to_string(),
            search_min_impressions: 30,
            conversion_action: DEFAULT_CONVERSION_ACTION.to_string(),
        }
    }
}

impl ReportConfig {
    pub fn tab_name(&self, tab: SheetTab) -> &str {
        match tab {
            SheetTab::Daily => &self.daily_tab,
            SheetTab::SearchTerms => &self.search_terms_tab,
            SheetTab::Daily2 => &self.daily2_tab,
            SheetTab::ProductPerformance => &self.product_performance_tab,
            SheetTab::ConfigInfo => &self.config_info_tab,
            SheetTab::Api => &self.api_tab,
        }
    }
}

/// Thresholds and vocabulary for the heuristic analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub currency: String,
    /// ROAS strictly below this is negative.
    pub min_roas: f64,
    /// CPA strictly above this is a warning.
    pub max_cpa: f64,
    pub short_title_words: usize,
    pub comparison_threshold: f64,
    pub brand: String,
    pub keyword: String,
    /// How the keyword is written when added to a title.
    pub keyword_label: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            currency: "€".to_string(),
            min_roas: 1.0,
            max_cpa: 15.0,
            short_title_words: 6,
            comparison_threshold: 0.5,
            brand: "natulim".to_string(),
            keyword: "ecológic".to_string(),
            keyword_label: "Ecológico".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind = env::var("ADLYTICS_BIND").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_addr = bind
            .parse()
            .map_err(|source| ConfigError::BindAddress {
                value: bind.clone(),
                source,
            })?;

        let report_defaults = ReportConfig::default();
        let analysis_defaults = AnalysisConfig::default();

        Ok(Self {
            bind_addr,
            database_path: env::var("ADLYTICS_DB")
                .unwrap_or_else(|_| "adlytics.db".to_string())
                .into(),
            sheet_url: env::var("ADLYTICS_SHEET_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            reports_dir: env::var("ADLYTICS_REPORTS_DIR")
                .unwrap_or_else(|_| "reports".to_string())
                .into(),
            report: ReportConfig {
                date_range: env::var("ADLYTICS_DATE_RANGE")
                    .unwrap_or(report_defaults.date_range.clone()),
                conversion_action: env::var("ADLYTICS_CONVERSION_ACTION")
                    .unwrap_or(report_defaults.conversion_action.clone()),
                ..report_defaults
            },
            analysis: AnalysisConfig {
                currency: env::var("ADLYTICS_CURRENCY")
                    .unwrap_or(analysis_defaults.currency.clone()),
                brand: env::var("ADLYTICS_BRAND")
                    .map(|b| b.to_lowercase())
                    .unwrap_or(analysis_defaults.brand.clone()),
                keyword: env::var("ADLYTICS_KEYWORD")
                    .map(|k| k.to_lowercase())
                    .unwrap_or(analysis_defaults.keyword.clone()),
                ..analysis_defaults
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reporting_conventions() {
        let report = ReportConfig::default();
        assert_eq!(report.conversion_action, "Google Shopping App Purchase");
        assert_eq!(report.search_min_impressions, 30);
        assert_eq!(report.tab_name(SheetTab::Daily2), "daily2");

        let analysis = AnalysisConfig::default();
        assert_eq!(analysis.min_roas, 1.0);
        assert_eq!(analysis.max_cpa, 15.0);
        assert_eq!(analysis.short_title_words, 6);
    }
}
