use std::fmt;

use crate::config::ReportConfig;

/// Declarative report query, rendered into the ads query language on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    pub name: String,
    pub resource: String,
    pub fields: Vec<String>,
    pub conditions: Vec<String>,
    pub order_by: Vec<String>,
}

impl ReportQuery {
    fn new(name: &str, resource: &str, fields: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            resource: resource.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            conditions: Vec::new(),
            order_by: Vec::new(),
        }
    }

    fn filter(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    fn order(mut self, clause: impl Into<String>) -> Self {
        self.order_by.push(clause.into());
        self
    }
}

impl fmt::Display for ReportQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT {} FROM {}", self.fields.join(", "), self.resource)?;
        if !self.conditions.is_empty() {
            write!(f, " WHERE {}", self.conditions.join(" AND "))?;
        }
        if !self.order_by.is_empty() {
            write!(f, " ORDER BY {}", self.order_by.join(", "))?;
        }
        Ok(())
    }
}

fn during(config: &ReportConfig) -> String {
    format!("segments.date DURING {}", config.date_range)
}

pub fn search_terms_query(config: &ReportConfig) -> ReportQuery {
    ReportQuery::new(
        "search_terms",
        "search_term_view",
        &[
            "search_term_view.search_term",
            "campaign.name",
            "ad_group.name",
            "metrics.impressions",
            "metrics.clicks",
            "metrics.cost_micros",
            "metrics.conversions",
            "metrics.conversions_value",
        ],
    )
    .filter(during(config))
    .filter("campaign.advertising_channel_type = \"SEARCH\"")
    .filter(format!("metrics.impressions >= {}", config.search_min_impressions))
    .order("metrics.cost_micros DESC")
}

pub fn daily_query(config: &ReportConfig) -> ReportQuery {
    ReportQuery::new(
        "daily",
        "campaign",
        &[
            "campaign.name",
            "campaign.id",
            "metrics.clicks",
            "metrics.conversions_value",
            "metrics.conversions",
            "metrics.cost_micros",
            "metrics.impressions",
            "segments.date",
        ],
    )
    .filter(during(config))
    .order("segments.date DESC")
    .order("metrics.cost_micros DESC")
}

pub fn daily2_query(config: &ReportConfig) -> ReportQuery {
    ReportQuery::new(
        "daily2",
        "campaign",
        &[
            "campaign.name",
            "campaign.id",
            "metrics.clicks",
            "metrics.impressions",
            "metrics.cost_micros",
            "metrics.view_through_conversions",
            "segments.date",
            "metrics.conversions",
        ],
    )
    .filter(during(config))
    .order("segments.date DESC")
    .order("metrics.cost_micros DESC")
}

pub fn conversion_action_query(config: &ReportConfig) -> ReportQuery {
    ReportQuery::new(
        "conversion_actions",
        "campaign",
        &[
            "campaign.id",
            "segments.date",
            "segments.conversion_action_name",
            "segments.conversion_action_category",
            "metrics.conversions",
            "metrics.conversions_value",
        ],
    )
    .filter(during(config))
    .filter(format!(
        "segments.conversion_action_name = \"{}\"",
        config.conversion_action.replace('"', "\\\"")
    ))
}

pub fn product_performance_query(config: &ReportConfig) -> ReportQuery {
    ReportQuery::new(
        "product_performance",
        "shopping_performance_view",
        &[
            "segments.product_title",
            "metrics.impressions",
            "metrics.clicks",
            "metrics.cost_micros",
            "metrics.conversions",
            "metrics.conversions_value",
            "segments.date",
        ],
    )
    .filter(during(config))
    .filter("campaign.advertising_channel_type = \"SHOPPING\"")
    .order("metrics.cost_micros DESC")
}
