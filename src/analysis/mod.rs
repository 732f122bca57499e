use serde::Serialize;

pub mod performance;
pub mod title_insights;
pub mod title_service;

pub use performance::{classify_performance, PerformanceFigures};
pub use title_insights::title_comparisons;
pub use title_service::{HeuristicTitleService, TitleAnalysisService};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Negative,
    Warning,
    Positive,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub text: String,
    pub sentiment: Sentiment,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Positive,
    Negative,
    Suggestion,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ProductInsight {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: InsightKind,
}

impl ProductInsight {
    pub fn new(title: impl Into<String>, content: impl Into<String>, kind: InsightKind) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            kind,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TitleImprovement {
    pub original_title: String,
    pub improved_title: String,
    pub explanation: String,
    /// 1 to 10.
    pub score: u8,
}
