use std::sync::Arc;

use serde::Deserialize;

use crate::analysis::TitleAnalysisService;
use crate::config::AppConfig;
use crate::sheets::{SheetTab, TabSource};
use crate::store::TabStore;

pub mod campaigns;
pub mod export_status;
pub mod health;
pub mod overview;
pub mod products;
pub mod search_terms;

pub use campaigns::*;
pub use export_status::*;
pub use health::*;
pub use overview::*;
pub use products::*;
pub use search_terms::*;

#[derive(Clone)]
pub struct AppState {
    pub tabs: TabSource,
    pub store: TabStore,
    pub config: Arc<AppConfig>,
    pub title_service: Arc<dyn TitleAnalysisService>,
}

/// Which campaign-day tab a dashboard view reads.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DailyTab {
    #[default]
    Daily,
    Daily2,
}

impl DailyTab {
    pub fn sheet_tab(self) -> SheetTab {
        match self {
            DailyTab::Daily => SheetTab::Daily,
            DailyTab::Daily2 => SheetTab::Daily2,
        }
    }
}
