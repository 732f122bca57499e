use std::sync::Arc;

use anyhow::{bail, Context};
use axum::{routing::get, Router};
use tokio_rusqlite::Connection;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use adlytics::analysis::HeuristicTitleService;
use adlytics::config::AppConfig;
use adlytics::dev_tools::report_generator::generate_sample_reports;
use adlytics::handlers::{
    get_campaigns, get_export_status, get_overview, get_products, get_search_terms, health_check,
    AppState,
};
use adlytics::migrations::initialize_database;
use adlytics::reports::{run_export, FileReportSource};
use adlytics::sheets::{SheetClient, TabSource};
use adlytics::store::TabStore;

const SAMPLE_DAYS: u32 = 30;
const SAMPLE_SEED: u64 = 2024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let mode = std::env::args().nth(1).unwrap_or_else(|| "serve".to_string());

    match mode.as_str() {
        "serve" => serve(config).await,
        "export" => export(config).await,
        "sample-reports" => {
            generate_sample_reports(&config.reports_dir, SAMPLE_DAYS, SAMPLE_SEED, &config.report)?;
            Ok(())
        }
        other => bail!("unknown mode {other:?}, expected serve, export or sample-reports"),
    }
}

async fn open_store(config: &AppConfig) -> anyhow::Result<TabStore> {
    let db = Connection::open(&config.database_path)
        .await
        .with_context(|| format!("opening {}", config.database_path.display()))?;
    initialize_database(&db).await?;
    Ok(TabStore::new(Arc::new(db)))
}

async fn export(config: AppConfig) -> anyhow::Result<()> {
    info!("Exporting reports from {}", config.reports_dir.display());

    let store = open_store(&config).await?;
    let source = FileReportSource::new(&config.reports_dir);
    let summary = run_export(&source, &store, &config.report).await;

    for warning in &summary.warnings {
        warn!("{}", warning);
    }
    info!(
        "Export finished: {} tabs, {} failed",
        summary.tabs.len(),
        summary.failed()
    );
    Ok(())
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    info!("Starting adlytics server...");

    let store = open_store(&config).await?;
    let tabs = match &config.sheet_url {
        Some(url) => {
            info!("Reading tabs from {}", url);
            TabSource::Http(SheetClient::new(url)?)
        }
        None => {
            info!("Reading tabs from {}", config.database_path.display());
            TabSource::Store(store.clone())
        }
    };

    let addr = config.bind_addr;
    let app_state = AppState {
        tabs,
        store,
        title_service: Arc::new(HeuristicTitleService::new(config.analysis.clone())),
        config: Arc::new(config),
    };

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/campaigns", get(get_campaigns))
        .route("/api/overview", get(get_overview))
        .route("/api/search-terms", get(get_search_terms))
        .route("/api/products", get(get_products))
        .route("/api/export-status", get(get_export_status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
