pub mod clients { pub mod ga4; pub mod google_auth; pub mod site; }
pub mod config;
pub mod telemetry;
pub mod state;
pub mod error;
pub mod domain { pub mod metric; }
pub mod services { pub mod analytics; pub mod headline; pub mod title_store; pub mod titles; }
pub mod web { pub mod router; pub mod handlers; pub mod utils; }
pub mod dashboard { pub mod client; pub mod export; pub mod rows; pub mod summary; }

use std::sync::Arc;

use crate::clients::{ga4::Ga4Client, site::SiteClient};
use crate::services::{analytics::AnalyticsService, title_store::JsonFileStore, titles::TitleService};
use crate::state::AppState;

pub async fn build_app(cfg: crate::config::Config) -> anyhow::Result<(axum::Router, u16)> {
    let source = Ga4Client::new(&cfg)?;
    let fetcher = SiteClient::new(&cfg.site_base_url, cfg.scrape_timeout)?;
    let store = JsonFileStore::open(cfg.title_cache_path.clone()).await;

    let titles = TitleService::new(Arc::new(store), Arc::new(fetcher));
    let analytics = AnalyticsService::new(Arc::new(source), Arc::new(titles), cfg.enrich_concurrency);
    let state = AppState::new(analytics);

    Ok((crate::web::router::build_router(state), cfg.port))
}
