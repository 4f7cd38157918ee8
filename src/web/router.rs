use axum::{routing::get, Router};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use super::handlers::{health, list_pages, not_found, page_by_path};
use super::utils::panic_response;

pub fn build_router(state: AppState) -> Router {
    let analytics = Router::new()
        .route("/pages", get(list_pages))
        .route("/page/:path", get(page_by_path));

    Router::new()
        .route("/health", get(health))
        .nest("/api/analytics", analytics)
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
