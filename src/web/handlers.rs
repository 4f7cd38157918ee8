use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::Serialize;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::domain::metric::PageMetric;
use crate::error::Result;
use crate::state::AppState;
use crate::web::utils::{failure, ItemEnvelope, ListEnvelope};

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

pub async fn health() -> Json<HealthResponse> {
    let timestamp = OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default();
    Json(HealthResponse { status: "ok", timestamp })
}

/// GET /api/analytics/pages
pub async fn list_pages(State(state): State<AppState>) -> Result<Json<ListEnvelope<PageMetric>>> {
    let pages = state.analytics.list_pages().await?;
    Ok(Json(ListEnvelope::ok(pages)))
}

/// GET /api/analytics/page/:path
pub async fn page_by_path(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<ItemEnvelope<PageMetric>>> {
    let page = state.analytics.page_by_path(&path).await?;
    Ok(Json(ItemEnvelope::ok(page)))
}

pub async fn not_found() -> Response {
    failure(StatusCode::NOT_FOUND, "Endpoint not found")
}
