use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::google_auth::{ServiceAccountKey, TokenProvider};
use crate::config::Config;
use crate::domain::metric::PageMetric;
use crate::error::{AppError, Result};

pub const API_BASE: &str = "https://analyticsdata.googleapis.com/v1beta";

/// Per-page counters for the reporting window. `None` lists every page matching
/// the path marker, most viewed first; `Some(path)` matches that path exactly.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn fetch_page_metrics(&self, exact_path: Option<&str>) -> Result<Vec<PageMetric>>;
}

pub struct Ga4Client {
    http: reqwest::Client,
    tokens: TokenProvider,
    api_base: String,
    property_id: String,
    path_marker: String,
    window_days: u32,
}

impl Ga4Client {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("news_pulse/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building analytics HTTP client")?;
        let key = ServiceAccountKey::load(&cfg.credentials)?;
        let tokens = TokenProvider::new(http.clone(), key)?;
        info!(client_email = %tokens.client_email(), property = %cfg.property_id, "analytics client ready");
        Ok(Self {
            http,
            tokens,
            api_base: API_BASE.to_string(),
            property_id: cfg.property_id.clone(),
            path_marker: cfg.path_marker.clone(),
            window_days: cfg.window_days,
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    async fn run_report(&self, request: &RunReportRequest) -> anyhow::Result<RunReportResponse> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}/properties/{}:runReport", self.api_base, self.property_id);
        let res = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(request)
            .send()
            .await
            .context("runReport request failed")?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            bail!("runReport returned {}: {}", status.as_u16(), body.trim());
        }
        res.json().await.context("decoding runReport response")
    }
}

#[async_trait]
impl MetricsSource for Ga4Client {
    async fn fetch_page_metrics(&self, exact_path: Option<&str>) -> Result<Vec<PageMetric>> {
        let request = report_request(&self.path_marker, self.window_days, exact_path);
        let response = self
            .run_report(&request)
            .await
            .map_err(|e| AppError::Upstream(format!("{e:#}")))?;
        let metrics = rows_to_metrics(response).map_err(|e| AppError::Upstream(format!("{e:#}")))?;
        debug!(rows = metrics.len(), exact = exact_path.is_some(), "analytics report fetched");
        Ok(metrics)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReportRequest {
    date_ranges: Vec<DateRange>,
    dimensions: Vec<Named>,
    metrics: Vec<Named>,
    dimension_filter: FilterExpression,
    order_bys: Vec<OrderBy>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DateRange {
    start_date: String,
    end_date: String,
}

#[derive(Debug, Serialize)]
struct Named {
    name: &'static str,
}

#[derive(Debug, Serialize)]
struct FilterExpression {
    filter: Filter,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Filter {
    field_name: &'static str,
    string_filter: StringFilter,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StringFilter {
    match_type: &'static str,
    value: String,
}

#[derive(Debug, Serialize)]
struct OrderBy {
    metric: MetricOrder,
    desc: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MetricOrder {
    metric_name: &'static str,
}

pub fn report_request(marker: &str, window_days: u32, exact_path: Option<&str>) -> RunReportRequest {
    let string_filter = match exact_path {
        Some(path) => StringFilter { match_type: "EXACT", value: path.to_string() },
        None => StringFilter { match_type: "CONTAINS", value: marker.to_string() },
    };
    RunReportRequest {
        date_ranges: vec![DateRange { start_date: format!("{window_days}daysAgo"), end_date: "today".into() }],
        dimensions: vec![Named { name: "pagePath" }],
        metrics: vec![
            Named { name: "screenPageViews" },
            Named { name: "activeUsers" },
            Named { name: "userEngagementDuration" },
        ],
        dimension_filter: FilterExpression { filter: Filter { field_name: "pagePath", string_filter } },
        order_bys: vec![OrderBy { metric: MetricOrder { metric_name: "screenPageViews" }, desc: true }],
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RunReportResponse {
    #[serde(default)]
    rows: Vec<ReportRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportRow {
    #[serde(default)]
    dimension_values: Vec<Cell>,
    #[serde(default)]
    metric_values: Vec<Cell>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    #[serde(default)]
    value: String,
}

fn cell<'a>(cells: &'a [Cell], idx: usize, what: &str) -> anyhow::Result<&'a str> {
    cells
        .get(idx)
        .map(|c| c.value.as_str())
        .ok_or_else(|| anyhow!("report row is missing {what}"))
}

fn parse_count(raw: &str, what: &str) -> anyhow::Result<u64> {
    raw.trim().parse().with_context(|| format!("bad {what} value {raw:?}"))
}

/// Rows arrive one per path, already ordered by views.
pub fn rows_to_metrics(response: RunReportResponse) -> anyhow::Result<Vec<PageMetric>> {
    response
        .rows
        .into_iter()
        .map(|row| {
            let path = cell(&row.dimension_values, 0, "pagePath")?;
            let views = parse_count(cell(&row.metric_values, 0, "screenPageViews")?, "screenPageViews")?;
            let users = parse_count(cell(&row.metric_values, 1, "activeUsers")?, "activeUsers")?;
            let raw_duration = cell(&row.metric_values, 2, "userEngagementDuration")?;
            let duration: f64 = raw_duration
                .trim()
                .parse()
                .with_context(|| format!("bad userEngagementDuration value {raw_duration:?}"))?;
            Ok(PageMetric::new(path, views, users, duration))
        })
        .collect()
}
