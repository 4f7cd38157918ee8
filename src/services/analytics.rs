use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::info;

use crate::clients::ga4::MetricsSource;
use crate::domain::metric::PageMetric;
use crate::error::{AppError, Result};
use crate::services::titles::TitleService;

/// Joins the analytics report with scraped headlines.
pub struct AnalyticsService {
    source: Arc<dyn MetricsSource>,
    titles: Arc<TitleService>,
    concurrency: usize,
}

impl AnalyticsService {
    pub fn new(source: Arc<dyn MetricsSource>, titles: Arc<TitleService>, concurrency: usize) -> Self {
        Self { source, titles, concurrency: concurrency.max(1) }
    }

    pub async fn list_pages(&self) -> Result<Vec<PageMetric>> {
        let rows = self.source.fetch_page_metrics(None).await?;
        let enriched = enrich(rows, &self.titles, self.concurrency).await;
        info!(pages = enriched.len(), "page metrics served");
        Ok(enriched)
    }

    pub async fn page_by_path(&self, path: &str) -> Result<PageMetric> {
        let exact = if path.starts_with('/') { path.to_string() } else { format!("/{path}") };
        let row = self
            .source
            .fetch_page_metrics(Some(&exact))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("No data found for the specified path".into()))?;
        let title = self.titles.get_title(&row.page_path).await;
        Ok(with_fallback_title(row, title))
    }
}

/// Attaches a headline to every row, keeping input order.
///
/// A cache/scrape miss leaves whatever title the report already carried.
pub async fn enrich(rows: Vec<PageMetric>, titles: &TitleService, concurrency: usize) -> Vec<PageMetric> {
    stream::iter(rows)
        .map(|row| async move {
            let title = titles.get_title(&row.page_path).await;
            with_fallback_title(row, title)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

fn with_fallback_title(row: PageMetric, scraped: Option<String>) -> PageMetric {
    let fallback = row.page_title.clone();
    row.with_title(scraped.or(fallback))
}
