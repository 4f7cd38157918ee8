use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::clients::site::PageFetcher;
use crate::services::headline::extract_headline;
use crate::services::title_store::TitleStore;

/// Headline lookup: cache first, live page on a miss.
///
/// Nothing is held across the fetch, so two misses for the same path may both
/// scrape and both write. They write the same value; the last one wins.
pub struct TitleService {
    store: Arc<dyn TitleStore>,
    fetcher: Arc<dyn PageFetcher>,
}

impl TitleService {
    pub fn new(store: Arc<dyn TitleStore>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { store, fetcher }
    }

    pub async fn get_title(&self, path: &str) -> Option<String> {
        if let Some(title) = self.store.get(path).await {
            debug!(%path, "title cache hit");
            return Some(title);
        }

        info!(%path, "scraping headline");
        let html = match self.fetcher.fetch_page(path).await {
            Ok(html) => html,
            Err(e) => {
                warn!(%path, error = %format!("{e:#}"), "error scraping page");
                return None;
            }
        };
        let Some(title) = extract_headline(&html) else {
            warn!(%path, "no headline found on page");
            return None;
        };

        if let Err(e) = self.store.put(path, &title).await {
            warn!(%path, error = %format!("{e:#}"), "error saving title cache");
        }
        Some(title)
    }
}
