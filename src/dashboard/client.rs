use anyhow::{bail, Context};
use serde::Deserialize;
use time::OffsetDateTime;
use url::Url;

use crate::dashboard::rows::PageRow;

#[derive(Debug, Deserialize)]
struct PagesEnvelope {
    success: bool,
    #[serde(default)]
    data: Vec<PageRow>,
    #[serde(default)]
    message: Option<String>,
}

/// Reads the pages list from a running backend.
pub struct DashboardClient {
    http: reqwest::Client,
    base: Url,
}

impl DashboardClient {
    pub fn new(api_url: &str) -> anyhow::Result<Self> {
        let mut base = Url::parse(api_url).with_context(|| format!("bad api url {api_url:?}"))?;
        if !base.path().ends_with('/') {
            let dir = format!("{}/", base.path());
            base.set_path(&dir);
        }
        Ok(Self { http: reqwest::Client::new(), base })
    }

    /// `api/analytics/pages?t=<millis>` under the base; the timestamp defeats intermediary caches.
    pub fn pages_url(&self, now: OffsetDateTime) -> anyhow::Result<Url> {
        let mut url = self.base.join("api/analytics/pages")?;
        let millis = now.unix_timestamp_nanos() / 1_000_000;
        url.query_pairs_mut().append_pair("t", &millis.to_string());
        Ok(url)
    }

    pub async fn fetch_pages(&self) -> anyhow::Result<Vec<PageRow>> {
        let url = self.pages_url(OffsetDateTime::now_utc())?;
        let res = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("could not reach backend at {}", self.base))?;
        let envelope: PagesEnvelope = res.json().await.context("decoding pages response")?;
        decode(envelope)
    }
}

fn decode(envelope: PagesEnvelope) -> anyhow::Result<Vec<PageRow>> {
    if !envelope.success {
        bail!(envelope.message.unwrap_or_else(|| "error fetching data".into()));
    }
    Ok(envelope.data)
}
