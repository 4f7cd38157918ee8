use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use url::Url;

/// Fetches the live HTML for a page path.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, path: &str) -> anyhow::Result<String>;
}

#[derive(Clone)]
pub struct SiteClient {
    http: Client,
    base: Url,
}

impl SiteClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("bad site base url {base_url:?}"))?;
        let http = Client::builder()
            .user_agent(concat!("news_pulse/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .redirect(Policy::limited(5))
            .timeout(timeout)
            .build()
            .context("building site HTTP client")?;
        Ok(Self { http, base })
    }

    /// Base URL with the path appended verbatim, never resolved as a reference.
    pub fn page_url(&self, path: &str) -> anyhow::Result<Url> {
        let base = self.base.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let url = Url::parse(&format!("{base}/{path}")).with_context(|| format!("bad page path {path:?}"))?;
        if url.origin() != self.base.origin() {
            bail!("page path {path:?} leaves {}", self.base);
        }
        Ok(url)
    }
}

#[async_trait]
impl PageFetcher for SiteClient {
    async fn fetch_page(&self, path: &str) -> anyhow::Result<String> {
        let url = self.page_url(path)?;
        let res = self.http.get(url.clone()).send().await?;
        let status = res.status();
        if !status.is_success() {
            bail!("GET {url} returned {}", status.as_u16());
        }
        Ok(res.text().await?)
    }
}
