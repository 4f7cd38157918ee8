use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

/// Where the analytics service-account key comes from.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Inline key JSON, preferred when present and parseable.
    pub inline_json: Option<String>,
    pub key_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub property_id: String,
    pub credentials: Credentials,
    pub port: u16,
    pub site_base_url: String,
    pub path_marker: String,
    pub window_days: u32,
    pub title_cache_path: PathBuf,
    pub scrape_timeout: Duration,
    pub enrich_concurrency: usize,
}

fn default_port() -> u16 { 3000 }
fn default_site() -> String { "https://www.iabargentina.com.ar".into() }
fn default_marker() -> String { "noticia-".into() }
fn default_window_days() -> u32 { 30 }
fn default_scrape_timeout() -> Duration { Duration::from_secs(5) }
fn default_concurrency() -> usize { 4 }

fn parsed<T: FromStr>(raw: Option<String>) -> Option<T> {
    raw.and_then(|v| v.trim().parse().ok())
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let property_id = var("GA_PROPERTY_ID").context("GA_PROPERTY_ID is not set")?;
        let credentials = Credentials {
            inline_json: var("GOOGLE_APPLICATION_CREDENTIALS_JSON"),
            key_file: var("GOOGLE_APPLICATION_CREDENTIALS")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("credentials.json")),
        };

        Ok(Self {
            property_id: property_id.trim().to_string(),
            credentials,
            port: parsed::<u16>(var("PORT")).unwrap_or(default_port()),
            site_base_url: var("SITE_BASE_URL").unwrap_or_else(default_site),
            path_marker: var("PATH_MARKER").unwrap_or_else(default_marker),
            window_days: parsed::<u32>(var("REPORT_WINDOW_DAYS")).filter(|d| *d > 0).unwrap_or(default_window_days()),
            title_cache_path: var("TITLE_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("titles-cache.json")),
            scrape_timeout: parsed::<u64>(var("SCRAPE_TIMEOUT_SECS"))
                .map(Duration::from_secs)
                .unwrap_or_else(default_scrape_timeout),
            enrich_concurrency: parsed::<usize>(var("ENRICH_CONCURRENCY")).filter(|n| *n > 0).unwrap_or(default_concurrency()),
        })
    }
}
