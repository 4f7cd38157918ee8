use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};

/// Key/value store for scraped headlines, keyed by page path.
#[async_trait]
pub trait TitleStore: Send + Sync {
    async fn get(&self, path: &str) -> Option<String>;
    async fn put(&self, path: &str, title: &str) -> anyhow::Result<()>;
}

/// Headlines kept in memory and mirrored to one JSON object on disk.
///
/// The file is read once when opened and rewritten in full on every `put`.
/// Entries are never removed.
pub struct JsonFileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
    // One writer at a time; each snapshot is taken after the previous file landed.
    writer: Mutex<()>,
}

impl JsonFileStore {
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match load(&path).await {
            Ok(entries) => entries,
            Err(e) => {
                error!(path = %path.display(), error = %format!("{e:#}"), "error loading title cache");
                BTreeMap::new()
            }
        };
        info!(path = %path.display(), entries = entries.len(), "title cache loaded");
        Self { path, entries: RwLock::new(entries), writer: Mutex::new(()) }
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    #[cfg(test)]
    pub(crate) async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

async fn load(path: &Path) -> anyhow::Result<BTreeMap<String, String>> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Ok(BTreeMap::new());
    }
    let raw = tokio::fs::read_to_string(path).await.context("reading title cache")?;
    serde_json::from_str(&raw).context("parsing title cache")
}

#[async_trait]
impl TitleStore for JsonFileStore {
    async fn get(&self, path: &str) -> Option<String> {
        self.entries
            .read()
            .await
            .get(path)
            .filter(|t| !t.is_empty())
            .cloned()
    }

    async fn put(&self, path: &str, title: &str) -> anyhow::Result<()> {
        let _writer = self.writer.lock().await;
        let snapshot = {
            let mut entries = self.entries.write().await;
            entries.insert(path.to_string(), title.to_string());
            serde_json::to_string_pretty(&*entries)?
        };

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, snapshot)
            .await
            .with_context(|| format!("writing title cache {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replacing title cache {}", self.path.display()))
    }
}
