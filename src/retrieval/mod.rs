//! Site content retrieval: fetch, chunk, index, and cache per base URL.
//!
//! The cache is an explicit object owned by `AppState`, not a process
//! global. Entries live for the life of the process and are never
//! refreshed. A failed fetch is remembered as an explicit sentinel so later
//! turns short-circuit instead of hammering a dead site.

pub mod fetch;
pub mod index;

pub use fetch::{fetch_site_text, html_to_text, RetrievalError};
pub use index::{chunk_text, TfIdfIndex};

use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Fitted retrieval state for one site.
#[derive(Debug)]
pub struct SiteIndex {
    /// Plain text of the whole page, for truncation-based retrieval.
    pub text: String,
    pub chunks: Vec<String>,
    index: TfIdfIndex,
}

impl SiteIndex {
    pub fn build(text: String, window: usize) -> Self {
        let chunks = chunk_text(&text, window);
        let index = TfIdfIndex::fit(&chunks);
        Self { text, chunks, index }
    }

    /// Top-k chunks for a query, best first.
    pub fn top_chunks(&self, query: &str, k: usize) -> Vec<&str> {
        self.index
            .rank(query, k)
            .into_iter()
            .map(|i| self.chunks[i].as_str())
            .collect()
    }
}

/// A cache entry: `None` means a fetch was attempted and failed.
pub type CacheEntry = Option<Arc<SiteIndex>>;

/// Per-URL site index cache. Populate-on-first-use, never invalidated.
///
/// Concurrent turns may race to populate the same URL; the value is derived
/// deterministically from the same input, so last-writer-wins is safe. No
/// lock is held across an await point.
pub struct SiteCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    max_entries: Option<usize>,
}

impl SiteCache {
    /// Unbounded cache (current policy for this service).
    pub fn unbounded() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: None,
        }
    }

    /// Cache that stops accepting new URLs past `limit` entries.
    pub fn with_capacity_limit(limit: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: Some(limit),
        }
    }

    /// Outer `None` means "never attempted"; inner `None` is the
    /// fetch-failed sentinel.
    pub async fn lookup(&self, url: &str) -> Option<CacheEntry> {
        self.entries.read().await.get(url).cloned()
    }

    pub async fn store(&self, url: &str, entry: CacheEntry) {
        let mut entries = self.entries.write().await;
        if let Some(limit) = self.max_entries {
            if entries.len() >= limit && !entries.contains_key(url) {
                debug!("site cache at capacity ({}), not caching {}", limit, url);
                return;
            }
        }
        entries.insert(url.to_string(), entry);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Return the index for `url`, fetching and fitting it on first use.
///
/// Returns `None` when the site could not be fetched, now or on a previous
/// attempt this process.
pub async fn ensure_site_indexed(
    cache: &SiteCache,
    client: &Client,
    url: &str,
    window: usize,
    timeout: Duration,
) -> Option<Arc<SiteIndex>> {
    if let Some(entry) = cache.lookup(url).await {
        return entry;
    }

    match fetch_site_text(client, url, timeout).await {
        Ok(text) => {
            let site = Arc::new(SiteIndex::build(text, window));
            info!("indexed {} into {} chunks", url, site.chunks.len());
            cache.store(url, Some(site.clone())).await;
            Some(site)
        }
        Err(e) => {
            error!("failed to prepare site index for {}: {}", url, e);
            cache.store(url, None).await;
            None
        }
    }
}
