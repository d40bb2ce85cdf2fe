// Repository fetcher.
// Serves the repository list from cache when possible, fetches it synchronously
// on a cold cache, and refreshes a stale cache in the background.

use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::{FinderError, Result};
use crate::github::{EnterpriseClient, REPOSITORIES_PATH, RepositoryList, pagination};

/// Cache and pagination policy for a fetcher.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Cache entry holding the repository list.
    pub cache_key: String,
    /// Maximum age served without a refresh.
    pub freshness_window: Duration,
    /// Maximum number of pages followed in one fetch.
    pub max_pages: usize,
}

impl From<&Config> for FetchSettings {
    fn from(config: &Config) -> Self {
        Self {
            cache_key: config.cache_key.clone(),
            freshness_window: config.freshness_window,
            max_pages: config.max_pages,
        }
    }
}

/// Where the returned repositories came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Cache entry within the freshness window.
    Fresh,
    /// Cache entry past the freshness window; a refresh was started.
    Stale,
    /// No cache entry; fetched from the remote API.
    Miss,
}

/// Result of [`RepositoryFetcher::perform`].
#[derive(Debug)]
pub struct FetchOutcome {
    pub repositories: RepositoryList,
    pub status: CacheStatus,
    /// Background refresh started for a stale cache.
    pub refresh: Option<RefreshHandle>,
}

/// Handle to a background cache refresh.
///
/// Dropping the handle detaches the task. It keeps running until it finishes
/// or the runtime shuts down.
#[derive(Debug)]
pub struct RefreshHandle {
    handle: JoinHandle<Result<RepositoryList>>,
}

impl RefreshHandle {
    /// Wait for the refresh to finish and return what it fetched.
    pub async fn wait(self) -> Result<RepositoryList> {
        self.handle.await?
    }

    /// Cancel the refresh. A cancelled refresh leaves the cache untouched.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

/// Produces the repository list, trading freshness against latency.
#[derive(Debug, Clone)]
pub struct RepositoryFetcher {
    client: EnterpriseClient,
    store: CacheStore,
    settings: FetchSettings,
}

impl RepositoryFetcher {
    pub fn new(client: EnterpriseClient, store: CacheStore, settings: FetchSettings) -> Self {
        Self {
            client,
            store,
            settings,
        }
    }

    /// Build a fetcher with a client and cache store for `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            EnterpriseClient::new(config)?,
            CacheStore::new(&config.cache_dir),
            FetchSettings::from(config),
        ))
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Return the repository list.
    ///
    /// Fresh cache entries are returned as-is. Stale entries are returned as-is
    /// and a single background refresh is spawned. Without a cache entry the
    /// list is fetched, stored and returned. Must be called within a Tokio runtime.
    pub async fn perform(&self, fetch_all: bool) -> Result<FetchOutcome> {
        let Some(entry) = self
            .store
            .get::<RepositoryList>(&self.settings.cache_key)?
        else {
            debug!("no cache, slow fetch");
            let repositories = self.fetch_and_save(fetch_all).await?;
            return Ok(FetchOutcome {
                repositories,
                status: CacheStatus::Miss,
                refresh: None,
            });
        };

        let now = Utc::now().timestamp();
        if !entry.is_stale(self.settings.freshness_window, now) {
            debug!(age_secs = entry.age_secs(now), "serving cached repositories");
            return Ok(FetchOutcome {
                repositories: entry.data,
                status: CacheStatus::Fresh,
                refresh: None,
            });
        }

        debug!(
            age_secs = entry.age_secs(now),
            "cache is stale, refreshing in background"
        );
        Ok(FetchOutcome {
            repositories: entry.data,
            status: CacheStatus::Stale,
            refresh: Some(self.spawn_refresh(fetch_all)),
        })
    }

    /// Fetch from the remote API and replace the cache entry.
    /// Nothing is written if any page fails.
    pub async fn fetch_and_save(&self, fetch_all: bool) -> Result<RepositoryList> {
        let repositories = self.fetch(fetch_all).await?;
        self.store.put(&self.settings.cache_key, &repositories)?;
        Ok(repositories)
    }

    /// Fetch the repository list, following `next` links when `fetch_all` is set.
    pub async fn fetch(&self, fetch_all: bool) -> Result<RepositoryList> {
        let mut repositories = RepositoryList::new();
        let mut visited = HashSet::from([REPOSITORIES_PATH.to_string()]);
        let mut path = REPOSITORIES_PATH.to_string();
        let mut pages = 0;

        loop {
            pages += 1;
            debug!(%path, page = pages, "fetching repositories page");
            let page = self.client.get_repositories_page(&path).await?;
            repositories.extend(page.repositories);

            if !fetch_all {
                break;
            }
            let Some(next) = page.next else {
                break;
            };

            let next = pagination::relative_to_base(self.client.base(), &next)?;
            if pages >= self.settings.max_pages {
                return Err(FinderError::PaginationLimit {
                    max_pages: self.settings.max_pages,
                });
            }
            if !visited.insert(next.clone()) {
                return Err(FinderError::PaginationLoop { link: next });
            }
            path = next;
        }

        debug!(pages, count = repositories.len(), "done fetching");
        Ok(repositories)
    }

    fn spawn_refresh(&self, fetch_all: bool) -> RefreshHandle {
        let fetcher = self.clone();
        let handle = tokio::spawn(async move {
            let result = fetcher.fetch_and_save(fetch_all).await;
            match &result {
                Ok(repositories) => {
                    info!(count = repositories.len(), "background refresh complete")
                }
                Err(e) => warn!(error = %e, "background refresh failed"),
            }
            result
        });
        RefreshHandle { handle }
    }
}
