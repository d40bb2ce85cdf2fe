// Launcher backend for searching the repositories of a GitHub Enterprise instance.
// Fetches the paginated repository list, caches it on disk, and refreshes it in the background.

pub mod cache;
pub mod config;
pub mod error;
pub mod feedback;
pub mod fetcher;
pub mod github;
pub mod logging;

pub use cache::{CacheEntry, CacheStore};
pub use config::{Config, ConfigLoader};
pub use error::{FinderError, Result};
pub use fetcher::{CacheStatus, FetchOutcome, FetchSettings, RefreshHandle, RepositoryFetcher};
pub use github::{EnterpriseClient, RepositoryList, RepositoryRecord};
