// GitHub Enterprise API module.
// Provides the client, pagination helpers and types for the repository listing.

pub mod client;
pub mod endpoints;
pub mod pagination;
pub mod types;

pub use client::EnterpriseClient;
pub use endpoints::{REPOSITORIES_PATH, RepositoryPage};
pub use pagination::PageLink;
pub use types::{RateLimit, RepositoryList, RepositoryRecord};
