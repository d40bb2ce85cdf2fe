// GitHub Enterprise API endpoint functions.
// Typed wrappers over the raw client for the endpoints this tool reads.

use crate::error::{FinderError, Result};

use super::client::EnterpriseClient;
use super::pagination;
use super::types::RepositoryList;

/// Path of the listing of all repositories visible to the token.
pub const REPOSITORIES_PATH: &str = "repositories";

/// One page of the repository listing.
#[derive(Debug, Clone)]
pub struct RepositoryPage {
    pub repositories: RepositoryList,
    /// Raw `next` link, if the server advertised one.
    pub next: Option<String>,
}

impl EnterpriseClient {
    /// Fetch one page of repositories from `path` (relative to the API base).
    pub async fn get_repositories_page(&self, path: &str) -> Result<RepositoryPage> {
        let response = self.get(path).await?;
        let url = response.url().to_string();
        let next = pagination::next_link(response.headers());

        let body = response.bytes().await?;
        let repositories: RepositoryList = serde_json::from_slice(&body)
            .map_err(|source| FinderError::MalformedResponse { url, source })?;

        Ok(RepositoryPage { repositories, next })
    }
}
