// Error types for ghe-repos.
// Covers remote API failures, cache corruption, pagination guards and configuration.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed: invalid or expired token")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("HTTP {status} from {url}: {body}")]
    Status {
        status: StatusCode,
        url: String,
        body: String,
    },

    #[error("Malformed response from {url}: {source}")]
    MalformedResponse {
        url: String,
        source: serde_json::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cache entry {} is corrupt: {source}", .path.display())]
    CacheCorrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Pagination exceeded {max_pages} pages")]
    PaginationLimit { max_pages: usize },

    #[error("Pagination loop detected at {link}")]
    PaginationLoop { link: String },

    #[error("Pagination link {link} is outside the configured API base")]
    ForeignLink { link: String },

    #[error("Background refresh did not complete: {0}")]
    Refresh(#[from] tokio::task::JoinError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FinderError {
    /// True for failures that come from talking to the remote API.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            FinderError::Http(_)
                | FinderError::Unauthorized
                | FinderError::NotFound(_)
                | FinderError::RateLimited { .. }
                | FinderError::Status { .. }
                | FinderError::MalformedResponse { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FinderError>;
