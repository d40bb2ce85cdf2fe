// GitHub Enterprise API HTTP client.
// Handles authentication headers, TLS policy, timeouts, and status checking.

use reqwest::{
    Client, Response, StatusCode, Url,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use tracing::warn;

use crate::config::Config;
use crate::error::{FinderError, Result};

use super::types::RateLimit;

const USER_AGENT_VALUE: &str = concat!("ghe-repos/", env!("CARGO_PKG_VERSION"));

/// HTTP client bound to one GitHub Enterprise API base.
#[derive(Debug, Clone)]
pub struct EnterpriseClient {
    client: Client,
    base: Url,
}

impl EnterpriseClient {
    /// Create a client for the instance described by `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("token {}", token))
                .map_err(|e| FinderError::Config(format!("invalid token: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        if !config.verify_tls {
            warn!(host = %config.host, "TLS certificate verification is disabled");
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        Ok(Self {
            client,
            base: config.api_base()?,
        })
    }

    /// Base URL all request paths are relative to.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Make a GET request for a path relative to the API base.
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = self
            .base
            .join(path)
            .map_err(|e| FinderError::InvalidUrl(format!("{}: {}", path, e)))?;
        let response = self.client.get(url).send().await?;

        check_response(response).await
    }
}

/// Read rate limit headers from a response.
fn rate_limit(response: &Response) -> RateLimit {
    let header = |name: &str| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    };

    RateLimit {
        remaining: header("x-ratelimit-remaining"),
        reset: header("x-ratelimit-reset"),
    }
}

/// Check response status and convert errors.
async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    match status {
        StatusCode::UNAUTHORIZED => Err(FinderError::Unauthorized),
        StatusCode::NOT_FOUND => Err(FinderError::NotFound(url)),
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
            if rate_limit(&response).remaining == Some(0) =>
        {
            let reset_at = rate_limit(&response)
                .reset
                .and_then(|reset| chrono::DateTime::from_timestamp(reset as i64, 0))
                .map(|dt| dt.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "unknown".to_string());
            Err(FinderError::RateLimited { reset_at })
        }
        status => Err(FinderError::Status {
            status,
            url,
            body: response.text().await.unwrap_or_default(),
        }),
    }
}
