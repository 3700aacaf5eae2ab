use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client, Method, Url};
use serde::Serialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::backend::BackendError;
use crate::config::BackendConfig;

/// Rate-limited HTTP client for the portal REST API
///
/// Every request waits on a shared direct rate limiter and carries the bearer
/// token handed in at construction. Paths are given as segments and each one is
/// percent-encoded, so an id can never step outside its resource.
#[derive(Debug, Clone)]
pub struct RateLimitedHttpClient {
    client: Client,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    base_url: Url,
    token: Option<String>,
}

impl RateLimitedHttpClient {
    /// Create a new rate-limited HTTP client
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let per_second = NonZeroU32::new(config.rate_limit.requests_per_second)
            .unwrap_or(NonZeroU32::MIN);
        let burst =
            NonZeroU32::new(config.rate_limit.burst_capacity).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_second(per_second).allow_burst(burst);
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| BackendError::ClientSetup {
                message: e.to_string(),
            })?;

        let base_url = Url::parse(config.base_url.trim_end_matches('/')).map_err(|e| {
            BackendError::ClientSetup {
                message: format!("invalid base URL {}: {e}", config.base_url),
            }
        })?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::ClientSetup {
                message: format!("base URL {} cannot carry a path", config.base_url),
            });
        }

        Ok(Self {
            client,
            rate_limiter,
            base_url,
            token: config.token.clone().filter(|token| !token.is_empty()),
        })
    }

    /// Absolute URL for an API path, one encoded segment per element
    pub fn url(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::ClientSetup {
                message: format!("base URL {} cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a JSON body and return the raw response text of a 2xx reply
    pub async fn send_json<B>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<String, BackendError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(segments)?;
        self.rate_limiter.until_ready().await;

        debug!(method = %method, url = %url, "Sending backend request");

        let mut request = self.client.request(method, url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "Backend request failed");
            return Err(BackendError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }
}
