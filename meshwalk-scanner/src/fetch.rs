//! Retrieval of node status documents.
//!
//! [`FetchPort`] is the seam the walker depends on. [`HttpFetcher`] is the
//! production implementation: a shared `reqwest` client behind a semaphore,
//! retrying transport failures and suspicious status codes with a randomized
//! delay.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, StatusCode};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, warn};
use url::Url;

use crate::document::RawDocument;
use crate::error::{FetchError, Result, ScanError};

pub const DEFAULT_USER_AGENT: &str = "meshwalk/0.1 (AREDN mesh topology walker)";

/// Anything that can turn a node URL into its status document.
#[async_trait]
pub trait FetchPort: Send + Sync {
    async fn fetch(&self, url: &str) -> std::result::Result<RawDocument, FetchError>;
}

#[async_trait]
impl<T: FetchPort + ?Sized> FetchPort for Arc<T> {
    async fn fetch(&self, url: &str) -> std::result::Result<RawDocument, FetchError> {
        (**self).fetch(url).await
    }
}

/// Maps a node identity to the URL of its status document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEndpoint {
    template: String,
}

impl NodeEndpoint {
    pub const PLACEHOLDER: &'static str = "{node}";
    pub const DEFAULT_TEMPLATE: &'static str =
        "http://{node}.local.mesh:8080/cgi-bin/sysinfo.json?hosts=1&link_info=1&lqm=1";

    /// Create an endpoint from a template containing `{node}`.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if !template.contains(Self::PLACEHOLDER) {
            return Err(ScanError::InvalidEndpoint(format!(
                "template '{}' has no {} placeholder",
                template,
                Self::PLACEHOLDER
            )));
        }
        Url::parse(&template.replace(Self::PLACEHOLDER, "node"))
            .map_err(|e| ScanError::InvalidEndpoint(format!("{}: {}", template, e)))?;
        Ok(Self { template })
    }

    pub fn url_for(&self, identity: &str) -> String {
        self.template.replace(Self::PLACEHOLDER, identity)
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl Default for NodeEndpoint {
    fn default() -> Self {
        Self {
            template: Self::DEFAULT_TEMPLATE.to_string(),
        }
    }
}

/// Settings for [`HttpFetcher`].
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Maximum number of requests in flight at once.
    pub max_concurrency: usize,
    /// Total attempts per URL, including the first.
    pub attempts: u32,
    /// Limit on a single attempt, body included.
    pub timeout: Duration,
    pub retry_min_delay: Duration,
    pub retry_max_delay: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 200,
            attempts: 5,
            timeout: Duration::from_secs(120),
            retry_min_delay: Duration::from_secs(120),
            retry_max_delay: Duration::from_secs(130),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Status codes that trigger another attempt.
pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 205..=299 | 300..=399 | 405..=599)
}

pub struct HttpFetcher {
    client: Client,
    permits: Arc<Semaphore>,
    attempts: u32,
    retry_delay: RangeInclusive<Duration>,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .pool_max_idle_per_host(0)
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        let min = config.retry_min_delay;
        let max = config.retry_max_delay.max(min);

        Ok(Self {
            client,
            permits: Arc::new(Semaphore::new(config.max_concurrency.max(1))),
            attempts: config.attempts.max(1),
            retry_delay: min..=max,
        })
    }

    fn backoff(&self) -> Duration {
        let (min, max) = (*self.retry_delay.start(), *self.retry_delay.end());
        if min == max {
            return min;
        }
        rand::thread_rng().gen_range(min..=max)
    }

    /// Acquire a connection slot, then send. The slot is held by the caller
    /// until the body has been read.
    async fn send_once(
        &self,
        url: &str,
    ) -> std::result::Result<(reqwest::Response, OwnedSemaphorePermit), FetchError> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| FetchError::ConnectionLost(e.to_string()))?;
        let response = self.client.get(url).send().await?;
        Ok((response, permit))
    }

    async fn send_with_retry(
        &self,
        url: &str,
    ) -> std::result::Result<(reqwest::Response, OwnedSemaphorePermit), FetchError> {
        let mut attempt = 1;
        loop {
            let last_attempt = attempt >= self.attempts;

            match self.send_once(url).await {
                Ok((response, permit))
                    if !is_retryable_status(response.status()) || last_attempt =>
                {
                    return Ok((response, permit));
                }
                Ok((response, _)) => {
                    debug!(
                        "{} answered {} (attempt {}/{})",
                        url,
                        response.status(),
                        attempt,
                        self.attempts
                    );
                }
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) if last_attempt => {
                    warn!("Giving up on {} after {} attempts: {}", url, attempt, e);
                    return Err(e);
                }
                Err(e) => {
                    debug!("{} failed (attempt {}/{}): {}", url, attempt, self.attempts, e);
                }
            }

            tokio::time::sleep(self.backoff()).await;
            attempt += 1;
        }
    }
}

#[async_trait]
impl FetchPort for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<RawDocument, FetchError> {
        Url::parse(url).map_err(|e| FetchError::MalformedFraming(format!("{}: {}", url, e)))?;

        let (response, _permit) = self.send_with_retry(url).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
