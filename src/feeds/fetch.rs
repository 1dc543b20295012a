//! Feed retrieval over HTTP.
//!
//! The collector only needs "give me the body behind this URL", so retrieval
//! sits behind the [`FeedFetcher`] trait. [`HttpFetcher`] is the real
//! implementation; tests plug in canned bodies.

use reqwest::Client;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

use crate::error::{DigestError, Result};

/// Connect timeout; the total per-feed timeout is configurable.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// User agent string for feed fetching.
const USER_AGENT: &str = concat!("overnight_digest/", env!("CARGO_PKG_VERSION"));

/// Trait for retrieving a feed document.
pub trait FeedFetcher {
    /// Return the response body for `url`.
    ///
    /// # Errors
    ///
    /// Any transport failure or non-success status. The caller treats every
    /// error as "this feed contributes nothing".
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// [`FeedFetcher`] backed by a shared `reqwest` client.
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Build a fetcher whose requests give up after `timeout` in total.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, timeout })
    }
}

impl fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("timeout", &self.timeout)
            .field("user_agent", &USER_AGENT)
            .finish()
    }
}

impl FeedFetcher for HttpFetcher {
    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String> {
        let t0 = Instant::now();
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, elapsed_ms = t0.elapsed().as_millis() as u64, "Feed returned error status");
            return Err(DigestError::Status(status));
        }

        let body = response.text().await?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched feed body"
        );
        Ok(body)
    }
}
