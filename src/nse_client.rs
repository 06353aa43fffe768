use crate::cache::ChainCache;
use crate::config;
use crate::error::{preview, FetchError};
use crate::models::{FetchOutcome, OptionChain};
use rand::{seq::SliceRandom, thread_rng};
use reqwest::{header, Client};
use serde_json::Value;
use std::time::Duration;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::Retry;
use tracing::{info, warn};

/// How many times to try a fetch and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, delay: Duration) -> Self {
        Self { max_attempts, delay }
    }

    /// Zero is treated as a single attempt.
    pub fn attempts(&self) -> usize {
        self.max_attempts.max(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: config::DEFAULT_MAX_ATTEMPTS,
            delay: Duration::from_secs(config::DEFAULT_RETRY_DELAY_SECS),
        }
    }
}

// -----------------------------------------------
// CLIENT WRAPPER WITH CHAIN CACHE
// -----------------------------------------------
pub struct NSEClient {
    base_url: String,
    cache: ChainCache,
}

impl NSEClient {
    pub fn new() -> Self {
        Self::with_base_url(config::NSE_BASE_URL)
    }

    /// Point the client at another host. The landing page is `base_url` itself.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache: ChainCache::default(),
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = ChainCache::new(ttl);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -----------------------------------------------
    // FETCH OPTION CHAIN (CACHED)
    // -----------------------------------------------
    /// Fetch the option chain for `symbol`, reusing a fresh cached copy when
    /// one exists. Failures come back as `FetchOutcome::Failed`.
    pub async fn fetch(&self, symbol: &str, policy: &RetryPolicy) -> FetchOutcome {
        if symbol.trim().is_empty() {
            return FetchOutcome::failed("Empty provider symbol");
        }

        match self
            .cache
            .get_or_try_fetch(symbol, || self.fetch_with_retry(symbol, policy))
            .await
        {
            Ok(chain) => FetchOutcome::Success(chain),
            Err(e) => FetchOutcome::failed(e.to_string()),
        }
    }

    /// Same as `fetch` but always goes upstream and never touches the cache.
    pub async fn fetch_uncached(&self, symbol: &str, policy: &RetryPolicy) -> FetchOutcome {
        if symbol.trim().is_empty() {
            return FetchOutcome::failed("Empty provider symbol");
        }

        match self.fetch_with_retry(symbol, policy).await {
            Ok(chain) => FetchOutcome::Success(chain),
            Err(e) => FetchOutcome::failed(e.to_string()),
        }
    }

    /// One session, up to `policy.attempts()` warm-up + data round trips.
    async fn fetch_with_retry(
        &self,
        symbol: &str,
        policy: &RetryPolicy,
    ) -> Result<OptionChain, FetchError> {
        let session = build_session()?;
        let url = config::option_chain_url(&self.base_url, symbol);
        let total = policy.attempts();
        let strategy = FixedInterval::new(policy.delay).take(total - 1);

        let session = &session;
        let url = url.as_str();
        let mut attempt = 0;

        let chain = Retry::spawn(strategy, move || {
            attempt += 1;
            self.attempt(session, url, symbol, attempt, total)
        })
        .await?;

        info!(symbol, "option chain fetched");
        Ok(chain)
    }

    async fn attempt(
        &self,
        session: &Client,
        url: &str,
        symbol: &str,
        attempt: usize,
        total: usize,
    ) -> Result<OptionChain, FetchError> {
        let result = self.request_chain(session, url).await;

        if let Err(e) = &result {
            if attempt < total {
                warn!(symbol, attempt, total, error = %e, "option chain attempt failed, retrying");
            } else {
                warn!(symbol, attempt, total, error = %e, "option chain attempts exhausted");
            }
        }

        result
    }

    async fn request_chain(&self, session: &Client, url: &str) -> Result<OptionChain, FetchError> {
        // Landing page hands out the cookies the API checks for
        session
            .get(&self.base_url)
            .header(header::ACCEPT, config::HEADER_ACCEPT_HTML)
            .timeout(config::WARMUP_TIMEOUT)
            .send()
            .await?;

        let res = session
            .get(url)
            .header(header::REFERER, format!("{}/", self.base_url))
            .header("X-Requested-With", config::HEADER_X_REQUESTED_WITH)
            .timeout(config::DATA_TIMEOUT)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(FetchError::Status(status.as_u16(), preview(&body, 200)));
        }

        let text = res.text().await?;
        let value: Value = serde_json::from_str(&text)
            .map_err(|_| FetchError::NonJsonResponse(preview(&text, 200)))?;

        Ok(OptionChain::from_value(value))
    }
}

impl Default for NSEClient {
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------
// HTTP SESSION BUILDER
// -----------------------------------------------
fn build_session() -> Result<Client, FetchError> {
    let mut headers = header::HeaderMap::new();

    let lang = config::ACCEPT_LANGUAGES
        .choose(&mut thread_rng())
        .copied()
        .unwrap_or("en-US,en;q=0.9");
    headers.insert(header::ACCEPT_LANGUAGE, header::HeaderValue::from_static(lang));
    headers.insert(header::ACCEPT, header::HeaderValue::from_static("*/*"));

    Ok(Client::builder()
        .default_headers(headers)
        .cookie_store(true)
        .user_agent(config::USER_AGENT)
        .build()?)
}
