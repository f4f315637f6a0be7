//! HTTP access to the result-reporting service.
//!
//! Two layers:
//!
//! - `Fetch`: one raw GET (endpoint + flat query parameters -> body text)
//! - `ApiClient`: typed JSON decoding on top of a `Fetch`, retried according
//!   to a `RetryPolicy`
//!
//! The production policy retries forever at a fixed interval, so callers only
//! ever see success (or the process is killed from outside).

use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

use crate::error::{AppError, FetchError};

pub const DEFAULT_BASE_URL: &str = "https://sspskokpit.ysk.gov.tr/api/ssps/";
pub const DEFAULT_ELECTION_ID: u64 = 60792;

/// Ordered query parameters. Empty values are sent as `key=`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(&'static str, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &'static str, value: impl ToString) -> Self {
        self.0.push((key, value.to_string()));
        self
    }

    /// Add a parameter the provider expects to be present but empty.
    pub fn blank(self, key: &'static str) -> Self {
        self.with(key, "")
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.0
    }
}

/// A single request-response exchange with the data source.
///
/// Shared by every export worker, hence `Send + Sync`.
pub trait Fetch: Send + Sync {
    fn fetch(&self, endpoint: &str, params: &Params) -> Result<String, FetchError>;
}

/// `Fetch` over reqwest's blocking client.
pub struct HttpFetcher {
    client: Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(base_url: &str, timeout: Duration, insecure_tls: bool) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(insecure_tls)
            .build()
            .map_err(|e| AppError::new(2, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("https://") || endpoint.starts_with("http://") {
            endpoint.to_string()
        } else {
            format!("{}/{}", self.base_url, endpoint.trim_matches('/'))
        }
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, endpoint: &str, params: &Params) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(self.url(endpoint))
            .query(params.pairs())
            .send()
            .map_err(|source| FetchError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        if !resp.status().is_success() {
            return Err(FetchError::Status {
                endpoint: endpoint.to_string(),
                status: resp.status().as_u16(),
            });
        }

        resp.text().map_err(|source| FetchError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

/// How failed requests are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// `None` = never give up.
    pub max_attempts: Option<u32>,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn forever(delay: Duration) -> Self {
        Self {
            max_attempts: None,
            delay,
        }
    }

    pub fn bounded(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: Some(max_attempts.max(1)),
            delay,
        }
    }

    pub fn gives_up_after(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::forever(Duration::from_secs(1))
    }
}

/// Typed, retrying client for the provider's endpoints.
pub struct ApiClient<F> {
    fetcher: F,
    retry: RetryPolicy,
    election_id: u64,
}

impl<F: Fetch> ApiClient<F> {
    pub fn new(fetcher: F, retry: RetryPolicy, election_id: u64) -> Self {
        Self {
            fetcher,
            retry,
            election_id,
        }
    }

    pub fn election_id(&self) -> u64 {
        self.election_id
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// GET `endpoint` and decode the body, retrying transport, status and
    /// decode failures per the policy.
    pub fn get<T: DeserializeOwned>(&self, endpoint: &str, params: &Params) -> Result<T, FetchError> {
        let mut attempts = 0u32;
        loop {
            attempts = attempts.saturating_add(1);
            let err = match self.try_get(endpoint, params) {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if self.retry.gives_up_after(attempts) {
                return Err(FetchError::Exhausted {
                    endpoint: endpoint.to_string(),
                    attempts,
                    last: Box::new(err),
                });
            }
            log::warn!("{err}; retrying in {:?} (attempt {attempts})", self.retry.delay);
            std::thread::sleep(self.retry.delay);
        }
    }

    fn try_get<T: DeserializeOwned>(&self, endpoint: &str, params: &Params) -> Result<T, FetchError> {
        let body = self.fetcher.fetch(endpoint, params)?;
        serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}
