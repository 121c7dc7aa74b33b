//! Blocking HTTP source for the analytics API.
//!
//! Issues GET requests with query parameters, treats a configurable set of
//! status codes as success, and retries timeouts, connection failures, rate
//! limits and server errors after a fixed sleep until the attempt budget is
//! spent. The API key travels as a query parameter, so every URL that reaches
//! a log line or an error goes through [`redacted_url`] first.

use super::provider::{FetchError, MetricSource, RawPoint};
use std::time::Duration;
use tracing::{debug, warn};

/// Query parameter names whose values never leave this module.
const SECRET_PARAMS: &[&str] = &["api_key"];

/// Transport settings for [`HttpSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub retry_sleep: Duration,
    pub max_attempts: u32,
    pub accepted_statuses: Vec<u16>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            retry_sleep: Duration::from_secs(5),
            max_attempts: 3,
            accepted_statuses: vec![200],
        }
    }
}

impl HttpConfig {
    pub fn accepts(&self, status: u16) -> bool {
        self.accepted_statuses.contains(&status)
    }
}

/// Whether a rejected status is worth another attempt.
fn is_retryable(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Render `url?params` with secret parameter values masked.
pub fn redacted_url(url: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return url.to_string();
    }
    let query: Vec<String> = params
        .iter()
        .map(|(key, value)| {
            if SECRET_PARAMS.contains(key) {
                format!("{key}=***")
            } else {
                format!("{key}={value}")
            }
        })
        .collect();
    format!("{url}?{}", query.join("&"))
}

/// Live API source backed by `reqwest::blocking`.
pub struct HttpSource {
    client: reqwest::blocking::Client,
    config: HttpConfig,
}

impl HttpSource {
    pub fn new(config: HttpConfig) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("chainmetrics/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }
}

impl MetricSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch(&self, url: &str, params: &[(&str, &str)]) -> Result<Vec<RawPoint>, FetchError> {
        let shown = redacted_url(url, params);
        let attempts = self.config.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            if attempt > 1 {
                warn!(
                    url = %shown,
                    attempt,
                    sleep_ms = self.config.retry_sleep.as_millis() as u64,
                    "retrying request"
                );
                std::thread::sleep(self.config.retry_sleep);
            }

            debug!(url = %shown, attempt, "GET");

            match self.client.get(url).query(params).send() {
                Ok(resp) => {
                    let status = resp.status().as_u16();

                    if !self.config.accepts(status) {
                        let err = FetchError::Status {
                            status,
                            url: shown.clone(),
                        };
                        if is_retryable(status) {
                            last_error = Some(err);
                            continue;
                        }
                        return Err(err);
                    }

                    let points: Vec<RawPoint> = resp.json().map_err(|e| {
                        FetchError::Decode(format!("{shown}: {}", e.without_url()))
                    })?;
                    debug!(url = %shown, points = points.len(), "response decoded");
                    return Ok(points);
                }
                Err(e) => {
                    if e.is_timeout() {
                        last_error = Some(FetchError::Timeout { url: shown.clone() });
                        continue;
                    }
                    if e.is_connect() {
                        last_error = Some(FetchError::Network(e.without_url().to_string()));
                        continue;
                    }
                    return Err(FetchError::Network(e.without_url().to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| FetchError::Network(format!("{shown}: no attempt made"))))
    }
}
