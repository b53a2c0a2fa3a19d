//! Resilient document fetching with retry and backoff.
//!
//! This module acquires the raw content of a single URL. Transient failures
//! (connect errors, timeouts, and the retryable status set 429/500/502/503/504)
//! are retried up to a configured number of additional attempts, waiting
//! between attempts according to a [`BackoffPolicy`] schedule. Any other
//! non-success status terminates immediately.
//!
//! # Architecture
//!
//! The module uses a trait-based design:
//! - [`FetchOnce`]: one HTTP GET attempt, classifying failures as transient or fatal
//! - [`HttpFetcher`]: `reqwest`-backed implementation of `FetchOnce`
//! - [`RetryFetch`]: decorator that adds the retry loop to any `FetchOnce`
//!
//! The decorator makes the retry logic testable with a fake inner fetcher and
//! no network.

use crate::config::{BackoffPolicy, FetchConfig};
use crate::error::ScrapeError;
use crate::models::FetchResult;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// HTTP statuses worth retrying: rate limiting and transient server errors.
const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// How a single fetch attempt failed.
#[derive(Debug)]
pub enum AttemptError {
    /// Worth retrying: connection error, timeout, or a retryable status.
    Transient(String),
    /// Not worth retrying: any other non-success status.
    Fatal(String),
}

/// One HTTP GET attempt against a validated URL.
pub trait FetchOnce {
    async fn fetch_once(&self, url: &Url) -> Result<FetchResult, AttemptError>;
}

/// Validate a target URL before any network I/O.
///
/// The URL must parse, carry an `http`/`https` scheme, and have a non-empty
/// host. Anything else is [`ScrapeError::InvalidTarget`] and is never retried.
pub fn validate_target(raw: &str) -> Result<Url, ScrapeError> {
    let url = Url::parse(raw).map_err(|e| ScrapeError::invalid_target(raw, e))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ScrapeError::invalid_target(
                raw,
                format!("unsupported scheme `{other}`"),
            ));
        }
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ScrapeError::invalid_target(raw, "missing host"));
    }
    Ok(url)
}

/// `reqwest`-backed [`FetchOnce`] implementation.
#[derive(Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Builds a client with the configured User-Agent, per-attempt timeout,
    /// redirect following, and TLS verification mode.
    pub fn new(config: &FetchConfig) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| ScrapeError::fetch("", format!("failed to build HTTP client: {e}")))?;
        Ok(HttpFetcher { client })
    }
}

impl FetchOnce for HttpFetcher {
    async fn fetch_once(&self, url: &Url) -> Result<FetchResult, AttemptError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| AttemptError::Transient(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string());
            let body = response
                .text()
                .await
                .map_err(|e| AttemptError::Transient(format!("failed to read body: {e}")))?;
            debug!(%url, bytes = body.len(), "Fetched document");
            return Ok(FetchResult {
                url: url.clone(),
                body,
                content_type,
            });
        }

        let cause = format!("HTTP status {}", status.as_u16());
        if RETRYABLE_STATUSES.contains(&status.as_u16()) {
            Err(AttemptError::Transient(cause))
        } else {
            Err(AttemptError::Fatal(cause))
        }
    }
}

/// Decorator that adds bounded retries with backoff to any [`FetchOnce`].
#[derive(Debug)]
pub struct RetryFetch<T> {
    inner: T,
    max_retries: u32,
    backoff: BackoffPolicy,
}

impl<T> RetryFetch<T>
where
    T: FetchOnce,
{
    pub fn new(inner: T, max_retries: u32, backoff: BackoffPolicy) -> Self {
        RetryFetch {
            inner,
            max_retries,
            backoff,
        }
    }

    /// Fetches with retries, sleeping the scheduled delay between attempts.
    pub async fn fetch(&self, url: &Url) -> Result<FetchResult, ScrapeError> {
        self.fetch_observed(url, |_| {}).await
    }

    /// Like [`RetryFetch::fetch`], invoking `on_delay` with each backoff delay
    /// just before sleeping it.
    pub async fn fetch_observed(
        &self,
        url: &Url,
        mut on_delay: impl FnMut(Duration),
    ) -> Result<FetchResult, ScrapeError> {
        let total_t0 = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.fetch_once(url).await {
                Ok(result) => {
                    info!(
                        %url,
                        attempt,
                        elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                        "Fetch succeeded"
                    );
                    return Ok(result);
                }
                Err(AttemptError::Fatal(cause)) => {
                    warn!(%url, attempt, %cause, "Non-retryable fetch failure");
                    return Err(ScrapeError::fetch(url.as_str(), cause));
                }
                Err(AttemptError::Transient(cause)) => {
                    if attempt >= self.max_retries {
                        warn!(
                            %url,
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                            %cause,
                            "Fetch exhausted retries"
                        );
                        return Err(ScrapeError::fetch(
                            url.as_str(),
                            format!("exhausted {} retries: {cause}", self.max_retries),
                        ));
                    }

                    let delay = self.backoff.delay(attempt);
                    warn!(
                        %url,
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_t0.elapsed().as_millis() as u64,
                        ?delay,
                        %cause,
                        "Fetch attempt failed; backing off"
                    );
                    on_delay(delay);
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// High-level entry point: validate the target, then fetch it with retries.
///
/// A declared content type that does not look like a text/markup payload is
/// logged as a warning but the content is still returned; extraction decides
/// whether it can use the body.
#[instrument(level = "info", skip_all, fields(url = %raw_url))]
pub async fn fetch_content(raw_url: &str, config: &FetchConfig) -> Result<FetchResult, ScrapeError> {
    let url = validate_target(raw_url)?;
    let fetcher = HttpFetcher::new(config)?;
    let retrying = RetryFetch::new(fetcher, config.max_retries, config.backoff);
    let result = retrying.fetch(&url).await?;

    if let Some(ct) = &result.content_type {
        let lowered = ct.to_ascii_lowercase();
        if !(lowered.contains("text") || lowered.contains("html") || lowered.contains("xml")) {
            warn!(content_type = %ct, "Response does not declare a text/markup payload");
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Fake fetcher that plays back a scripted sequence of attempt outcomes.
    struct Scripted {
        outcomes: Mutex<Vec<Result<String, AttemptError>>>,
        calls: Mutex<u32>,
    }

    impl Scripted {
        fn new(outcomes: Vec<Result<String, AttemptError>>) -> Self {
            Scripted {
                outcomes: Mutex::new(outcomes),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    impl FetchOnce for Scripted {
        async fn fetch_once(&self, url: &Url) -> Result<FetchResult, AttemptError> {
            *self.calls.lock().unwrap() += 1;
            let next = self.outcomes.lock().unwrap().remove(0);
            next.map(|body| FetchResult {
                url: url.clone(),
                body,
                content_type: Some("text/html".to_string()),
            })
        }
    }

    fn transient(msg: &str) -> Result<String, AttemptError> {
        Err(AttemptError::Transient(msg.to_string()))
    }

    #[test]
    fn test_validate_target_accepts_http_and_https() {
        assert!(validate_target("https://example.com/news").is_ok());
        assert!(validate_target("http://example.com").is_ok());
    }

    #[test]
    fn test_validate_target_rejects_garbage() {
        assert!(matches!(
            validate_target("not a url"),
            Err(ScrapeError::InvalidTarget { .. })
        ));
        assert!(matches!(
            validate_target("ftp://example.com/file"),
            Err(ScrapeError::InvalidTarget { .. })
        ));
        // Scheme but no host.
        assert!(matches!(
            validate_target("http:///path-only"),
            Err(ScrapeError::InvalidTarget { .. })
        ));
    }

    #[tokio::test]
    async fn test_retry_recovers_after_transient_failures() {
        let url = Url::parse("https://example.com/news").unwrap();
        let inner = Scripted::new(vec![
            transient("HTTP status 503"),
            transient("HTTP status 503"),
            transient("HTTP status 503"),
            Ok("<html></html>".to_string()),
        ]);
        let retrying = RetryFetch::new(
            inner,
            3,
            BackoffPolicy::Exponential {
                base: Duration::from_millis(1),
            },
        );

        let mut delays = Vec::new();
        let result = retrying
            .fetch_observed(&url, |d| delays.push(d))
            .await
            .unwrap();

        assert_eq!(result.body, "<html></html>");
        assert_eq!(retrying.inner.calls(), 4);
        // Exactly three backoff delays following the exponential schedule.
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(1),
                Duration::from_millis(2),
                Duration::from_millis(4),
            ]
        );
    }

    #[tokio::test]
    async fn test_retry_exhaustion_fails() {
        let url = Url::parse("https://example.com/news").unwrap();
        let inner = Scripted::new(vec![
            transient("timed out"),
            transient("timed out"),
            transient("timed out"),
        ]);
        let retrying = RetryFetch::new(
            inner,
            2,
            BackoffPolicy::Constant {
                base: Duration::ZERO,
            },
        );

        let err = retrying.fetch(&url).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Fetch { .. }));
        assert_eq!(retrying.inner.calls(), 3);
    }

    #[tokio::test]
    async fn test_fatal_status_stops_immediately() {
        let url = Url::parse("https://example.com/gone").unwrap();
        let inner = Scripted::new(vec![
            Err(AttemptError::Fatal("HTTP status 404".to_string())),
            Ok("never reached".to_string()),
        ]);
        let retrying = RetryFetch::new(
            inner,
            5,
            BackoffPolicy::Constant {
                base: Duration::ZERO,
            },
        );

        let err = retrying.fetch(&url).await.unwrap_err();
        assert!(err.to_string().contains("404"));
        assert_eq!(retrying.inner.calls(), 1);
    }

    #[tokio::test]
    async fn test_constant_backoff_delays() {
        let url = Url::parse("https://example.com").unwrap();
        let inner = Scripted::new(vec![
            transient("HTTP status 429"),
            transient("HTTP status 429"),
            Ok("ok".to_string()),
        ]);
        let retrying = RetryFetch::new(
            inner,
            3,
            BackoffPolicy::Constant {
                base: Duration::from_millis(2),
            },
        );

        let mut delays = Vec::new();
        retrying
            .fetch_observed(&url, |d| delays.push(d))
            .await
            .unwrap();
        assert_eq!(
            delays,
            vec![Duration::from_millis(2), Duration::from_millis(2)]
        );
    }
}
