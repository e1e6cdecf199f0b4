use std::future::Future;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::Client;
use tracing::debug;

use crate::core::config::RetryPolicy;
use crate::core::error::{DistroError, DistroResult};

const APP_USER_AGENT: &str = concat!("helios-distro/", env!("CARGO_PKG_VERSION"));

pub fn build_http_client(policy: &RetryPolicy) -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    Client::builder()
        .user_agent(APP_USER_AGENT)
        .default_headers(default_headers)
        .timeout(policy.timeout)
        .build()
}

/// Run `operation` until it succeeds, fails with a non-transient error, or
/// the retry budget is spent. `label` only feeds the logs.
pub async fn retry_with_backoff<F, Fut, T>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
) -> DistroResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DistroResult<T>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                attempt += 1;
                debug!(
                    "{} failed (attempt {}/{}): {}. Retrying in {:?}",
                    label, attempt, policy.max_retries, e, delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Turn a non-success response into a [`DistroError::Network`].
pub fn check_status(response: reqwest::Response) -> DistroResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(DistroError::Network {
        url: response.url().to_string(),
        status: Some(status.as_u16()),
        message: format!("HTTP {}", status),
    })
}
