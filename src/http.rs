//! Shared HTTP client configuration.

use crate::error::Result;
use std::time::Duration;

/// Default timeout for outbound API requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

const USER_AGENT: &str = concat!("tubebrief/", env!("CARGO_PKG_VERSION"));

/// Create an HTTP client with the default timeout.
pub fn create_client() -> Result<reqwest::Client> {
    create_client_with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an HTTP client with a custom timeout.
///
/// Long generation calls can legitimately take minutes, so callers pass the
/// configured generation timeout here.
pub fn create_client_with_timeout(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?)
}
