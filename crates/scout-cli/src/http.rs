//! HTTP existence check
//!
//! Issues a `HEAD` request per locator. Status mapping:
//! - 2xx: found
//! - 404 and 410: not found
//! - anything else, or a transport failure: error

use reqwest::StatusCode;
use scout_core::{ExistenceCheck, ProbeOutcome};
use std::time::Duration;

const USER_AGENT: &str = concat!("troupe-scout/", env!("CARGO_PKG_VERSION"));

/// [`ExistenceCheck`] over HTTP `HEAD`
#[derive(Debug, Clone)]
pub struct HttpExists {
    client: reqwest::Client,
}

impl HttpExists {
    /// Create client with a transport-level timeout
    ///
    /// # Errors
    /// Returns the builder error if the TLS backend cannot be initialised.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl ExistenceCheck for HttpExists {
    async fn exists(&self, locator: &str) -> ProbeOutcome {
        match self.client.head(locator).send().await {
            Ok(response) => outcome_for_status(response.status()),
            Err(err) => ProbeOutcome::Error(err.to_string()),
        }
    }
}

/// Map an HTTP status to a probe outcome
#[must_use]
pub fn outcome_for_status(status: StatusCode) -> ProbeOutcome {
    if status.is_success() {
        ProbeOutcome::Found
    } else if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        ProbeOutcome::NotFound
    } else {
        ProbeOutcome::Error(format!("unexpected status {status}"))
    }
}
