use reqwest::{Client, Method, StatusCode, redirect};
use url::Url;

use crate::config::{ConfigError, LoadTestConfig};
use crate::metric::RequestOutcome;

/// Issues the configured request and reduces whatever happens into a single
/// [`RequestOutcome`].
///
/// The client is built once, up front. Instantiating one per request would
/// dominate the measurement.
#[derive(Debug, Clone)]
pub struct HttpRequester {
    client: Client,
    method: Method,
    url: Url,
    success_status: StatusCode,
}

impl HttpRequester {
    /// Build the underlying client from the run parameters. Client
    /// construction failure is a setup error.
    pub fn new(config: &LoadTestConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .redirect(redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            client,
            method: config.method.clone(),
            url: config.target_url.clone(),
            success_status: config.success_status,
        })
    }

    /// One network round-trip.
    ///
    /// Never returns an error and never panics: connect failures, timeout
    /// expiry, redirect-loop exhaustion and non-success statuses all
    /// collapse to `success: false`. The response body is dropped without
    /// buffering; bodies are not needed for this workload.
    pub async fn execute(&self) -> RequestOutcome {
        let success = match self
            .client
            .request(self.method.clone(), self.url.clone())
            .send()
            .await
        {
            Ok(response) => response.status() == self.success_status,
            Err(_) => false,
        };

        RequestOutcome { success }
    }
}
