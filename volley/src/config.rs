use std::time::Duration;

use reqwest::{Method, StatusCode};
use thiserror::Error;
use typed_builder::TypedBuilder;
use url::Url;

/// Setup errors. These are the only failures that cross component
/// boundaries; everything that happens after the run starts is data.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("{which} timeout must be greater than zero")]
    ZeroTimeout { which: &'static str },

    #[error("unsupported target scheme `{scheme}` (expected http or https)")]
    UnsupportedScheme { scheme: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Immutable run parameters.
///
/// Parse the target with [`Url::parse`] before building; a malformed URI is
/// a setup error at the caller's boundary. `total_requests == 0` is
/// accepted and produces a degenerate empty run with zero throughput.
#[derive(Debug, Clone, TypedBuilder)]
pub struct LoadTestConfig {
    pub target_url: Url,
    pub total_requests: u64,
    /// Upper bound on requests in flight at any instant.
    #[builder(default = default_concurrency())]
    pub concurrency: usize,
    #[builder(default = Duration::from_secs(5))]
    pub connect_timeout: Duration,
    /// Covers the whole round-trip; a hung connection must not stall the run.
    #[builder(default = Duration::from_secs(5))]
    pub request_timeout: Duration,
    #[builder(default = Method::GET)]
    pub method: Method,
    #[builder(default = StatusCode::OK)]
    pub success_status: StatusCode,
    /// Delay inserted every `concurrency`-th submission. Zero disables it.
    #[builder(default = Duration::from_millis(1))]
    pub pace_delay: Duration,
}

// Twice the cores, capped: past a hundred sockets the client box is the
// bottleneck, not the target.
pub(crate) fn default_concurrency() -> usize {
    (num_cpus::get() * 2).min(100)
}

impl LoadTestConfig {
    /// Check the parameters before any work starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout { which: "connect" });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout { which: "request" });
        }
        match self.target_url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ConfigError::UnsupportedScheme {
                scheme: other.to_owned(),
            }),
        }
    }
}
