//! Volley is a small concurrent HTTP load-generation library with resource
//! accounting.
//!
//! Volley issues a fixed volume of requests against a target endpoint from a
//! bounded worker pool, collects one success/failure outcome per request,
//! and wraps the whole run in resource snapshots so the final report carries
//! wall-clock time, CPU time, memory and throughput figures alongside the
//! counts.
//!
//! # Architecture
//!
//! The main building blocks are:
//!
//! - [`LoadTestConfig`]: validated, immutable run parameters (target,
//!   request count, concurrency bound, timeouts).
//! - [`HttpRequester`]: issues one request and reduces every possible ending
//!   (success status, transport error, timeout, redirect exhaustion) into a
//!   single boolean [`RequestOutcome`]. It never fails past its boundary.
//! - [`Executor`]: responsible for actually running a scenario. The shipped
//!   [`PoolExecutor`] fans the configured number of requests out over a
//!   semaphore-bounded slot set, paces submissions lightly, and joins
//!   everything before returning.
//! - [`Aggregate`]: folds per-request metrics into a compact result; the
//!   built-in [`OutcomeTally`] counts successes and failures.
//! - [`ResourceProbe`]: samples process CPU time and resident memory at the
//!   two run brackets; [`ProcfsProbe`] reads the Linux procfs and degrades
//!   to zeros anywhere else.
//! - [`LoadTestReport`]: derived once from the tally and the two snapshots;
//!   [`Reporter`] implementations ship it to stdout as text or JSON.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use url::Url;
//! use volley::{LoadTestConfig, Reporter, StdoutReporter, run_load_test};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = LoadTestConfig::builder()
//!         .target_url(Url::parse("http://localhost:3000/health")?)
//!         .total_requests(1_000)
//!         .concurrency(100)
//!         .connect_timeout(Duration::from_secs(5))
//!         .request_timeout(Duration::from_secs(5))
//!         .build();
//!
//!     let report = run_load_test(&config).await?;
//!     StdoutReporter.report(report).await
//! }
//! ```
//!
//! Individual request failures never fail the run; they end up in the
//! report's failure count. Only setup errors (bad target, zero concurrency,
//! zero timeouts) come back as `Err`, before any work starts.
//!
//! # Feature flags
//!
//! - `macros`: re-exports the `#[metric]`/`#[aggregate]` attribute macros
//!   for user-defined metric types. (Enabled by default)
//! - `internals`: exposes the pool executor's submit loop for downstream
//!   instrumentation.

/// Outcome tallies and the aggregate seam
pub mod aggregate;
/// Run parameters and validation
pub mod config;
/// Orchestrators that define how things will actually run
pub mod executor;
/// End-to-end wiring of a load-test run
pub mod harness;
/// Single metrics
pub mod metric;
/// Resource counters and run bracketing
pub mod probe;
/// Reports and Reporters
pub mod report;
/// The HTTP request side
pub mod request;
/// Glues an action, an executor and an aggregate into one runnable unit
pub mod scenario;

pub use aggregate::{Aggregate, OutcomeTally};
pub use config::{ConfigError, LoadTestConfig};
pub use executor::{Executor, PoolExecutor, PoolPhase};
pub use harness::run_load_test;
pub use metric::{Metric, RequestOutcome};
pub use probe::{NullProbe, ProcfsProbe, ResourceProbe, ResourceSnapshot, benchmark};
pub use report::{JsonReporter, LoadTestReport, Reporter, StdoutReporter};
pub use request::HttpRequester;
pub use scenario::Scenario;

#[cfg(feature = "macros")]
/// Attribute macros for user-defined metric and aggregate types
pub mod macros {
    pub use volley_macros::*;
}
