use std::fmt::Debug;

use serde::{Serialize, de::DeserializeOwned};
use volley_macros::metric;

/// Metrics that should be collected and processed by the framework.
/// A scenario action produces exactly one metric per invocation.
pub trait Metric
where
    Self: Serialize + DeserializeOwned + PartialOrd + PartialEq + Send + Sync + Debug + Clone,
{
}

/// The outcome of one dispatched request.
///
/// `success` is true iff a response arrived with the configured success
/// status. Transport errors, timeout expiry, redirect-loop exhaustion, and
/// non-success statuses all collapse to `false`, so the dispatcher is
/// guaranteed one outcome per request no matter how the request ends.
#[metric]
pub struct RequestOutcome {
    pub success: bool,
}
