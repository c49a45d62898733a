use std::fmt::Debug;

use serde::{Serialize, de::DeserializeOwned};
use volley_macros::aggregate;

use crate::metric::{Metric, RequestOutcome};

/// The `Aggregate` trait defines how raw [`Metric`] values are folded into a
/// compact, mergeable representation.
///
/// Aggregates store raw counts and sums; derived statistics (ratios,
/// throughput) belong to the report stage, which consumes an aggregate once
/// the run is over. Keeping the two apart means several report formats can
/// be produced from the same run without re-executing anything.
///
/// Implementor notes:
/// - `merge` must be associative and commutative, since per-task results
///   are combined in arbitrary order at the join barrier.
/// - `consume` sits on the hot path; keep it to counter updates.
pub trait Aggregate
where
    Self: Serialize + DeserializeOwned + PartialOrd + PartialEq + Send + Sync + Debug + Clone,
{
    /// The metric type this aggregate summarizes.
    type Metric: Metric;

    /// Create a new, empty instance of the aggregate.
    fn new() -> Self;

    /// Aggregate multiple metrics into the current instance.
    ///
    /// This default implementation calls [`Aggregate::consume`] for each
    /// metric.
    fn aggregate(&mut self, metrics: &[Self::Metric]) {
        metrics.iter().for_each(|m| self.consume(m));
    }

    /// Incorporate a single metric into the aggregate.
    fn consume(&mut self, metric: &Self::Metric);

    /// Combine two different aggregates into one.
    fn merge(&mut self, other: Self);
}

/// Counts successful and failed request outcomes.
///
/// After a run, `success_count + failure_count` equals the number of
/// requests submitted, since every outcome lands in exactly one bucket.
#[aggregate]
#[derive(Default)]
pub struct OutcomeTally {
    pub success_count: u64,
    pub failure_count: u64,
}

impl OutcomeTally {
    /// Total number of outcomes observed.
    pub fn total(&self) -> u64 {
        self.success_count + self.failure_count
    }
}

impl Aggregate for OutcomeTally {
    type Metric = RequestOutcome;

    fn new() -> Self {
        OutcomeTally::default()
    }

    fn consume(&mut self, metric: &Self::Metric) {
        if metric.success {
            self.success_count += 1;
        } else {
            self.failure_count += 1;
        }
    }

    fn merge(&mut self, other: Self) {
        self.success_count += other.success_count;
        self.failure_count += other.failure_count;
    }
}
