//! Executor: orchestration of runtime execution.
//!
//! The `Executor` trait is the runtime hook that executes a `Scenario`.
//! Different executors provide different execution strategies; the one
//! shipped here, [`PoolExecutor`], fans a fixed number of requests out over
//! a bounded set of concurrent slots and joins them all before returning.
//!
//! # High-level flow
//! 1. The submit loop claims one slot (a semaphore permit) per unit of
//!    work, spawning a task only once a slot is free. The bound on
//!    in-flight work is enforced at admission, not checked after the fact.
//! 2. Every `concurrency`-th submission sleeps a short pacing delay so the
//!    run does not open every connection in the same instant.
//! 3. Once everything is submitted, a join barrier awaits all task handles
//!    and folds the per-task metrics into a single aggregate. The executor
//!    returns only after every submitted unit has produced exactly one
//!    outcome.
//!
//! Outcome order is not preserved across the barrier; only counts matter
//! downstream, and per-task results avoid any shared mutable state during
//! the run.

pub mod pool;
pub use pool::{PoolExecutor, PoolPhase};

use crate::{aggregate::Aggregate, scenario::Scenario};

pub trait Executor<A, F, Fut>
where
    Self: Send + Sync + Sized,
    A: Aggregate,
    F: Fn() -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = A::Metric> + Send,
{
    /// Execute the scenario and return the final aggregate.
    fn exec(
        &self,
        scenario: &Scenario<A, Self, F, Fut>,
    ) -> impl Future<Output = Result<A, Box<dyn std::error::Error>>> + Send;
}
