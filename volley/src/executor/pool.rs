use std::{sync::Arc, time::Duration};

use futures::future::join_all;
use tokio::sync::{Semaphore, watch};
use typed_builder::TypedBuilder;

use super::Executor;
use crate::config::{ConfigError, LoadTestConfig, default_concurrency};
use crate::{aggregate::Aggregate, scenario::Scenario};
use internals::*;

/// Lifecycle of one pool run.
///
/// Transitions are strictly ordered (no phase is skipped) and `Done` is
/// entered exactly once per run, after which the aggregate is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PoolPhase {
    /// Pool created, no work accepted yet.
    Idle,
    /// Accepting and executing work up to the concurrency bound.
    Running,
    /// All work submitted; waiting for in-flight requests to finish.
    Draining,
    /// Terminal; the outcome aggregate is finalized.
    Done,
}

/// Executor that fans a fixed number of requests out over a bounded set of
/// concurrent slots and joins them all before returning.
///
/// - A semaphore permit is claimed before each spawn and held for the whole
///   round-trip, so at most `concurrency` requests are in flight at any
///   instant. The bound protects the target and the client box alike; it is
///   a correctness requirement, not a tuning knob.
/// - Every `concurrency`-th submission sleeps `pace_delay`, shaving the
///   connection-storm a cold start would otherwise produce. Zero disables
///   the shaping.
/// - Each task returns its own metric and the join barrier folds them into
///   a fresh aggregate; nothing shared is written while the run is hot.
///
/// One `PoolExecutor` value models a single run; calling `exec` again
/// restarts the phase machine from `Running`.
#[derive(Debug, TypedBuilder)]
pub struct PoolExecutor {
    pub total_requests: u64,
    /// Upper bound on in-flight requests.
    #[builder(default = default_concurrency())]
    pub concurrency: usize,
    #[builder(default = Duration::from_millis(1))]
    pub pace_delay: Duration,
    #[builder(default = watch::channel(PoolPhase::Idle).0, setter(skip))]
    phase: watch::Sender<PoolPhase>,
}

impl PoolExecutor {
    pub fn from_config(config: &LoadTestConfig) -> Self {
        PoolExecutor::builder()
            .total_requests(config.total_requests)
            .concurrency(config.concurrency)
            .pace_delay(config.pace_delay)
            .build()
    }

    /// Observe phase transitions. The receiver also reports the current
    /// phase at any time via `borrow`.
    pub fn subscribe(&self) -> watch::Receiver<PoolPhase> {
        self.phase.subscribe()
    }
}

impl<A, F, Fut> Executor<A, F, Fut> for PoolExecutor
where
    Self: Send + Sync + Sized,
    A: Aggregate + 'static,
    A::Metric: 'static,
    F: Fn() -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = A::Metric> + Send + 'static,
{
    async fn exec(
        &self,
        scenario: &Scenario<A, Self, F, Fut>,
    ) -> Result<A, Box<dyn std::error::Error>> {
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency.into());
        }

        let slots = Arc::new(Semaphore::new(self.concurrency));

        self.phase.send_replace(PoolPhase::Running);
        tracing::info!(
            "Dispatching {} requests over {} slots...",
            self.total_requests,
            self.concurrency
        );
        let handles = submit_all(
            slots,
            self.total_requests,
            self.concurrency,
            self.pace_delay,
            scenario.action.clone(),
        )
        .await?;

        self.phase.send_replace(PoolPhase::Draining);
        tracing::info!("All requests submitted, draining in-flight work...");
        let mut agg = A::new();
        for outcome in join_all(handles).await {
            agg.consume(&outcome.expect("request task panicked"));
        }

        self.phase.send_replace(PoolPhase::Done);
        tracing::info!("Done running scenario: {}!", scenario.name);
        Ok(agg)
    }
}

#[cfg(feature = "internals")]
pub use internals::*;

mod internals {
    use tokio::{sync::AcquireError, task::JoinHandle, time::sleep};

    use super::*;

    /// Submit `total` units of work, claiming a slot before each spawn and
    /// pacing every `concurrency`-th submission. Returns once everything is
    /// submitted; the handles are the caller's join barrier.
    pub async fn submit_all<M, F, Fut>(
        slots: Arc<Semaphore>,
        total: u64,
        concurrency: usize,
        pace_delay: Duration,
        action: F,
    ) -> Result<Vec<JoinHandle<M>>, AcquireError>
    where
        M: Send + 'static,
        F: Fn() -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = M> + Send + 'static,
    {
        let mut handles = Vec::with_capacity(total as usize);
        for seq in 0..total {
            if !pace_delay.is_zero() && seq % concurrency as u64 == 0 {
                sleep(pace_delay).await;
            }

            let permit = slots.clone().acquire_owned().await?;
            let action = action.clone();
            handles.push(tokio::spawn(async move {
                // slot held for the whole round-trip
                let _slot = permit;
                action().await
            }));
        }
        Ok(handles)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    use tokio::time::sleep;

    use super::*;
    use crate::{aggregate::OutcomeTally, metric::RequestOutcome};

    fn scenario_with<F, Fut>(
        executor: PoolExecutor,
        action: F,
    ) -> Scenario<OutcomeTally, PoolExecutor, F, Fut>
    where
        F: Fn() -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = RequestOutcome> + Send + 'static,
    {
        Scenario::<OutcomeTally, _, _, _>::builder()
            .name("pool test")
            .action(action)
            .executor(executor)
            .build()
    }

    #[tokio::test]
    async fn every_submission_yields_exactly_one_outcome() {
        let executor = PoolExecutor::builder()
            .total_requests(64)
            .concurrency(8)
            .pace_delay(Duration::ZERO)
            .build();

        let seq = Arc::new(AtomicU64::new(0));
        let action = {
            let seq = Arc::clone(&seq);
            move || {
                let seq = Arc::clone(&seq);
                async move {
                    // uneven latencies so completions interleave arbitrarily
                    let i = seq.fetch_add(1, Ordering::Relaxed);
                    sleep(Duration::from_micros((i * 37) % 500)).await;
                    RequestOutcome { success: true }
                }
            }
        };

        let tally = scenario_with(executor, action).run().await.unwrap();

        assert_eq!(tally.total(), 64);
        assert_eq!(tally.success_count + tally.failure_count, 64);
    }

    #[tokio::test]
    async fn in_flight_work_never_exceeds_the_concurrency_bound() {
        let executor = PoolExecutor::builder()
            .total_requests(48)
            .concurrency(4)
            .pace_delay(Duration::ZERO)
            .build();

        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let action = {
            let current = Arc::clone(&current);
            let peak = Arc::clone(&peak);
            move || {
                let current = Arc::clone(&current);
                let peak = Arc::clone(&peak);
                async move {
                    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    sleep(Duration::from_millis(2)).await;
                    current.fetch_sub(1, Ordering::SeqCst);
                    RequestOutcome { success: true }
                }
            }
        };

        let tally = scenario_with(executor, action).run().await.unwrap();

        assert_eq!(tally.total(), 48);
        assert!(peak.load(Ordering::SeqCst) <= 4);
    }

    #[tokio::test]
    async fn zero_requests_complete_immediately_with_an_empty_tally() {
        let executor = PoolExecutor::builder()
            .total_requests(0)
            .concurrency(4)
            .build();
        let phases = executor.subscribe();

        let action = || async { RequestOutcome { success: true } };
        let tally = scenario_with(executor, action).run().await.unwrap();

        assert_eq!(tally.total(), 0);
        assert_eq!(*phases.borrow(), PoolPhase::Done);
    }

    #[tokio::test]
    async fn all_successes_are_counted() {
        let executor = PoolExecutor::builder()
            .total_requests(100)
            .concurrency(10)
            .build();

        let action = || async { RequestOutcome { success: true } };
        let tally = scenario_with(executor, action).run().await.unwrap();

        assert_eq!(tally.success_count, 100);
        assert_eq!(tally.failure_count, 0);
    }

    #[tokio::test]
    async fn alternating_outcomes_split_the_tally() {
        let executor = PoolExecutor::builder()
            .total_requests(50)
            .concurrency(5)
            .pace_delay(Duration::ZERO)
            .build();

        let seq = Arc::new(AtomicU64::new(0));
        let action = {
            let seq = Arc::clone(&seq);
            move || {
                let seq = Arc::clone(&seq);
                async move {
                    let i = seq.fetch_add(1, Ordering::Relaxed);
                    RequestOutcome { success: i % 2 == 0 }
                }
            }
        };

        let tally = scenario_with(executor, action).run().await.unwrap();

        assert_eq!(tally.success_count, 25);
        assert_eq!(tally.failure_count, 25);
    }

    #[tokio::test]
    async fn timed_out_actions_still_complete_the_run() {
        let executor = PoolExecutor::builder()
            .total_requests(20)
            .concurrency(5)
            .pace_delay(Duration::ZERO)
            .build();

        let action = || async {
            let waited = tokio::time::timeout(
                Duration::from_millis(1),
                sleep(Duration::from_secs(30)),
            )
            .await;
            RequestOutcome {
                success: waited.is_ok(),
            }
        };

        let tally = scenario_with(executor, action).run().await.unwrap();

        assert_eq!(tally.success_count, 0);
        assert_eq!(tally.failure_count, 20);
    }

    #[tokio::test]
    async fn phases_progress_in_order_and_finish_done_once() {
        let executor = PoolExecutor::builder()
            .total_requests(8)
            .concurrency(2)
            .pace_delay(Duration::ZERO)
            .build();
        let mut rx = executor.subscribe();
        assert_eq!(*rx.borrow(), PoolPhase::Idle);

        let watcher = tokio::spawn(async move {
            let mut seen = vec![*rx.borrow_and_update()];
            while rx.changed().await.is_ok() {
                let phase = *rx.borrow_and_update();
                seen.push(phase);
                if phase == PoolPhase::Done {
                    break;
                }
            }
            seen
        });

        let action = || async {
            sleep(Duration::from_millis(1)).await;
            RequestOutcome { success: true }
        };
        scenario_with(executor, action).run().await.unwrap();

        let seen = watcher.await.unwrap();
        // the watch channel may coalesce, but what it sees is ordered and
        // ends at Done, entered once
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*seen.last().unwrap(), PoolPhase::Done);
        assert_eq!(
            seen.iter().filter(|p| **p == PoolPhase::Done).count(),
            1
        );
    }

    #[tokio::test]
    async fn zero_concurrency_is_refused_up_front() {
        let executor = PoolExecutor::builder()
            .total_requests(10)
            .concurrency(0)
            .build();

        let action = || async { RequestOutcome { success: true } };
        let result = scenario_with(executor, action).run().await;

        assert!(result.is_err());
    }
}
