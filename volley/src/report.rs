use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::aggregate::OutcomeTally;
use crate::probe::ResourceSnapshot;

/// Derived, read-only summary of a finished run.
///
/// Built once, after every outcome has been collected, and immutable from
/// then on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadTestReport {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub wall_clock: Duration,
    pub cpu_time: Duration,
    pub peak_memory_bytes: u64,
    /// Requests per second over the wall-clock window.
    pub throughput: f64,
}

impl LoadTestReport {
    /// Pure derivation from the two bracketing snapshots and the outcome
    /// tally. No I/O.
    ///
    /// Counter deltas saturate at zero: counters can wrap, and the thread
    /// set can differ between snapshots. Memory is the larger of the two
    /// readings, a peak-ish proxy in the absence of continuous sampling.
    /// Throughput is 0 for a zero-length window, never NaN or infinity.
    pub fn derive(
        start: &ResourceSnapshot,
        end: &ResourceSnapshot,
        tally: &OutcomeTally,
    ) -> Self {
        let wall_clock = end.taken_at.saturating_duration_since(start.taken_at);
        let cpu_time = end.cpu_time.saturating_sub(start.cpu_time);
        let peak_memory_bytes = start.memory_bytes.max(end.memory_bytes);

        let total = tally.total();
        let secs = wall_clock.as_secs_f64();
        let throughput = if secs > 0.0 { total as f64 / secs } else { 0.0 };

        Self {
            total_requests: total,
            successful_requests: tally.success_count,
            failed_requests: tally.failure_count,
            wall_clock,
            cpu_time,
            peak_memory_bytes,
            throughput,
        }
    }

    pub fn peak_memory_mb(&self) -> f64 {
        self.peak_memory_bytes as f64 / (1024.0 * 1024.0)
    }
}

impl fmt::Display for LoadTestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Load Test Report ---")?;
        writeln!(f, "Total requests      : {}", self.total_requests)?;
        writeln!(f, "Successful requests : {}", self.successful_requests)?;
        writeln!(f, "Failed requests     : {}", self.failed_requests)?;
        writeln!(
            f,
            "Wall-clock time     : {:.3} seconds",
            self.wall_clock.as_secs_f64()
        )?;
        writeln!(
            f,
            "Total CPU time      : {:.3} seconds",
            self.cpu_time.as_secs_f64()
        )?;
        writeln!(f, "Max memory usage    : {:.2} MB", self.peak_memory_mb())?;
        write!(
            f,
            "Throughput          : {:.2} requests/second",
            self.throughput
        )
    }
}

/// Reporters consume a finished report and perform the side effects
/// (stdout, a file, some telemetry service). Derivation stays pure; this
/// is the I/O boundary.
#[async_trait]
pub trait Reporter<R: Send + Sync> {
    async fn report(&self, report: R) -> Result<(), Box<dyn std::error::Error>>;
}

/// Prints the human-readable summary to stdout.
pub struct StdoutReporter;

#[async_trait]
impl Reporter<LoadTestReport> for StdoutReporter {
    async fn report(&self, report: LoadTestReport) -> Result<(), Box<dyn std::error::Error>> {
        println!("{report}");
        Ok(())
    }
}

/// Prints the report as a single JSON line.
pub struct JsonReporter;

#[async_trait]
impl Reporter<LoadTestReport> for JsonReporter {
    async fn report(&self, report: LoadTestReport) -> Result<(), Box<dyn std::error::Error>> {
        println!("{}", serde_json::to_string(&report)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    fn snapshot(taken_at: Instant, cpu: Duration, memory: u64) -> ResourceSnapshot {
        ResourceSnapshot {
            taken_at,
            cpu_time: cpu,
            memory_bytes: memory,
        }
    }

    #[test]
    fn derives_counts_and_throughput() {
        let t0 = Instant::now();
        let start = snapshot(t0, Duration::from_secs(1), 10 * 1024 * 1024);
        let end = snapshot(t0 + Duration::from_secs(2), Duration::from_secs(3), 14 * 1024 * 1024);
        let tally = OutcomeTally {
            success_count: 25,
            failure_count: 25,
        };

        let report = LoadTestReport::derive(&start, &end, &tally);

        assert_eq!(report.total_requests, 50);
        assert_eq!(report.successful_requests, 25);
        assert_eq!(report.failed_requests, 25);
        assert_eq!(report.wall_clock, Duration::from_secs(2));
        assert_eq!(report.cpu_time, Duration::from_secs(2));
        assert_eq!(report.peak_memory_bytes, 14 * 1024 * 1024);
        assert!((report.throughput - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reversed_counters_clamp_to_zero() {
        let t0 = Instant::now();
        // end "before" start: wrapped counters must not produce negatives
        let start = snapshot(t0 + Duration::from_secs(10), Duration::from_secs(5), 8 << 20);
        let end = snapshot(t0, Duration::from_secs(1), 4 << 20);
        let tally = OutcomeTally::default();

        let report = LoadTestReport::derive(&start, &end, &tally);

        assert_eq!(report.wall_clock, Duration::ZERO);
        assert_eq!(report.cpu_time, Duration::ZERO);
        assert_eq!(report.peak_memory_bytes, 8 << 20);
    }

    #[test]
    fn zero_length_window_has_zero_throughput() {
        let t0 = Instant::now();
        let start = snapshot(t0, Duration::ZERO, 0);
        let end = snapshot(t0, Duration::ZERO, 0);
        let tally = OutcomeTally::default();

        let report = LoadTestReport::derive(&start, &end, &tally);

        assert_eq!(report.total_requests, 0);
        assert_eq!(report.throughput, 0.0);
        assert!(report.throughput.is_finite());
    }

    #[test]
    fn display_lists_every_figure() {
        let t0 = Instant::now();
        let start = snapshot(t0, Duration::ZERO, 16 << 20);
        let end = snapshot(t0 + Duration::from_secs(1), Duration::from_millis(1500), 16 << 20);
        let tally = OutcomeTally {
            success_count: 99,
            failure_count: 1,
        };

        let text = LoadTestReport::derive(&start, &end, &tally).to_string();

        assert!(text.contains("--- Load Test Report ---"));
        assert!(text.contains("Total requests      : 100"));
        assert!(text.contains("Successful requests : 99"));
        assert!(text.contains("Failed requests     : 1"));
        assert!(text.contains("Total CPU time      : 1.500 seconds"));
        assert!(text.contains("Max memory usage    : 16.00 MB"));
        assert!(text.contains("requests/second"));
    }
}
