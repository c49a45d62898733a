use std::time::{Duration, Instant};

/// A point-in-time reading of the process's resource counters.
///
/// Two of these bracket every measured run; neither is mutated after
/// capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSnapshot {
    pub taken_at: Instant,
    /// CPU time consumed so far, user plus system.
    pub cpu_time: Duration,
    /// Resident memory in bytes.
    pub memory_bytes: u64,
}

/// Reads resource counters.
///
/// Implementations are side-effect-free and callable at any time. A probe
/// that cannot read a counter reports zero for it; a missing metric never
/// aborts a run.
pub trait ResourceProbe {
    fn snapshot(&self) -> ResourceSnapshot;
}

/// Probe backed by the Linux procfs.
///
/// CPU time is the whole process's utime + stime from `/proc/self/stat`.
/// That is process-level accounting: runtime threads outside the worker
/// pool are included, so absolute figures are an approximation, while
/// comparisons between runs on the same host are unaffected. Memory is the
/// resident set size from `/proc/self/statm`.
///
/// On other targets, and whenever procfs cannot be read or parsed, the
/// counters degrade to zero and the snapshot is still produced.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcfsProbe;

impl ProcfsProbe {
    pub fn new() -> Self {
        Self
    }

    #[cfg(target_os = "linux")]
    fn cpu_time() -> Option<Duration> {
        // USER_HZ is 100 on every mainstream kernel.
        const TICKS_PER_SEC: u64 = 100;

        let stat = std::fs::read_to_string("/proc/self/stat").ok()?;
        // comm may contain spaces and parens; fields are positional only
        // after the last ')'.
        let rest = stat.get(stat.rfind(')')? + 1..)?;
        let mut fields = rest.split_whitespace();
        let utime: u64 = fields.nth(11)?.parse().ok()?;
        let stime: u64 = fields.next()?.parse().ok()?;
        Some(Duration::from_millis((utime + stime) * 1000 / TICKS_PER_SEC))
    }

    #[cfg(target_os = "linux")]
    fn memory_bytes() -> Option<u64> {
        let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
        let resident: u64 = statm.split_whitespace().nth(1)?.parse().ok()?;
        Some(resident * 4096) // assume 4KB pages
    }

    #[cfg(not(target_os = "linux"))]
    fn cpu_time() -> Option<Duration> {
        None
    }

    #[cfg(not(target_os = "linux"))]
    fn memory_bytes() -> Option<u64> {
        None
    }
}

impl ResourceProbe for ProcfsProbe {
    fn snapshot(&self) -> ResourceSnapshot {
        let cpu_time = Self::cpu_time().unwrap_or_else(|| {
            tracing::debug!("process CPU time unavailable, reporting zero");
            Duration::ZERO
        });
        let memory_bytes = Self::memory_bytes().unwrap_or_else(|| {
            tracing::debug!("resident memory unavailable, reporting zero");
            0
        });

        ResourceSnapshot {
            taken_at: Instant::now(),
            cpu_time,
            memory_bytes,
        }
    }
}

/// Fallback probe for hosts with no supported counter source: real
/// timestamps, zero counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProbe;

impl ResourceProbe for NullProbe {
    fn snapshot(&self) -> ResourceSnapshot {
        ResourceSnapshot {
            taken_at: Instant::now(),
            cpu_time: Duration::ZERO,
            memory_bytes: 0,
        }
    }
}

/// Run a computation bracketed by two snapshots.
///
/// This is the measurement protocol shared by every benchmarked workload:
/// sample, run, sample again. The caller derives elapsed, CPU and memory
/// figures from the pair.
pub fn benchmark<P, T>(probe: &P, f: impl FnOnce() -> T) -> (T, ResourceSnapshot, ResourceSnapshot)
where
    P: ResourceProbe,
{
    let before = probe.snapshot();
    let value = f();
    let after = probe.snapshot();
    (value, before, after)
}
