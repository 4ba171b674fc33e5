use std::future::Future;
use std::time::Duration;

use serde::Serialize;

use super::error::CpuError;
use super::numeric::percent_of;
use super::source::{HostSource, ProcFs};

/// Steal time at or below this percentage is not worth showing.
pub const STEAL_DISPLAY_THRESHOLD: f64 = 0.1;

const COUNTER_FIELDS: usize = 8;

/// Cumulative aggregate CPU counters, in ticks since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CpuSnapshot {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuSnapshot {
    /// Parses the first line of an aggregate CPU statistics text:
    /// a label followed by at least eight unsigned counters.
    pub fn parse(content: &str) -> Result<Self, CpuError> {
        let line = content.lines().next().unwrap_or_default();
        let mut tokens = line.split_whitespace();
        if tokens.next().is_none() {
            return Err(CpuError::Parse("empty cpu statistics".to_string()));
        }

        let mut counters = [0u64; COUNTER_FIELDS];
        for (idx, slot) in counters.iter_mut().enumerate() {
            *slot = tokens
                .next()
                .and_then(|t| t.parse().ok())
                .ok_or_else(|| {
                    CpuError::Parse(format!(
                        "expected {COUNTER_FIELDS} numeric counters, found {idx}"
                    ))
                })?;
        }

        let [user, nice, system, idle, iowait, irq, softirq, steal] = counters;
        Ok(Self {
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
        })
    }

    pub fn active(&self) -> u64 {
        self.user
            .saturating_add(self.nice)
            .saturating_add(self.system)
            .saturating_add(self.irq)
            .saturating_add(self.softirq)
    }

    pub fn total(&self) -> u64 {
        self.active()
            .saturating_add(self.idle)
            .saturating_add(self.iowait)
            .saturating_add(self.steal)
    }
}

/// Share of elapsed CPU time per category between two snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CpuUtilization {
    pub active: f64,
    pub idle: f64,
    pub iowait: f64,
    pub steal: f64,
}

impl CpuUtilization {
    /// Utilization over the interval `prev` → `curr`.
    ///
    /// `curr` must not precede `prev`. Counter regressions saturate to zero
    /// deltas rather than going negative; a stalled clock yields all zeros.
    pub fn between(prev: &CpuSnapshot, curr: &CpuSnapshot) -> Self {
        let total_delta = curr.total().saturating_sub(prev.total());
        if total_delta == 0 {
            return Self::default();
        }

        Self {
            active: percent_of(curr.active().saturating_sub(prev.active()), total_delta),
            idle: percent_of(curr.idle.saturating_sub(prev.idle), total_delta),
            iowait: percent_of(curr.iowait.saturating_sub(prev.iowait), total_delta),
            steal: percent_of(curr.steal.saturating_sub(prev.steal), total_delta),
        }
    }

    pub fn shows_steal(&self) -> bool {
        self.steal > STEAL_DISPLAY_THRESHOLD
    }
}

/// Reads aggregate CPU counters and turns pairs of them into utilization.
#[derive(Debug, Clone, Default)]
pub struct CpuSampler<S = ProcFs> {
    source: S,
}

impl<S: HostSource> CpuSampler<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn capture(&self) -> Result<CpuSnapshot, CpuError> {
        let content = self
            .source
            .read_cpu_stat()
            .map_err(CpuError::Unavailable)?;
        CpuSnapshot::parse(&content)
    }

    pub fn utilization(prev: &CpuSnapshot, curr: &CpuSnapshot) -> CpuUtilization {
        CpuUtilization::between(prev, curr)
    }

    /// Captures, blocks the calling thread for `window`, captures again.
    pub fn sample_over_window(&self, window: Duration) -> Result<CpuUtilization, CpuError> {
        let first = self.capture()?;
        std::thread::sleep(window);
        let second = self.capture()?;
        Ok(CpuUtilization::between(&first, &second))
    }

    /// Like [`sample_over_window`](Self::sample_over_window), but the wait
    /// ends early with `Ok(None)` once `cancel` completes.
    pub async fn sample_over_window_until<F>(
        &self,
        window: Duration,
        cancel: F,
    ) -> Result<Option<CpuUtilization>, CpuError>
    where
        F: Future,
    {
        let first = self.capture()?;
        tokio::select! {
            biased;
            _ = cancel => return Ok(None),
            _ = tokio::time::sleep(window) => {}
        }
        let second = self.capture()?;
        Ok(Some(CpuUtilization::between(&first, &second)))
    }
}
