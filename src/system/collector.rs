use sysinfo::System;

use super::cpu::{CpuSampler, CpuSnapshot, CpuUtilization};
use super::error::SystemError;
use super::memory::MemorySummary;
use super::process::{DEFAULT_TOP_LIMIT, ProcessScanner};
use super::snapshot::MonitorSnapshot;
use super::source::HostSource;

pub const MAX_TOP_LIMIT: usize = 50;

/// Periodic re-sampling for the live view.
///
/// Keeps the CPU snapshot from the previous refresh, so each refresh reports
/// utilization over the refresh interval without sleeping.
pub struct Collector<S: HostSource + Clone> {
    sampler: CpuSampler<S>,
    scanner: ProcessScanner<S>,
    sys: System,
    previous: Option<CpuSnapshot>,
    top_limit: usize,
}

impl<S: HostSource + Clone> Collector<S> {
    pub fn new(source: S, top_limit: usize) -> Self {
        Collector {
            sampler: CpuSampler::new(source.clone()),
            scanner: ProcessScanner::new(source),
            sys: System::new(),
            previous: None,
            top_limit: clamp_top_limit(top_limit),
        }
    }

    pub fn top_limit(&self) -> usize {
        self.top_limit
    }

    pub fn set_top_limit(&mut self, limit: usize) {
        self.top_limit = clamp_top_limit(limit);
    }

    pub fn refresh(&mut self) -> Result<MonitorSnapshot, SystemError> {
        let cpu_ready = self.previous.is_some();
        let current = self.sampler.capture()?;
        let previous = self.previous.replace(current).unwrap_or(current);
        let cpu = CpuUtilization::between(&previous, &current);

        let top = self.scanner.list_top_processes(self.top_limit)?;
        let memory = MemorySummary::collect(&mut self.sys);

        Ok(MonitorSnapshot {
            cpu,
            cpu_ready,
            memory,
            top,
        })
    }
}

/// Maps 0 to the default limit and caps at [`MAX_TOP_LIMIT`].
pub fn clamp_top_limit(limit: usize) -> usize {
    if limit == 0 {
        return DEFAULT_TOP_LIMIT;
    }
    limit.min(MAX_TOP_LIMIT)
}
