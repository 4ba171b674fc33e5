use serde::Serialize;

use super::cpu::CpuUtilization;
use super::memory::MemorySummary;
use super::process::RankedProcessList;

#[derive(Debug, Clone, Default, Serialize)]
pub struct MonitorSnapshot {
    pub cpu: CpuUtilization,
    /// False on the first refresh, when there is no earlier capture to
    /// compare against and `cpu` is all zero.
    pub cpu_ready: bool,
    pub memory: MemorySummary,
    pub top: RankedProcessList,
}
