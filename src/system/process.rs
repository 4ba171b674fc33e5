use std::fmt;

use serde::Serialize;

use super::error::ScanError;
use super::numeric::{parse_pid, truncate_to_bytes};
use super::source::{HostSource, ProcFs};

/// Upper bound on a stored process name, in bytes.
pub const MAX_NAME_BYTES: usize = 255;
pub const UNKNOWN_NAME: &str = "unknown";
pub const DEFAULT_TOP_LIMIT: usize = 5;

// Positions after the closing paren of the comm field:
// state(0) ppid(1) pgrp(2) session(3) tty_nr(4) tpgid(5) flags(6)
// minflt(7) cminflt(8) majflt(9) cmajflt(10) utime(11) stime(12)
const UTIME_INDEX: usize = 11;
const STIME_INDEX: usize = 12;

/// Process name bounded to [`MAX_NAME_BYTES`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProcessName(String);

impl ProcessName {
    pub fn new(raw: &str) -> Self {
        Self(truncate_to_bytes(raw, MAX_NAME_BYTES).to_string())
    }

    pub fn unknown() -> Self {
        Self(UNKNOWN_NAME.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProcessName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessSample {
    pub pid: u32,
    pub name: ProcessName,
    pub user_ticks: u64,
    pub kernel_ticks: u64,
}

impl ProcessSample {
    pub fn total_ticks(&self) -> u64 {
        self.user_ticks.saturating_add(self.kernel_ticks)
    }
}

/// Processes ordered by total CPU ticks, highest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RankedProcessList {
    pub processes: Vec<ProcessSample>,
    /// How many processes were read successfully before truncation.
    pub considered: usize,
}

impl RankedProcessList {
    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProcessSample> {
        self.processes.iter()
    }
}

/// Sorts descending by total ticks and keeps the first `limit`.
///
/// The sort is stable: equal totals keep their enumeration order.
pub fn rank(mut samples: Vec<ProcessSample>, limit: usize) -> RankedProcessList {
    let considered = samples.len();
    samples.sort_by(|a, b| b.total_ticks().cmp(&a.total_ticks()));
    samples.truncate(limit);
    RankedProcessList {
        processes: samples,
        considered,
    }
}

/// Extracts `(utime, stime)` from a `/proc/<pid>/stat` record.
///
/// The comm field may contain spaces and parens, so positions are counted
/// from the last `)` in the record.
pub fn parse_stat_times(record: &str) -> Option<(u64, u64)> {
    let after_comm = record.rfind(')')? + 1;
    let fields: Vec<&str> = record[after_comm..].split_whitespace().collect();
    let utime = fields.get(UTIME_INDEX)?.parse().ok()?;
    let stime = fields.get(STIME_INDEX)?.parse().ok()?;
    Some((utime, stime))
}

/// Keeps the first line only; `comm` may carry an embedded newline.
fn clean_name(raw: &str) -> ProcessName {
    ProcessName::new(raw.lines().next().unwrap_or_default())
}

/// Enumerates the process registry and ranks processes by CPU time.
#[derive(Debug, Clone, Default)]
pub struct ProcessScanner<S = ProcFs> {
    source: S,
}

impl<S: HostSource> ProcessScanner<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Reads one process. `None` means the process should be skipped:
    /// it exited, its record is unreadable, or the record is malformed.
    /// An unreadable name alone is not a failure.
    pub fn read_process_info(&self, pid: u32) -> Option<ProcessSample> {
        let name = match self.source.read_process_name(pid) {
            Ok(raw) => clean_name(&raw),
            Err(_) => ProcessName::unknown(),
        };
        let record = self.source.read_process_record(pid).ok()?;
        let (user_ticks, kernel_ticks) = parse_stat_times(&record)?;
        Some(ProcessSample {
            pid,
            name,
            user_ticks,
            kernel_ticks,
        })
    }

    /// Every readable process, in enumeration order.
    pub fn scan_all(&self) -> Result<Vec<ProcessSample>, ScanError> {
        let entries = self
            .source
            .list_registry()
            .map_err(ScanError::Enumeration)?;

        let samples = entries
            .iter()
            .filter_map(|entry| parse_pid(entry))
            .filter_map(|pid| self.read_process_info(pid))
            .collect();
        Ok(samples)
    }

    pub fn list_top_processes(&self, limit: usize) -> Result<RankedProcessList, ScanError> {
        Ok(rank(self.scan_all()?, limit))
    }
}
