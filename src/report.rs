//! Plain-text and JSON renderings of one-shot reports.

use std::fmt::Write;
use std::time::Duration;

use color_eyre::Result;
use serde::Serialize;

use crate::format::{format_bytes, format_percent, pad_unicode};
use crate::system::cpu::CpuUtilization;
use crate::system::memory::MemorySummary;
use crate::system::process::RankedProcessList;

const RULE_WIDTH: usize = 80;

pub fn render_cpu(util: &CpuUtilization, window: Duration) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== CPU Usage ===");
    let _ = writeln!(out);
    let _ = writeln!(out, "Sampled over {:.2}s", window.as_secs_f64());
    let _ = writeln!(out, "{:<10}{:>7}", "Active:", format_percent(util.active));
    let _ = writeln!(out, "{:<10}{:>7}", "Idle:", format_percent(util.idle));
    let _ = writeln!(out, "{:<10}{:>7}", "I/O wait:", format_percent(util.iowait));
    if util.shows_steal() {
        let _ = writeln!(out, "{:<10}{:>7}", "Steal:", format_percent(util.steal));
    }
    out
}

pub fn render_memory(summary: &MemorySummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Memory Usage ===");
    let _ = writeln!(out);
    let _ = writeln!(out, "{:<11}{}", "Total:", format_bytes(summary.total));
    let _ = writeln!(
        out,
        "{:<11}{} ({:.1}%)",
        "Used:",
        format_bytes(summary.used),
        summary.used_ratio() * 100.0
    );
    let _ = writeln!(out, "{:<11}{}", "Available:", format_bytes(summary.available));
    let _ = writeln!(
        out,
        "{:<11}{} / {}",
        "Swap:",
        format_bytes(summary.swap_used),
        format_bytes(summary.swap_total)
    );
    out
}

pub fn render_top(list: &RankedProcessList, limit: usize, ticks_per_second: u64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Top {limit} Processes ===");
    let _ = writeln!(out);

    if list.is_empty() {
        let _ = writeln!(out, "No processes found");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<8} {:<20} {:<15} {:<15} {}",
        "PID", "Process Name", "User Time", "System Time", "Total Time"
    );
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    for process in list.iter() {
        let _ = writeln!(
            out,
            "{:<8} {} {:<15} {:<15} {}",
            process.pid,
            pad_unicode(process.name.as_str(), 20),
            process.user_ticks,
            process.kernel_ticks,
            process.total_ticks()
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Note: Times are in clock ticks ({ticks_per_second} per second)"
    );
    out
}

/// Everything a one-shot invocation asked for, serialized as one document.
#[derive(Debug, Default, Serialize)]
pub struct OneShotReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<CpuUtilization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemorySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<RankedProcessList>,
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
