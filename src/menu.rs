use std::io::{BufRead, Write};
use std::time::Duration;

use color_eyre::Result;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use sysinfo::System;

use crate::activity::ActivityLog;
use crate::report;
use crate::system::collector::clamp_top_limit;
use crate::system::cpu::CpuSampler;
use crate::system::memory::MemorySummary;
use crate::system::process::ProcessScanner;
use crate::system::source::{HostSource, ProcFs, clock_ticks_per_second};

const RULE: &str = "=====================================";
const INVALID_INPUT_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuExit {
    Quit,
    /// The operator chose continuous monitoring; the caller runs the live
    /// view and may re-enter the menu afterwards.
    Watch,
}

/// The numbered main menu.
pub struct Menu<S: HostSource + Clone = ProcFs> {
    sampler: CpuSampler<S>,
    scanner: ProcessScanner<S>,
    sys: System,
    window: Duration,
    top_limit: usize,
    ticks_per_second: u64,
    invalid_input_delay: Duration,
    log: ActivityLog,
}

impl<S: HostSource + Clone> Menu<S> {
    pub fn new(source: S, window: Duration, top_limit: usize, log: ActivityLog) -> Self {
        Menu {
            sampler: CpuSampler::new(source.clone()),
            scanner: ProcessScanner::new(source),
            sys: System::new(),
            window,
            top_limit: clamp_top_limit(top_limit),
            ticks_per_second: clock_ticks_per_second(),
            invalid_input_delay: INVALID_INPUT_DELAY,
            log,
        }
    }

    pub fn with_invalid_input_delay(mut self, delay: Duration) -> Self {
        self.invalid_input_delay = delay;
        self
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: &mut R, out: &mut W) -> Result<MenuExit> {
        loop {
            self.display_menu(out)?;
            write!(out, "Enter your choice: ")?;
            out.flush()?;

            let Some(line) = read_line(input)? else {
                self.log.record("menu_exit", "end of input");
                return Ok(MenuExit::Quit);
            };

            let Ok(choice) = line.trim().parse::<u32>() else {
                writeln!(out, "\nInvalid input. Please enter a number.")?;
                self.log.record("menu_invalid_input", line.trim());
                std::thread::sleep(self.invalid_input_delay);
                continue;
            };

            match choice {
                1 => self.cpu_usage(input, out)?,
                2 => self.memory_usage(input, out)?,
                3 => self.top_processes(input, out)?,
                4 => {
                    self.log.record("continuous_monitoring", "live view");
                    return Ok(MenuExit::Watch);
                }
                5 => {
                    writeln!(out, "\nExiting System Monitor. Goodbye!")?;
                    self.log.record("menu_exit", "exit chosen");
                    return Ok(MenuExit::Quit);
                }
                other => {
                    writeln!(out, "\nInvalid choice. Please select 1-5.")?;
                    self.log.record("menu_invalid_choice", &other.to_string());
                    std::thread::sleep(self.invalid_input_delay);
                }
            }
        }
    }

    fn display_menu<W: Write>(&self, out: &mut W) -> Result<()> {
        clear_screen(out)?;
        writeln!(out, "{RULE}")?;
        writeln!(out, "    SYSTEM MONITOR - MAIN MENU")?;
        writeln!(out, "{RULE}")?;
        writeln!(out, "1. CPU Usage")?;
        writeln!(out, "2. Memory Usage")?;
        writeln!(out, "3. Top {} Processes", self.top_limit)?;
        writeln!(out, "4. Continuous Monitoring")?;
        writeln!(out, "5. Exit")?;
        writeln!(out, "{RULE}")?;
        Ok(())
    }

    fn cpu_usage<R: BufRead, W: Write>(&mut self, input: &mut R, out: &mut W) -> Result<()> {
        clear_screen(out)?;
        writeln!(out, "Sampling CPU for {:.2}s...", self.window.as_secs_f64())?;
        out.flush()?;

        match self.sampler.sample_over_window(self.window) {
            Ok(util) => {
                write!(out, "{}", report::render_cpu(&util, self.window))?;
                self.log.record(
                    "cpu_usage",
                    &format!("active={:.2}% idle={:.2}%", util.active, util.idle),
                );
            }
            Err(err) => {
                writeln!(out, "Error: {err}")?;
                self.log.failure("cpu_usage", &err);
            }
        }
        wait_for_enter(input, out)
    }

    fn memory_usage<R: BufRead, W: Write>(&mut self, input: &mut R, out: &mut W) -> Result<()> {
        clear_screen(out)?;
        let summary = MemorySummary::collect(&mut self.sys);
        write!(out, "{}", report::render_memory(&summary))?;
        self.log.record(
            "memory_usage",
            &format!("used={} total={}", summary.used, summary.total),
        );
        wait_for_enter(input, out)
    }

    fn top_processes<R: BufRead, W: Write>(&mut self, input: &mut R, out: &mut W) -> Result<()> {
        clear_screen(out)?;
        match self.scanner.list_top_processes(self.top_limit) {
            Ok(list) => {
                write!(
                    out,
                    "{}",
                    report::render_top(&list, self.top_limit, self.ticks_per_second)
                )?;
                self.log.record(
                    "top_processes",
                    &format!("shown={} considered={}", list.len(), list.considered),
                );
            }
            Err(err) => {
                writeln!(out, "Error: {err}")?;
                self.log.failure("top_processes", &err);
            }
        }
        wait_for_enter(input, out)
    }
}

pub fn clear_screen<W: Write>(out: &mut W) -> Result<()> {
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    Ok(())
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn wait_for_enter<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<()> {
    write!(out, "\nPress Enter to return to menu...")?;
    out.flush()?;
    read_line(input)?;
    Ok(())
}
