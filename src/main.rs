use std::io;
use std::path::PathBuf;
use std::sync::Once;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use sysinfo::System;

use sysmon::activity::ActivityLog;
use sysmon::app::App;
use sysmon::config::{Config, load_config, load_config_from_path};
use sysmon::event::{Event, EventHandler};
use sysmon::menu::{Menu, MenuExit};
use sysmon::report::{self, OneShotReport};
use sysmon::system::collector::{Collector, clamp_top_limit};
use sysmon::system::cpu::CpuSampler;
use sysmon::system::memory::MemorySummary;
use sysmon::system::process::ProcessScanner;
use sysmon::system::source::{ProcFs, clock_ticks_per_second};
use sysmon::ui;

const MIN_REFRESH_RATE_MS: u64 = 100;
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Parser)]
#[command(
    name = "sysmon",
    about = "Terminal system monitor: CPU utilization and top processes by CPU time"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print CPU utilization over one sampling window and exit
    #[arg(long)]
    cpu: bool,

    /// Print a memory summary and exit
    #[arg(long)]
    memory: bool,

    /// Print the top N processes by CPU time and exit (configured limit when N is omitted)
    #[arg(long, value_name = "N", num_args = 0..=1)]
    top: Option<Option<usize>>,

    /// Start the live view instead of the menu
    #[arg(long)]
    watch: bool,

    /// CPU sampling window in milliseconds
    #[arg(long)]
    window_ms: Option<u64>,

    /// Live view refresh rate in milliseconds
    #[arg(long)]
    refresh_rate: Option<u64>,

    /// Root of the process filesystem
    #[arg(long)]
    proc_root: Option<PathBuf>,

    /// Print one-shot reports as JSON
    #[arg(long)]
    json: bool,

    /// Append activity records to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn is_one_shot(&self) -> bool {
        self.cpu || self.memory || self.top.is_some()
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);
    let log = ActivityLog::from_settings(cli.log_file.as_deref(), &config.log)?;
    let source = ProcFs::new(config.general.proc_root.clone());

    if cli.is_one_shot() {
        return run_one_shot(&cli, &config, source, &log).await;
    }
    if cli.watch {
        return run_watch(&config, source, &log).await;
    }
    run_menu(&config, source, log).await
}

fn load_config_for_cli(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(window) = cli.window_ms {
        config.general.sample_window_ms = window;
    }
    if let Some(rate) = cli.refresh_rate {
        config.general.refresh_rate_ms = rate;
    }
    if let Some(ref root) = cli.proc_root {
        config.general.proc_root = root.clone();
    }
    config.general.refresh_rate_ms = config.general.refresh_rate_ms.max(MIN_REFRESH_RATE_MS);
    config.general.top_limit = clamp_top_limit(config.general.top_limit);

    config
}

async fn run_one_shot(cli: &Cli, config: &Config, source: ProcFs, log: &ActivityLog) -> Result<()> {
    let top_limit = match cli.top {
        Some(Some(0)) => return Err(eyre!("--top must be greater than 0")),
        Some(Some(n)) => Some(n),
        Some(None) => Some(config.general.top_limit),
        None => None,
    };
    let window = Duration::from_millis(config.general.sample_window_ms);
    let mut report = OneShotReport::default();

    if cli.cpu {
        let sampler = CpuSampler::new(source.clone());
        let sampled = sampler
            .sample_over_window_until(window, tokio::signal::ctrl_c())
            .await;
        let util = match sampled {
            Ok(Some(util)) => util,
            Ok(None) => interrupted(log),
            Err(err) => {
                log.failure("cpu_usage", &err);
                return Err(err.into());
            }
        };
        log.record(
            "cpu_usage",
            &format!("active={:.2}% idle={:.2}%", util.active, util.idle),
        );
        if !cli.json {
            print!("{}", report::render_cpu(&util, window));
        }
        report.cpu = Some(util);
    }

    if cli.memory {
        let mut sys = System::new();
        let summary = MemorySummary::collect(&mut sys);
        log.record(
            "memory_usage",
            &format!("used={} total={}", summary.used, summary.total),
        );
        if !cli.json {
            print!("{}", report::render_memory(&summary));
        }
        report.memory = Some(summary);
    }

    if let Some(limit) = top_limit {
        let scanner = ProcessScanner::new(source);
        let list = scanner.list_top_processes(limit).inspect_err(|err| {
            log.failure("top_processes", err);
        })?;
        log.record(
            "top_processes",
            &format!("shown={} considered={}", list.len(), list.considered),
        );
        if !cli.json {
            print!(
                "{}",
                report::render_top(&list, limit, clock_ticks_per_second())
            );
        }
        report.top = Some(list);
    }

    if cli.json {
        println!("{}", report::to_json(&report)?);
    }
    Ok(())
}

async fn run_menu(config: &Config, source: ProcFs, log: ActivityLog) -> Result<()> {
    let window = Duration::from_millis(config.general.sample_window_ms);
    let mut menu = Menu::new(
        source.clone(),
        window,
        config.general.top_limit,
        log.clone(),
    );
    log.record("menu_start", &source.root().display().to_string());

    loop {
        // The menu blocks on stdin, so it runs off the runtime thread while
        // this task keeps listening for Ctrl+C.
        let task = tokio::task::spawn_blocking(move || {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut out = io::stdout();
            let result = menu.run(&mut input, &mut out);
            (menu, result)
        });

        let finished = tokio::select! {
            joined = task => Some(joined?),
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some((returned, result)) = finished else {
            interrupted(&log);
        };
        menu = returned;

        match result? {
            MenuExit::Quit => return Ok(()),
            MenuExit::Watch => run_watch(config, source.clone(), &log).await?,
        }
    }
}

async fn run_watch(config: &Config, source: ProcFs, log: &ActivityLog) -> Result<()> {
    log.record(
        "live_view_start",
        &format!("refresh every {}ms", config.general.refresh_rate_ms),
    );

    let mut terminal = ratatui::init();
    install_restore_hook();

    let result = run_live(&mut terminal, config, source).await;

    ratatui::restore();
    match &result {
        Ok(()) => log.record("live_view_stop", "quit"),
        Err(err) => log.failure("live_view_stop", err),
    }
    result
}

async fn run_live(
    terminal: &mut ratatui::DefaultTerminal,
    config: &Config,
    source: ProcFs,
) -> Result<()> {
    let tick_rate = Duration::from_millis(config.general.refresh_rate_ms);
    let mut app = App::new(Collector::new(source, config.general.top_limit), config);
    let mut events = EventHandler::new(tick_rate);

    terminal.draw(|frame| ui::draw(frame, &app))?;

    while app.running {
        let Some(event) = events.next().await else {
            break;
        };
        match event {
            Event::Key(key) => {
                let action = app.map_key(key);
                app.dispatch(action);
            }
            Event::Tick => app.on_tick(),
            Event::Resize => {}
        }
        terminal.draw(|frame| ui::draw(frame, &app))?;
    }

    Ok(())
}

/// Leaves the alternate screen before a panic report is printed. Installed
/// once even when the live view is entered repeatedly from the menu.
fn install_restore_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            ratatui::restore();
            original_hook(panic_info);
        }));
    });
}

fn interrupted(log: &ActivityLog) -> ! {
    log.record("interrupted", "ctrl-c");
    println!("\nInterrupted. Exiting System Monitor.");
    std::process::exit(INTERRUPTED_EXIT_CODE);
}
