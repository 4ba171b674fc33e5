use std::collections::VecDeque;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Paragraph, Sparkline};

use crate::format::format_bytes;
use crate::system::snapshot::MonitorSnapshot;
use crate::ui::theme::Theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    snapshot: &MonitorSnapshot,
    theme: &Theme,
    paused: bool,
    cpu_history: &VecDeque<u64>,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ])
        .split(area);

    render_cpu_gauge(frame, chunks[0], snapshot, theme, paused);
    render_ram_gauge(frame, chunks[1], snapshot, theme);
    render_cpu_sparkline(frame, chunks[2], theme, cpu_history);
}

fn bordered<'a>(title: String, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ))
}

fn render_cpu_gauge(
    frame: &mut Frame,
    area: Rect,
    snapshot: &MonitorSnapshot,
    theme: &Theme,
    paused: bool,
) {
    let cpu = &snapshot.cpu;
    let mut title = if snapshot.cpu_ready {
        format!(" CPU  idle {:.1}%  iowait {:.1}%", cpu.idle, cpu.iowait)
    } else {
        " CPU".to_string()
    };
    if cpu.shows_steal() {
        title.push_str(&format!("  steal {:.1}%", cpu.steal));
    }
    if paused {
        title.push_str("  [paused]");
    }
    title.push(' ');

    let gauge = Gauge::default()
        .block(bordered(title, theme))
        .gauge_style(
            Style::default()
                .fg(theme.heat_color(cpu.active))
                .bg(theme.gauge_unfilled),
        )
        .ratio((cpu.active / 100.0).clamp(0.0, 1.0))
        .label(if snapshot.cpu_ready {
            format!("{:.1}% active", cpu.active)
        } else {
            "sampling\u{2026}".to_string()
        });

    frame.render_widget(gauge, area);
}

fn render_ram_gauge(frame: &mut Frame, area: Rect, snapshot: &MonitorSnapshot, theme: &Theme) {
    let memory = &snapshot.memory;
    let ratio = memory.used_ratio();

    let gauge = Gauge::default()
        .block(bordered(" RAM ".to_string(), theme))
        .gauge_style(
            Style::default()
                .fg(theme.heat_color(ratio * 100.0))
                .bg(theme.gauge_unfilled),
        )
        .ratio(ratio)
        .label(format!(
            "{}/{} ({:.0}%)",
            format_bytes(memory.used),
            format_bytes(memory.total),
            ratio * 100.0
        ));

    frame.render_widget(gauge, area);
}

fn render_cpu_sparkline(frame: &mut Frame, area: Rect, theme: &Theme, cpu_history: &VecDeque<u64>) {
    let cpu_data: Vec<u64> = cpu_history.iter().copied().collect();
    let sparkline = Sparkline::default()
        .block(bordered(" History ".to_string(), theme))
        .data(&cpu_data)
        .max(10000)
        .style(Style::default().fg(theme.sparkline_color));

    frame.render_widget(sparkline, area);
}

/// One-line branding strip shown above the gauges.
pub fn render_title(frame: &mut Frame, area: Rect, snapshot: &MonitorSnapshot, theme: &Theme) {
    let line = Line::from(vec![
        Span::styled(
            " sysmon ",
            Style::default()
                .fg(theme.header_accent_fg)
                .bg(theme.header_accent_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("Procs: {}", snapshot.top.considered),
            Style::default().fg(theme.text_secondary),
        ),
        Span::raw("  "),
        Span::styled(
            format!(
                "Swap: {}/{}",
                format_bytes(snapshot.memory.swap_used),
                format_bytes(snapshot.memory.swap_total)
            ),
            Style::default().fg(theme.text_secondary),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
