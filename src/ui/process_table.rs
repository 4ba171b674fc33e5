use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, BorderType, Borders, Cell, Row, Table};

use crate::format::{format_cpu_seconds, truncate_unicode};
use crate::system::process::RankedProcessList;
use crate::ui::theme::Theme;

const NAME_WIDTH: u16 = 24;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    top: &RankedProcessList,
    limit: usize,
    ticks_per_second: u64,
    theme: &Theme,
) {
    let header = Row::new(
        ["PID", "Process Name", "User", "System", "Total", "CPU Time"]
            .into_iter()
            .map(Cell::from),
    )
    .style(
        Style::default()
            .fg(theme.table_header_fg)
            .add_modifier(Modifier::BOLD),
    );

    let rows = top.iter().map(|process| {
        Row::new(vec![
            Cell::from(process.pid.to_string()),
            Cell::from(truncate_unicode(process.name.as_str(), NAME_WIDTH as usize)),
            Cell::from(process.user_ticks.to_string()),
            Cell::from(process.kernel_ticks.to_string()),
            Cell::from(process.total_ticks().to_string()),
            Cell::from(format_cpu_seconds(process.total_ticks(), ticks_per_second)),
        ])
        .style(Style::default().fg(theme.text_primary))
    });

    let widths = [
        Constraint::Length(8),
        Constraint::Length(NAME_WIDTH),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Min(10),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            format!(" Top {limit} by CPU time "),
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}
