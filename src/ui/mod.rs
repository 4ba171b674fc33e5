pub mod header;
pub mod help;
pub mod process_table;
pub mod statusbar;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::App;
use crate::system::source::HostSource;

pub fn draw<S: HostSource + Clone>(frame: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    header::render_title(frame, chunks[0], &app.snapshot, &app.theme);
    header::render(
        frame,
        chunks[1],
        &app.snapshot,
        &app.theme,
        app.paused,
        &app.cpu_history,
    );
    process_table::render(
        frame,
        chunks[2],
        &app.snapshot.top,
        app.top_limit(),
        app.ticks_per_second,
        &app.theme,
    );
    statusbar::render(
        frame,
        chunks[3],
        app.status_message.as_ref(),
        &app.keybinds,
        app.paused,
        &app.theme,
    );

    // Drawn last so it sits above the table.
    if app.show_help() {
        let footer = format!(
            " Refreshing every {:.1}s",
            app.refresh_rate_ms as f64 / 1000.0
        );
        let area = frame.area();
        help::render(frame, area, &app.help_entries(), &footer, &app.theme);
    }
}
