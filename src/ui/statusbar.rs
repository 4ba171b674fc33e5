use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{ResolvedKeybinds, key_label};
use crate::ui::theme::Theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    status_message: Option<&(String, std::time::Instant)>,
    keybinds: &ResolvedKeybinds,
    paused: bool,
    theme: &Theme,
) {
    let bg_style = Style::default().bg(theme.statusbar_bg);

    // Status message takes priority
    if let Some((msg, _)) = status_message {
        let color = if msg.starts_with("Refresh failed") {
            theme.status_err
        } else {
            theme.status_ok
        };
        let line = Line::from(Span::styled(
            format!(" {msg}"),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(line).style(bg_style), area);
        return;
    }

    let quit = key_label(keybinds.quit);
    let refresh = key_label(keybinds.refresh);
    let pause = key_label(keybinds.pause);
    let more = key_label(keybinds.more);
    let fewer = key_label(keybinds.fewer);
    let help = key_label(keybinds.help);

    let mut spans = Vec::new();
    spans.extend(pill_spans(&quit, "Quit", theme));
    spans.extend(pill_spans(&refresh, "Refresh", theme));
    spans.extend(pill_spans(&pause, if paused { "Resume" } else { "Pause" }, theme));
    spans.extend(pill_spans(&more, "More", theme));
    spans.extend(pill_spans(&fewer, "Fewer", theme));
    spans.extend(pill_spans(&help, "Help", theme));

    frame.render_widget(Paragraph::new(Line::from(spans)).style(bg_style), area);
}

fn pill_spans<'a>(key: &str, desc: &str, theme: &Theme) -> Vec<Span<'a>> {
    vec![
        Span::raw(" "),
        Span::styled(
            format!(" {key} "),
            Style::default()
                .fg(theme.pill_key_fg)
                .bg(theme.pill_key_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {desc}"),
            Style::default().fg(theme.pill_desc_fg).bg(theme.surface_bg),
        ),
    ]
}
