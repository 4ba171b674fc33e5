use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn truncate_unicode(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width.saturating_sub(1) {
            result.push('\u{2026}');
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result
}

/// Left-aligns `s` in `width` display columns, truncating with an ellipsis.
pub fn pad_unicode(s: &str, width: usize) -> String {
    let truncated = truncate_unicode(s, width);
    let pad = width.saturating_sub(truncated.width());
    format!("{truncated}{}", " ".repeat(pad))
}

pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    const GB: u64 = 1024 * 1024 * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.0} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

/// CPU time as seconds, e.g. `12.34s`. `ticks_per_second` of 0 is treated as 1.
pub fn format_cpu_seconds(ticks: u64, ticks_per_second: u64) -> String {
    let seconds = ticks as f64 / ticks_per_second.max(1) as f64;
    format!("{seconds:.2}s")
}
