use chrono::{DateTime, Local};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Human-readable byte count ("512B", "1.5KB", "3.2MB").
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    const GB: u64 = 1024 * 1024 * 1024;

    if bytes >= GB {
        format!("{:.1}GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1}MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1}KB", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

/// Full timestamp used by the Properties dialog.
pub fn format_timestamp(time: &DateTime<Local>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Compact timestamp used in the listing's date column.
pub fn format_short_date(time: &DateTime<Local>) -> String {
    time.format("%Y-%m-%d %H:%M").to_string()
}

/// Longest prefix of `s` whose display width fits in `max_width`.
pub fn truncate_to_display_width(s: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut out = String::new();
    for c in s.chars() {
        let cw = c.width().unwrap_or(1);
        if width + cw > max_width {
            break;
        }
        width += cw;
        out.push(c);
    }
    out
}

/// Pad (or cut) `s` with spaces to exactly `width` display columns.
pub fn pad_to_display_width(s: &str, width: usize) -> String {
    let current = s.width();
    if current > width {
        let truncated = truncate_to_display_width(s, width);
        let fill = width.saturating_sub(truncated.width());
        format!("{}{}", truncated, " ".repeat(fill))
    } else {
        format!("{}{}", s, " ".repeat(width - current))
    }
}

/// Fit `name` into `width` columns, ending with "..." when it is cut.
pub fn ellipsize(name: &str, width: usize) -> String {
    if name.width() <= width {
        return name.to_string();
    }
    if width <= 3 {
        return ".".repeat(width);
    }
    format!("{}...", truncate_to_display_width(name, width - 3))
}

/// Keep the tail of a path so the most specific components stay visible.
pub fn safe_suffix(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let target = max_width - 3;
    let mut width = 0;
    let mut tail: Vec<char> = Vec::new();
    for c in s.chars().rev() {
        let cw = c.width().unwrap_or(1);
        if width + cw > target {
            break;
        }
        width += cw;
        tail.push(c);
    }
    tail.reverse();
    format!("...{}", tail.into_iter().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(0), "0B");
        assert_eq!(format_size(512), "512B");
        assert_eq!(format_size(1536), "1.5KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0MB");
    }

    #[test]
    fn test_pad_to_display_width_wide_chars() {
        let padded = pad_to_display_width("한글", 6);
        assert_eq!(padded.width(), 6);
        let cut = pad_to_display_width("한글한글", 5);
        assert_eq!(cut.width(), 5);
    }

    #[test]
    fn test_ellipsize() {
        assert_eq!(ellipsize("short", 10), "short");
        assert_eq!(ellipsize("a_very_long_name.txt", 10), "a_very_...");
    }

    #[test]
    fn test_safe_suffix_keeps_tail() {
        assert_eq!(safe_suffix("/home/user/projects", 12), ".../projects");
        assert_eq!(safe_suffix("/tmp", 12), "/tmp");
    }
}
