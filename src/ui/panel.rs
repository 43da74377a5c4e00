use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::{app::{App, Focus}, theme::Theme};
use crate::config::ViewMode;
use crate::services::directory::{DirectoryEntry, SortKey};
use crate::utils::format::{
    ellipsize, format_short_date, format_size, pad_to_display_width, safe_suffix,
};

const TYPE_COL: usize = 6;
const SIZE_COL: usize = 10;
const DATE_COL: usize = 18;
const MIN_CELL_WIDTH: usize = 14;
const MAX_CELL_WIDTH: usize = 30;

/// First visible row: keep the cursor row in view, centring it when it
/// jumped outside the window.
fn scroll_start(current: usize, cursor: usize, visible: usize, total: usize) -> usize {
    if total <= visible {
        0
    } else if cursor >= current && cursor < current + visible {
        current.min(total - visible)
    } else {
        cursor.saturating_sub(visible / 2).min(total - visible)
    }
}

/// Cursor colours: the background takes the entry's own text colour.
fn cursor_bg(entry: &DirectoryEntry, theme: &Theme) -> Color {
    if entry.is_symlink {
        theme.panel.symlink_text
    } else if entry.is_directory {
        theme.panel.directory_text
    } else {
        theme.panel.file_text
    }
}

fn entry_style(entry: &DirectoryEntry, theme: &Theme) -> Style {
    if entry.is_symlink {
        theme.symlink_style()
    } else if entry.is_directory {
        theme.directory_style()
    } else {
        theme.normal_style()
    }
}

fn icon(entry: &DirectoryEntry, theme: &Theme) -> char {
    if entry.is_symlink {
        theme.chars.symlink
    } else if entry.is_directory {
        theme.chars.folder
    } else {
        theme.chars.file
    }
}

pub fn draw(frame: &mut Frame, app: &mut App, area: Rect, theme: &Theme) {
    let focused = app.focus == Focus::Listing && app.dialog.is_none();
    let inner_width = area.width.saturating_sub(2) as usize;
    let path_str = app.current_path().display().to_string();
    let display_path = safe_suffix(&path_str, inner_width.saturating_sub(2));

    let block = Block::default()
        .title(format!(" {} ", display_path))
        .title_style(theme.title_style(focused))
        .borders(Borders::ALL)
        .border_style(theme.border_style(focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 3 || inner.width < 10 {
        return;
    }

    let header_bg = if focused { theme.panel.header_bg_active } else { theme.panel.header_bg };
    let header_style = if focused {
        Style::default().fg(theme.panel.header_text_active).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.panel.header_text)
    };

    let visible_rows = (inner.height - 2) as usize; // header + footer
    let rows_area = Rect::new(inner.x, inner.y + 1, inner.width, visible_rows as u16);

    match app.view_mode {
        ViewMode::List => {
            let (name_col, type_col, size_col, date_col) = list_columns(app, inner.width as usize);
            let header = create_header_line(app.sort_key, name_col, type_col, size_col, date_col, header_style);
            frame.render_widget(
                Paragraph::new(header).style(Style::default().bg(header_bg)),
                Rect::new(inner.x, inner.y, inner.width, 1),
            );
            draw_list_rows(frame, app, rows_area, (name_col, type_col, size_col, date_col), focused, theme);
        }
        ViewMode::Grid => {
            let header = format!(" Icons, sorted by {}\u{25B2}", app.sort_key.label());
            frame.render_widget(
                Paragraph::new(Span::styled(header, header_style)).style(Style::default().bg(header_bg)),
                Rect::new(inner.x, inner.y, inner.width, 1),
            );
            draw_grid(frame, app, rows_area, focused, theme);
        }
    }

    draw_footer(frame, app, Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1), theme);
}

/// Column widths for the list layout. The type column appears only when
/// every name fits beside it.
fn list_columns(app: &App, width: usize) -> (usize, usize, usize, usize) {
    let min_columns = SIZE_COL + DATE_COL + 1;
    if width <= min_columns + 8 {
        return (width.saturating_sub(1), 0, 0, 0);
    }
    let available = width - min_columns;
    let widest = app.entries.iter().map(|e| e.name.width() + 2).max().unwrap_or(0);
    let type_total = TYPE_COL + 4;
    if available >= widest + type_total {
        (available - type_total, TYPE_COL, SIZE_COL, DATE_COL)
    } else {
        (available, 0, SIZE_COL, DATE_COL)
    }
}

fn create_header_line(
    sort_key: SortKey,
    name_width: usize,
    type_width: usize,
    size_width: usize,
    date_width: usize,
    header_style: Style,
) -> Line<'static> {
    let label = |key: SortKey, text: &str| -> String {
        if sort_key == key {
            format!("{}\u{25B2}", text)
        } else {
            text.to_string()
        }
    };

    let name_col = format!(" {:width$}", label(SortKey::Name, "Name"), width = name_width.saturating_sub(1));
    let type_col = if type_width > 0 {
        format!("  {:^width$}  ", label(SortKey::Type, "Type"), width = type_width)
    } else {
        String::new()
    };
    let size_col = if size_width > 2 {
        format!("{:>width$}  ", label(SortKey::Size, "Size"), width = size_width - 2)
    } else {
        String::new()
    };
    let date_col = if date_width > 2 {
        format!("{:>width$}  ", label(SortKey::Modified, "Modified"), width = date_width - 2)
    } else {
        String::new()
    };

    Line::from(vec![
        Span::styled(name_col, header_style),
        Span::styled(type_col, header_style),
        Span::styled(size_col, header_style),
        Span::styled(date_col, header_style),
    ])
}

fn draw_list_rows(
    frame: &mut Frame,
    app: &mut App,
    area: Rect,
    columns: (usize, usize, usize, usize),
    focused: bool,
    theme: &Theme,
) {
    let visible = area.height as usize;
    let total = app.entries.len();
    let start = scroll_start(app.scroll_offset, app.selected_index, visible, total);
    app.scroll_offset = start;
    app.layout.listing = area;
    app.layout.listing_columns = 1;
    app.layout.listing_cell_width = area.width;
    app.layout.listing_first = start;

    for (i, entry) in app.entries.iter().enumerate().skip(start).take(visible) {
        let is_cursor = i == app.selected_index && focused;
        let line = create_entry_line(entry, is_cursor, columns, theme);
        let paragraph = if is_cursor {
            Paragraph::new(line).style(Style::default().bg(cursor_bg(entry, theme)))
        } else {
            Paragraph::new(line)
        };
        frame.render_widget(paragraph, Rect::new(area.x, area.y + (i - start) as u16, area.width, 1));
    }

    if total > visible {
        draw_scrollbar(frame, area, total, app.selected_index);
    }
}

fn create_entry_line(
    entry: &DirectoryEntry,
    is_cursor: bool,
    (name_width, type_width, size_width, date_width): (usize, usize, usize, usize),
    theme: &Theme,
) -> Line<'static> {
    let name = ellipsize(&entry.name, name_width.saturating_sub(3));
    let name_col = pad_to_display_width(&format!(" {}{}", icon(entry, theme), name), name_width);

    let type_col = if type_width > 0 {
        let ext = if entry.is_directory { String::new() } else { entry.type_label() };
        format!("  {:^width$}  ", ellipsize(&ext, type_width), width = type_width)
    } else {
        String::new()
    };

    let size_str = if entry.is_directory { "<DIR>".to_string() } else { format_size(entry.size) };
    let size_col = if size_width > 2 {
        format!("{:>width$}  ", size_str, width = size_width - 2)
    } else {
        String::new()
    };
    let date_col = if date_width > 2 {
        format!("{:>width$}  ", format_short_date(&entry.modified), width = date_width - 2)
    } else {
        String::new()
    };

    let (name_style, type_style, size_style, date_style) = if is_cursor {
        let style = Style::default()
            .fg(theme.panel.selected_text)
            .bg(cursor_bg(entry, theme));
        (style, style, style, style)
    } else {
        (
            entry_style(entry, theme),
            theme.dim_style(),
            Style::default().fg(theme.panel.size_text),
            Style::default().fg(theme.panel.date_text),
        )
    };

    Line::from(vec![
        Span::styled(name_col, name_style),
        Span::styled(type_col, type_style),
        Span::styled(size_col, size_style),
        Span::styled(date_col, date_style),
    ])
}

fn draw_grid(frame: &mut Frame, app: &mut App, area: Rect, focused: bool, theme: &Theme) {
    let widest = app.entries.iter().map(|e| e.name.width()).max().unwrap_or(0);
    let cell_width = (widest + 4).clamp(MIN_CELL_WIDTH, MAX_CELL_WIDTH);
    let usable = (area.width as usize).saturating_sub(1);
    let columns = (usable / cell_width).max(1);
    let cell_width = cell_width.min(usable.max(1));

    let visible = area.height as usize;
    let total_rows = app.entries.len().div_ceil(columns);
    let cursor_row = app.selected_index / columns;
    let start_row = scroll_start(app.scroll_offset, cursor_row, visible, total_rows);
    app.scroll_offset = start_row;
    app.layout.listing = area;
    app.layout.listing_columns = columns;
    app.layout.listing_cell_width = cell_width as u16;
    app.layout.listing_first = start_row * columns;

    let first = start_row * columns;
    for (i, entry) in app.entries.iter().enumerate().skip(first).take(visible * columns) {
        let offset = i - first;
        let x = area.x + ((offset % columns) * cell_width) as u16;
        let y = area.y + (offset / columns) as u16;
        let text = pad_to_display_width(
            &format!(" {} {}", icon(entry, theme), ellipsize(&entry.name, cell_width.saturating_sub(4))),
            cell_width,
        );
        let style = if i == app.selected_index && focused {
            Style::default().fg(theme.panel.selected_text).bg(cursor_bg(entry, theme))
        } else if i == app.selected_index {
            entry_style(entry, theme).add_modifier(Modifier::REVERSED)
        } else {
            entry_style(entry, theme)
        };
        frame.render_widget(
            Paragraph::new(Span::styled(text, style)),
            Rect::new(x, y, cell_width as u16, 1),
        );
    }

    if total_rows > visible {
        draw_scrollbar(frame, area, total_rows, cursor_row);
    }
}

fn draw_scrollbar(frame: &mut Frame, area: Rect, total: usize, position: usize) {
    let scrollbar = Scrollbar::default()
        .orientation(ScrollbarOrientation::VerticalRight)
        .begin_symbol(Some("▲"))
        .end_symbol(Some("▼"));
    let mut state = ScrollbarState::new(total).position(position);
    frame.render_stateful_widget(
        scrollbar,
        Rect::new(area.x + area.width - 1, area.y, 1, area.height),
        &mut state,
    );
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let dir_count = app.entries.iter().filter(|e| e.is_directory).count();
    let file_count = app.entries.len() - dir_count;
    let total_size: u64 = app.entries.iter().filter(|e| !e.is_directory).map(|e| e.size).sum();

    let number_style = Style::default().fg(theme.panel.directory_text);
    let label_style = theme.dim_style();
    let spans = vec![
        Span::styled(dir_count.to_string(), number_style),
        Span::styled("d ", label_style),
        Span::styled(file_count.to_string(), number_style),
        Span::styled("f ", label_style),
        Span::styled(format_size(total_size), number_style),
    ];
    frame.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Center), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_start_keeps_cursor_visible() {
        assert_eq!(scroll_start(0, 3, 10, 5), 0);
        assert_eq!(scroll_start(5, 7, 10, 100), 5);
        // Jumped below the window: centre
        assert_eq!(scroll_start(0, 50, 10, 100), 45);
        // Near the end the window is pinned to the last page
        assert_eq!(scroll_start(0, 99, 10, 100), 90);
    }

    #[test]
    fn test_header_marks_sort_column() {
        let style = Style::default();
        let line = create_header_line(SortKey::Size, 20, 6, 10, 18, style);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.contains("Size\u{25B2}"));
        assert!(!text.contains("Name\u{25B2}"));
    }

    #[test]
    fn test_size_and_date_columns_use_their_colors() {
        let mut theme = Theme::dark();
        theme.panel.size_text = Color::Indexed(1);
        theme.panel.date_text = Color::Indexed(2);
        let entry = DirectoryEntry {
            name: "report.pdf".to_string(),
            path: std::path::PathBuf::from("/tmp/report.pdf"),
            is_directory: false,
            is_symlink: false,
            size: 2048,
            modified: chrono::Local::now(),
        };

        let line = create_entry_line(&entry, false, (20, 6, 10, 18), &theme);
        assert_eq!(line.spans[2].style.fg, Some(Color::Indexed(1)));
        assert_eq!(line.spans[3].style.fg, Some(Color::Indexed(2)));

        // The cursor row keeps one style across all columns
        let line = create_entry_line(&entry, true, (20, 6, 10, 18), &theme);
        assert_eq!(line.spans[2].style, line.spans[0].style);
    }
}
