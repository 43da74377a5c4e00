use std::time::Instant;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::{
    app::{App, Focus, MessageLevel},
    context_menu, dialogs, help, panel, preview_pane,
    theme::Theme,
    toolbar, tree,
};
use crate::keybindings::BrowserAction;
use crate::utils::format::truncate_to_display_width;

const APP_TITLE: &str = concat!("NIMBUS v", env!("CARGO_PKG_VERSION"));

pub fn draw(frame: &mut Frame, app: &mut App) {
    // Clone theme to avoid borrow conflict with mutable app
    let theme = app.theme.clone();
    let area = frame.area();

    // Check if terminal is too large for ratatui buffer
    if (area.width as u32 * area.height as u32) > 65534 {
        let msg = Paragraph::new("Terminal too large. Please resize smaller.")
            .style(Style::default().fg(theme.message.text).add_modifier(Modifier::BOLD));
        frame.render_widget(msg, Rect::new(0, 0, area.width.min(80), 1));
        return;
    }

    app.status.expire(Instant::now());
    app.layout.screen = area;

    let background = Block::default().style(Style::default().bg(theme.palette.bg));
    frame.render_widget(background, area);

    // Toolbar, panes, status bar, function bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    toolbar::draw(frame, app, chunks[0], &theme);
    draw_panes(frame, app, chunks[1], &theme);
    draw_status_bar(frame, app, chunks[2], &theme);
    draw_function_bar(frame, app, chunks[3], &theme);

    if let Some(ref menu) = app.context_menu {
        context_menu::draw(frame, menu, area, &theme);
    }

    if let Some(ref dialog) = app.dialog {
        dialogs::draw_dialog(frame, dialog, area, &theme);
    }

    if app.show_help {
        help::draw(frame, app, area, &theme);
    }
}

fn draw_panes(frame: &mut Frame, app: &mut App, area: Rect, theme: &Theme) {
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(45),
            Constraint::Percentage(30),
        ])
        .split(area);

    app.layout.tree = panes[0];
    let tree_focused = app.focus == Focus::Tree && app.dialog.is_none();
    tree::draw(frame, &mut app.tree, panes[0], tree_focused, theme);
    panel::draw(frame, app, panes[1], theme);
    preview_pane::draw(frame, app, panes[2], theme);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let (message, level) = app.status.current();
    let right_text = format!(
        "{} items | Sort: {} | {}",
        app.entries.len(),
        app.sort_key.label(),
        app.view_mode.label()
    );

    let left_width = (area.width as usize).saturating_sub(right_text.width() + 4);
    let left_text = truncate_to_display_width(message, left_width);
    let left_style = match level {
        MessageLevel::Warning => theme.warning_style().bg(theme.status_bar.bg),
        MessageLevel::Info if app.status.transient().is_some() => Style::default()
            .fg(theme.message.text)
            .bg(theme.status_bar.bg)
            .add_modifier(Modifier::BOLD),
        MessageLevel::Info => theme.status_bar_style(),
    };

    let padding = (area.width as usize).saturating_sub(left_text.width() + right_text.width() + 4);
    let status = Line::from(vec![
        Span::styled(format!(" {} ", left_text), left_style),
        Span::styled(" ".repeat(padding), theme.status_bar_style()),
        Span::styled(
            format!(" {} ", right_text),
            Style::default().fg(theme.status_bar.text_dim).bg(theme.status_bar.bg),
        ),
    ]);

    frame.render_widget(Paragraph::new(status).style(theme.status_bar_style()), area);
}

fn draw_function_bar(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let kb = &app.keybindings;

    // (action, short label); key text comes from keybindings
    let items: [(BrowserAction, &str); 10] = [
        (BrowserAction::Help, "help "),
        (BrowserAction::Open, "open "),
        (BrowserAction::Rename, "ren "),
        (BrowserAction::Refresh, "ref "),
        (BrowserAction::NewFolder, "mkdir "),
        (BrowserAction::Delete, "del "),
        (BrowserAction::FocusSearch, "find "),
        (BrowserAction::FocusAddress, "goto "),
        (BrowserAction::ToggleView, "view "),
        (BrowserAction::Quit, "quit"),
    ];

    let key_style = Style::default().fg(theme.function_bar.key);
    let label_style = Style::default().fg(theme.function_bar.label);

    let shortcuts: Vec<(String, &str)> = items
        .iter()
        .map(|(action, label)| (kb.browser_first_key(*action).to_string(), *label))
        .filter(|(key, _)| !key.is_empty())
        .collect();

    let mut spans = vec![Span::raw(" ")];
    for (key, label) in &shortcuts {
        spans.push(Span::styled(key.clone(), key_style));
        spans.push(Span::styled(":", label_style));
        spans.push(Span::styled(*label, label_style));
    }

    let shortcuts_width: usize = 1 + shortcuts
        .iter()
        .map(|(k, l)| k.width() + 1 + l.width())
        .sum::<usize>();
    let version_text = format!(" {} ", APP_TITLE);
    let padding_width = (area.width as usize).saturating_sub(shortcuts_width + version_text.width());

    spans.push(Span::styled(" ".repeat(padding_width), theme.dim_style()));
    spans.push(Span::styled(version_text, theme.dim_style()));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Settings, ViewMode};
    use ratatui::{backend::TestBackend, Terminal};
    use std::fs;
    use tempfile::TempDir;

    fn render(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    fn setup() -> (TempDir, App) {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        fs::create_dir(root.join("music")).unwrap();
        fs::write(root.join("readme.md"), "hello preview").unwrap();
        let app = App::new(root, Settings::default(), Theme::dark());
        (temp, app)
    }

    #[test]
    fn test_full_frame_renders_all_regions() {
        let (_temp, mut app) = setup();
        let screen = render(&mut app, 140, 30);
        assert!(screen.contains("Folders"));
        assert!(screen.contains("Name\u{25B2}"));
        assert!(screen.contains("readme.md"));
        assert!(screen.contains("2 items | Sort: Name | List"));
        assert!(screen.contains(APP_TITLE));
        assert!(app.layout.listing.height > 0);
        assert!(app.layout.tree.width > 0);
    }

    #[test]
    fn test_text_preview_is_drawn() {
        let (_temp, mut app) = setup();
        let idx = app.entries.iter().position(|e| e.name == "readme.md").unwrap();
        app.select_index(idx);
        let screen = render(&mut app, 140, 30);
        assert!(screen.contains("hello preview"));
    }

    #[test]
    fn test_grid_layout_reports_columns() {
        let (_temp, mut app) = setup();
        app.view_mode = ViewMode::Grid;
        render(&mut app, 140, 30);
        assert!(app.layout.listing_columns >= 2);
        assert!(app.layout.listing_cell_width >= 14);
    }

    #[test]
    fn test_overlays() {
        let (_temp, mut app) = setup();
        app.show_help = true;
        let screen = render(&mut app, 140, 40);
        assert!(screen.contains(" Help "));

        app.show_help = false;
        app.start_mkdir();
        let screen = render(&mut app, 140, 40);
        assert!(screen.contains("New Folder"));
    }

    #[test]
    fn test_warning_message_in_status_bar() {
        let (_temp, mut app) = setup();
        app.execute_goto("/no/such/place");
        let screen = render(&mut app, 140, 30);
        assert!(screen.contains("'/no/such/place' is not a valid directory."));
    }
}
