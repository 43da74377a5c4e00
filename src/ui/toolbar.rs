use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::{app::{App, Focus}, input::TextInput, theme::Theme};
use crate::keybindings::BrowserAction;

const BUTTONS: [(BrowserAction, &str); 7] = [
    (BrowserAction::Back, "Back"),
    (BrowserAction::Up, "Up"),
    (BrowserAction::Refresh, "Refresh"),
    (BrowserAction::NewFolder, "New"),
    (BrowserAction::Delete, "Delete"),
    (BrowserAction::Rename, "Rename"),
    (BrowserAction::Open, "Open"),
];

/// Buttons row followed by the address bar and the search box.
pub fn draw(frame: &mut Frame, app: &mut App, area: Rect, theme: &Theme) {
    frame.render_widget(
        Paragraph::new("").style(Style::default().bg(theme.toolbar.bg)),
        area,
    );
    if area.height < 2 {
        return;
    }
    draw_buttons(frame, app, Rect::new(area.x, area.y, area.width, 1), theme);
    draw_fields(frame, app, Rect::new(area.x, area.y + 1, area.width, 1), theme);
}

fn draw_buttons(frame: &mut Frame, app: &mut App, area: Rect, theme: &Theme) {
    let button_style = Style::default().fg(theme.toolbar.label).bg(theme.toolbar.bg);
    let key_style = Style::default().fg(theme.function_bar.key).bg(theme.toolbar.bg);
    let selector_style = Style::default()
        .fg(theme.toolbar.selector_text)
        .bg(theme.toolbar.bg)
        .add_modifier(Modifier::BOLD);

    let view_label = format!("View: {}", app.view_mode.label());
    let sort_label = format!("Sort: {}", app.sort_key.label());
    let mut items: Vec<(BrowserAction, String, Style)> = BUTTONS
        .iter()
        .map(|(action, label)| {
            let style = if *action == BrowserAction::Back && !app.navigator.can_go_back() {
                theme.dim_style().bg(theme.toolbar.bg)
            } else {
                button_style
            };
            (*action, label.to_string(), style)
        })
        .collect();
    items.push((BrowserAction::ToggleView, view_label, selector_style));
    items.push((BrowserAction::CycleSort, sort_label, selector_style));

    app.layout.buttons.clear();
    let mut spans = vec![Span::styled(" ", button_style)];
    let mut x = area.x + 1;
    let right = area.x + area.width;
    for (action, label, style) in items {
        let text = format!("[{}]", label);
        let width = text.width() as u16;
        if x + width > right {
            break;
        }
        app.layout.buttons.push((Rect::new(x, area.y, width, 1), action));
        spans.push(Span::styled("[", key_style));
        spans.push(Span::styled(label, style));
        spans.push(Span::styled("] ", key_style));
        x += width + 1;
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_fields(frame: &mut Frame, app: &mut App, area: Rect, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    app.layout.address = draw_field(
        frame,
        " Address: ",
        &app.address,
        app.focus == Focus::Address,
        chunks[0],
        theme,
    );
    app.layout.search = draw_field(
        frame,
        " Search: ",
        &app.search_input,
        app.focus == Focus::Search,
        chunks[1],
        theme,
    );
}

/// Label plus input field. Returns the field's rect.
fn draw_field(
    frame: &mut Frame,
    label: &str,
    input: &TextInput,
    active: bool,
    area: Rect,
    theme: &Theme,
) -> Rect {
    let label_width = (label.width() as u16).min(area.width);
    frame.render_widget(
        Paragraph::new(Span::styled(label.to_string(), Style::default().fg(theme.toolbar.label))),
        Rect::new(area.x, area.y, label_width, 1),
    );

    let field = Rect::new(
        area.x + label_width,
        area.y,
        area.width.saturating_sub(label_width + 1),
        1,
    );
    let bg = if active { theme.toolbar.input_bg_active } else { theme.toolbar.input_bg };
    let text_style = Style::default().fg(theme.toolbar.input_text).bg(bg);
    let cursor_style = Style::default()
        .fg(theme.dialog.input_cursor_fg)
        .bg(theme.dialog.input_cursor_bg);
    let spans = input.spans(field.width as usize, text_style, cursor_style, active);
    frame.render_widget(Paragraph::new(Line::from(spans)).style(Style::default().bg(bg)), field);
    field
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use ratatui::{backend::TestBackend, Terminal};
    use tempfile::TempDir;

    #[test]
    fn test_buttons_are_registered_for_clicks() {
        let temp = TempDir::new().unwrap();
        let mut app = App::new(temp.path().to_path_buf(), Settings::default(), Theme::dark());
        let mut terminal = Terminal::new(TestBackend::new(120, 2)).unwrap();
        let theme = app.theme.clone();
        terminal.draw(|f| draw(f, &mut app, f.area(), &theme)).unwrap();

        let actions: Vec<BrowserAction> = app.layout.buttons.iter().map(|(_, a)| *a).collect();
        assert_eq!(actions.first(), Some(&BrowserAction::Back));
        assert!(actions.contains(&BrowserAction::CycleSort));
        assert_eq!(app.layout.address.y, 1);
        assert!(app.layout.search.x > app.layout.address.x);

        let buffer = terminal.backend().buffer();
        let row: String = buffer.content()[..120].iter().map(|c| c.symbol()).collect();
        assert!(row.contains("[Sort: Name]"));
        assert!(row.contains("[View: List]"));
    }
}
