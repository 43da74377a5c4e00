//! Help overlay listing every key binding.
//!
//! Built from `BrowserAction::HELP_SECTIONS`, so user overrides from the
//! settings file show up here as they are bound.

use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

use super::{app::App, theme::Theme};
use crate::keybindings::{BrowserAction, Keybindings};

/// Draw the help overlay on top of the browser
pub fn draw(frame: &mut Frame, app: &mut App, area: Rect, theme: &Theme) {
    let lines = build_help_content(&app.keybindings, theme);
    let total_lines = lines.len();

    // 80% of the screen, within bounds
    let width = ((area.width as u32 * 80 / 100) as u16).clamp(50, 72).min(area.width);
    let height = ((area.height as u32 * 80 / 100) as u16).clamp(12, 40).min(area.height);

    if width < 30 || height < 6 {
        return;
    }

    let visible_height = height.saturating_sub(2) as usize;
    let max_scroll = total_lines.saturating_sub(visible_height);

    app.help_state.visible_height = visible_height;
    app.help_state.max_scroll = max_scroll;
    app.help_state.scroll_offset = app.help_state.scroll_offset.min(max_scroll);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let dialog_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(" Help ")
        .title_style(Style::default().fg(theme.help.title).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.help.border))
        .style(Style::default().bg(theme.help.bg));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((app.help_state.scroll_offset as u16, 0));
    frame.render_widget(paragraph, dialog_area);

    if total_lines > visible_height {
        let scrollbar_area = Rect::new(
            dialog_area.x + dialog_area.width - 1,
            dialog_area.y + 1,
            1,
            dialog_area.height.saturating_sub(2),
        );
        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("▲"))
            .end_symbol(Some("▼"));
        let mut scrollbar_state = ScrollbarState::new(max_scroll + 1)
            .position(app.help_state.scroll_offset);
        frame.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);
    }
}

/// Handle keyboard input for the help overlay.
/// Returns true if the overlay should be closed
pub fn handle_input(app: &mut App, code: KeyCode) -> bool {
    let state = &mut app.help_state;

    match code {
        KeyCode::Up | KeyCode::Char('k') => {
            state.scroll_offset = state.scroll_offset.saturating_sub(1);
            false
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.scroll_offset < state.max_scroll {
                state.scroll_offset += 1;
            }
            false
        }
        KeyCode::PageUp => {
            let amount = state.visible_height.saturating_sub(1).max(1);
            state.scroll_offset = state.scroll_offset.saturating_sub(amount);
            false
        }
        KeyCode::PageDown => {
            let amount = state.visible_height.saturating_sub(1).max(1);
            state.scroll_offset = (state.scroll_offset + amount).min(state.max_scroll);
            false
        }
        KeyCode::Home => {
            state.scroll_offset = 0;
            false
        }
        KeyCode::End => {
            state.scroll_offset = state.max_scroll;
            false
        }
        KeyCode::Esc | KeyCode::Enter | KeyCode::F(1) | KeyCode::Char('q') | KeyCode::Char('?') => {
            state.scroll_offset = 0;
            true
        }
        _ => false,
    }
}

fn build_help_content(keybindings: &Keybindings, theme: &Theme) -> Vec<Line<'static>> {
    let section_title_style = Style::default()
        .fg(theme.help.section_title)
        .add_modifier(Modifier::BOLD);
    let section_decorator_style = Style::default().fg(theme.help.section_decorator);
    let key_style = Style::default().fg(theme.help.key);
    let desc_style = Style::default().fg(theme.help.description);
    let hint_style = Style::default().fg(theme.help.hint_text);

    let section = |title: &str| -> Line<'static> {
        Line::from(vec![
            Span::styled("── ".to_string(), section_decorator_style),
            Span::styled(title.to_string(), section_title_style),
            Span::styled(" ──".to_string(), section_decorator_style),
        ])
    };

    let key_line = |key: &str, desc: &str| -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("  {:20}", key), key_style),
            Span::styled(desc.to_string(), desc_style),
        ])
    };

    let mut lines: Vec<Line> = Vec::new();
    for (title, actions) in BrowserAction::HELP_SECTIONS {
        lines.push(section(title));
        for action in actions.iter() {
            let keys = keybindings.browser_keys_joined(*action, ", ");
            if keys.is_empty() {
                continue;
            }
            lines.push(key_line(&keys, keybindings.browser_description(*action)));
        }
        lines.push(Line::from(""));
    }

    lines.push(section("Mouse"));
    lines.push(key_line("Click", "Select a row or open a tree folder"));
    lines.push(key_line("Double-click", "Open file or enter folder"));
    lines.push(key_line("Right-click", "Context menu for a listing entry"));
    lines.push(key_line("Wheel", "Scroll the pane under the pointer"));
    lines.push(Line::from(""));

    lines.push(section("Text Fields"));
    lines.push(key_line("Enter", "Go to address / run search"));
    lines.push(key_line("Esc", "Leave the field"));
    lines.push(key_line("Ctrl+U", "Clear the field"));
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(
        "  Search patterns accept * and ? wildcards.".to_string(),
        hint_style,
    )));
    lines.push(Line::from(Span::styled(
        "  Key bindings can be overridden in settings.json.".to_string(),
        hint_style,
    )));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use tempfile::TempDir;

    fn text(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_content_lists_every_section() {
        let content = text(&build_help_content(&Keybindings::default(), &Theme::dark()));
        for (title, _) in BrowserAction::HELP_SECTIONS {
            assert!(content.contains(title), "missing section {}", title);
        }
        assert!(content.contains("New folder"));
        assert!(content.contains("F7"));
    }

    #[test]
    fn test_scroll_and_close() {
        let temp = TempDir::new().unwrap();
        let mut app = App::new(temp.path().to_path_buf(), Settings::default(), Theme::dark());
        app.help_state.max_scroll = 5;
        app.help_state.visible_height = 3;

        assert!(!handle_input(&mut app, KeyCode::Down));
        assert!(!handle_input(&mut app, KeyCode::PageDown));
        assert_eq!(app.help_state.scroll_offset, 3);
        assert!(!handle_input(&mut app, KeyCode::End));
        assert_eq!(app.help_state.scroll_offset, 5);
        assert!(handle_input(&mut app, KeyCode::Esc));
        assert_eq!(app.help_state.scroll_offset, 0);
    }
}
