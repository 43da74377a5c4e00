use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};

use super::{
    app::{App, ClickTarget, Focus},
    context_menu, dialogs, help,
};

const WHEEL_STEP: isize = 3;

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    rect.contains(Position::new(column, row))
}

/// Route a key press. Returns `true` when the application should quit.
pub fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    if app.show_help {
        if help::handle_input(app, code) {
            app.show_help = false;
        }
        return false;
    }

    if app.dialog.is_some() {
        dialogs::handle_dialog_input(app, code, modifiers);
        return false;
    }

    if app.context_menu.is_some() {
        context_menu::handle_input(app, code);
        return false;
    }

    if app.focus.is_text_input() {
        match code {
            KeyCode::Enter => {
                if app.focus == Focus::Address {
                    let input = app.address.text().to_string();
                    app.execute_goto(&input);
                } else {
                    let pattern = app.search_input.text().to_string();
                    app.execute_search(&pattern);
                }
                return false;
            }
            KeyCode::Esc | KeyCode::Tab => {
                app.cancel_text_input();
                return false;
            }
            _ => {}
        }
        let field = if app.focus == Focus::Address { &mut app.address } else { &mut app.search_input };
        if field.handle_key(code, modifiers) {
            return false;
        }
        // Only control chords and function keys reach the bindings from a text field
        if !modifiers.contains(KeyModifiers::CONTROL) && !matches!(code, KeyCode::F(_)) {
            return false;
        }
    }

    match app.keybindings.browser_action(code, modifiers) {
        Some(action) => app.dispatch(action),
        None => false,
    }
}

pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let (x, y) = (mouse.column, mouse.row);

    if app.show_help || app.dialog.is_some() {
        return;
    }

    if let Some(menu) = app.context_menu.as_ref() {
        if let MouseEventKind::Down(_) = mouse.kind {
            match menu.item_at(app.layout.screen, x, y) {
                Some(action) => {
                    let target = menu.target.clone();
                    app.execute_context_action(action, &target);
                }
                None => app.context_menu = None,
            }
        }
        return;
    }

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => handle_left_click(app, x, y),
        MouseEventKind::Down(MouseButton::Right) => {
            if let Some(idx) = listing_index_at(app, x, y) {
                app.focus = Focus::Listing;
                app.select_index(idx);
                app.open_context_menu(x, y);
            }
        }
        MouseEventKind::ScrollUp => scroll_at(app, x, y, -WHEEL_STEP),
        MouseEventKind::ScrollDown => scroll_at(app, x, y, WHEEL_STEP),
        _ => {}
    }
}

fn handle_left_click(app: &mut App, x: u16, y: u16) {
    if let Some(action) = app
        .layout
        .buttons
        .iter()
        .find(|(rect, _)| contains(*rect, x, y))
        .map(|(_, action)| *action)
    {
        app.focus = Focus::Listing;
        app.dispatch(action);
        return;
    }

    if contains(app.layout.address, x, y) {
        app.focus_address();
        return;
    }
    if contains(app.layout.search, x, y) {
        app.focus_search();
        return;
    }

    if let Some(idx) = tree_index_at(app, x, y) {
        app.focus = Focus::Tree;
        app.tree.selected_index = idx;
        app.activate_tree_selection();
        return;
    }

    if let Some(idx) = listing_index_at(app, x, y) {
        app.focus = Focus::Listing;
        app.select_index(idx);
        if app.register_click(ClickTarget::Listing(idx)) {
            app.open_selected();
        }
        return;
    }

    if contains(app.layout.listing, x, y) {
        app.focus = Focus::Listing;
    } else if contains(app.layout.preview, x, y) {
        app.focus = Focus::Preview;
    } else if contains(app.layout.tree, x, y) {
        app.focus = Focus::Tree;
    }
}

/// Tree row under a screen position.
fn tree_index_at(app: &App, x: u16, y: u16) -> Option<usize> {
    let area = app.layout.tree;
    // Inside the border
    if x <= area.x || x + 1 >= area.x + area.width || y <= area.y || y + 1 >= area.y + area.height {
        return None;
    }
    app.tree.row_at((y - area.y - 1) as usize)
}

/// Listing entry under a screen position, in either view.
fn listing_index_at(app: &App, x: u16, y: u16) -> Option<usize> {
    let area = app.layout.listing;
    if !contains(area, x, y) {
        return None;
    }
    let columns = app.layout.listing_columns.max(1);
    let row = (y - area.y) as usize;
    let col = if columns > 1 {
        let cell = app.layout.listing_cell_width.max(1);
        ((x - area.x) / cell) as usize
    } else {
        0
    };
    if col >= columns {
        return None;
    }
    let idx = app.layout.listing_first + row * columns + col;
    (idx < app.entries.len()).then_some(idx)
}

fn scroll_at(app: &mut App, x: u16, y: u16, delta: isize) {
    if contains(app.layout.tree, x, y) {
        app.tree.move_by(delta);
    } else if contains(app.layout.listing, x, y) {
        let step = app.layout.listing_columns.max(1) as isize;
        app.move_selection(delta * step);
    } else if contains(app.layout.preview, x, y) {
        app.scroll_preview(delta as i32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::ui::app::DialogType;
    use crate::ui::theme::Theme;
    use ratatui::{backend::TestBackend, Terminal};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf, App) {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        fs::create_dir(root.join("alpha")).unwrap();
        fs::write(root.join("b.txt"), "bee").unwrap();
        fs::write(root.join("c.txt"), "sea").unwrap();
        let mut app = App::new(root.clone(), Settings::default(), Theme::dark());
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| crate::ui::draw::draw(f, &mut app)).unwrap();
        (temp, root, app)
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_key(app, code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    fn click(app: &mut App, kind: MouseEventKind, column: u16, row: u16) {
        handle_mouse(app, MouseEvent { kind, column, row, modifiers: KeyModifiers::NONE });
    }

    #[test]
    fn test_address_bar_typing_and_enter() {
        let (_temp, root, mut app) = setup();
        handle_key(&mut app, KeyCode::Char('l'), KeyModifiers::CONTROL);
        assert_eq!(app.focus, Focus::Address);

        // Letters bound to actions are plain text here
        handle_key(&mut app, KeyCode::Char('u'), KeyModifiers::CONTROL);
        type_text(&mut app, "alpha");
        assert_eq!(app.address.text(), "alpha");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.current_path(), root.join("alpha"));
        assert_eq!(app.focus, Focus::Listing);
    }

    #[test]
    fn test_address_escape_restores_path() {
        let (_temp, root, mut app) = setup();
        app.focus_address();
        type_text(&mut app, "zzz");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.focus, Focus::Listing);
        assert_eq!(app.address.text(), root.display().to_string());
        assert_eq!(app.current_path(), root);
    }

    #[test]
    fn test_search_box() {
        let (_temp, root, mut app) = setup();
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.focus, Focus::Search);
        type_text(&mut app, "c.*");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.current_path(), root);
        assert_eq!(app.selected_entry().unwrap().name, "c.txt");
    }

    #[test]
    fn test_dialog_captures_keys() {
        let (_temp, root, mut app) = setup();
        press(&mut app, KeyCode::F(7));
        assert_eq!(app.dialog.as_ref().unwrap().dialog_type, DialogType::Mkdir);
        // 'q' is text inside the dialog, not Quit
        assert!(!press(&mut app, KeyCode::Char('q')));
        press(&mut app, KeyCode::Enter);
        assert!(root.join("q").is_dir());
        assert!(app.dialog.is_none());
    }

    #[test]
    fn test_quit_and_help() {
        let (_temp, _root, mut app) = setup();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        assert!(!press(&mut app, KeyCode::Char('x')));
        press(&mut app, KeyCode::Esc);
        assert!(!app.show_help);
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn test_click_and_double_click_listing() {
        let (_temp, root, mut app) = setup();
        let area = app.layout.listing;
        click(&mut app, MouseEventKind::Down(MouseButton::Left), area.x + 3, area.y + 1);
        assert_eq!(app.selected_entry().unwrap().name, "b.txt");

        click(&mut app, MouseEventKind::Down(MouseButton::Left), area.x + 3, area.y);
        click(&mut app, MouseEventKind::Down(MouseButton::Left), area.x + 3, area.y);
        assert_eq!(app.current_path(), root.join("alpha"));
        assert_eq!(app.navigator.history(), [root]);
    }

    #[test]
    fn test_single_click_on_tree_row_navigates() {
        let (_temp, root, mut app) = setup();
        let parent = root.parent().unwrap().to_path_buf();
        let idx = app.tree.rows.iter().position(|r| r.path == parent).unwrap();
        // Bring the row into view before clicking it
        app.tree.selected_index = idx;
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| crate::ui::draw::draw(f, &mut app)).unwrap();

        let area = app.layout.tree;
        let row = area.y + 1 + (idx - app.tree.scroll_offset) as u16;
        click(&mut app, MouseEventKind::Down(MouseButton::Left), area.x + 2, row);
        assert_eq!(app.focus, Focus::Tree);
        assert_eq!(app.current_path(), parent);
        assert_eq!(app.navigator.history(), [root]);
    }

    #[test]
    fn test_right_click_opens_menu_for_row() {
        let (_temp, root, mut app) = setup();
        let area = app.layout.listing;
        click(&mut app, MouseEventKind::Down(MouseButton::Right), area.x + 3, area.y + 2);
        let menu = app.context_menu.as_ref().unwrap();
        assert_eq!(menu.target, root.join("c.txt"));

        // Third item is Delete
        let (mx, my) = (menu.x + 2, menu.y + 3);
        click(&mut app, MouseEventKind::Down(MouseButton::Left), mx, my);
        assert!(app.context_menu.is_none());
        assert_eq!(app.dialog.as_ref().unwrap().dialog_type, DialogType::Delete);
    }

    #[test]
    fn test_toolbar_button_click() {
        let (_temp, _root, mut app) = setup();
        let (rect, _) = *app
            .layout
            .buttons
            .iter()
            .find(|(_, a)| *a == crate::keybindings::BrowserAction::ToggleView)
            .unwrap();
        click(&mut app, MouseEventKind::Down(MouseButton::Left), rect.x + 1, rect.y);
        assert_eq!(app.view_mode, crate::config::ViewMode::Grid);
    }

    #[test]
    fn test_wheel_moves_listing_selection() {
        let (_temp, _root, mut app) = setup();
        let area = app.layout.listing;
        click(&mut app, MouseEventKind::ScrollDown, area.x + 1, area.y);
        assert_eq!(app.selected_index, 2);
        click(&mut app, MouseEventKind::ScrollUp, area.x + 1, area.y);
        assert_eq!(app.selected_index, 0);
    }
}
