use std::path::PathBuf;

use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::{app::App, theme::Theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextAction {
    Open,
    Rename,
    Delete,
    Properties,
}

impl ContextAction {
    pub const ALL: [ContextAction; 4] = [
        ContextAction::Open,
        ContextAction::Rename,
        ContextAction::Delete,
        ContextAction::Properties,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ContextAction::Open => "Open",
            ContextAction::Rename => "Rename",
            ContextAction::Delete => "Delete",
            ContextAction::Properties => "Properties",
        }
    }
}

/// Popup menu for one listing entry, anchored at a screen position.
#[derive(Debug, Clone)]
pub struct ContextMenuState {
    pub x: u16,
    pub y: u16,
    pub selected_index: usize,
    pub target: PathBuf,
}

impl ContextMenuState {
    pub fn new(x: u16, y: u16, target: PathBuf) -> Self {
        Self { x, y, selected_index: 0, target }
    }

    /// Outer size including borders.
    pub fn dimensions() -> (u16, u16) {
        let widest = ContextAction::ALL.iter().map(|a| a.label().len()).max().unwrap_or(0) as u16;
        (widest + 4, ContextAction::ALL.len() as u16 + 2)
    }

    /// Menu area clamped inside `area`.
    pub fn rect(&self, area: Rect) -> Rect {
        let (menu_w, menu_h) = Self::dimensions();
        let width = menu_w.min(area.width.max(1));
        let height = menu_h.min(area.height.max(1));
        let max_x = area.x.saturating_add(area.width.saturating_sub(width));
        let max_y = area.y.saturating_add(area.height.saturating_sub(height));
        Rect::new(self.x.min(max_x), self.y.min(max_y), width, height)
    }

    /// Menu item under a screen position, if any.
    pub fn item_at(&self, area: Rect, x: u16, y: u16) -> Option<ContextAction> {
        let rect = self.rect(area);
        let inside = x > rect.x && x < rect.x + rect.width - 1 && y > rect.y && y < rect.y + rect.height - 1;
        if !inside {
            return None;
        }
        ContextAction::ALL.get((y - rect.y - 1) as usize).copied()
    }
}

pub fn draw(frame: &mut Frame, menu: &ContextMenuState, area: Rect, theme: &Theme) {
    let menu_area = menu.rect(area);
    frame.render_widget(Clear, menu_area);

    let block = Block::default()
        .title(" Menu ")
        .title_style(Style::default().fg(theme.dialog.title).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.dialog.border))
        .style(Style::default().bg(theme.dialog.bg));
    let inner = block.inner(menu_area);
    frame.render_widget(block, menu_area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let selected_style = Style::default()
        .fg(theme.dialog.button_selected_text)
        .bg(theme.dialog.button_selected_bg)
        .add_modifier(Modifier::BOLD);
    let normal_style = Style::default().fg(theme.dialog.text);

    for (i, action) in ContextAction::ALL.iter().enumerate() {
        let y = inner.y + i as u16;
        if y >= inner.y + inner.height {
            break;
        }
        let style = if i == menu.selected_index { selected_style } else { normal_style };
        let label = format!(" {:<width$}", action.label(), width = inner.width.saturating_sub(1) as usize);
        frame.render_widget(
            Paragraph::new(Span::styled(label, style)),
            Rect::new(inner.x, y, inner.width, 1),
        );
    }
}

/// Keyboard handling while the menu is open.
pub fn handle_input(app: &mut App, code: KeyCode) {
    let Some(menu) = app.context_menu.as_mut() else {
        return;
    };
    let count = ContextAction::ALL.len();
    match code {
        KeyCode::Up => menu.selected_index = (menu.selected_index + count - 1) % count,
        KeyCode::Down | KeyCode::Tab => menu.selected_index = (menu.selected_index + 1) % count,
        KeyCode::Home => menu.selected_index = 0,
        KeyCode::End => menu.selected_index = count - 1,
        KeyCode::Enter => {
            let action = ContextAction::ALL[menu.selected_index.min(count - 1)];
            let target = menu.target.clone();
            app.execute_context_action(action, &target);
        }
        KeyCode::Esc => app.context_menu = None,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_is_clamped_to_area() {
        let menu = ContextMenuState::new(95, 38, PathBuf::from("/tmp/x"));
        let area = Rect::new(0, 0, 100, 40);
        let rect = menu.rect(area);
        assert!(rect.x + rect.width <= 100);
        assert!(rect.y + rect.height <= 40);
        assert_eq!((rect.width, rect.height), ContextMenuState::dimensions());
    }

    #[test]
    fn test_item_at() {
        let menu = ContextMenuState::new(10, 5, PathBuf::from("/tmp/x"));
        let area = Rect::new(0, 0, 80, 24);
        assert_eq!(menu.item_at(area, 12, 6), Some(ContextAction::Open));
        assert_eq!(menu.item_at(area, 12, 9), Some(ContextAction::Properties));
        // Border rows are not items
        assert_eq!(menu.item_at(area, 12, 5), None);
        assert_eq!(menu.item_at(area, 2, 6), None);
    }
}
