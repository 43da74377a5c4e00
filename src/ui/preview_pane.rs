use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::{app::{App, Focus}, theme::Theme};
use crate::services::preview::Preview;

pub fn draw(frame: &mut Frame, app: &mut App, area: Rect, theme: &Theme) {
    let focused = app.focus == Focus::Preview && app.dialog.is_none();
    let block = Block::default()
        .title(app.preview.title())
        .title_style(theme.title_style(focused))
        .borders(Borders::ALL)
        .border_style(theme.border_style(focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    app.layout.preview = inner;

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let style = match app.preview {
        Preview::Error { .. } => Style::default().fg(theme.preview.error_text),
        Preview::Text { .. } => Style::default().fg(theme.preview.text),
        _ => Style::default().fg(theme.preview.info_text),
    };

    let paragraph = Paragraph::new(app.preview.body())
        .style(style)
        .wrap(Wrap { trim: false });
    let total = paragraph.line_count(inner.width) as u16;
    app.preview_max_scroll = total.saturating_sub(inner.height);
    app.preview_scroll = app.preview_scroll.min(app.preview_max_scroll);

    frame.render_widget(paragraph.scroll((app.preview_scroll, 0)), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use ratatui::{backend::TestBackend, Terminal};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scroll_is_clamped_to_content() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        let text = (0..40).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n");
        fs::write(root.join("long.txt"), text).unwrap();
        let mut app = App::new(root, Settings::default(), Theme::dark());
        app.preview_scroll = 500;

        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        let theme = app.theme.clone();
        terminal
            .draw(|f| draw(f, &mut app, f.area(), &theme))
            .unwrap();
        assert_eq!(app.preview_max_scroll, 30);
        assert_eq!(app.preview_scroll, 30);
        assert_eq!(app.layout.preview.height, 10);
    }
}
