use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::{
    app::{App, Dialog, DialogType},
    theme::Theme,
};

const SIMPLE_DIALOG_WIDTH: u16 = 50;
const SIMPLE_INPUT_HEIGHT: u16 = 5;
const NOTICE_MAX_WIDTH: u16 = 72;
const DIALOG_MARGIN: u16 = 6;

/// Message lines wrapped to the dialog's inner width.
fn wrapped_message(message: &str, width: u16) -> Vec<String> {
    let width = width.saturating_sub(4).max(10) as usize;
    textwrap::wrap(message, width)
        .into_iter()
        .map(|l| l.into_owned())
        .collect()
}

/// Outer size for a dialog on a screen of `area`.
fn dialog_size(dialog: &Dialog, area: Rect) -> (u16, u16) {
    match dialog.dialog_type {
        DialogType::Mkdir | DialogType::Rename => (SIMPLE_DIALOG_WIDTH, SIMPLE_INPUT_HEIGHT),
        _ => {
            let longest = dialog
                .message
                .lines()
                .map(unicode_width::UnicodeWidthStr::width)
                .max()
                .unwrap_or(0) as u16;
            let width = (longest + 6)
                .max(SIMPLE_DIALOG_WIDTH)
                .min(NOTICE_MAX_WIDTH)
                .min(area.width.saturating_sub(DIALOG_MARGIN).max(20));
            let lines = wrapped_message(&dialog.message, width).len() as u16;
            // Borders, padding above the message and the button row
            (width, lines.max(1) + 5)
        }
    }
}

pub fn draw_dialog(frame: &mut Frame, dialog: &Dialog, area: Rect, theme: &Theme) {
    let (width, height) = dialog_size(dialog, area);
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let dialog_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, dialog_area);

    match dialog.dialog_type {
        DialogType::Mkdir | DialogType::Rename => draw_simple_input_dialog(frame, dialog, dialog_area, theme),
        DialogType::Delete => draw_confirm_dialog(frame, dialog, dialog_area, theme),
        DialogType::Info | DialogType::Warning | DialogType::Error | DialogType::Properties => {
            draw_notice_dialog(frame, dialog, dialog_area, theme)
        }
    }
}

fn dialog_block<'a>(title: &str, title_style: Style, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(format!(" {} ", title))
        .title_style(title_style.add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.dialog.border))
        .style(Style::default().bg(theme.dialog.bg))
}

fn draw_simple_input_dialog(frame: &mut Frame, dialog: &Dialog, area: Rect, theme: &Theme) {
    let block = dialog_block(&dialog.title, Style::default().fg(theme.dialog.title), theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width < 6 || inner.height < 3 {
        return;
    }

    frame.render_widget(
        Paragraph::new(dialog.message.clone()).style(Style::default().fg(theme.dialog.text)),
        Rect::new(inner.x + 1, inner.y, inner.width - 2, 1),
    );

    let cursor_style = Style::default()
        .fg(theme.dialog.input_cursor_fg)
        .bg(theme.dialog.input_cursor_bg)
        .add_modifier(Modifier::SLOW_BLINK);
    let mut spans = vec![Span::styled("> ", Style::default().fg(theme.dialog.input_prompt))];
    spans.extend(dialog.input.spans(
        (inner.width - 4) as usize,
        Style::default().fg(theme.dialog.input_text),
        cursor_style,
        true,
    ));
    frame.render_widget(
        Paragraph::new(Line::from(spans)),
        Rect::new(inner.x + 1, inner.y + 2, inner.width - 2, 1),
    );
}

fn button_styles(theme: &Theme) -> (Style, Style) {
    let selected = Style::default()
        .fg(theme.dialog.button_selected_text)
        .bg(theme.dialog.button_selected_bg);
    let normal = Style::default().fg(theme.dialog.button_text);
    (selected, normal)
}

fn draw_message(frame: &mut Frame, dialog: &Dialog, area: Rect, inner: Rect, theme: &Theme) {
    let lines: Vec<Line> = wrapped_message(&dialog.message, area.width)
        .into_iter()
        .map(Line::from)
        .collect();
    let alignment = if lines.len() == 1 && dialog.dialog_type != DialogType::Properties {
        Alignment::Center
    } else {
        Alignment::Left
    };
    frame.render_widget(
        Paragraph::new(lines)
            .style(Style::default().fg(theme.dialog.text))
            .alignment(alignment),
        Rect::new(inner.x + 1, inner.y + 1, inner.width - 2, inner.height.saturating_sub(3)),
    );
}

fn draw_confirm_dialog(frame: &mut Frame, dialog: &Dialog, area: Rect, theme: &Theme) {
    let block = dialog_block(&dialog.title, Style::default().fg(theme.dialog.title), theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width < 4 || inner.height < 3 {
        return;
    }

    draw_message(frame, dialog, area, inner, theme);

    let (selected_style, normal_style) = button_styles(theme);
    let yes_style = if dialog.selected_button == 0 { selected_style } else { normal_style };
    let no_style = if dialog.selected_button == 1 { selected_style } else { normal_style };

    let buttons = Line::from(vec![
        Span::styled("  ", Style::default()),
        Span::styled(" Yes ", yes_style),
        Span::styled("    ", Style::default()),
        Span::styled(" No ", no_style),
        Span::styled("  ", Style::default()),
    ]);
    frame.render_widget(
        Paragraph::new(buttons).alignment(Alignment::Center),
        Rect::new(inner.x + 1, inner.y + inner.height - 2, inner.width - 2, 1),
    );
}

/// Information, warning, error and properties dialogs: message plus OK.
fn draw_notice_dialog(frame: &mut Frame, dialog: &Dialog, area: Rect, theme: &Theme) {
    let title_color = match dialog.dialog_type {
        DialogType::Warning => theme.state.warning,
        DialogType::Error => theme.state.error,
        _ => theme.dialog.title,
    };
    let block = dialog_block(&dialog.title, Style::default().fg(title_color), theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width < 4 || inner.height < 3 {
        return;
    }

    draw_message(frame, dialog, area, inner, theme);

    let (selected_style, _) = button_styles(theme);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(" OK ", selected_style))).alignment(Alignment::Center),
        Rect::new(inner.x + 1, inner.y + inner.height - 2, inner.width - 2, 1),
    );
}

/// Keyboard handling while a dialog is open.
pub fn handle_dialog_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    let Some(dialog) = app.dialog.as_mut() else {
        return;
    };

    match dialog.dialog_type {
        DialogType::Delete => match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Some(target) = app.dialog.take().and_then(|d| d.target) {
                    app.execute_delete(&target);
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.dialog = None;
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                dialog.selected_button = 1 - dialog.selected_button;
            }
            KeyCode::Enter => {
                let confirmed = dialog.selected_button == 0;
                let target = app.dialog.take().and_then(|d| d.target);
                if let (true, Some(target)) = (confirmed, target) {
                    app.execute_delete(&target);
                }
            }
            _ => {}
        },
        DialogType::Mkdir | DialogType::Rename => match code {
            KeyCode::Enter => {
                let Some(dialog) = app.dialog.take() else {
                    return;
                };
                let input = dialog.input.text().to_string();
                match (dialog.dialog_type, dialog.target) {
                    (DialogType::Mkdir, _) => app.execute_mkdir(&input),
                    (DialogType::Rename, Some(target)) => app.execute_rename(&target, &input),
                    _ => {}
                }
            }
            KeyCode::Esc => {
                app.dialog = None;
            }
            _ => {
                dialog.input.handle_key(code, modifiers);
            }
        },
        DialogType::Info | DialogType::Warning | DialogType::Error | DialogType::Properties => {
            if matches!(code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') | KeyCode::Char('q')) {
                app.dialog = None;
            }
        }
    }
}
