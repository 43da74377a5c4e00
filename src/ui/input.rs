use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{style::Style, text::Span};
use unicode_width::UnicodeWidthChar;

/// Single-line editable text with a char-indexed cursor. Used by the
/// address bar, the search box and the input dialogs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    text: String,
    cursor: usize,
}

impl TextInput {
    /// Input holding `text` with the cursor at the end.
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.chars().count(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Apply an editing key. Returns `false` for keys that are not editing
    /// keys (Enter, Esc, Tab, ...), leaving them to the caller.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        match code {
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    let mut chars: Vec<char> = self.text.chars().collect();
                    chars.remove(self.cursor - 1);
                    self.text = chars.into_iter().collect();
                    self.cursor -= 1;
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.len() {
                    let mut chars: Vec<char> = self.text.chars().collect();
                    chars.remove(self.cursor);
                    self.text = chars.into_iter().collect();
                }
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.cursor < self.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => self.clear(),
            KeyCode::Char(_) if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                return false;
            }
            KeyCode::Char(c) => {
                let mut chars: Vec<char> = self.text.chars().collect();
                chars.insert(self.cursor, c);
                self.text = chars.into_iter().collect();
                self.cursor += 1;
            }
            _ => return false,
        }
        true
    }

    /// Spans for a field `width` cells wide. When the text does not fit, the
    /// window scrolls so the cursor stays visible and a leading "..." marks
    /// the hidden part.
    pub fn spans(
        &self,
        width: usize,
        text_style: Style,
        cursor_style: Style,
        show_cursor: bool,
    ) -> Vec<Span<'static>> {
        let chars: Vec<char> = self.text.chars().collect();
        let cursor = self.cursor.min(chars.len());
        let char_w = |c: &char| c.width().unwrap_or(1);

        // One cell is reserved for the cursor block at the end of the text
        let total_width: usize = chars.iter().map(char_w).sum::<usize>() + 1;
        let (visible, cursor_in_visible) = if total_width > width && width > 3 {
            let budget = width - 3;
            let mut start = cursor;
            let mut used = 1;
            while start > 0 {
                let w = char_w(&chars[start - 1]);
                if used + w > budget {
                    break;
                }
                start -= 1;
                used += w;
            }
            let mut end = cursor;
            while end < chars.len() {
                // The char under the cursor takes the reserved cell
                let w = if end == cursor { 0 } else { char_w(&chars[end]) };
                if used + w > budget {
                    break;
                }
                used += w;
                end += 1;
            }
            let mut shown: Vec<char> = Vec::new();
            if start > 0 {
                shown.extend(['.', '.', '.']);
            }
            let offset = shown.len();
            shown.extend(&chars[start..end]);
            (shown, cursor - start + offset)
        } else {
            (chars.clone(), cursor)
        };

        if !show_cursor {
            return vec![Span::styled(visible.iter().collect::<String>(), text_style)];
        }

        let before: String = visible[..cursor_in_visible].iter().collect();
        let (at, after) = if cursor_in_visible < visible.len() {
            (
                visible[cursor_in_visible].to_string(),
                visible[cursor_in_visible + 1..].iter().collect(),
            )
        } else {
            (" ".to_string(), String::new())
        };
        vec![
            Span::styled(before, text_style),
            Span::styled(at, cursor_style),
            Span::styled(after, text_style),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(input: &mut TextInput, code: KeyCode) -> bool {
        input.handle_key(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_and_cursor_movement() {
        let mut input = TextInput::default();
        for c in "hllo".chars() {
            press(&mut input, KeyCode::Char(c));
        }
        press(&mut input, KeyCode::Home);
        press(&mut input, KeyCode::Right);
        press(&mut input, KeyCode::Char('e'));
        assert_eq!(input.text(), "hello");
        assert_eq!(input.cursor, 2);

        press(&mut input, KeyCode::End);
        press(&mut input, KeyCode::Backspace);
        assert_eq!(input.text(), "hell");
        press(&mut input, KeyCode::Home);
        press(&mut input, KeyCode::Delete);
        assert_eq!(input.text(), "ell");
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = TextInput::new("사진");
        assert_eq!(input.cursor, 2);
        press(&mut input, KeyCode::Backspace);
        assert_eq!(input.text(), "사");
    }

    #[test]
    fn test_non_editing_keys_are_passed_through() {
        let mut input = TextInput::new("x");
        assert!(!press(&mut input, KeyCode::Enter));
        assert!(!press(&mut input, KeyCode::Esc));
        assert!(!input.handle_key(KeyCode::Char('l'), KeyModifiers::CONTROL));
        assert!(input.handle_key(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(input.text(), "");
    }

    #[test]
    fn test_spans_fit() {
        let input = TextInput::new("abc");
        let spans = input.spans(20, Style::default(), Style::default(), true);
        assert_eq!(spans[0].content, "abc");
        assert_eq!(spans[1].content, " ");
    }

    #[test]
    fn test_spans_scroll_keeps_cursor_visible() {
        let input = TextInput::new("/very/long/path/to/some/directory");
        let spans = input.spans(12, Style::default(), Style::default(), true);
        let shown: String = spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(shown.starts_with("..."));
        assert!(shown.trim_end().ends_with("ory"));
        assert!(unicode_width::UnicodeWidthStr::width(shown.as_str()) <= 12);
    }
}
