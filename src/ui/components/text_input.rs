use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::Theme;
use crate::ui::{Component, EventResult, Result};

pub enum TextInputEvent {
    Submitted(String),
    Cancelled,
}

/// Single-line bordered text field.
///
/// Used by the toolbar search box and by edit forms. The cursor is tracked in
/// characters, not bytes.
pub struct TextInput {
    label: String,
    value: String,
    cursor: usize,
    placeholder: Option<String>,
    focused: bool,
    error: Option<String>,
}

impl TextInput {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: String::new(),
            cursor: 0,
            placeholder: None,
            focused: false,
            error: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.set_value(value);
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.len();
    }

    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    pub const fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Message shown under the label, e.g. a field error returned by a save.
    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    fn delete_char_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    fn delete_char_at_cursor(&mut self) {
        if self.cursor < self.len() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    fn delete_word_before_cursor(&mut self) {
        let chars: Vec<char> = self.value.chars().collect();
        let mut pos = self.cursor;
        while pos > 0 && chars[pos - 1] == ' ' {
            pos -= 1;
        }
        while pos > 0 && chars[pos - 1] != ' ' {
            pos -= 1;
        }
        let (start, end) = (self.byte_index(pos), self.byte_index(self.cursor));
        self.value.drain(start..end);
        self.cursor = pos;
    }

    fn clear_line(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }
}

impl Component for TextInput {
    type Output = TextInputEvent;

    /// Insert pasted text at the cursor. Line breaks become spaces since the
    /// input holds a single line.
    fn handle_paste(&mut self, text: &str) -> bool {
        if !self.focused {
            return false;
        }
        for c in text.chars().filter(|c| *c != '\r') {
            self.insert_char(if c == '\n' { ' ' } else { c });
        }
        true
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        let result = match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => TextInputEvent::Submitted(self.value.clone()).into(),
            (KeyCode::Esc, _) => TextInputEvent::Cancelled.into(),

            (KeyCode::Backspace, KeyModifiers::ALT) => {
                self.delete_word_before_cursor();
                EventResult::Consumed
            }
            (KeyCode::Backspace, _) => {
                self.delete_char_before_cursor();
                EventResult::Consumed
            }
            (KeyCode::Delete, _) => {
                self.delete_char_at_cursor();
                EventResult::Consumed
            }

            (KeyCode::Left, _) => {
                self.cursor = self.cursor.saturating_sub(1);
                EventResult::Consumed
            }
            (KeyCode::Right, _) => {
                self.cursor = (self.cursor + 1).min(self.len());
                EventResult::Consumed
            }
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
                self.cursor = 0;
                EventResult::Consumed
            }
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.cursor = self.len();
                EventResult::Consumed
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.clear_line();
                EventResult::Consumed
            }

            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.insert_char(c);
                EventResult::Consumed
            }

            // Navigation keys such as Tab belong to the parent (form field cycling).
            _ => EventResult::Ignored,
        };
        Ok(result)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let text_style = Style::default().fg(theme.text());
        let cursor_style = Style::default()
            .fg(theme.base())
            .bg(theme.text())
            .add_modifier(Modifier::BOLD);

        let line = if self.value.is_empty() && !self.focused {
            let placeholder = self.placeholder.clone().unwrap_or_default();
            Line::from(Span::styled(placeholder, Style::default().fg(theme.muted())))
        } else if self.focused {
            let before: String = self.value.chars().take(self.cursor).collect();
            let at: String = self
                .value
                .chars()
                .nth(self.cursor)
                .map_or_else(|| " ".to_string(), |c| c.to_string());
            let after: String = self.value.chars().skip(self.cursor + 1).collect();
            Line::from(vec![
                Span::styled(before, text_style),
                Span::styled(at, cursor_style),
                Span::styled(after, text_style),
            ])
        } else {
            Line::from(Span::styled(self.value.clone(), text_style))
        };

        let border_color = match (&self.error, self.focused) {
            (Some(_), _) => theme.error(),
            (None, true) => theme.border_focused(),
            (None, false) => theme.border(),
        };

        let mut block = Block::default()
            .title(format!(" {} ", self.label))
            .title_style(Style::default().fg(theme.accent()).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color));

        if let Some(error) = &self.error {
            block = block.title_bottom(
                Line::from(Span::styled(format!(" {error} "), Style::default().fg(theme.error())))
                    .right_aligned(),
            );
        }

        frame.render_widget(Paragraph::new(line).block(block), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(input: &mut TextInput, s: &str) {
        for c in s.chars() {
            input.handle_key(key(KeyCode::Char(c))).unwrap();
        }
    }

    #[test]
    fn test_typing_and_submit() {
        let mut input = TextInput::new("Search");
        type_str(&mut input, "apple");
        assert_eq!(input.value(), "apple");

        match input.handle_key(key(KeyCode::Enter)).unwrap() {
            EventResult::Event(TextInputEvent::Submitted(v)) => assert_eq!(v, "apple"),
            _ => panic!("expected submit"),
        }
    }

    #[test]
    fn test_editing_multibyte_text() {
        let mut input = TextInput::new("Name").with_value("Crème");
        input.handle_key(key(KeyCode::Left)).unwrap();
        input.handle_key(key(KeyCode::Left)).unwrap();
        input.handle_key(key(KeyCode::Backspace)).unwrap();
        assert_eq!(input.value(), "Crme");
        type_str(&mut input, "è");
        assert_eq!(input.value(), "Crème");
    }

    #[test]
    fn test_delete_word() {
        let mut input = TextInput::new("Name").with_value("American Beef");
        input
            .handle_key(KeyEvent::new(KeyCode::Backspace, KeyModifiers::ALT))
            .unwrap();
        assert_eq!(input.value(), "American ");
    }

    #[test]
    fn test_tab_is_left_to_parent() {
        let mut input = TextInput::new("Name");
        assert!(!input.handle_key(key(KeyCode::Tab)).unwrap().is_consumed());
    }

    #[test]
    fn test_paste_inserts_at_cursor_on_one_line() {
        let mut input = TextInput::new("Name").with_value("Beef");
        assert!(!input.handle_paste("x"));

        input.set_focused(true);
        input.handle_key(key(KeyCode::Home)).unwrap();
        assert!(input.handle_paste("Wagyu\r\n"));
        assert_eq!(input.value(), "Wagyu Beef");
    }
}
