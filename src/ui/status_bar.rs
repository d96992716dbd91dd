use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::Theme;

/// A key and what it does, shown in the hint line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keybinding {
    pub key: String,
    pub description: String,
}

impl Keybinding {
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
        }
    }
}

/// Single-line hint bar at the bottom of the screen.
#[derive(Default)]
pub struct StatusBar;

impl StatusBar {
    pub fn render(frame: &mut Frame, area: Rect, theme: &Theme, keybindings: &[Keybinding]) {
        let key_style = Style::default().fg(theme.key()).add_modifier(Modifier::BOLD);
        let desc_style = Style::default().fg(theme.hint());

        let mut spans = Vec::with_capacity(keybindings.len() * 3);
        for (i, kb) in keybindings.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled("  ", desc_style));
            }
            spans.push(Span::styled(kb.key.clone(), key_style));
            spans.push(Span::styled(format!(" {}", kb.description), desc_style));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
