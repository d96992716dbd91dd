use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::Theme;

/// Visible row range and pager enablement, derived from the page number,
/// page size and total count. Holds no state of its own.
///
/// The `from`/`to` fields follow the plain formula even for an empty
/// result (`1` and `0`); [`PageWindow::range_text`] special-cases that to
/// `"0 of 0"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub from: usize,
    pub to: usize,
    pub count: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PageWindow {
    pub fn new(page_number: usize, page_size: usize, count: usize) -> Self {
        Self {
            from: (page_number - 1) * page_size + 1,
            to: (page_number * page_size).min(count),
            count,
            has_prev: page_number > 1,
            has_next: page_number * page_size < count,
        }
    }

    /// `"6-8 of 8"`. An empty result reads `"0 of 0"` rather than `"1-0 of 0"`.
    pub fn range_text(&self) -> String {
        if self.count == 0 {
            return "0 of 0".to_string();
        }
        format!("{}-{} of {}", self.from, self.to, self.count)
    }
}

/// Screen positions of the pager buttons from the last render.
#[derive(Debug, Clone, Copy, Default)]
pub struct PagerHits {
    pub prev: Rect,
    pub next: Rect,
}

const PREV: &str = " ❮ ";
const NEXT: &str = " ❯ ";

/// Render `"{from}-{to} of {count}   ❮ ❯"` right-aligned in `area`.
///
/// With no rows the range reads `"0 of 0"`, not the `"1-0 of 0"` the
/// formula would give, and both arrows are disabled.
pub fn render_pager(frame: &mut Frame, area: Rect, theme: &Theme, window: &PageWindow) -> PagerHits {
    let range = window.range_text();
    let range_width = u16::try_from(range.chars().count()).unwrap_or(u16::MAX);

    let [_, range_area, _, prev_area, next_area] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(range_width),
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Length(3),
    ])
    .areas(area);

    let button = |enabled: bool| {
        if enabled {
            Style::default().fg(theme.selection_fg()).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.muted()).add_modifier(Modifier::DIM)
        }
    };

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(range, Style::default().fg(theme.text())))),
        range_area,
    );
    frame.render_widget(Paragraph::new(Span::styled(PREV, button(window.has_prev))), prev_area);
    frame.render_widget(Paragraph::new(Span::styled(NEXT, button(window.has_next))), next_area);

    PagerHits {
        prev: prev_area,
        next: next_area,
    }
}
