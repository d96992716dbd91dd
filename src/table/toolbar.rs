use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::Theme;
use crate::table::dropdown::DropdownFilter;
use crate::ui::{Component, EventResult, Result, TextInput, TextInputEvent};

pub const HEIGHT: u16 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarEvent {
    New,
    /// Search submitted with Enter or "Go".
    Search(String),
    /// Dropdown should move to the option at this index.
    Filter(usize),
}

#[derive(Debug, Default, Clone, Copy)]
struct Hits {
    new: Rect,
    dropdown: Option<Rect>,
    search: Option<Rect>,
    go: Option<Rect>,
}

/// Row above the grid: "New", the optional dropdown filter and the optional
/// search box.
pub struct Toolbar {
    search: Option<TextInput>,
    dropdown: Option<DropdownFilter>,
    hits: Hits,
}

impl Toolbar {
    pub fn new(searchable: bool, dropdown: Option<DropdownFilter>) -> Self {
        Self {
            search: searchable.then(|| TextInput::new("Search").with_placeholder("Search by name")),
            dropdown,
            hits: Hits::default(),
        }
    }

    pub const fn is_searchable(&self) -> bool {
        self.search.is_some()
    }

    pub fn search_focused(&self) -> bool {
        self.search.as_ref().is_some_and(TextInput::is_focused)
    }

    /// Focus the search box. No-op when the table is not searchable.
    pub fn focus_search(&mut self) {
        if let Some(search) = &mut self.search {
            search.set_focused(true);
        }
    }

    pub const fn dropdown(&self) -> Option<&DropdownFilter> {
        self.dropdown.as_ref()
    }

    pub const fn dropdown_mut(&mut self) -> Option<&mut DropdownFilter> {
        self.dropdown.as_mut()
    }

    fn submit(&mut self) -> EventResult<ToolbarEvent> {
        match &mut self.search {
            Some(search) => {
                search.set_focused(false);
                ToolbarEvent::Search(search.value().to_string()).into()
            }
            None => EventResult::Ignored,
        }
    }

    fn button(label: &str, theme: &Theme, highlighted: bool) -> Paragraph<'static> {
        let border = if highlighted {
            theme.border_focused()
        } else {
            theme.border()
        };
        Paragraph::new(Line::from(Span::styled(
            label.to_string(),
            Style::default().fg(theme.accent()).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(border)),
        )
    }
}

fn width_of(text: &str) -> u16 {
    u16::try_from(text.chars().count()).unwrap_or(u16::MAX)
}

impl Component for Toolbar {
    type Output = ToolbarEvent;

    /// Only keys typed into a focused search box are handled here.
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        let Some(search) = self.search.as_mut().filter(|s| s.is_focused()) else {
            return Ok(EventResult::Ignored);
        };
        Ok(match search.handle_key(key)? {
            EventResult::Event(TextInputEvent::Submitted(value)) => {
                search.set_focused(false);
                ToolbarEvent::Search(value).into()
            }
            EventResult::Event(TextInputEvent::Cancelled) => {
                search.set_focused(false);
                EventResult::Consumed
            }
            EventResult::Consumed => EventResult::Consumed,
            EventResult::Ignored => EventResult::Ignored,
        })
    }

    fn handle_paste(&mut self, text: &str) -> bool {
        self.search.as_mut().is_some_and(|search| search.handle_paste(text))
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<EventResult<Self::Output>> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Ok(EventResult::Ignored);
        }
        let at = Position::new(mouse.column, mouse.row);
        let hits = self.hits;
        let inside = |rect: Option<Rect>| rect.is_some_and(|r| r.contains(at));

        if hits.new.contains(at) {
            return Ok(ToolbarEvent::New.into());
        }
        if inside(hits.dropdown) {
            return Ok(self
                .dropdown
                .as_ref()
                .map_or(EventResult::Consumed, |d| ToolbarEvent::Filter(d.next_index()).into()));
        }
        if inside(hits.go) {
            return Ok(self.submit());
        }
        if inside(hits.search) {
            self.focus_search();
            return Ok(EventResult::Consumed);
        }
        if let Some(search) = &mut self.search {
            search.set_focused(false);
        }
        Ok(EventResult::Ignored)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let dropdown_width = self.dropdown.as_ref().map_or(0, |d| {
            let widest = d.options().iter().map(|o| width_of(&o.label)).max().unwrap_or(0);
            widest.max(width_of(&d.field)) + 6
        });

        let mut constraints = vec![Constraint::Length(7), Constraint::Length(dropdown_width)];
        if self.search.is_some() {
            constraints.extend([Constraint::Fill(1), Constraint::Length(6)]);
        } else {
            constraints.push(Constraint::Fill(1));
        }
        let areas = Layout::horizontal(constraints).spacing(1).split(area);

        frame.render_widget(Self::button("New", theme, false), areas[0]);
        self.hits = Hits {
            new: areas[0],
            ..Hits::default()
        };

        if let Some(dropdown) = &self.dropdown {
            let line = Line::from(vec![
                Span::styled(dropdown.selected_label().to_string(), Style::default().fg(theme.text())),
                Span::styled(" ▾", Style::default().fg(theme.muted())),
            ]);
            let block = Block::default()
                .title(format!(" {} ", dropdown.field))
                .title_style(Style::default().fg(theme.accent()))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(theme.border()));
            frame.render_widget(Paragraph::new(line).block(block), areas[1]);
            self.hits.dropdown = Some(areas[1]);
        }

        if let Some(search) = &mut self.search {
            search.render(frame, areas[2], theme);
            let focused = search.is_focused();
            frame.render_widget(Self::button("Go", theme, focused), areas[3]);
            self.hits.search = Some(areas[2]);
            self.hits.go = Some(areas[3]);
        }
    }
}
