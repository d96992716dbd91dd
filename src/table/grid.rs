//! Header, body and row actions, plus mouse hit-testing against the layout
//! of the last render.

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};

use crate::Theme;
use crate::table::column::Column;
use crate::table::query::OrderBy;

const EDIT_WIDTH: u16 = 6;
const DELETE_WIDTH: u16 = 8;
const COLUMN_SPACING: u16 = 1;

/// What is under the pointer, in terms of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridHit {
    Header(usize),
    ResizeHandle(usize),
    Row(usize),
    Edit(usize),
    Delete(usize),
}

/// Data for one render pass.
pub struct GridView<'a, R> {
    pub columns: &'a [Column<R>],
    pub widths: &'a [u16],
    pub rows: &'a [R],
    pub order_by: Option<&'a OrderBy>,
    /// Column whose resize handle is being dragged.
    pub dragging: Option<usize>,
}

#[derive(Debug, Default, Clone)]
struct GridLayout {
    header_y: Option<u16>,
    body: Rect,
    columns: Vec<Rect>,
    edit: Rect,
    delete: Rect,
}

/// Row cursor, column focus and last-render geometry of the table grid.
#[derive(Debug)]
pub struct Grid {
    state: TableState,
    row_count: usize,
    column_count: usize,
    focused_column: usize,
    hovered_handle: Option<usize>,
    layout: GridLayout,
}

impl Grid {
    pub fn new(column_count: usize) -> Self {
        Self {
            state: TableState::default(),
            row_count: 0,
            column_count,
            focused_column: 0,
            hovered_handle: None,
            layout: GridLayout::default(),
        }
    }

    pub const fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    pub const fn focused_column(&self) -> usize {
        self.focused_column
    }

    /// Rows were replaced. Moves the cursor to `select` if given, otherwise
    /// keeps it in range.
    pub fn set_rows(&mut self, row_count: usize, select: Option<usize>) {
        self.row_count = row_count;
        let selected = if row_count == 0 {
            None
        } else {
            Some(
                select
                    .or_else(|| self.state.selected())
                    .unwrap_or(0)
                    .min(row_count - 1),
            )
        };
        self.state.select(selected);
        if selected.is_none() {
            *self.state.offset_mut() = 0;
        }
    }

    pub fn select(&mut self, index: usize) {
        if index < self.row_count {
            self.state.select(Some(index));
        }
    }

    pub fn select_next(&mut self) {
        if self.row_count > 0 {
            let next = self.state.selected().map_or(0, |i| (i + 1).min(self.row_count - 1));
            self.state.select(Some(next));
        }
    }

    pub fn select_previous(&mut self) {
        if self.row_count > 0 {
            let previous = self.state.selected().map_or(0, |i| i.saturating_sub(1));
            self.state.select(Some(previous));
        }
    }

    pub fn select_first(&mut self) {
        if self.row_count > 0 {
            self.state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if self.row_count > 0 {
            self.state.select(Some(self.row_count - 1));
        }
    }

    pub const fn focus_left(&mut self) {
        self.focused_column = self.focused_column.saturating_sub(1);
    }

    pub const fn focus_right(&mut self) {
        if self.focused_column + 1 < self.column_count {
            self.focused_column += 1;
        }
    }

    /// Highlight the handle under the pointer, if any.
    pub fn hover(&mut self, x: u16, y: u16) {
        self.hovered_handle = match self.hit_test(x, y) {
            Some(GridHit::ResizeHandle(column)) => Some(column),
            _ => None,
        };
    }

    /// Resolve a screen position against the last render.
    pub fn hit_test(&self, x: u16, y: u16) -> Option<GridHit> {
        let layout = &self.layout;
        let at = Position::new(x, y);

        if Some(y) == layout.header_y {
            for (i, rect) in layout.columns.iter().enumerate() {
                let on_edge = rect.width > 0 && x == rect.right() - 1;
                if on_edge || x == rect.right() {
                    return Some(GridHit::ResizeHandle(i));
                }
                if rect.contains(at) {
                    return Some(GridHit::Header(i));
                }
            }
            return None;
        }

        if !layout.body.contains(at) {
            return None;
        }
        let index = self.state.offset() + usize::from(y - layout.body.y);
        if index >= self.row_count {
            return None;
        }
        if (layout.edit.left()..layout.edit.right()).contains(&x) {
            Some(GridHit::Edit(index))
        } else if (layout.delete.left()..layout.delete.right()).contains(&x) {
            Some(GridHit::Delete(index))
        } else {
            Some(GridHit::Row(index))
        }
    }

    fn header<R>(&self, view: &GridView<'_, R>, theme: &Theme) -> Row<'static> {
        let mut cells: Vec<Cell> = view
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let indicator = match view.order_by {
                    Some(order) if order.field == column.field => {
                        if order.is_descending() { " ↓" } else { " ↑" }
                    }
                    _ => "",
                };
                let color = if i == self.focused_column {
                    theme.accent()
                } else {
                    theme.header()
                };
                Cell::from(Line::from(vec![
                    Span::raw(column.title.clone()),
                    Span::styled(indicator, Style::default().fg(theme.accent())),
                ]))
                .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            })
            .collect();
        cells.extend(["Edit", "Delete"].map(|title| {
            Cell::from(title).style(Style::default().fg(theme.muted()).add_modifier(Modifier::BOLD))
        }));
        Row::new(cells).style(Style::default().bg(theme.header_bg()))
    }

    fn body<R>(view: &GridView<'_, R>, theme: &Theme) -> Vec<Row<'static>> {
        view.rows
            .iter()
            .map(|row| {
                let mut cells: Vec<Cell> = view
                    .columns
                    .iter()
                    .map(|column| {
                        let cell = Cell::from(column.cell(row));
                        match column.style {
                            Some(style) => cell.style(style),
                            None => cell,
                        }
                    })
                    .collect();
                cells.push(Cell::from(
                    Line::from(Span::styled("✎", Style::default().fg(theme.accent()))).centered(),
                ));
                cells.push(Cell::from(
                    Line::from(Span::styled("✖", Style::default().fg(theme.error()))).centered(),
                ));
                Row::new(cells).style(Style::default().fg(theme.text()))
            })
            .collect()
    }

    pub fn render<R>(&mut self, frame: &mut Frame, area: Rect, theme: &Theme, view: &GridView<'_, R>) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border()));
        let inner = block.inner(area);

        let constraints: Vec<Constraint> = view
            .widths
            .iter()
            .map(|w| Constraint::Length(*w))
            .chain([Constraint::Length(EDIT_WIDTH), Constraint::Length(DELETE_WIDTH)])
            .collect();
        let cells = Layout::horizontal(constraints.clone())
            .flex(Flex::Start)
            .spacing(COLUMN_SPACING)
            .split(inner);
        let data_columns = view.widths.len();

        self.layout = GridLayout {
            header_y: (inner.height > 0).then_some(inner.y),
            body: Rect {
                y: inner.y.saturating_add(1),
                height: inner.height.saturating_sub(1),
                ..inner
            },
            columns: cells[..data_columns].to_vec(),
            edit: cells[data_columns],
            delete: cells[data_columns + 1],
        };

        let table = Table::new(Self::body(view, theme), constraints)
            .header(self.header(view, theme))
            .block(block)
            .flex(Flex::Start)
            .column_spacing(COLUMN_SPACING)
            .row_highlight_style(
                Style::default()
                    .bg(theme.selection_bg())
                    .fg(theme.selection_fg())
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_stateful_widget(table, area, &mut self.state);

        if view.rows.is_empty() && self.layout.body.height > 0 {
            let message = Paragraph::new(Span::styled("No rows", Style::default().fg(theme.muted())))
                .centered();
            frame.render_widget(message, Rect { height: 1, ..self.layout.body });
        }

        self.render_handles(frame, theme, view.dragging);
    }

    fn render_handles(&self, frame: &mut Frame, theme: &Theme, dragging: Option<usize>) {
        let Some(y) = self.layout.header_y else {
            return;
        };
        let limit = self.layout.body.right();
        for (i, rect) in self.layout.columns.iter().enumerate() {
            let x = rect.right();
            if x >= limit {
                continue;
            }
            let active = dragging == Some(i) || self.hovered_handle == Some(i);
            let style = if active {
                Style::default().fg(theme.resize_handle()).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.border())
            };
            if let Some(cell) = frame.buffer_mut().cell_mut((x, y)) {
                cell.set_symbol(if active { "┃" } else { "│" }).set_style(style);
            }
        }
    }
}
