use std::fmt;
use std::sync::Arc;

use ratatui::style::Style;
use ratatui::text::Line;

use crate::table::value::Value;

type Accessor<R> = Arc<dyn Fn(&R) -> Value + Send + Sync>;
type Renderer<R> = Arc<dyn Fn(&R, &Column<R>) -> Line<'static> + Send + Sync>;

const MIN_DEFAULT_WIDTH: u16 = 6;

/// Declarative description of one table column.
///
/// Rows are never inspected by reflection: each column carries an accessor
/// that projects the row to a [`Value`] for `field`.
pub struct Column<R> {
    pub title: String,
    pub field: String,
    pub sortable: bool,
    pub style: Option<Style>,
    pub width: u16,
    accessor: Accessor<R>,
    render: Option<Renderer<R>>,
}

impl<R> Column<R> {
    pub fn new(
        title: impl Into<String>,
        field: impl Into<String>,
        accessor: impl Fn(&R) -> Value + Send + Sync + 'static,
    ) -> Self {
        let title = title.into();
        let width = u16::try_from(title.chars().count() + 4)
            .unwrap_or(u16::MAX)
            .max(MIN_DEFAULT_WIDTH);
        Self {
            title,
            field: field.into(),
            sortable: true,
            style: None,
            width,
            accessor: Arc::new(accessor),
            render: None,
        }
    }

    #[must_use]
    pub const fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Initial rendered width in cells.
    #[must_use]
    pub const fn with_width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    #[must_use]
    pub const fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    /// Replace the default verbatim rendering of the cell.
    #[must_use]
    pub fn with_render(
        mut self,
        render: impl Fn(&R, &Self) -> Line<'static> + Send + Sync + 'static,
    ) -> Self {
        self.render = Some(Arc::new(render));
        self
    }

    pub fn value(&self, row: &R) -> Value {
        (self.accessor)(row)
    }

    /// Cell content: the render function's output when declared, otherwise
    /// the raw value.
    pub fn cell(&self, row: &R) -> Line<'static> {
        self.render.as_ref().map_or_else(
            || Line::from(self.value(row).to_string()),
            |render| render(row, self),
        )
    }
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        Self {
            title: self.title.clone(),
            field: self.field.clone(),
            sortable: self.sortable,
            style: self.style,
            width: self.width,
            accessor: Arc::clone(&self.accessor),
            render: self.render.clone(),
        }
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("title", &self.title)
            .field("field", &self.field)
            .field("sortable", &self.sortable)
            .field("width", &self.width)
            .finish_non_exhaustive()
    }
}
