//! Column resizing by dragging header edges.
//!
//! Only the rendered width changes; the column declarations the table was
//! built with are left alone.

use tracing::debug;

/// An active drag on one column's resize handle.
///
/// Acquired by [`ResizeController::begin`] and consumed by
/// [`ResizeController::end`], so a session is released exactly once.
#[derive(Debug)]
pub struct DragSession {
    column: usize,
    last_x: u16,
    moves: usize,
}

impl DragSession {
    pub const fn column(&self) -> usize {
        self.column
    }

    fn release(self) -> usize {
        debug!(column = self.column, moves = self.moves, "Column drag released");
        self.column
    }
}

#[derive(Debug)]
pub struct ResizeController {
    widths: Vec<u16>,
    session: Option<DragSession>,
}

impl ResizeController {
    pub const fn new(widths: Vec<u16>) -> Self {
        Self {
            widths,
            session: None,
        }
    }

    pub fn widths(&self) -> &[u16] {
        &self.widths
    }

    pub const fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn dragging_column(&self) -> Option<usize> {
        self.session.as_ref().map(DragSession::column)
    }

    /// Start a drag on `column` at pointer position `x`.
    ///
    /// Returns `false` if the column does not exist or a drag is already in
    /// progress.
    pub fn begin(&mut self, column: usize, x: u16) -> bool {
        if self.session.is_some() || column >= self.widths.len() {
            return false;
        }
        debug!(column, x, "Column drag started");
        self.session = Some(DragSession {
            column,
            last_x: x,
            moves: 0,
        });
        true
    }

    /// Pointer moved to `x` during a drag: widen or narrow the dragged column
    /// by the distance travelled since the last position. Returns the new
    /// width, or `None` when no drag is active.
    pub fn drag_to(&mut self, x: u16) -> Option<u16> {
        let session = self.session.as_mut()?;
        let delta = i32::from(x) - i32::from(session.last_x);
        session.last_x = x;
        session.moves += 1;
        let column = session.column;
        Some(self.resize_by(column, delta))
    }

    /// End the drag, if any. Returns the column that was being resized.
    pub fn end(&mut self) -> Option<usize> {
        self.session.take().map(DragSession::release)
    }

    /// Apply `delta` cells to the width of `column`, never going below zero.
    pub fn resize_by(&mut self, column: usize, delta: i32) -> u16 {
        let Some(width) = self.widths.get_mut(column) else {
            return 0;
        };
        let resized = (i32::from(*width) + delta).clamp(0, i32::from(u16::MAX));
        *width = u16::try_from(resized).unwrap_or(u16::MAX);
        *width
    }
}
