use crate::table::overlay::SaveTicket;
use crate::table::source::{Page, SaveResult};

/// Everything that can change a [`DataTable`](crate::table::DataTable).
///
/// Input handlers and async commands queue these; `update()` drains them.
#[derive(Debug)]
pub enum TableMsg<R> {
    /// Refetch the current page with unchanged query state.
    Refresh,
    PrevPage,
    NextPage,
    SubmitSearch(String),
    /// Header of the column at this index was activated.
    SortColumn(usize),
    /// Dropdown filter switched to this option index.
    SelectFilter(usize),

    OpenNew,
    OpenEdit(R),
    CloseForm,
    SaveForm(R),

    RequestDelete(R),
    ConfirmDelete,
    CancelDelete,

    PageLoaded { seq: u64, page: Page<R> },
    SaveCompleted { ticket: SaveTicket, result: SaveResult<R> },
    DeleteCompleted(SaveResult<R>),
}
