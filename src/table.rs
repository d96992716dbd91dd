//! Generic CRUD table: paginated listing, search, single-column sort, an
//! optional dropdown filter, column resizing and an edit overlay, over any
//! [`DataSource`].

mod column;
mod data_table;
mod dropdown;
mod fetch;
mod grid;
mod message;
mod overlay;
mod pager;
mod query;
mod resize;
mod source;
mod toolbar;
mod value;

pub use column::Column;
pub use data_table::{DataTable, DataTableOptions, UpdateResult};
pub use dropdown::{DropdownFilter, DropdownOption};
pub use message::TableMsg;
pub use overlay::{EditForm, FormErrors, FormEvent, FormFactory, SaveMode, SaveTicket};
pub use query::{OrderBy, Query};
pub use source::{DataSource, Page, Record, SaveError, SaveResult};
pub use value::Value;
