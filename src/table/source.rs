//! Contract between the table and wherever its rows live.
//!
//! A data source may be a REST client, a database or an in-memory map; the
//! table only ever talks to it through [`DataSource`].

use std::fmt;
use std::hash::Hash;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::table::query::Query;

/// A row the table can display.
///
/// `key` is the row's stable identity. Data sources use it to match rows on
/// update and delete; the table uses it to keep the cursor on the same row
/// across refetches.
pub trait Record: Clone + fmt::Debug + Send + Sync + 'static {
    type Key: Clone + Eq + Hash + fmt::Debug + Send + Sync;

    fn key(&self) -> Self::Key;
}

/// One page of rows plus the number of rows matching the query overall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<R> {
    pub rows: Vec<R>,
    pub count: usize,
}

/// Why a save was rejected.
///
/// With a `field` the message belongs next to that field in the edit form;
/// without one it is shown as a general form error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveError {
    pub field: Option<String>,
    pub message: String,
}

impl SaveError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{field}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for SaveError {}

pub type SaveResult<R> = Result<R, SaveError>;

/// Asynchronous CRUD operations backing a table.
///
/// Failures are reported by resolving to a [`SaveError`], never by
/// panicking. Transport problems must be mapped to one of the two error
/// shapes by the implementation.
#[async_trait]
pub trait DataSource: Send + Sync + 'static {
    type Row: Record;

    /// Fetch one page of rows matching `query`.
    async fn list(&self, query: Query) -> Page<Self::Row>;

    async fn create(&self, row: Self::Row) -> SaveResult<Self::Row>;

    async fn update(&self, row: Self::Row) -> SaveResult<Self::Row>;

    async fn delete(&self, row: Self::Row) -> SaveResult<Self::Row>;
}
