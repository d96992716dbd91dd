//! Commands for data source operations.
//!
//! These commands call the data source and send results back through the
//! table's message channel.

use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use tokio::sync::mpsc::UnboundedSender;

use crate::commands::Command;
use crate::table::{DataSource, Query, Record, SaveMode, SaveTicket, TableMsg};

type Tx<S> = UnboundedSender<TableMsg<<S as DataSource>::Row>>;

fn send<R>(tx: &UnboundedSender<TableMsg<R>>, msg: TableMsg<R>) -> Result<()> {
    tx.send(msg).map_err(|_| eyre!("Table is gone, dropping result"))
}

/// Fetch one page.
pub struct FetchPageCmd<S: DataSource> {
    source: Arc<S>,
    query: Query,
    seq: u64,
    tx: Tx<S>,
}

impl<S: DataSource> FetchPageCmd<S> {
    pub const fn new(source: Arc<S>, query: Query, seq: u64, tx: Tx<S>) -> Self {
        Self {
            source,
            query,
            seq,
            tx,
        }
    }
}

#[async_trait]
impl<S: DataSource> Command for FetchPageCmd<S> {
    fn name(&self) -> String {
        format!("Loading page {} (#{})", self.query.page_number, self.seq)
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        let page = self.source.list(self.query).await;
        send(&self.tx, TableMsg::PageLoaded { seq: self.seq, page })
    }
}

/// Create or update a row, depending on how the form was opened.
pub struct SaveRowCmd<S: DataSource> {
    source: Arc<S>,
    row: S::Row,
    ticket: SaveTicket,
    tx: Tx<S>,
}

impl<S: DataSource> SaveRowCmd<S> {
    pub const fn new(source: Arc<S>, row: S::Row, ticket: SaveTicket, tx: Tx<S>) -> Self {
        Self {
            source,
            row,
            ticket,
            tx,
        }
    }
}

#[async_trait]
impl<S: DataSource> Command for SaveRowCmd<S> {
    fn name(&self) -> String {
        match self.ticket.mode {
            SaveMode::Create => "Creating row".to_string(),
            SaveMode::Update => format!("Updating row {:?}", self.row.key()),
        }
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        let ticket = self.ticket;
        let result = match ticket.mode {
            SaveMode::Create => self.source.create(self.row).await,
            SaveMode::Update => self.source.update(self.row).await,
        };
        send(&self.tx, TableMsg::SaveCompleted { ticket, result })
    }
}

/// Delete a row the user already confirmed.
pub struct DeleteRowCmd<S: DataSource> {
    source: Arc<S>,
    row: S::Row,
    tx: Tx<S>,
}

impl<S: DataSource> DeleteRowCmd<S> {
    pub const fn new(source: Arc<S>, row: S::Row, tx: Tx<S>) -> Self {
        Self { source, row, tx }
    }
}

#[async_trait]
impl<S: DataSource> Command for DeleteRowCmd<S> {
    fn name(&self) -> String {
        format!("Deleting row {:?}", self.row.key())
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        let result = self.source.delete(self.row).await;
        send(&self.tx, TableMsg::DeleteCompleted(result))
    }
}
