//! Async commands pattern for side effects.
//!
//! Commands represent async operations that run outside the main event loop.
//! The table returns commands from `update()`, and the App spawns them. They
//! report back through the table's message channel.

mod table;

use async_trait::async_trait;
use color_eyre::Result;
pub use table::{DeleteRowCmd, FetchPageCmd, SaveRowCmd};

/// Async command that performs side effects.
#[async_trait]
pub trait Command: Send + 'static {
    /// Human-readable name for logs.
    /// Include context like the page number or row key.
    fn name(&self) -> String;

    /// Execute the command.
    async fn execute(self: Box<Self>) -> Result<()>;
}
