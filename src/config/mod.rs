pub mod actions;
mod defaults;
pub mod key;
pub mod keybindings;
pub mod loader;
pub mod resolver;

pub use actions::*;
use color_eyre::eyre::ensure;
use keybindings::KeybindingsConfig;
pub use loader::load;
pub use resolver::KeyResolver;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Catppuccin Mocha".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Rows per page. Fixed for the lifetime of a table.
    pub page_size: usize,
    /// Show the search box.
    pub searchable: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: 5,
            searchable: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub table: TableConfig,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

impl AppConfig {
    /// Reject configurations the table cannot work with.
    pub fn validate(&self) -> color_eyre::Result<()> {
        ensure!(self.table.page_size > 0, "table.page_size must be at least 1");
        Ok(())
    }
}
