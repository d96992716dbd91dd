use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::catalog::{Product, ProductStore};
use crate::config::{AppConfig, KeyResolver};
use crate::table::DataTable;

mod app;
mod catalog;
mod cli;
pub mod commands;
mod config;
mod table;
mod theme;
pub mod tui;
mod ui;

pub use theme::Theme;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = initialize_logging()?;
    info!("Starting lazytable");

    let args = cli::Args::parse();

    let mut config = config::load(args.config.as_deref())?;
    apply_cli_args(&mut config, &args);
    config.validate()?;

    let resolver = Arc::new(KeyResolver::new(Arc::new(config.keybindings.clone())));
    let theme = theme::theme_from_name(&config.theme.name);

    let store = match &args.data {
        Some(path) => ProductStore::from_json_file(path)?,
        None => ProductStore::new(Product::samples()),
    };
    let options = catalog::table_options(
        &theme,
        Arc::clone(&resolver),
        config.table.page_size,
        config.table.searchable,
    );
    let table = DataTable::new(Arc::new(store), options, Arc::clone(&resolver));

    let mut app = App::new("Products", table, theme, resolver);
    app.run().await?;

    Ok(())
}

/// Command line flags win over the config file.
fn apply_cli_args(config: &mut AppConfig, args: &cli::Args) {
    if let Some(page_size) = args.page_size {
        config.table.page_size = page_size;
    }
    if args.no_search {
        config.table.searchable = false;
    }
    if let Some(theme) = &args.theme {
        config.theme.name.clone_from(theme);
    }
}

fn initialize_logging() -> Result<WorkerGuard> {
    let directory = dirs::data_local_dir().map_or_else(
        || std::path::PathBuf::from("logs"),
        |path| path.join("lazytable").join("logs"),
    );
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "lazytable.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}
