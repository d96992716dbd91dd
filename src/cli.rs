use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "lazytable", version, about = "CRUD table for the terminal")]
pub struct Args {
    /// Rows per page (overrides the config file)
    #[arg(short, long)]
    pub page_size: Option<usize>,

    /// Seed the catalog from a JSON array of products
    #[arg(short, long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// Hide the search box
    #[arg(long)]
    pub no_search: bool,

    /// Theme name (e.g., "Catppuccin Latte")
    #[arg(short, long)]
    pub theme: Option<String>,

    /// Config file to use instead of the default location
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
