//! Demo product catalog wired to the table.

mod form;
mod product;
mod store;

use std::sync::Arc;

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

pub use form::ProductForm;
pub use product::Product;
pub use store::ProductStore;

use crate::Theme;
use crate::config::KeyResolver;
use crate::table::{Column, DataTableOptions, DropdownFilter, DropdownOption, EditForm, FormFactory};

pub fn columns(theme: &Theme) -> Vec<Column<Product>> {
    let in_stock = Style::default().fg(theme.success());
    let sold_out = Style::default().fg(theme.error()).add_modifier(Modifier::DIM);
    vec![
        Column::new("Id", "id", |p: &Product| p.id.into())
            .with_style(Style::default().fg(theme.muted())),
        Column::new("Sku", "sku", |p: &Product| p.sku.as_str().into())
            .sortable(false)
            .with_width(10),
        Column::new("Name", "name", |p: &Product| p.name.as_str().into())
            .sortable(false)
            .with_width(22),
        Column::new("Price", "price", |p: &Product| p.price.into())
            .with_width(10)
            .with_render(|p, _| Line::from(format!("${:.2}", p.price)).right_aligned()),
        Column::new("Stock", "stock", |p: &Product| p.stock.into())
            .sortable(false)
            .with_render(move |p, _| {
                if p.stock {
                    Line::from(Span::styled("✔", in_stock))
                } else {
                    Line::from(Span::styled("✘", sold_out))
                }
            }),
    ]
}

pub fn stock_filter() -> DropdownFilter {
    DropdownFilter::new(
        "stock",
        vec![
            DropdownOption::new("All", ""),
            DropdownOption::new("In stock", "true"),
            DropdownOption::new("Out of stock", "false"),
        ],
    )
    .on_select(|value| tracing::info!(value, "Stock filter changed"))
}

pub fn form_factory(resolver: Arc<KeyResolver>) -> FormFactory<Product> {
    Box::new(move |product: Option<&Product>| {
        Box::new(ProductForm::new(product, Arc::clone(&resolver))) as Box<dyn EditForm<Row = Product>>
    })
}

/// Table configuration for the catalog.
pub fn table_options(
    theme: &Theme,
    resolver: Arc<KeyResolver>,
    page_size: usize,
    searchable: bool,
) -> DataTableOptions<Product> {
    DataTableOptions::new(columns(theme), form_factory(resolver))
        .page_size(page_size)
        .searchable(searchable)
        .dropdown(stock_filter())
}
