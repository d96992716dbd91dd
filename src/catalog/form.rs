use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::Theme;
use crate::catalog::product::Product;
use crate::config::{FormAction, KeyResolver};
use crate::table::{EditForm, FormErrors, FormEvent};
use crate::ui::{Component, EventResult, Result, TextInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Sku,
    Name,
    Price,
    Stock,
}

impl Field {
    const ALL: [Self; 5] = [Self::Id, Self::Sku, Self::Name, Self::Price, Self::Stock];

    const fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Sku => "sku",
            Self::Name => "name",
            Self::Price => "price",
            Self::Stock => "stock",
        }
    }
}

/// Edit form for one product.
///
/// The id can only be chosen for new products. Id and price are parsed on
/// save; unparsable input is reported next to the field without asking the
/// store.
pub struct ProductForm {
    id: TextInput,
    sku: TextInput,
    name: TextInput,
    price: TextInput,
    stock: bool,
    editing: bool,
    focus: Field,
    /// Parse error found before the row ever reached the store.
    local_error: Option<(Field, String)>,
    resolver: Arc<KeyResolver>,
}

impl ProductForm {
    pub fn new(product: Option<&Product>, resolver: Arc<KeyResolver>) -> Self {
        let id = product.map(|p| p.id.to_string()).unwrap_or_default();
        let price = product.map(|p| p.price.to_string()).unwrap_or_default();
        let mut form = Self {
            id: TextInput::new("Id").with_value(id).with_placeholder("1"),
            sku: TextInput::new("Sku").with_value(product.map(|p| p.sku.clone()).unwrap_or_default()),
            name: TextInput::new("Name").with_value(product.map(|p| p.name.clone()).unwrap_or_default()),
            price: TextInput::new("Price").with_value(price).with_placeholder("0.00"),
            stock: product.is_some_and(|p| p.stock),
            editing: product.is_some(),
            focus: if product.is_some() { Field::Sku } else { Field::Id },
            local_error: None,
            resolver,
        };
        form.sync_focus();
        form
    }

    fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        Field::ALL
            .into_iter()
            .filter(|f| !(self.editing && *f == Field::Id))
    }

    fn move_focus(&mut self, forward: bool) {
        let fields: Vec<Field> = self.fields().collect();
        let current = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (current + 1) % fields.len()
        } else {
            (current + fields.len() - 1) % fields.len()
        };
        self.focus = fields[next];
        self.sync_focus();
    }

    fn sync_focus(&mut self) {
        let focus = self.focus;
        for (field, input) in self.inputs_mut() {
            input.set_focused(field == focus);
        }
    }

    fn inputs_mut(&mut self) -> [(Field, &mut TextInput); 4] {
        [
            (Field::Id, &mut self.id),
            (Field::Sku, &mut self.sku),
            (Field::Name, &mut self.name),
            (Field::Price, &mut self.price),
        ]
    }

    fn focused_input(&mut self) -> Option<&mut TextInput> {
        match self.focus {
            Field::Id => Some(&mut self.id),
            Field::Sku => Some(&mut self.sku),
            Field::Name => Some(&mut self.name),
            Field::Price => Some(&mut self.price),
            Field::Stock => None,
        }
    }

    fn build(&self) -> std::result::Result<Product, (Field, String)> {
        let id = self
            .id
            .value()
            .trim()
            .parse::<u32>()
            .map_err(|_| (Field::Id, "Id must be a whole number".to_string()))?;
        let price = self
            .price
            .value()
            .trim()
            .parse::<f64>()
            .map_err(|_| (Field::Price, "Price must be a number".to_string()))?;
        Ok(Product {
            id,
            sku: self.sku.value().trim().to_string(),
            name: self.name.value().trim().to_string(),
            price,
            stock: self.stock,
        })
    }
}

impl EditForm for ProductForm {
    type Row = Product;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<FormEvent<Product>>> {
        let r = Arc::clone(&self.resolver);

        if r.matches_form(&key, FormAction::Save) {
            return Ok(match self.build() {
                Ok(product) => {
                    self.local_error = None;
                    FormEvent::Save(product).into()
                }
                Err(error) => {
                    self.focus = error.0;
                    self.sync_focus();
                    self.local_error = Some(error);
                    EventResult::Consumed
                }
            });
        }
        if r.matches_form(&key, FormAction::Cancel) {
            return Ok(FormEvent::Close.into());
        }
        if r.matches_form(&key, FormAction::NextField) {
            self.move_focus(true);
            return Ok(EventResult::Consumed);
        }
        if r.matches_form(&key, FormAction::PrevField) {
            self.move_focus(false);
            return Ok(EventResult::Consumed);
        }
        if self.focus == Field::Stock {
            if r.matches_form(&key, FormAction::Toggle) {
                self.stock = !self.stock;
                return Ok(EventResult::Consumed);
            }
            return Ok(EventResult::Ignored);
        }

        let Some(input) = self.focused_input() else {
            return Ok(EventResult::Ignored);
        };
        Ok(match input.handle_key(key)? {
            EventResult::Ignored => EventResult::Ignored,
            _ => EventResult::Consumed,
        })
    }

    fn handle_paste(&mut self, text: &str) -> bool {
        self.focused_input().is_some_and(|input| input.handle_paste(text))
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme, errors: &FormErrors) {
        let local = self.local_error.clone();
        let error_for = |field: Field| match &local {
            Some((f, message)) if *f == field => Some(message.clone()),
            Some(_) => None,
            None => errors.field(field.name()).map(str::to_string),
        };

        let [id, sku, name, price, stock, general] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        for (field, input) in self.inputs_mut() {
            input.set_error(error_for(field));
        }
        self.id.render(frame, id, theme);
        self.sku.render(frame, sku, theme);
        self.name.render(frame, name, theme);
        self.price.render(frame, price, theme);

        let stock_style = if self.focus == Field::Stock {
            Style::default().fg(theme.selection_fg()).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text())
        };
        let check = if self.stock { "[x]" } else { "[ ]" };
        let mut stock_line = vec![Span::styled(format!(" {check} In stock"), stock_style)];
        if let Some(message) = error_for(Field::Stock) {
            stock_line.push(Span::styled(format!("  {message}"), Style::default().fg(theme.error())));
        }
        frame.render_widget(Paragraph::new(Line::from(stock_line)), stock);

        if local.is_none()
            && let Some(message) = errors.general()
        {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!(" {message}"),
                    Style::default().fg(theme.error()).add_modifier(Modifier::BOLD),
                )),
                general,
            );
        }
    }

    fn height(&self) -> u16 {
        14
    }
}
