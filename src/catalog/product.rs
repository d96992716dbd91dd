use serde::{Deserialize, Serialize};

use crate::table::{Record, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub sku: String,
    pub name: String,
    pub price: f64,
    pub stock: bool,
}

impl Product {
    pub fn new(id: u32, sku: &str, name: &str, price: f64, stock: bool) -> Self {
        Self {
            id,
            sku: sku.to_string(),
            name: name.to_string(),
            price,
            stock,
        }
    }

    /// Project a field by name. Unknown fields are `Null`.
    pub fn field(&self, field: &str) -> Value {
        match field {
            "id" => self.id.into(),
            "sku" => self.sku.as_str().into(),
            "name" => self.name.as_str().into(),
            "price" => self.price.into(),
            "stock" => self.stock.into(),
            _ => Value::Null,
        }
    }

    /// Demo catalog shown when no data file is given.
    pub fn samples() -> Vec<Self> {
        vec![
            Self::new(1, "sku001", "Australian Apple", 5.0, true),
            Self::new(2, "sku002", "Australian Banana", 6.0, true),
            Self::new(3, "sku003", "American Apple", 7.0, true),
            Self::new(4, "sku004", "American Banana", 8.0, false),
            Self::new(5, "sku005", "Australian Beef", 15.0, true),
            Self::new(6, "sku006", "Australian Lamb", 16.0, true),
            Self::new(7, "sku007", "American Beef", 17.0, true),
            Self::new(8, "sku008", "American Lamb", 18.0, true),
        ]
    }
}

impl Record for Product {
    type Key = u32;

    fn key(&self) -> u32 {
        self.id
    }
}
