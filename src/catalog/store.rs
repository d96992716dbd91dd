//! In-memory product catalog behind the [`DataSource`] contract.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::catalog::product::Product;
use crate::table::{DataSource, OrderBy, Page, Query, SaveError, SaveResult};

/// Products keyed by id. Nothing is persisted.
#[derive(Debug, Default)]
pub struct ProductStore {
    products: RwLock<BTreeMap<u32, Product>>,
}

impl ProductStore {
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: RwLock::new(products.into_iter().map(|p| (p.id, p)).collect()),
        }
    }

    /// Seed from a JSON array of products.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read data file: {}", path.display()))?;
        let products: Vec<Product> = serde_json::from_str(&content)
            .wrap_err_with(|| format!("Failed to parse data file: {}", path.display()))?;
        info!(count = products.len(), path = %path.display(), "Loaded products");
        Ok(Self::new(products))
    }

    fn validate(product: &Product) -> SaveResult<()> {
        if product.sku.trim().is_empty() {
            return Err(SaveError::field("sku", "Sku is required"));
        }
        if product.name.trim().is_empty() {
            return Err(SaveError::field("name", "Name is required"));
        }
        if !product.price.is_finite() || product.price < 0.0 {
            return Err(SaveError::field("price", "Price must not be negative"));
        }
        Ok(())
    }

    fn compare(a: &Product, b: &Product, order: &OrderBy) -> Ordering {
        let ordering = a.field(&order.field).compare(&b.field(&order.field));
        if order.is_descending() { ordering.reverse() } else { ordering }
    }

    fn matches(product: &Product, query: &Query) -> bool {
        let search = query.search.as_deref().map(str::to_lowercase);
        if let Some(search) = search
            && !product.name.to_lowercase().contains(&search)
        {
            return false;
        }
        // An empty filter value means "any".
        query.filter.iter().flatten().all(|(field, value)| {
            value.is_empty() || product.field(field).to_string() == *value
        })
    }
}

#[async_trait]
impl DataSource for ProductStore {
    type Row = Product;

    async fn list(&self, query: Query) -> Page<Product> {
        let products = self.products.read().await;
        let mut rows: Vec<Product> = products
            .values()
            .filter(|p| Self::matches(p, &query))
            .cloned()
            .collect();

        if let Some(order) = &query.order_by {
            rows.sort_by(|a, b| Self::compare(a, b, order));
        }

        let count = rows.len();
        let rows: Vec<Product> = rows
            .into_iter()
            .skip(query.offset())
            .take(query.page_size)
            .collect();
        debug!(?query, rows = rows.len(), count, "Listed products");
        Page { rows, count }
    }

    async fn create(&self, product: Product) -> SaveResult<Product> {
        Self::validate(&product)?;
        let mut products = self.products.write().await;
        if products.contains_key(&product.id) {
            return Err(SaveError::field(
                "id",
                format!("Id {} is already taken", product.id),
            ));
        }
        products.insert(product.id, product.clone());
        Ok(product)
    }

    /// Inserts the product if its id is unknown.
    async fn update(&self, product: Product) -> SaveResult<Product> {
        Self::validate(&product)?;
        self.products
            .write()
            .await
            .insert(product.id, product.clone());
        Ok(product)
    }

    /// Deleting a product that is already gone succeeds.
    async fn delete(&self, product: Product) -> SaveResult<Product> {
        self.products.write().await.remove(&product.id);
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ProductStore {
        ProductStore::new(Product::samples())
    }

    fn query(page_number: usize) -> Query {
        Query {
            page_size: 5,
            page_number,
            search: None,
            order_by: None,
            filter: None,
        }
    }

    fn names(page: &Page<Product>) -> Vec<&str> {
        page.rows.iter().map(|p| p.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_pages_of_five() {
        let store = store();
        let first = store.list(query(1)).await;
        assert_eq!(first.rows.len(), 5);
        assert_eq!(first.count, 8);
        let second = store.list(query(2)).await;
        assert_eq!(
            second.rows.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![6, 7, 8]
        );
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_on_name() {
        let page = store()
            .list(Query {
                search: Some("APPLE".into()),
                ..query(1)
            })
            .await;
        assert_eq!(names(&page), vec!["Australian Apple", "American Apple"]);
        assert_eq!(page.count, 2);
    }

    #[tokio::test]
    async fn test_sort_by_price_descending() {
        let page = store()
            .list(Query {
                order_by: Some(OrderBy::descending("price")),
                ..query(1)
            })
            .await;
        let prices: Vec<f64> = page.rows.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![18.0, 17.0, 16.0, 15.0, 8.0]);
    }

    #[tokio::test]
    async fn test_sort_by_name_is_alphabetical() {
        let page = store()
            .list(Query {
                order_by: Some(OrderBy::ascending("name")),
                ..query(1)
            })
            .await;
        assert_eq!(page.rows[0].name, "American Apple");
        assert_eq!(page.rows[1].name, "American Banana");
    }

    #[tokio::test]
    async fn test_stock_filter() {
        let store = store();
        let filter = |value: &str| Query {
            filter: Some(BTreeMap::from([("stock".to_string(), value.to_string())])),
            ..query(1)
        };
        assert_eq!(store.list(filter("")).await.count, 8);
        assert_eq!(store.list(filter("true")).await.count, 7);
        let out = store.list(filter("false")).await;
        assert_eq!(names(&out), vec!["American Banana"]);
    }

    #[tokio::test]
    async fn test_create_rejects_taken_id_and_missing_name() {
        let store = store();
        let taken = store
            .create(Product::new(1, "sku100", "Pear", 3.0, true))
            .await
            .unwrap_err();
        assert_eq!(taken.field.as_deref(), Some("id"));

        let unnamed = store
            .create(Product::new(9, "sku009", " ", 3.0, true))
            .await
            .unwrap_err();
        assert_eq!(unnamed, SaveError::field("name", "Name is required"));
        assert_eq!(store.products.read().await.len(), 8);
    }

    #[tokio::test]
    async fn test_created_product_is_listed() {
        let store = store();
        store
            .create(Product::new(9, "sku009", "Kiwi", 2.5, true))
            .await
            .unwrap();
        let page = store
            .list(Query {
                search: Some("kiwi".into()),
                ..query(1)
            })
            .await;
        assert_eq!(page.rows[0].id, 9);
        assert_eq!(store.list(query(1)).await.count, 9);
    }

    #[tokio::test]
    async fn test_update_upserts_and_delete_is_idempotent() {
        let store = store();
        let mut apple = Product::samples()[0].clone();
        apple.price = 5.5;
        store.update(apple.clone()).await.unwrap();
        store
            .update(Product::new(20, "sku020", "Plum", 1.0, false))
            .await
            .unwrap();
        assert_eq!(store.products.read().await.len(), 9);

        store.delete(apple.clone()).await.unwrap();
        store.delete(apple).await.unwrap();
        assert_eq!(store.products.read().await.len(), 8);
    }
}
