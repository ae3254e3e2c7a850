//! Product intake and maintenance

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::traits::LedgerStore;
use crate::types::*;

/// Product manager for catalog intake and maintenance.
///
/// `stock_level` and `unit_price` are not writable here after creation:
/// stock moves through the purchase and order workflows and the unit cost
/// is overwritten by purchases (last-cost-wins).
pub struct ProductManager<S: LedgerStore> {
    pub(crate) storage: S,
}

impl<S: LedgerStore> ProductManager<S> {
    /// Create a new product manager
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Create a new product with an opening stock figure
    pub async fn create_product(
        &mut self,
        sku: String,
        name: String,
        price: BigDecimal,
        unit_price: BigDecimal,
        opening_stock: i64,
        reorder_level: i64,
    ) -> CoreResult<Product> {
        if sku.trim().is_empty() {
            return Err(CoreError::Validation(
                "Product SKU cannot be empty".to_string(),
            ));
        }
        if name.trim().is_empty() {
            return Err(CoreError::Validation(
                "Product name cannot be empty".to_string(),
            ));
        }
        if price < BigDecimal::from(0) || unit_price < BigDecimal::from(0) {
            return Err(CoreError::Validation(
                "Product prices cannot be negative".to_string(),
            ));
        }
        if opening_stock < 0 || reorder_level < 0 {
            return Err(CoreError::Validation(
                "Stock figures cannot be negative".to_string(),
            ));
        }

        let mut product = Product::new(Uuid::new_v4().to_string(), sku, name, price);
        product.unit_price = unit_price;
        product.stock_level = opening_stock;
        product.reorder_level = reorder_level;

        self.storage.save_product(&product).await?;
        Ok(product)
    }

    /// Get a product by id
    pub async fn get_product(&self, product_id: &str) -> CoreResult<Option<Product>> {
        self.storage.get_product(product_id).await
    }

    /// Get a product by id, returning an error if not found
    pub async fn get_product_required(&self, product_id: &str) -> CoreResult<Product> {
        self.storage
            .get_product(product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))
    }

    /// List all products
    pub async fn list_products(&self) -> CoreResult<Vec<Product>> {
        self.storage.list_products().await
    }

    /// Update a product's display, selling price, and reorder threshold.
    /// Stock level and unit cost on the stored row are preserved as-is.
    pub async fn update_product_details(
        &mut self,
        product_id: &str,
        name: String,
        price: BigDecimal,
        reorder_level: i64,
    ) -> CoreResult<Product> {
        if name.trim().is_empty() {
            return Err(CoreError::Validation(
                "Product name cannot be empty".to_string(),
            ));
        }
        if price < BigDecimal::from(0) {
            return Err(CoreError::Validation(
                "Product price cannot be negative".to_string(),
            ));
        }
        if reorder_level < 0 {
            return Err(CoreError::Validation(
                "Reorder level cannot be negative".to_string(),
            ));
        }

        let mut product = self.get_product_required(product_id).await?;
        product.name = name;
        product.price = price;
        product.reorder_level = reorder_level;
        product.updated_at = chrono::Utc::now().naive_utc();

        self.storage.update_product(&product).await?;
        Ok(product)
    }

    /// Delete a product
    pub async fn delete_product(&mut self, product_id: &str) -> CoreResult<()> {
        if self.storage.get_product(product_id).await?.is_none() {
            return Err(CoreError::ProductNotFound(product_id.to_string()));
        }
        self.storage.delete_product(product_id).await
    }
}
