//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use bigdecimal::BigDecimal;

use crate::types::*;

/// Storage abstraction over the remote ledger store.
///
/// This trait lets the retail core run against any table-shaped backend
/// (a hosted relational store, SQLite, in-memory, etc.) by implementing
/// row CRUD for the seven tables plus, where the backend offers one, the
/// atomic numeric-increment primitive.
///
/// None of these calls are assumed to share a transaction: the workflows
/// in [`crate::ops`] treat each one as an independent durable write and
/// surface mid-sequence failures as [`CoreError::PartialWrite`].
#[async_trait]
pub trait LedgerStore: Send + Sync {
    // Customers

    /// Save a new customer row
    async fn save_customer(&mut self, customer: &Customer) -> CoreResult<()>;

    /// Get a customer by id
    async fn get_customer(&self, customer_id: &str) -> CoreResult<Option<Customer>>;

    /// List all customers
    async fn list_customers(&self) -> CoreResult<Vec<Customer>>;

    /// Update an existing customer row
    async fn update_customer(&mut self, customer: &Customer) -> CoreResult<()>;

    /// Delete a customer. Does not cascade to their orders.
    async fn delete_customer(&mut self, customer_id: &str) -> CoreResult<()>;

    // Products

    /// Save a new product row
    async fn save_product(&mut self, product: &Product) -> CoreResult<()>;

    /// Get a product by id
    async fn get_product(&self, product_id: &str) -> CoreResult<Option<Product>>;

    /// List all products
    async fn list_products(&self) -> CoreResult<Vec<Product>>;

    /// Update an existing product row
    async fn update_product(&mut self, product: &Product) -> CoreResult<()>;

    /// Overwrite only a product's latest unit cost (last-cost-wins pricing)
    async fn set_product_unit_price(
        &mut self,
        product_id: &str,
        unit_price: &BigDecimal,
    ) -> CoreResult<()>;

    /// Delete a product
    async fn delete_product(&mut self, product_id: &str) -> CoreResult<()>;

    // Orders

    /// Insert an order header row. Lines are written separately, so an
    /// order can be observed with zero lines after a mid-workflow failure.
    async fn insert_order(&mut self, order: &Order) -> CoreResult<()>;

    /// Insert the line rows for an order
    async fn insert_order_lines(&mut self, order_id: &str, lines: &[OrderLine]) -> CoreResult<()>;

    /// Get an order by id with its lines hydrated
    async fn get_order(&self, order_id: &str) -> CoreResult<Option<Order>>;

    /// List all orders for a customer
    async fn list_customer_orders(&self, customer_id: &str) -> CoreResult<Vec<Order>>;

    /// List a customer's orders with `payment_status != Paid`, ordered by
    /// creation time ascending. The ordering is a contract: payment
    /// allocation settles strictly oldest-first.
    async fn list_outstanding_orders(&self, customer_id: &str) -> CoreResult<Vec<Order>>;

    /// Apply a sparse field patch to an order row
    async fn update_order_fields(&mut self, order_id: &str, patch: &OrderPatch) -> CoreResult<()>;

    /// Delete an order row. Cascading the line rows is the store's
    /// responsibility.
    async fn delete_order(&mut self, order_id: &str) -> CoreResult<()>;

    // Purchases

    /// Insert a purchase header row
    async fn insert_purchase(&mut self, purchase: &Purchase) -> CoreResult<()>;

    /// Insert the line rows for a purchase
    async fn insert_purchase_lines(
        &mut self,
        purchase_id: &str,
        lines: &[PurchaseItem],
    ) -> CoreResult<()>;

    /// Get a purchase by id with its lines hydrated
    async fn get_purchase(&self, purchase_id: &str) -> CoreResult<Option<Purchase>>;

    /// List all purchases
    async fn list_purchases(&self) -> CoreResult<Vec<Purchase>>;

    /// Set a purchase's lifecycle status
    async fn update_purchase_status(
        &mut self,
        purchase_id: &str,
        status: PurchaseStatus,
    ) -> CoreResult<()>;

    /// Delete a purchase row and its lines. Stock is left untouched.
    async fn delete_purchase(&mut self, purchase_id: &str) -> CoreResult<()>;

    // Expenses

    /// Insert an expense row
    async fn insert_expense(&mut self, expense: &Expense) -> CoreResult<()>;

    /// List all expenses
    async fn list_expenses(&self) -> CoreResult<Vec<Expense>>;

    /// Delete an expense row
    async fn delete_expense(&mut self, expense_id: &str) -> CoreResult<()>;

    // Atomic increment primitive

    /// Whether this store offers the single-field atomic increment
    /// primitive. When `false` the core falls back to read-modify-write
    /// and logs the degraded-consistency path.
    fn supports_atomic_adjust(&self) -> bool {
        false
    }

    /// Atomically add `delta` to a customer's balance and return the new
    /// value. Only called when [`supports_atomic_adjust`] is `true`.
    ///
    /// [`supports_atomic_adjust`]: LedgerStore::supports_atomic_adjust
    async fn adjust_customer_balance(
        &mut self,
        customer_id: &str,
        delta: &BigDecimal,
    ) -> CoreResult<BigDecimal> {
        let _ = (customer_id, delta);
        Err(CoreError::Storage(
            "atomic balance adjust not supported by this store".to_string(),
        ))
    }

    /// Atomically add `delta` to a product's stock level and return the new
    /// value. Only called when [`supports_atomic_adjust`] is `true`.
    ///
    /// [`supports_atomic_adjust`]: LedgerStore::supports_atomic_adjust
    async fn adjust_stock_level(&mut self, product_id: &str, delta: i64) -> CoreResult<i64> {
        let _ = (product_id, delta);
        Err(CoreError::Storage(
            "atomic stock adjust not supported by this store".to_string(),
        ))
    }
}

/// Trait for implementing custom order draft validation rules
pub trait OrderValidator: Send + Sync {
    /// Validate an order draft before any write happens
    fn validate_draft(&self, draft: &OrderDraft) -> CoreResult<()>;
}

/// Trait for implementing custom purchase draft validation rules
pub trait PurchaseValidator: Send + Sync {
    /// Validate a purchase draft before any write happens
    fn validate_draft(&self, draft: &PurchaseDraft) -> CoreResult<()>;
}

/// Default order validator with basic rules
pub struct DefaultOrderValidator;

impl OrderValidator for DefaultOrderValidator {
    fn validate_draft(&self, draft: &OrderDraft) -> CoreResult<()> {
        if draft.customer_id.trim().is_empty() {
            return Err(CoreError::Validation(
                "Order must reference a customer".to_string(),
            ));
        }

        if draft.lines.is_empty() {
            return Err(CoreError::Validation(
                "Order must have at least one line".to_string(),
            ));
        }

        for line in &draft.lines {
            if line.product_id.trim().is_empty() {
                return Err(CoreError::Validation(
                    "Order line must reference a product".to_string(),
                ));
            }
            if line.quantity <= 0 {
                return Err(CoreError::Validation(
                    "Order line quantity must be positive".to_string(),
                ));
            }
            if line.free_quantity < 0 {
                return Err(CoreError::Validation(
                    "Order line free quantity cannot be negative".to_string(),
                ));
            }
            if line.selling_price < BigDecimal::from(0) {
                return Err(CoreError::Validation(
                    "Order line selling price cannot be negative".to_string(),
                ));
            }
        }

        if draft.amount_paid < BigDecimal::from(0) {
            return Err(CoreError::Validation(
                "Amount paid cannot be negative".to_string(),
            ));
        }

        Ok(())
    }
}

/// Default purchase validator with basic rules
pub struct DefaultPurchaseValidator;

impl PurchaseValidator for DefaultPurchaseValidator {
    fn validate_draft(&self, draft: &PurchaseDraft) -> CoreResult<()> {
        if draft.supplier_name.trim().is_empty() {
            return Err(CoreError::Validation(
                "Purchase must name a supplier".to_string(),
            ));
        }

        if draft.lines.is_empty() {
            return Err(CoreError::Validation(
                "Purchase must have at least one line".to_string(),
            ));
        }

        for line in &draft.lines {
            if line.product_id.trim().is_empty() {
                return Err(CoreError::Validation(
                    "Purchase line must reference a product".to_string(),
                ));
            }
            if line.quantity <= 0 {
                return Err(CoreError::Validation(
                    "Purchase line quantity must be positive".to_string(),
                ));
            }
            if line.unit_cost < BigDecimal::from(0) {
                return Err(CoreError::Validation(
                    "Purchase line unit cost cannot be negative".to_string(),
                ));
            }
        }

        Ok(())
    }
}
