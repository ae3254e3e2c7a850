//! Main facade that coordinates the managers over one storage backend

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::ops::customers::CustomerManager;
use crate::ops::orders::OrderManager;
use crate::ops::payments::PaymentAllocator;
use crate::ops::products::ProductManager;
use crate::ops::purchases::PurchaseManager;
use crate::traits::*;
use crate::types::*;

/// Retail operations core composing the entity managers over a shared
/// storage backend
pub struct RetailCore<S: LedgerStore> {
    customers: CustomerManager<S>,
    products: ProductManager<S>,
    orders: OrderManager<S>,
    payments: PaymentAllocator<S>,
    purchases: PurchaseManager<S>,
}

impl<S: LedgerStore + Clone> RetailCore<S> {
    /// Create a new core with the given storage backend
    pub fn new(storage: S) -> Self {
        Self {
            customers: CustomerManager::new(storage.clone()),
            products: ProductManager::new(storage.clone()),
            orders: OrderManager::new(storage.clone()),
            payments: PaymentAllocator::new(storage.clone()),
            purchases: PurchaseManager::new(storage),
        }
    }

    /// Create a new core with custom draft validators
    pub fn with_validators(
        storage: S,
        order_validator: Box<dyn OrderValidator>,
        purchase_validator: Box<dyn PurchaseValidator>,
    ) -> Self {
        Self {
            customers: CustomerManager::new(storage.clone()),
            products: ProductManager::new(storage.clone()),
            orders: OrderManager::with_validator(storage.clone(), order_validator),
            payments: PaymentAllocator::new(storage.clone()),
            purchases: PurchaseManager::with_validator(storage, purchase_validator),
        }
    }

    // Customer operations

    /// Create a new customer with an opening balance
    pub async fn create_customer(
        &mut self,
        name: String,
        phone: Option<String>,
        email: Option<String>,
        address: Option<String>,
        opening_balance: BigDecimal,
    ) -> CoreResult<Customer> {
        self.customers
            .create_customer(name, phone, email, address, opening_balance)
            .await
    }

    /// Get a customer by id
    pub async fn get_customer(&self, customer_id: &str) -> CoreResult<Option<Customer>> {
        self.customers.get_customer(customer_id).await
    }

    /// List all customers
    pub async fn list_customers(&self) -> CoreResult<Vec<Customer>> {
        self.customers.list_customers().await
    }

    /// Update a customer's display and contact fields
    pub async fn update_customer_details(
        &mut self,
        customer_id: &str,
        name: String,
        phone: Option<String>,
        email: Option<String>,
        address: Option<String>,
    ) -> CoreResult<Customer> {
        self.customers
            .update_customer_details(customer_id, name, phone, email, address)
            .await
    }

    /// Delete a customer (orders are not cascaded)
    pub async fn delete_customer(&mut self, customer_id: &str) -> CoreResult<()> {
        self.customers.delete_customer(customer_id).await
    }

    // Product operations

    /// Create a new product
    pub async fn create_product(
        &mut self,
        sku: String,
        name: String,
        price: BigDecimal,
        unit_price: BigDecimal,
        opening_stock: i64,
        reorder_level: i64,
    ) -> CoreResult<Product> {
        self.products
            .create_product(sku, name, price, unit_price, opening_stock, reorder_level)
            .await
    }

    /// Get a product by id
    pub async fn get_product(&self, product_id: &str) -> CoreResult<Option<Product>> {
        self.products.get_product(product_id).await
    }

    /// List all products
    pub async fn list_products(&self) -> CoreResult<Vec<Product>> {
        self.products.list_products().await
    }

    /// Update a product's display, selling price, and reorder threshold
    pub async fn update_product_details(
        &mut self,
        product_id: &str,
        name: String,
        price: BigDecimal,
        reorder_level: i64,
    ) -> CoreResult<Product> {
        self.products
            .update_product_details(product_id, name, price, reorder_level)
            .await
    }

    /// Delete a product
    pub async fn delete_product(&mut self, product_id: &str) -> CoreResult<()> {
        self.products.delete_product(product_id).await
    }

    // Order workflows

    /// Create an order (see [`OrderManager::create_order`])
    pub async fn create_order(&mut self, draft: OrderDraft) -> CoreResult<Order> {
        self.orders.create_order(draft).await
    }

    /// Apply a sparse patch to an order (see [`OrderManager::update_order`])
    pub async fn update_order(&mut self, order_id: &str, patch: OrderPatch) -> CoreResult<()> {
        self.orders.update_order(order_id, patch).await
    }

    /// Delete an order, reversing its stock and balance side effects
    pub async fn delete_order(&mut self, order_id: &str) -> CoreResult<()> {
        self.orders.delete_order(order_id).await
    }

    /// Get an order by id with its lines hydrated
    pub async fn get_order(&self, order_id: &str) -> CoreResult<Option<Order>> {
        self.orders.get_order(order_id).await
    }

    /// List all orders for a customer
    pub async fn list_customer_orders(&self, customer_id: &str) -> CoreResult<Vec<Order>> {
        self.orders.list_customer_orders(customer_id).await
    }

    // Payment allocation

    /// Apply a lump payment across the customer's outstanding orders,
    /// oldest first (see [`PaymentAllocator::allocate_payment`])
    pub async fn allocate_payment(
        &mut self,
        customer_id: &str,
        amount: BigDecimal,
    ) -> CoreResult<()> {
        self.payments.allocate_payment(customer_id, amount).await
    }

    // Purchase workflows

    /// Record a purchase (see [`PurchaseManager::record_purchase`])
    pub async fn record_purchase(&mut self, draft: PurchaseDraft) -> CoreResult<Purchase> {
        self.purchases.record_purchase(draft).await
    }

    /// Get a purchase by id with its lines hydrated
    pub async fn get_purchase(&self, purchase_id: &str) -> CoreResult<Option<Purchase>> {
        self.purchases.get_purchase(purchase_id).await
    }

    /// List all purchases
    pub async fn list_purchases(&self) -> CoreResult<Vec<Purchase>> {
        self.purchases.list_purchases().await
    }

    /// Move a purchase to a new lifecycle status
    pub async fn set_purchase_status(
        &mut self,
        purchase_id: &str,
        status: PurchaseStatus,
    ) -> CoreResult<()> {
        self.purchases.set_purchase_status(purchase_id, status).await
    }

    /// Delete a purchase without reversing received stock
    pub async fn delete_purchase(&mut self, purchase_id: &str) -> CoreResult<()> {
        self.purchases.delete_purchase(purchase_id).await
    }

    // Expense log

    /// Record a flat expense row
    pub async fn record_expense(&mut self, draft: ExpenseDraft) -> CoreResult<Expense> {
        if draft.description.trim().is_empty() {
            return Err(CoreError::Validation(
                "Expense description cannot be empty".to_string(),
            ));
        }
        if draft.amount < BigDecimal::from(0) {
            return Err(CoreError::Validation(
                "Expense amount cannot be negative".to_string(),
            ));
        }

        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            date: draft.date,
            description: draft.description,
            amount: draft.amount,
            category: draft.category,
            payment_mode: draft.payment_mode,
            created_at: chrono::Utc::now().naive_utc(),
        };
        self.customers.storage.insert_expense(&expense).await?;
        Ok(expense)
    }

    /// List all expenses
    pub async fn list_expenses(&self) -> CoreResult<Vec<Expense>> {
        self.customers.storage.list_expenses().await
    }

    /// Delete an expense row
    pub async fn delete_expense(&mut self, expense_id: &str) -> CoreResult<()> {
        self.customers.storage.delete_expense(expense_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::memory_store::MemoryStore;

    #[tokio::test]
    async fn test_core_basic_operations() {
        let storage = MemoryStore::new();
        let mut core = RetailCore::new(storage);

        let customer = core
            .create_customer("Asha".to_string(), None, None, None, BigDecimal::from(0))
            .await
            .unwrap();
        let product = core
            .create_product(
                "SKU-1".to_string(),
                "Soap".to_string(),
                BigDecimal::from(50),
                BigDecimal::from(30),
                100,
                10,
            )
            .await
            .unwrap();

        let draft = OrderDraftBuilder::new(customer.id.clone())
            .line(product.id.clone(), 4, BigDecimal::from(50))
            .amount_paid(BigDecimal::from(50))
            .build();
        let order = core.create_order(draft).await.unwrap();

        assert_eq!(order.total, BigDecimal::from(200));
        assert_eq!(order.payment_status, PaymentStatus::Partial);

        // 150 still owed, stock debited by the sold units
        let customer = core.get_customer(&customer.id).await.unwrap().unwrap();
        assert_eq!(customer.balance, BigDecimal::from(-150));
        let product = core.get_product(&product.id).await.unwrap().unwrap();
        assert_eq!(product.stock_level, 96);
    }
}
