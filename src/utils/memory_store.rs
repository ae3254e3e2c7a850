//! In-memory ledger store for testing and development

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::traits::*;
use crate::types::*;

/// In-memory `LedgerStore` implementation for testing and development.
///
/// Orders and purchases keep their header and line rows in separate maps,
/// like the remote store does, so mid-workflow failures leave observable
/// partial states (a header with zero lines). Two extra switches exist for
/// tests: the atomic-adjust capability can be disabled to exercise the
/// read-modify-write fallback, and any named write can be failed once to
/// exercise partial-write handling.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    customers: Arc<RwLock<HashMap<String, Customer>>>,
    products: Arc<RwLock<HashMap<String, Product>>>,
    // Order headers carry an insertion sequence so FIFO ordering stays
    // deterministic when timestamps collide.
    orders: Arc<RwLock<HashMap<String, (u64, Order)>>>,
    order_lines: Arc<RwLock<HashMap<String, Vec<OrderLine>>>>,
    purchases: Arc<RwLock<HashMap<String, Purchase>>>,
    purchase_lines: Arc<RwLock<HashMap<String, Vec<PurchaseItem>>>>,
    expenses: Arc<RwLock<HashMap<String, Expense>>>,
    next_seq: Arc<AtomicU64>,
    atomic_adjust: bool,
    failures: Arc<RwLock<HashSet<String>>>,
}

impl MemoryStore {
    /// Create a new memory store with the atomic-adjust capability enabled
    pub fn new() -> Self {
        Self {
            customers: Arc::new(RwLock::new(HashMap::new())),
            products: Arc::new(RwLock::new(HashMap::new())),
            orders: Arc::new(RwLock::new(HashMap::new())),
            order_lines: Arc::new(RwLock::new(HashMap::new())),
            purchases: Arc::new(RwLock::new(HashMap::new())),
            purchase_lines: Arc::new(RwLock::new(HashMap::new())),
            expenses: Arc::new(RwLock::new(HashMap::new())),
            next_seq: Arc::new(AtomicU64::new(0)),
            atomic_adjust: true,
            failures: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Create a store without the atomic-adjust capability, forcing the
    /// core onto the read-modify-write fallback path
    pub fn without_atomic_adjust() -> Self {
        Self {
            atomic_adjust: false,
            ..Self::new()
        }
    }

    /// Make the named store operation fail on its next call (useful for
    /// testing partial-write handling)
    pub fn fail_once(&self, operation: &str) {
        self.failures.write().unwrap().insert(operation.to_string());
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        self.customers.write().unwrap().clear();
        self.products.write().unwrap().clear();
        self.orders.write().unwrap().clear();
        self.order_lines.write().unwrap().clear();
        self.purchases.write().unwrap().clear();
        self.purchase_lines.write().unwrap().clear();
        self.expenses.write().unwrap().clear();
    }

    fn trip(&self, operation: &str) -> CoreResult<()> {
        if self.failures.write().unwrap().remove(operation) {
            Err(CoreError::Storage(format!(
                "injected failure in {}",
                operation
            )))
        } else {
            Ok(())
        }
    }

    fn hydrate_order(&self, header: &Order) -> Order {
        let mut order = header.clone();
        order.lines = self
            .order_lines
            .read()
            .unwrap()
            .get(&order.id)
            .cloned()
            .unwrap_or_default();
        order
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn save_customer(&mut self, customer: &Customer) -> CoreResult<()> {
        self.trip("save_customer")?;
        self.customers
            .write()
            .unwrap()
            .insert(customer.id.clone(), customer.clone());
        Ok(())
    }

    async fn get_customer(&self, customer_id: &str) -> CoreResult<Option<Customer>> {
        Ok(self.customers.read().unwrap().get(customer_id).cloned())
    }

    async fn list_customers(&self) -> CoreResult<Vec<Customer>> {
        let mut customers: Vec<Customer> =
            self.customers.read().unwrap().values().cloned().collect();
        customers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(customers)
    }

    async fn update_customer(&mut self, customer: &Customer) -> CoreResult<()> {
        self.trip("update_customer")?;
        let mut customers = self.customers.write().unwrap();
        if customers.contains_key(&customer.id) {
            customers.insert(customer.id.clone(), customer.clone());
            Ok(())
        } else {
            Err(CoreError::CustomerNotFound(customer.id.clone()))
        }
    }

    async fn delete_customer(&mut self, customer_id: &str) -> CoreResult<()> {
        self.trip("delete_customer")?;
        if self.customers.write().unwrap().remove(customer_id).is_some() {
            Ok(())
        } else {
            Err(CoreError::CustomerNotFound(customer_id.to_string()))
        }
    }

    async fn save_product(&mut self, product: &Product) -> CoreResult<()> {
        self.trip("save_product")?;
        self.products
            .write()
            .unwrap()
            .insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn get_product(&self, product_id: &str) -> CoreResult<Option<Product>> {
        Ok(self.products.read().unwrap().get(product_id).cloned())
    }

    async fn list_products(&self) -> CoreResult<Vec<Product>> {
        let mut products: Vec<Product> =
            self.products.read().unwrap().values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn update_product(&mut self, product: &Product) -> CoreResult<()> {
        self.trip("update_product")?;
        let mut products = self.products.write().unwrap();
        if products.contains_key(&product.id) {
            products.insert(product.id.clone(), product.clone());
            Ok(())
        } else {
            Err(CoreError::ProductNotFound(product.id.clone()))
        }
    }

    async fn set_product_unit_price(
        &mut self,
        product_id: &str,
        unit_price: &BigDecimal,
    ) -> CoreResult<()> {
        self.trip("set_product_unit_price")?;
        let mut products = self.products.write().unwrap();
        match products.get_mut(product_id) {
            Some(product) => {
                product.unit_price = unit_price.clone();
                product.updated_at = chrono::Utc::now().naive_utc();
                Ok(())
            }
            None => Err(CoreError::ProductNotFound(product_id.to_string())),
        }
    }

    async fn delete_product(&mut self, product_id: &str) -> CoreResult<()> {
        self.trip("delete_product")?;
        if self.products.write().unwrap().remove(product_id).is_some() {
            Ok(())
        } else {
            Err(CoreError::ProductNotFound(product_id.to_string()))
        }
    }

    async fn insert_order(&mut self, order: &Order) -> CoreResult<()> {
        self.trip("insert_order")?;
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let mut header = order.clone();
        header.lines = Vec::new();
        self.orders
            .write()
            .unwrap()
            .insert(order.id.clone(), (seq, header));
        Ok(())
    }

    async fn insert_order_lines(&mut self, order_id: &str, lines: &[OrderLine]) -> CoreResult<()> {
        self.trip("insert_order_lines")?;
        if !self.orders.read().unwrap().contains_key(order_id) {
            return Err(CoreError::OrderNotFound(order_id.to_string()));
        }
        self.order_lines
            .write()
            .unwrap()
            .insert(order_id.to_string(), lines.to_vec());
        Ok(())
    }

    async fn get_order(&self, order_id: &str) -> CoreResult<Option<Order>> {
        let header = self
            .orders
            .read()
            .unwrap()
            .get(order_id)
            .map(|(_, order)| order.clone());
        Ok(header.map(|h| self.hydrate_order(&h)))
    }

    async fn list_customer_orders(&self, customer_id: &str) -> CoreResult<Vec<Order>> {
        let mut headers: Vec<(u64, Order)> = self
            .orders
            .read()
            .unwrap()
            .values()
            .filter(|(_, order)| order.customer_id == customer_id)
            .cloned()
            .collect();
        headers.sort_by_key(|(seq, _)| *seq);
        Ok(headers
            .iter()
            .map(|(_, order)| self.hydrate_order(order))
            .collect())
    }

    async fn list_outstanding_orders(&self, customer_id: &str) -> CoreResult<Vec<Order>> {
        let mut headers: Vec<(u64, Order)> = self
            .orders
            .read()
            .unwrap()
            .values()
            .filter(|(_, order)| {
                order.customer_id == customer_id && order.payment_status != PaymentStatus::Paid
            })
            .cloned()
            .collect();
        // Oldest first; the insertion sequence breaks timestamp ties
        headers.sort_by(|(a_seq, a), (b_seq, b)| {
            a.created_at.cmp(&b.created_at).then(a_seq.cmp(b_seq))
        });
        Ok(headers
            .iter()
            .map(|(_, order)| self.hydrate_order(order))
            .collect())
    }

    async fn update_order_fields(&mut self, order_id: &str, patch: &OrderPatch) -> CoreResult<()> {
        self.trip("update_order_fields")?;
        let mut orders = self.orders.write().unwrap();
        let (_, order) = orders
            .get_mut(order_id)
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        if let Some(total) = &patch.total {
            order.total = total.clone();
        }
        if let Some(status) = patch.status {
            order.status = status;
        }
        if let Some(amount_paid) = &patch.amount_paid {
            order.amount_paid = amount_paid.clone();
        }
        if let Some(payment_status) = patch.payment_status {
            order.payment_status = payment_status;
        }
        if let Some(payment_mode) = &patch.payment_mode {
            order.payment_mode = Some(payment_mode.clone());
        }
        order.updated_at = chrono::Utc::now().naive_utc();
        Ok(())
    }

    async fn delete_order(&mut self, order_id: &str) -> CoreResult<()> {
        self.trip("delete_order")?;
        if self.orders.write().unwrap().remove(order_id).is_none() {
            return Err(CoreError::OrderNotFound(order_id.to_string()));
        }
        // Line rows cascade with the header
        self.order_lines.write().unwrap().remove(order_id);
        Ok(())
    }

    async fn insert_purchase(&mut self, purchase: &Purchase) -> CoreResult<()> {
        self.trip("insert_purchase")?;
        let mut header = purchase.clone();
        header.lines = Vec::new();
        self.purchases
            .write()
            .unwrap()
            .insert(purchase.id.clone(), header);
        Ok(())
    }

    async fn insert_purchase_lines(
        &mut self,
        purchase_id: &str,
        lines: &[PurchaseItem],
    ) -> CoreResult<()> {
        self.trip("insert_purchase_lines")?;
        if !self.purchases.read().unwrap().contains_key(purchase_id) {
            return Err(CoreError::PurchaseNotFound(purchase_id.to_string()));
        }
        self.purchase_lines
            .write()
            .unwrap()
            .insert(purchase_id.to_string(), lines.to_vec());
        Ok(())
    }

    async fn get_purchase(&self, purchase_id: &str) -> CoreResult<Option<Purchase>> {
        let header = self.purchases.read().unwrap().get(purchase_id).cloned();
        Ok(header.map(|mut purchase| {
            purchase.lines = self
                .purchase_lines
                .read()
                .unwrap()
                .get(purchase_id)
                .cloned()
                .unwrap_or_default();
            purchase
        }))
    }

    async fn list_purchases(&self) -> CoreResult<Vec<Purchase>> {
        let mut purchases: Vec<Purchase> =
            self.purchases.read().unwrap().values().cloned().collect();
        purchases.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        let lines = self.purchase_lines.read().unwrap();
        for purchase in &mut purchases {
            purchase.lines = lines.get(&purchase.id).cloned().unwrap_or_default();
        }
        Ok(purchases)
    }

    async fn update_purchase_status(
        &mut self,
        purchase_id: &str,
        status: PurchaseStatus,
    ) -> CoreResult<()> {
        self.trip("update_purchase_status")?;
        let mut purchases = self.purchases.write().unwrap();
        match purchases.get_mut(purchase_id) {
            Some(purchase) => {
                purchase.status = status;
                purchase.updated_at = chrono::Utc::now().naive_utc();
                Ok(())
            }
            None => Err(CoreError::PurchaseNotFound(purchase_id.to_string())),
        }
    }

    async fn delete_purchase(&mut self, purchase_id: &str) -> CoreResult<()> {
        self.trip("delete_purchase")?;
        if self.purchases.write().unwrap().remove(purchase_id).is_none() {
            return Err(CoreError::PurchaseNotFound(purchase_id.to_string()));
        }
        self.purchase_lines.write().unwrap().remove(purchase_id);
        Ok(())
    }

    async fn insert_expense(&mut self, expense: &Expense) -> CoreResult<()> {
        self.trip("insert_expense")?;
        self.expenses
            .write()
            .unwrap()
            .insert(expense.id.clone(), expense.clone());
        Ok(())
    }

    async fn list_expenses(&self) -> CoreResult<Vec<Expense>> {
        let mut expenses: Vec<Expense> =
            self.expenses.read().unwrap().values().cloned().collect();
        expenses.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(expenses)
    }

    async fn delete_expense(&mut self, expense_id: &str) -> CoreResult<()> {
        self.trip("delete_expense")?;
        if self.expenses.write().unwrap().remove(expense_id).is_some() {
            Ok(())
        } else {
            Err(CoreError::ExpenseNotFound(expense_id.to_string()))
        }
    }

    fn supports_atomic_adjust(&self) -> bool {
        self.atomic_adjust
    }

    async fn adjust_customer_balance(
        &mut self,
        customer_id: &str,
        delta: &BigDecimal,
    ) -> CoreResult<BigDecimal> {
        self.trip("adjust_customer_balance")?;
        let mut customers = self.customers.write().unwrap();
        match customers.get_mut(customer_id) {
            Some(customer) => {
                customer.balance += delta;
                customer.updated_at = chrono::Utc::now().naive_utc();
                Ok(customer.balance.clone())
            }
            None => Err(CoreError::CustomerNotFound(customer_id.to_string())),
        }
    }

    async fn adjust_stock_level(&mut self, product_id: &str, delta: i64) -> CoreResult<i64> {
        self.trip("adjust_stock_level")?;
        let mut products = self.products.write().unwrap();
        match products.get_mut(product_id) {
            Some(product) => {
                product.stock_level += delta;
                product.updated_at = chrono::Utc::now().naive_utc();
                Ok(product.stock_level)
            }
            None => Err(CoreError::ProductNotFound(product_id.to_string())),
        }
    }
}
