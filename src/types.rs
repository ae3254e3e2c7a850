//! Core types and data structures for the retail operations system

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Payment state of an order, always derivable from `amount_paid` vs `total`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// Nothing paid yet
    Unpaid,
    /// Partially paid: `0 < amount_paid < total`
    Partial,
    /// Fully paid: `amount_paid >= total`
    Paid,
}

impl PaymentStatus {
    /// Derive the payment status from the paid amount and the order total.
    ///
    /// A zero-total order is born settled: it owes nothing and must never
    /// absorb payment allocation.
    pub fn for_amounts(amount_paid: &BigDecimal, total: &BigDecimal) -> Self {
        if amount_paid >= total {
            PaymentStatus::Paid
        } else if *amount_paid <= BigDecimal::from(0) {
            PaymentStatus::Unpaid
        } else {
            PaymentStatus::Partial
        }
    }
}

/// Fulfillment state of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Created, not yet fulfilled
    Pending,
    /// Fulfilled (also set when an order becomes fully paid during allocation)
    Completed,
}

/// Lifecycle state of a purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PurchaseStatus {
    Pending,
    Received,
    Cancelled,
}

/// A customer with a signed running balance.
///
/// Balance convention: below zero the customer owes the business, above zero
/// they hold credit. The balance is only ever moved by the order and payment
/// workflows; the sole direct write is the opening balance at intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    /// Signed running balance (negative = owed to the business)
    pub balance: BigDecimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Customer {
    /// Create a new customer with an opening balance
    pub fn new(id: String, name: String, opening_balance: BigDecimal) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id,
            name,
            phone: None,
            email: None,
            address: None,
            balance: opening_balance,
            created_at: now,
            updated_at: now,
        }
    }

    /// Amount the customer currently owes (zero when they hold credit)
    pub fn amount_owed(&self) -> BigDecimal {
        if self.balance < BigDecimal::from(0) {
            -&self.balance
        } else {
            BigDecimal::from(0)
        }
    }
}

/// An inventory item.
///
/// `stock_level` and `unit_price` move only through the purchase and order
/// workflows; intake updates touch the display and pricing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier
    pub id: String,
    /// Stock keeping unit
    pub sku: String,
    /// Display name
    pub name: String,
    /// Units on hand
    pub stock_level: i64,
    /// Threshold below which the item counts as low stock
    pub reorder_level: i64,
    /// Latest purchase cost per unit (last-cost-wins)
    pub unit_price: BigDecimal,
    /// Selling price per unit
    pub price: BigDecimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Product {
    /// Create a new product
    pub fn new(id: String, sku: String, name: String, price: BigDecimal) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id,
            sku,
            name,
            stock_level: 0,
            reorder_level: 0,
            unit_price: BigDecimal::from(0),
            price,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A single line of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Product being sold
    pub product_id: String,
    /// Units sold at the selling price
    pub quantity: i64,
    /// Units given away with this line (affect stock, not the total)
    pub free_quantity: i64,
    /// Cost per unit at the time of sale
    pub unit_price: BigDecimal,
    /// Selling price per unit
    pub selling_price: BigDecimal,
}

impl OrderLine {
    pub fn new(product_id: String, quantity: i64, selling_price: BigDecimal) -> Self {
        Self {
            product_id,
            quantity,
            free_quantity: 0,
            unit_price: BigDecimal::from(0),
            selling_price,
        }
    }

    /// Contribution of this line to the order total
    pub fn line_total(&self) -> BigDecimal {
        BigDecimal::from(self.quantity) * &self.selling_price
    }

    /// Units this line removes from stock (sold plus free)
    pub fn stock_units(&self) -> i64 {
        self.quantity + self.free_quantity
    }
}

/// A sales order with its lines hydrated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier
    pub id: String,
    /// Customer the order belongs to
    pub customer_id: String,
    /// Line items
    pub lines: Vec<OrderLine>,
    /// Sum of line selling totals
    pub total: BigDecimal,
    /// Amount paid so far, never above `total`
    pub amount_paid: BigDecimal,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub payment_mode: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Order {
    /// Amount still owed on this order
    pub fn amount_owed(&self) -> BigDecimal {
        &self.total - &self.amount_paid
    }
}

/// Input for creating an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub customer_id: String,
    pub lines: Vec<OrderLine>,
    pub amount_paid: BigDecimal,
    pub payment_mode: Option<String>,
}

impl OrderDraft {
    /// Total of the drafted lines
    pub fn total(&self) -> BigDecimal {
        self.lines.iter().map(|line| line.line_total()).sum()
    }
}

/// Builder for order drafts
#[derive(Debug)]
pub struct OrderDraftBuilder {
    draft: OrderDraft,
}

impl OrderDraftBuilder {
    /// Start a draft for the given customer
    pub fn new(customer_id: String) -> Self {
        Self {
            draft: OrderDraft {
                customer_id,
                lines: Vec::new(),
                amount_paid: BigDecimal::from(0),
                payment_mode: None,
            },
        }
    }

    /// Add a line selling `quantity` units of a product
    pub fn line(mut self, product_id: String, quantity: i64, selling_price: BigDecimal) -> Self {
        self.draft
            .lines
            .push(OrderLine::new(product_id, quantity, selling_price));
        self
    }

    /// Add a fully specified line
    pub fn line_with(mut self, line: OrderLine) -> Self {
        self.draft.lines.push(line);
        self
    }

    /// Set the amount paid up front
    pub fn amount_paid(mut self, amount: BigDecimal) -> Self {
        self.draft.amount_paid = amount;
        self
    }

    /// Set the payment mode
    pub fn payment_mode(mut self, mode: String) -> Self {
        self.draft.payment_mode = Some(mode);
        self
    }

    pub fn build(self) -> OrderDraft {
        self.draft
    }
}

/// Sparse set of order fields to change.
///
/// When `amount_paid` or `total` is present the payment status is
/// recomputed from the effective pair, overriding any `payment_status`
/// set here. `payment_mode` is set-only: `Some` overwrites the stored
/// mode and `None` means "unchanged", so a mode can never be cleared
/// through a patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderPatch {
    pub total: Option<BigDecimal>,
    pub status: Option<OrderStatus>,
    pub amount_paid: Option<BigDecimal>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_mode: Option<String>,
}

impl OrderPatch {
    /// Patch that only changes the paid amount
    pub fn amount_paid(amount: BigDecimal) -> Self {
        Self {
            amount_paid: Some(amount),
            ..Default::default()
        }
    }
}

/// A single line of a purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseItem {
    /// Product being restocked
    pub product_id: String,
    /// Units purchased
    pub quantity: i64,
    /// Cost per unit
    pub unit_cost: BigDecimal,
    pub description: Option<String>,
}

impl PurchaseItem {
    pub fn new(product_id: String, quantity: i64, unit_cost: BigDecimal) -> Self {
        Self {
            product_id,
            quantity,
            unit_cost,
            description: None,
        }
    }

    /// Contribution of this line to the purchase total
    pub fn line_total(&self) -> BigDecimal {
        BigDecimal::from(self.quantity) * &self.unit_cost
    }
}

/// A supplier purchase with its lines hydrated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    /// Unique identifier
    pub id: String,
    /// Supplier the goods came from
    pub supplier_name: String,
    /// Company the purchase is billed to
    pub bill_to: Option<String>,
    /// Line items
    pub lines: Vec<PurchaseItem>,
    /// Sum of line cost totals
    pub total: BigDecimal,
    pub status: PurchaseStatus,
    /// Purchases are recorded fully settled
    pub payment_status: PaymentStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input for recording a purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseDraft {
    pub supplier_name: String,
    pub bill_to: Option<String>,
    pub lines: Vec<PurchaseItem>,
}

impl PurchaseDraft {
    /// Total of the drafted lines
    pub fn total(&self) -> BigDecimal {
        self.lines.iter().map(|line| line.line_total()).sum()
    }
}

/// A flat expense row, independent of the other ledgers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: BigDecimal,
    pub category: Option<String>,
    pub payment_mode: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Input for recording an expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub date: NaiveDate,
    pub description: String,
    pub amount: BigDecimal,
    pub category: Option<String>,
    pub payment_mode: Option<String>,
}

/// Errors that can occur in the retail core
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),
    #[error("Product not found: {0}")]
    ProductNotFound(String),
    #[error("Order not found: {0}")]
    OrderNotFound(String),
    #[error("Purchase not found: {0}")]
    PurchaseNotFound(String),
    #[error("Expense not found: {0}")]
    ExpenseNotFound(String),
    /// A later step of a multi-step workflow failed after an earlier write
    /// committed. The workflow's other side effects may have occurred;
    /// manual reconciliation can be needed.
    #[error("Partial write in {operation} at step {step}: {source}")]
    PartialWrite {
        operation: &'static str,
        step: &'static str,
        #[source]
        source: Box<CoreError>,
    },
}

impl CoreError {
    /// Wrap a step failure that happened after an earlier write committed
    pub fn partial_write(operation: &'static str, step: &'static str, source: CoreError) -> Self {
        CoreError::PartialWrite {
            operation,
            step,
            source: Box::new(source),
        }
    }
}

/// Result type for retail core operations
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_status_derivation() {
        let total = BigDecimal::from(100);
        assert_eq!(
            PaymentStatus::for_amounts(&BigDecimal::from(100), &total),
            PaymentStatus::Paid
        );
        assert_eq!(
            PaymentStatus::for_amounts(&BigDecimal::from(0), &total),
            PaymentStatus::Unpaid
        );
        assert_eq!(
            PaymentStatus::for_amounts(&BigDecimal::from(40), &total),
            PaymentStatus::Partial
        );
        // Overpayment still reads as paid
        assert_eq!(
            PaymentStatus::for_amounts(&BigDecimal::from(150), &total),
            PaymentStatus::Paid
        );
        // Zero-total orders are born settled
        assert_eq!(
            PaymentStatus::for_amounts(&BigDecimal::from(0), &BigDecimal::from(0)),
            PaymentStatus::Paid
        );
    }

    #[test]
    fn order_line_totals() {
        let mut line = OrderLine::new("p1".to_string(), 3, BigDecimal::from(50));
        line.free_quantity = 2;
        assert_eq!(line.line_total(), BigDecimal::from(150));
        assert_eq!(line.stock_units(), 5);
    }

    #[test]
    fn draft_builder_totals() {
        let draft = OrderDraftBuilder::new("c1".to_string())
            .line("p1".to_string(), 2, BigDecimal::from(100))
            .line("p2".to_string(), 1, BigDecimal::from(50))
            .amount_paid(BigDecimal::from(75))
            .build();
        assert_eq!(draft.total(), BigDecimal::from(250));
        assert_eq!(draft.lines.len(), 2);
    }

    #[test]
    fn customer_amount_owed_follows_sign_convention() {
        let mut customer = Customer::new("c1".to_string(), "Asha".to_string(), BigDecimal::from(0));
        customer.balance = BigDecimal::from(-250);
        assert_eq!(customer.amount_owed(), BigDecimal::from(250));
        customer.balance = BigDecimal::from(80);
        assert_eq!(customer.amount_owed(), BigDecimal::from(0));
    }
}
