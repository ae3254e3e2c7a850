//! Order lifecycle workflows: create, update, delete.
//!
//! Each workflow is a sequence of independent writes against the ledger
//! store; there is no cross-table transaction. A failure after the first
//! committed write surfaces as [`CoreError::PartialWrite`] so callers know
//! the earlier side effects stand.

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::ops::adjust;
use crate::traits::{DefaultOrderValidator, LedgerStore, OrderValidator};
use crate::types::*;
use crate::utils::validation::ensure_within_total;

/// Order manager for the create/update/delete workflows
pub struct OrderManager<S: LedgerStore> {
    pub(crate) storage: S,
    validator: Box<dyn OrderValidator>,
}

impl<S: LedgerStore> OrderManager<S> {
    /// Create a new order manager
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultOrderValidator),
        }
    }

    /// Create a new order manager with a custom draft validator
    pub fn with_validator(storage: S, validator: Box<dyn OrderValidator>) -> Self {
        Self { storage, validator }
    }

    /// Create an order: insert the header, insert the lines, debit stock
    /// per line, and apply `amount_paid - total` to the customer balance.
    ///
    /// Validation and reference checks all happen before the first write.
    /// A failure after the header insert leaves a partially constructed
    /// order and is surfaced as a partial write, never rolled back.
    pub async fn create_order(&mut self, draft: OrderDraft) -> CoreResult<Order> {
        self.validator.validate_draft(&draft)?;

        if self.storage.get_customer(&draft.customer_id).await?.is_none() {
            return Err(CoreError::CustomerNotFound(draft.customer_id.clone()));
        }
        for line in &draft.lines {
            if self.storage.get_product(&line.product_id).await?.is_none() {
                return Err(CoreError::ProductNotFound(line.product_id.clone()));
            }
        }

        let total = draft.total();
        ensure_within_total(&draft.amount_paid, &total)?;

        let now = chrono::Utc::now().naive_utc();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            customer_id: draft.customer_id,
            payment_status: PaymentStatus::for_amounts(&draft.amount_paid, &total),
            status: OrderStatus::Pending,
            lines: draft.lines,
            total,
            amount_paid: draft.amount_paid,
            payment_mode: draft.payment_mode,
            created_at: now,
            updated_at: now,
        };

        self.storage.insert_order(&order).await?;

        if let Err(err) = self.storage.insert_order_lines(&order.id, &order.lines).await {
            return Err(CoreError::partial_write(
                "create_order",
                "insert_order_lines",
                err,
            ));
        }

        for line in &order.lines {
            if let Err(err) =
                adjust::adjust_stock_level(&mut self.storage, &line.product_id, -line.stock_units())
                    .await
            {
                return Err(CoreError::partial_write("create_order", "debit_stock", err));
            }
        }

        let balance_change = &order.amount_paid - &order.total;
        if balance_change != BigDecimal::from(0) {
            if let Err(err) = adjust::adjust_customer_balance(
                &mut self.storage,
                &order.customer_id,
                &balance_change,
            )
            .await
            {
                return Err(CoreError::partial_write(
                    "create_order",
                    "apply_balance_change",
                    err,
                ));
            }
        }

        tracing::info!(
            order_id = %order.id,
            customer_id = %order.customer_id,
            total = %order.total,
            amount_paid = %order.amount_paid,
            "order created"
        );

        Ok(order)
    }

    /// Apply a sparse patch to an order.
    ///
    /// When `amount_paid` changes, the delta against the previous value is
    /// computed before anything is overwritten and applied to the customer
    /// balance; only then are the field changes persisted. Whenever the
    /// patch touches `amount_paid` or `total`, the payment bound is checked
    /// against the effective pair and the payment status recomputed from it,
    /// so a total-only patch cannot leave `amount_paid` above the new total
    /// or a stale status behind.
    pub async fn update_order(&mut self, order_id: &str, patch: OrderPatch) -> CoreResult<()> {
        let order = self.get_order_required(order_id).await?;
        let mut patch = patch;

        if patch.amount_paid.is_none() && patch.total.is_none() {
            return self.storage.update_order_fields(order_id, &patch).await;
        }

        let new_paid = patch
            .amount_paid
            .clone()
            .unwrap_or_else(|| order.amount_paid.clone());
        if new_paid < BigDecimal::from(0) {
            return Err(CoreError::Validation(
                "Amount paid cannot be negative".to_string(),
            ));
        }
        let effective_total = patch.total.clone().unwrap_or_else(|| order.total.clone());
        ensure_within_total(&new_paid, &effective_total)?;

        // The delta must come from the stored amount before it is
        // overwritten; reversing this order corrupts the balance.
        let delta = &new_paid - &order.amount_paid;
        patch.payment_status = Some(PaymentStatus::for_amounts(&new_paid, &effective_total));

        if delta != BigDecimal::from(0) {
            adjust::adjust_customer_balance(&mut self.storage, &order.customer_id, &delta).await?;
        }

        if let Err(err) = self.storage.update_order_fields(order_id, &patch).await {
            return Err(CoreError::partial_write(
                "update_order",
                "persist_fields",
                err,
            ));
        }

        tracing::info!(order_id, customer_id = %order.customer_id, delta = %delta, "order payment updated");
        Ok(())
    }

    /// Delete an order, reversing its combined side effects: restore
    /// `quantity + free_quantity` stock per line and refund the unpaid
    /// portion `total - amount_paid` to the customer balance.
    pub async fn delete_order(&mut self, order_id: &str) -> CoreResult<()> {
        let order = self.get_order_required(order_id).await?;

        self.storage.delete_order(order_id).await?;

        for line in &order.lines {
            if let Err(err) =
                adjust::adjust_stock_level(&mut self.storage, &line.product_id, line.stock_units())
                    .await
            {
                return Err(CoreError::partial_write(
                    "delete_order",
                    "restore_stock",
                    err,
                ));
            }
        }

        let refund = &order.total - &order.amount_paid;
        if refund != BigDecimal::from(0) {
            if let Err(err) =
                adjust::adjust_customer_balance(&mut self.storage, &order.customer_id, &refund)
                    .await
            {
                return Err(CoreError::partial_write(
                    "delete_order",
                    "refund_balance",
                    err,
                ));
            }
        }

        tracing::info!(order_id, customer_id = %order.customer_id, refund = %refund, "order deleted");
        Ok(())
    }

    /// Get an order by id with its lines hydrated
    pub async fn get_order(&self, order_id: &str) -> CoreResult<Option<Order>> {
        self.storage.get_order(order_id).await
    }

    /// Get an order by id, returning an error if not found
    pub async fn get_order_required(&self, order_id: &str) -> CoreResult<Order> {
        self.storage
            .get_order(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))
    }

    /// List all orders for a customer
    pub async fn list_customer_orders(&self, customer_id: &str) -> CoreResult<Vec<Order>> {
        self.storage.list_customer_orders(customer_id).await
    }
}
