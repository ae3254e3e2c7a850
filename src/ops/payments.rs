//! FIFO settlement of lump customer payments

use bigdecimal::BigDecimal;

use crate::ops::adjust;
use crate::ops::orders::OrderManager;
use crate::traits::LedgerStore;
use crate::types::*;

/// Allocates lump payments across a customer's outstanding orders,
/// strictly oldest-first, banking any remainder as balance credit.
pub struct PaymentAllocator<S: LedgerStore> {
    orders: OrderManager<S>,
}

impl<S: LedgerStore> PaymentAllocator<S> {
    /// Create a new payment allocator
    pub fn new(storage: S) -> Self {
        Self {
            orders: OrderManager::new(storage),
        }
    }

    /// Apply a lump payment to the customer's outstanding orders.
    ///
    /// Orders are settled strictly in creation order; no prioritisation by
    /// amount or due date. Each settled slice is persisted through the
    /// order-update workflow so the balance delta rides along with it. An
    /// order that reaches full payment is also marked `Completed`. Whatever
    /// remains after the last outstanding order is credited directly to the
    /// customer balance, so the whole amount is always accounted for:
    /// the applied slices and the credit sum to exactly `amount`.
    ///
    /// Concurrent allocations against the same customer can observe the
    /// same orders as outstanding and double-allocate; serialise callers
    /// per customer where that matters.
    pub async fn allocate_payment(
        &mut self,
        customer_id: &str,
        amount: BigDecimal,
    ) -> CoreResult<()> {
        if amount <= BigDecimal::from(0) {
            return Err(CoreError::Validation(
                "Payment amount must be positive".to_string(),
            ));
        }
        if self.orders.storage.get_customer(customer_id).await?.is_none() {
            return Err(CoreError::CustomerNotFound(customer_id.to_string()));
        }

        let outstanding = self.orders.storage.list_outstanding_orders(customer_id).await?;

        let mut remaining = amount.clone();
        let mut orders_settled = 0u32;
        let mut orders_touched = 0u32;

        for order in &outstanding {
            if remaining <= BigDecimal::from(0) {
                break;
            }

            let owed = order.amount_owed();
            if owed <= BigDecimal::from(0) {
                continue;
            }

            let applied = if remaining < owed {
                remaining.clone()
            } else {
                owed.clone()
            };
            let new_paid = &order.amount_paid + &applied;

            let mut patch = OrderPatch::amount_paid(new_paid.clone());
            if new_paid >= order.total {
                patch.status = Some(OrderStatus::Completed);
                orders_settled += 1;
            }
            orders_touched += 1;

            self.orders.update_order(&order.id, patch).await?;
            remaining -= &applied;
        }

        if remaining > BigDecimal::from(0) {
            adjust::adjust_customer_balance(&mut self.orders.storage, customer_id, &remaining)
                .await?;
        }

        tracing::info!(
            customer_id,
            amount = %amount,
            orders_touched,
            orders_settled,
            credit = %remaining,
            "payment allocated"
        );

        Ok(())
    }
}
