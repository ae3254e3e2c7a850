//! Shared numeric-adjustment primitive for balances and stock levels.
//!
//! Both customer balances and product stock levels are shared mutable
//! counters: every workflow moves them by a delta, never by writing an
//! absolute value. When the store offers an atomic increment the delta is
//! applied in a single remote operation; otherwise the fallback reads the
//! current value, adds the delta, and writes it back. The fallback loses
//! updates under concurrent writers, so every use of it is logged as a
//! degraded-consistency path rather than hidden.

use bigdecimal::BigDecimal;

use crate::traits::LedgerStore;
use crate::types::{CoreError, CoreResult};

/// Add `delta` to a customer's balance, atomically when the store allows it.
pub(crate) async fn adjust_customer_balance<S: LedgerStore>(
    store: &mut S,
    customer_id: &str,
    delta: &BigDecimal,
) -> CoreResult<BigDecimal> {
    if store.supports_atomic_adjust() {
        return store.adjust_customer_balance(customer_id, delta).await;
    }

    tracing::warn!(
        customer_id,
        %delta,
        "atomic balance adjust unavailable; using read-modify-write fallback"
    );

    let mut customer = store
        .get_customer(customer_id)
        .await?
        .ok_or_else(|| CoreError::CustomerNotFound(customer_id.to_string()))?;
    customer.balance += delta;
    customer.updated_at = chrono::Utc::now().naive_utc();
    store.update_customer(&customer).await?;
    Ok(customer.balance)
}

/// Add `delta` to a product's stock level, atomically when the store allows it.
pub(crate) async fn adjust_stock_level<S: LedgerStore>(
    store: &mut S,
    product_id: &str,
    delta: i64,
) -> CoreResult<i64> {
    if store.supports_atomic_adjust() {
        return store.adjust_stock_level(product_id, delta).await;
    }

    tracing::warn!(
        product_id,
        delta,
        "atomic stock adjust unavailable; using read-modify-write fallback"
    );

    let mut product = store
        .get_product(product_id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;
    product.stock_level += delta;
    product.updated_at = chrono::Utc::now().naive_utc();
    store.update_product(&product).await?;
    Ok(product.stock_level)
}
