//! Purchase intake and lifecycle

use uuid::Uuid;

use crate::ops::adjust;
use crate::traits::{DefaultPurchaseValidator, LedgerStore, PurchaseValidator};
use crate::types::*;

/// Purchase manager for supplier intake and the purchase lifecycle
pub struct PurchaseManager<S: LedgerStore> {
    pub(crate) storage: S,
    validator: Box<dyn PurchaseValidator>,
}

impl<S: LedgerStore> PurchaseManager<S> {
    /// Create a new purchase manager
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultPurchaseValidator),
        }
    }

    /// Create a new purchase manager with a custom draft validator
    pub fn with_validator(storage: S, validator: Box<dyn PurchaseValidator>) -> Self {
        Self { storage, validator }
    }

    /// Record a purchase: insert the header as received and settled, insert
    /// the lines, then per line increment the product's stock by the
    /// purchased quantity and overwrite its unit cost with the line cost
    /// (last-cost-wins). Line updates are independent of each other.
    ///
    /// Failures after the header insert surface as partial writes.
    pub async fn record_purchase(&mut self, draft: PurchaseDraft) -> CoreResult<Purchase> {
        self.validator.validate_draft(&draft)?;

        for line in &draft.lines {
            if self.storage.get_product(&line.product_id).await?.is_none() {
                return Err(CoreError::ProductNotFound(line.product_id.clone()));
            }
        }

        let total = draft.total();
        let now = chrono::Utc::now().naive_utc();
        let purchase = Purchase {
            id: Uuid::new_v4().to_string(),
            supplier_name: draft.supplier_name,
            bill_to: draft.bill_to,
            lines: draft.lines,
            total,
            status: PurchaseStatus::Received,
            payment_status: PaymentStatus::Paid,
            created_at: now,
            updated_at: now,
        };

        self.storage.insert_purchase(&purchase).await?;

        if let Err(err) = self
            .storage
            .insert_purchase_lines(&purchase.id, &purchase.lines)
            .await
        {
            return Err(CoreError::partial_write(
                "record_purchase",
                "insert_purchase_lines",
                err,
            ));
        }

        for line in &purchase.lines {
            if let Err(err) =
                adjust::adjust_stock_level(&mut self.storage, &line.product_id, line.quantity)
                    .await
            {
                return Err(CoreError::partial_write(
                    "record_purchase",
                    "credit_stock",
                    err,
                ));
            }
            if let Err(err) = self
                .storage
                .set_product_unit_price(&line.product_id, &line.unit_cost)
                .await
            {
                return Err(CoreError::partial_write(
                    "record_purchase",
                    "update_unit_price",
                    err,
                ));
            }
        }

        tracing::info!(
            purchase_id = %purchase.id,
            supplier = %purchase.supplier_name,
            total = %purchase.total,
            lines = purchase.lines.len(),
            "purchase recorded"
        );

        Ok(purchase)
    }

    /// Get a purchase by id with its lines hydrated
    pub async fn get_purchase(&self, purchase_id: &str) -> CoreResult<Option<Purchase>> {
        self.storage.get_purchase(purchase_id).await
    }

    /// Get a purchase by id, returning an error if not found
    pub async fn get_purchase_required(&self, purchase_id: &str) -> CoreResult<Purchase> {
        self.storage
            .get_purchase(purchase_id)
            .await?
            .ok_or_else(|| CoreError::PurchaseNotFound(purchase_id.to_string()))
    }

    /// List all purchases
    pub async fn list_purchases(&self) -> CoreResult<Vec<Purchase>> {
        self.storage.list_purchases().await
    }

    /// Move a purchase to a new lifecycle status
    pub async fn set_purchase_status(
        &mut self,
        purchase_id: &str,
        status: PurchaseStatus,
    ) -> CoreResult<()> {
        if self.storage.get_purchase(purchase_id).await?.is_none() {
            return Err(CoreError::PurchaseNotFound(purchase_id.to_string()));
        }
        self.storage.update_purchase_status(purchase_id, status).await
    }

    /// Delete a purchase. Stock received from it is NOT reversed; the
    /// operator must adjust inventory manually if the goods went back.
    pub async fn delete_purchase(&mut self, purchase_id: &str) -> CoreResult<()> {
        let purchase = self.get_purchase_required(purchase_id).await?;
        self.storage.delete_purchase(purchase_id).await?;

        tracing::warn!(
            purchase_id,
            supplier = %purchase.supplier_name,
            lines = purchase.lines.len(),
            "purchase deleted without stock reversal; adjust inventory manually"
        );
        Ok(())
    }
}
