//! Validation utilities

use bigdecimal::BigDecimal;
use std::collections::HashSet;

use crate::traits::*;
use crate::types::*;

/// Validate that an amount is positive
pub fn validate_positive_amount(amount: &BigDecimal) -> CoreResult<()> {
    if *amount <= BigDecimal::from(0) {
        Err(CoreError::Validation(
            "Amount must be positive".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validate that a quantity is a positive unit count
pub fn validate_positive_quantity(quantity: i64) -> CoreResult<()> {
    if quantity <= 0 {
        Err(CoreError::Validation(
            "Quantity must be positive".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validate that an entity id is usable as a row key
pub fn validate_entity_id(entity_id: &str) -> CoreResult<()> {
    if entity_id.trim().is_empty() {
        return Err(CoreError::Validation(
            "Entity id cannot be empty".to_string(),
        ));
    }

    if entity_id.len() > 64 {
        return Err(CoreError::Validation(
            "Entity id cannot exceed 64 characters".to_string(),
        ));
    }

    Ok(())
}

/// Enforce the payment bound: an order can never carry more payment than
/// its total. Lump payments route any surplus to balance credit instead.
pub fn ensure_within_total(amount_paid: &BigDecimal, total: &BigDecimal) -> CoreResult<()> {
    if amount_paid > total {
        return Err(CoreError::Validation(format!(
            "Amount paid {} exceeds order total {}",
            amount_paid, total
        )));
    }
    Ok(())
}

/// Enhanced order validator with detailed checks
pub struct EnhancedOrderValidator;

impl OrderValidator for EnhancedOrderValidator {
    fn validate_draft(&self, draft: &OrderDraft) -> CoreResult<()> {
        // Basic validation
        DefaultOrderValidator.validate_draft(draft)?;

        validate_entity_id(&draft.customer_id)?;

        // A product may not appear on two lines of the same order
        let mut seen = HashSet::new();
        for line in &draft.lines {
            validate_entity_id(&line.product_id)?;
            if !seen.insert(&line.product_id) {
                return Err(CoreError::Validation(format!(
                    "Product '{}' appears on multiple lines of the order",
                    line.product_id
                )));
            }
        }

        if let Some(mode) = &draft.payment_mode {
            if mode.trim().is_empty() || mode.len() > 50 {
                return Err(CoreError::Validation(
                    "Payment mode must be between 1 and 50 characters".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Enhanced purchase validator with detailed checks
pub struct EnhancedPurchaseValidator;

impl PurchaseValidator for EnhancedPurchaseValidator {
    fn validate_draft(&self, draft: &PurchaseDraft) -> CoreResult<()> {
        DefaultPurchaseValidator.validate_draft(draft)?;

        if draft.supplier_name.len() > 100 {
            return Err(CoreError::Validation(
                "Supplier name cannot exceed 100 characters".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for line in &draft.lines {
            validate_entity_id(&line.product_id)?;
            if !seen.insert(&line.product_id) {
                return Err(CoreError::Validation(format!(
                    "Product '{}' appears on multiple lines of the purchase",
                    line.product_id
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_bound_enforced() {
        let total = BigDecimal::from(100);
        assert!(ensure_within_total(&BigDecimal::from(100), &total).is_ok());
        assert!(ensure_within_total(&BigDecimal::from(101), &total).is_err());
    }

    #[test]
    fn duplicate_lines_rejected() {
        let draft = OrderDraftBuilder::new("c1".to_string())
            .line("p1".to_string(), 1, BigDecimal::from(10))
            .line("p1".to_string(), 2, BigDecimal::from(10))
            .build();
        assert!(EnhancedOrderValidator.validate_draft(&draft).is_err());
    }
}
