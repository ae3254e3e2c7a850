//! Customer intake and maintenance

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::traits::LedgerStore;
use crate::types::*;

/// Customer manager for intake and contact-detail maintenance.
///
/// The running balance is deliberately absent from the update path: after
/// the opening balance at creation it moves only through the order and
/// payment workflows.
pub struct CustomerManager<S: LedgerStore> {
    pub(crate) storage: S,
}

impl<S: LedgerStore> CustomerManager<S> {
    /// Create a new customer manager
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Create a new customer with an opening balance
    pub async fn create_customer(
        &mut self,
        name: String,
        phone: Option<String>,
        email: Option<String>,
        address: Option<String>,
        opening_balance: BigDecimal,
    ) -> CoreResult<Customer> {
        if name.trim().is_empty() {
            return Err(CoreError::Validation(
                "Customer name cannot be empty".to_string(),
            ));
        }

        let mut customer = Customer::new(Uuid::new_v4().to_string(), name, opening_balance);
        customer.phone = phone;
        customer.email = email;
        customer.address = address;

        self.storage.save_customer(&customer).await?;
        Ok(customer)
    }

    /// Get a customer by id
    pub async fn get_customer(&self, customer_id: &str) -> CoreResult<Option<Customer>> {
        self.storage.get_customer(customer_id).await
    }

    /// Get a customer by id, returning an error if not found
    pub async fn get_customer_required(&self, customer_id: &str) -> CoreResult<Customer> {
        self.storage
            .get_customer(customer_id)
            .await?
            .ok_or_else(|| CoreError::CustomerNotFound(customer_id.to_string()))
    }

    /// List all customers
    pub async fn list_customers(&self) -> CoreResult<Vec<Customer>> {
        self.storage.list_customers().await
    }

    /// Update a customer's display and contact fields. The balance on the
    /// stored row is preserved as-is.
    pub async fn update_customer_details(
        &mut self,
        customer_id: &str,
        name: String,
        phone: Option<String>,
        email: Option<String>,
        address: Option<String>,
    ) -> CoreResult<Customer> {
        if name.trim().is_empty() {
            return Err(CoreError::Validation(
                "Customer name cannot be empty".to_string(),
            ));
        }

        let mut customer = self.get_customer_required(customer_id).await?;
        customer.name = name;
        customer.phone = phone;
        customer.email = email;
        customer.address = address;
        customer.updated_at = chrono::Utc::now().naive_utc();

        self.storage.update_customer(&customer).await?;
        Ok(customer)
    }

    /// Delete a customer. Their orders are left in place; later workflows
    /// that need the customer will fail with `CustomerNotFound`.
    pub async fn delete_customer(&mut self, customer_id: &str) -> CoreResult<()> {
        if self.storage.get_customer(customer_id).await?.is_none() {
            return Err(CoreError::CustomerNotFound(customer_id.to_string()));
        }
        self.storage.delete_customer(customer_id).await
    }
}
