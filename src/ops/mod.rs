//! Reconciliation core: the workflows that keep the sales, payment,
//! inventory, and customer-balance ledgers mutually consistent

pub(crate) mod adjust;
pub mod core;
pub mod customers;
pub mod orders;
pub mod payments;
pub mod products;
pub mod purchases;

pub use self::core::*;
pub use customers::*;
pub use orders::*;
pub use payments::*;
pub use products::*;
pub use purchases::*;
