//! # Retail Core
//!
//! The reconciliation core of a retail operations app: the workflows that
//! keep sales orders, customer running balances, inventory stock levels,
//! and payment allocation mutually consistent over a remote table store.
//!
//! ## Features
//!
//! - **Order lifecycle**: create, sparse update, and delete with exact
//!   reversal of stock and balance side effects
//! - **FIFO payment allocation**: lump payments settle a customer's oldest
//!   outstanding orders first; the remainder becomes balance credit
//! - **Purchase intake**: received purchases increment stock and carry
//!   last-cost-wins unit pricing
//! - **Atomic adjustments**: balance and stock deltas use the store's
//!   atomic increment when available, with a logged read-modify-write
//!   fallback otherwise
//! - **Storage abstraction**: backend-agnostic via the trait-based
//!   [`LedgerStore`]
//!
//! ## Quick Start
//!
//! ```rust
//! use retail_core::utils::MemoryStore;
//! use retail_core::{OrderDraftBuilder, RetailCore};
//! use bigdecimal::BigDecimal;
//!
//! # async fn run() -> retail_core::CoreResult<()> {
//! let mut core = RetailCore::new(MemoryStore::new());
//! let customer = core
//!     .create_customer("Asha".to_string(), None, None, None, BigDecimal::from(0))
//!     .await?;
//! let draft = OrderDraftBuilder::new(customer.id.clone())
//!     .line("some-product-id".to_string(), 2, BigDecimal::from(100))
//!     .build();
//! # Ok(())
//! # }
//! ```

pub mod ops;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use ops::*;
pub use traits::*;
pub use types::*;
