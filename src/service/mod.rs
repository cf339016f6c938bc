//! Service layer: business logic orchestration.
//!
//! [`PoolService`] runs the lottery (joins, draws, summaries) and
//! [`CheckoutService`] sells storefront listings. Both collect payments
//! through the [`crate::payment::PaymentGateway`] and emit events through
//! the [`crate::domain::EventBus`].

pub mod checkout_service;
pub mod pool_service;

pub use checkout_service::{CheckoutService, PurchaseOutcome, PurchaseReceipt};
pub use pool_service::{JoinOutcome, JoinReceipt, PoolService, WinnerReceipt};
