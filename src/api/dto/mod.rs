//! Data Transfer Objects for REST request/response serialization.
//!
//! All PYUSD amounts are serialized as decimal strings so clients never
//! round micro-units through floating point.

pub mod checkout_dto;
pub mod common_dto;
pub mod pool_dto;

pub use checkout_dto::*;
pub use common_dto::*;
pub use pool_dto::*;
