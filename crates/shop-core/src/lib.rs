//! # shop-core
//!
//! Domain model shared by the bookshop checkout crates.
//!
//! ## Data Flow
//!
//! ```text
//! Cart + ShippingAddress ──▶ PricingBreakdown ──▶ payment intent
//! ```
//!
//! Money is always `rust_decimal::Decimal`. Components of a
//! [`PricingBreakdown`] are rounded to cents independently (see [`money`]).

pub mod catalog;
pub mod env;
pub mod error;
pub mod model;
pub mod money;

pub use error::{ModelError, Result};
pub use model::{Book, Cart, CartItem, Destination, PricingBreakdown, ShippingAddress};
pub use money::{CURRENCY, round2, to_fixed2};
