//! Error Types

use thiserror::Error;

/// Result type alias for model validation
pub type Result<T> = std::result::Result<T, ModelError>;

/// Invalid input from the storefront
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Shipping address failed validation
    #[error("Invalid shipping address: {0}")]
    InvalidAddress(String),

    /// A cart line failed validation
    #[error("Invalid cart item {book_id}: {reason}")]
    InvalidCartItem { book_id: String, reason: String },

    /// Client-supplied pricing is not internally consistent
    #[error("Invalid pricing: {0}")]
    InvalidPricing(String),
}

impl ModelError {
    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidAddress(msg) => format!("Please check your shipping address: {msg}"),
            Self::InvalidCartItem { .. } => "Your cart contains an invalid item.".into(),
            Self::InvalidPricing(_) => "The displayed price is out of date. Please refresh.".into(),
        }
    }
}
