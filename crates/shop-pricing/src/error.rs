//! Error Types for Pricing

use shop_core::ModelError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PricingError>;

#[derive(Error, Debug)]
pub enum PricingError {
    /// Tax API answered with a non-success status
    #[error("Tax service returned {status}: {body}")]
    TaxService { status: u16, body: String },

    #[error("Tax service response malformed: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Inputs that cannot be priced: negative shipping, amounts out of range
    #[error(transparent)]
    Validation(#[from] ModelError),
}

impl PricingError {
    /// Tax lookups are idempotent reads; anything but bad config or bad input can be retried
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Self::Config(_) | Self::Validation(_))
    }

    /// Upstream HTTP status, when the tax API produced one
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::TaxService { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the failure was a timeout waiting on the tax API
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network(e) if e.is_timeout())
    }

    pub fn user_message(&self) -> &str {
        match self {
            Self::Config(_) => "Service configuration error.",
            Self::Validation(_) => "Please check your cart and shipping details.",
            _ => "We could not calculate tax for this address. Please try again.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_is_not_retryable() {
        let err = PricingError::from(ModelError::InvalidPricing("negative shipping".into()));

        assert!(!err.is_retryable());
        assert!(!err.is_timeout());
        assert_eq!(err.upstream_status(), None);
        assert!(PricingError::MalformedResponse("eof".into()).is_retryable());
    }
}
