//! Payment Error Types

use shop_core::ModelError;
use shop_pricing::PricingError;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment-related errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Checkout attempted with no items
    #[error("Cart cannot be empty")]
    EmptyCart,

    /// Checkout attempted without a shipping address
    #[error("Shipping address is required")]
    MissingAddress,

    /// Cart, address or client pricing failed validation
    #[error(transparent)]
    Validation(#[from] ModelError),

    /// Payment API answered with a non-success status
    #[error("Airwallex returned {status}: {body}")]
    Api { status: u16, body: String },

    /// Payment API unreachable or timed out
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Payment API answered successfully but without the fields we rely on
    #[error("Airwallex contract violation: {0}")]
    ContractViolation(String),

    /// Tax lookup failed while pricing the order
    #[error("Pricing failed: {0}")]
    Pricing(PricingError),

    /// Webhook signature verification failed
    #[error("Webhook signature invalid: {0}")]
    WebhookSignature(String),

    /// Webhook payload parsing failed
    #[error("Webhook parse error: {0}")]
    WebhookParse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Bad input found while pricing is reported like any other validation failure
impl From<PricingError> for PaymentError {
    fn from(e: PricingError) -> Self {
        match e {
            PricingError::Validation(e) => Self::Validation(e),
            other => Self::Pricing(other),
        }
    }
}

impl PaymentError {
    /// Check if this error is retryable by the caller
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            Self::Network(_) => true,
            Self::Pricing(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Rejected because of what the caller sent, not because of us or upstream
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::EmptyCart | Self::MissingAddress | Self::Validation(_))
    }

    /// Upstream response body, parsed as JSON when possible
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Api { body, .. } | Self::Pricing(PricingError::TaxService { body, .. }) => Some(
                serde_json::from_str(body).unwrap_or_else(|_| serde_json::Value::String(body.clone())),
            ),
            _ => None,
        }
    }

    /// Get user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyCart => "Your cart is empty. Please add items before checkout.".into(),
            Self::MissingAddress => "Please provide your shipping address before checkout.".into(),
            Self::Validation(e) => e.user_message(),
            Self::Api { status, .. } if *status < 500 => {
                "The payment provider rejected this order. Please check your details.".into()
            }
            Self::Api { .. } | Self::Network(_) => "Payment processing failed. Please try again.".into(),
            Self::Pricing(e) => e.user_message().into(),
            Self::WebhookSignature(_) => "Invalid webhook signature.".into(),
            Self::WebhookParse(_) => "Invalid webhook payload.".into(),
            Self::ContractViolation(_) | Self::Config(_) => "Service configuration error.".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(!PaymentError::EmptyCart.is_retryable());
        assert!(PaymentError::EmptyCart.is_client_error());
        assert!(PaymentError::Api { status: 503, body: String::new() }.is_retryable());
        assert!(!PaymentError::Api { status: 400, body: String::new() }.is_retryable());
        assert!(!PaymentError::ContractViolation("no id".into()).is_retryable());
    }

    #[test]
    fn test_pricing_input_errors_are_client_errors() {
        let err = PaymentError::from(PricingError::from(ModelError::InvalidPricing("negative shipping".into())));
        assert!(matches!(err, PaymentError::Validation(ModelError::InvalidPricing(_))));
        assert!(err.is_client_error());

        let err = PaymentError::from(PricingError::TaxService { status: 503, body: String::new() });
        assert!(matches!(err, PaymentError::Pricing(_)));
        assert!(!err.is_client_error());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_details_parse_json_body() {
        let err = PaymentError::Api {
            status: 400,
            body: r#"{"code":"validation_error","message":"bad postcode"}"#.into(),
        };
        assert_eq!(err.details().unwrap()["code"], "validation_error");

        let err = PaymentError::Api { status: 502, body: "upstream down".into() };
        assert_eq!(err.details().unwrap(), serde_json::json!("upstream down"));
    }
}
