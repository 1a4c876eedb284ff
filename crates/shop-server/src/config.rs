//! Server Configuration
//!
//! Read once in `main` after `.env` is loaded, then passed by reference.

use shop_core::env;
use shop_payments::{AirwallexConfig, PaymentError, WebhookConfig};
use shop_pricing::{PricingError, QuadernoConfig, ShippingConfig};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {name} '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Payments(#[from] PaymentError),
}

/// Everything the server needs to start
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: String,

    /// Storefront origin; return URL base and the only CORS origin
    pub frontend_base_url: String,

    /// Timeout for every outbound HTTP call
    pub http_timeout_secs: u64,

    pub quaderno: QuadernoConfig,
    pub airwallex: AirwallexConfig,
    pub webhook: WebhookConfig,
    pub shipping: ShippingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3001".into(),
            frontend_base_url: "http://localhost:3000".into(),
            http_timeout_secs: 10,
            quaderno: QuadernoConfig::default(),
            airwallex: AirwallexConfig::default(),
            webhook: WebhookConfig::default(),
            shipping: ShippingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let http_timeout_secs = match env::optional("HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                Ok(_) => {
                    return Err(ConfigError::Invalid {
                        name: "HTTP_TIMEOUT_SECS",
                        value: raw,
                        reason: "must be at least 1".into(),
                    });
                }
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        name: "HTTP_TIMEOUT_SECS",
                        value: raw,
                        reason: e.to_string(),
                    });
                }
            },
            None => defaults.http_timeout_secs,
        };

        let mut quaderno = QuadernoConfig::from_env();
        quaderno.timeout_secs = http_timeout_secs;

        let mut airwallex = AirwallexConfig::from_env()?;
        airwallex.timeout_secs = http_timeout_secs;

        Ok(Self {
            bind_addr: env::or_default("BIND_ADDR", &defaults.bind_addr),
            frontend_base_url: env::or_default("FRONTEND_BASE_URL", &defaults.frontend_base_url)
                .trim_end_matches('/')
                .to_string(),
            http_timeout_secs,
            quaderno,
            airwallex,
            webhook: WebhookConfig::from_env()?,
            shipping: ShippingConfig::from_env()?,
        })
    }

    /// Where the hosted payment page sends the customer afterwards
    pub fn return_url(&self) -> String {
        format!("{}/", self.frontend_base_url)
    }
}
