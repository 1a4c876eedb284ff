//! Payment Configuration

use std::fmt;
use std::str::FromStr;

use shop_core::env;

use crate::error::{PaymentError, Result};

/// Airwallex environment
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AirwallexEnv {
    #[default]
    Demo,
    Prod,
}

impl AirwallexEnv {
    pub const fn default_base_url(self) -> &'static str {
        match self {
            Self::Demo => "https://api-demo.airwallex.com",
            Self::Prod => "https://api.airwallex.com",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Demo => "demo",
            Self::Prod => "prod",
        }
    }
}

impl FromStr for AirwallexEnv {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "demo" | "sandbox" => Ok(Self::Demo),
            "prod" | "production" => Ok(Self::Prod),
            other => Err(PaymentError::Config(format!(
                "AIRWALLEX_ENV must be 'demo' or 'prod', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for AirwallexEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Airwallex API configuration
#[derive(Clone)]
pub struct AirwallexConfig {
    pub client_id: Option<String>,
    pub api_key: Option<String>,
    pub env: AirwallexEnv,

    /// API base URL without trailing slash
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AirwallexConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            api_key: None,
            env: AirwallexEnv::Demo,
            base_url: AirwallexEnv::Demo.default_base_url().into(),
            timeout_secs: 10,
        }
    }
}

impl fmt::Debug for AirwallexConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AirwallexConfig")
            .field("client_id", &self.client_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("env", &self.env)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl AirwallexConfig {
    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let environment = env::optional("AIRWALLEX_ENV")
            .map(|raw| raw.parse::<AirwallexEnv>())
            .transpose()?
            .unwrap_or_default();

        let base_url = env::optional("AIRWALLEX_API_BASE_URL")
            .unwrap_or_else(|| environment.default_base_url().to_string());

        Ok(Self {
            client_id: env::optional("AIRWALLEX_CLIENT_ID"),
            api_key: env::optional("AIRWALLEX_API_KEY"),
            env: environment,
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Default::default()
        })
    }

    /// Client id and API key, when both are configured
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.client_id, &self.api_key) {
            (Some(id), Some(key)) => Some((id.as_str(), key.as_str())),
            _ => None,
        }
    }
}

/// Webhook verification configuration
#[derive(Clone, Default)]
pub struct WebhookConfig {
    /// Shared HMAC secret; without it every webhook is rejected
    pub secret: Option<String>,

    /// Maximum age of `x-timestamp` in seconds; `None` disables the check
    pub tolerance_secs: Option<u64>,
}

impl fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("tolerance_secs", &self.tolerance_secs)
            .finish()
    }
}

impl WebhookConfig {
    pub fn from_env() -> Result<Self> {
        let tolerance_secs = env::optional("AIRWALLEX_WEBHOOK_TOLERANCE_SECS")
            .map(|raw| {
                raw.parse::<u64>().map_err(|e| {
                    PaymentError::Config(format!("Invalid AIRWALLEX_WEBHOOK_TOLERANCE_SECS '{raw}': {e}"))
                })
            })
            .transpose()?;

        Ok(Self {
            secret: env::optional("AIRWALLEX_WEBHOOK_SECRET"),
            tolerance_secs,
        })
    }
}
