//! Airwallex API Authentication
//!
//! The production and demo APIs want a short-lived bearer token obtained by
//! logging in with a client id and API key. Sandbox stand-ins accept
//! unauthenticated calls. Which one applies is decided once at startup from
//! whether credentials are configured.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;

use crate::config::AirwallexConfig;
use crate::error::{PaymentError, Result};

const LOGIN_PATH: &str = "/api/v1/authentication/login";

/// Produces the `Authorization` header for payment API calls
#[async_trait]
pub trait ApiAuthenticator: Send + Sync {
    /// Header value to send, or `None` to send no `Authorization` header
    async fn authorization(&self) -> Result<Option<String>>;

    fn name(&self) -> &str;
}

/// No authentication (sandbox / dummy API)
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAuthentication;

#[async_trait]
impl ApiAuthenticator for NoAuthentication {
    async fn authorization(&self) -> Result<Option<String>> {
        Ok(None)
    }

    fn name(&self) -> &str {
        "none"
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
}

/// Exchanges client id + API key for a bearer token on every call
pub struct LoginAuthenticator {
    http: reqwest::Client,
    login_url: String,
    client_id: String,
    api_key: String,
}

impl LoginAuthenticator {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        client_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            login_url: format!("{base_url}{LOGIN_PATH}"),
            client_id: client_id.into(),
            api_key: api_key.into(),
        }
    }

    /// Log in and return the raw token
    pub async fn login(&self) -> Result<String> {
        let response = self
            .http
            .post(&self.login_url)
            .header("x-client-id", &self.client_id)
            .header("x-api-key", &self.api_key)
            .header(ACCEPT, "application/json")
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "Airwallex login failed");
            return Err(PaymentError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let login: LoginResponse = serde_json::from_str(&body)
            .map_err(|e| PaymentError::ContractViolation(format!("login response: {e}")))?;

        login
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| PaymentError::ContractViolation("login response has no token".into()))
    }
}

#[async_trait]
impl ApiAuthenticator for LoginAuthenticator {
    async fn authorization(&self) -> Result<Option<String>> {
        let token = self.login().await?;
        tracing::debug!("Obtained Airwallex bearer token");
        Ok(Some(format!("Bearer {token}")))
    }

    fn name(&self) -> &str {
        "bearer-login"
    }
}

/// Choose the authentication strategy once from configuration
pub fn from_config(config: &AirwallexConfig, http: reqwest::Client) -> Arc<dyn ApiAuthenticator> {
    match config.credentials() {
        Some((client_id, api_key)) => {
            tracing::info!(env = %config.env, "Airwallex: authenticating with client credentials");
            Arc::new(LoginAuthenticator::new(http, &config.base_url, client_id, api_key))
        }
        None => {
            tracing::warn!("Airwallex: no credentials configured, calling the API without authentication");
            Arc::new(NoAuthentication)
        }
    }
}
