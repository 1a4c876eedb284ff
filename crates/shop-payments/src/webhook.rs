//! Airwallex Webhook Handling
//!
//! Airwallex signs each delivery with `x-signature`, the lowercase hex
//! HMAC-SHA256 of `x-timestamp` followed by the raw request body, keyed by
//! the shared webhook secret. Verification must see the exact bytes that
//! were sent, so callers hand over the body before any JSON parsing.

use std::sync::Arc;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;

use crate::config::WebhookConfig;
use crate::error::{PaymentError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Timestamps above this are taken to be milliseconds
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Hex HMAC-SHA256 of `timestamp || raw_body`
pub fn compute_signature(raw_body: &[u8], timestamp: &str, secret: &str) -> Result<String> {
    let mac = new_mac(secret, timestamp, raw_body)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Check `signature` against the expected HMAC in constant time
pub fn verify_signature(raw_body: &[u8], timestamp: &str, signature: &str, secret: &str) -> bool {
    let Ok(provided) = hex::decode(signature) else {
        return false;
    };
    new_mac(secret, timestamp, raw_body)
        .is_ok_and(|mac| mac.verify_slice(&provided).is_ok())
}

fn new_mac(secret: &str, timestamp: &str, raw_body: &[u8]) -> Result<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| PaymentError::Config(format!("Invalid webhook secret: {e}")))?;
    mac.update(timestamp.as_bytes());
    mac.update(raw_body);
    Ok(mac)
}

/// Verifies incoming webhook deliveries against the configured secret
#[derive(Clone, Default)]
pub struct WebhookVerifier {
    secret: Option<String>,
    tolerance_secs: Option<u64>,
}

impl WebhookVerifier {
    pub fn new(secret: Option<String>, tolerance_secs: Option<u64>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
            tolerance_secs,
        }
    }

    pub fn from_config(config: &WebhookConfig) -> Self {
        Self::new(config.secret.clone(), config.tolerance_secs)
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Verify a delivery against the current clock
    pub fn verify(&self, raw_body: &[u8], timestamp: Option<&str>, signature: Option<&str>) -> Result<()> {
        self.verify_at(raw_body, timestamp, signature, chrono::Utc::now().timestamp())
    }

    /// Verify a delivery as of `now` (unix seconds)
    pub fn verify_at(
        &self,
        raw_body: &[u8],
        timestamp: Option<&str>,
        signature: Option<&str>,
        now: i64,
    ) -> Result<()> {
        let secret = self
            .secret
            .as_deref()
            .ok_or_else(|| PaymentError::WebhookSignature("webhook secret is not configured".into()))?;

        if raw_body.is_empty() {
            return Err(PaymentError::WebhookSignature("raw body is missing".into()));
        }

        let timestamp = timestamp
            .filter(|t| !t.is_empty())
            .ok_or_else(|| PaymentError::WebhookSignature("missing x-timestamp header".into()))?;
        let signature = signature
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PaymentError::WebhookSignature("missing x-signature header".into()))?;

        if let Some(tolerance) = self.tolerance_secs {
            check_freshness(timestamp, now, tolerance)?;
        }

        if !verify_signature(raw_body, timestamp, signature, secret) {
            return Err(PaymentError::WebhookSignature("signature mismatch".into()));
        }

        Ok(())
    }
}

fn check_freshness(timestamp: &str, now: i64, tolerance_secs: u64) -> Result<()> {
    let raw: i64 = timestamp
        .trim()
        .parse()
        .map_err(|_| PaymentError::WebhookSignature(format!("x-timestamp '{timestamp}' is not a number")))?;
    let sent = if raw > MILLIS_THRESHOLD { raw / 1000 } else { raw };

    if now.abs_diff(sent) > tolerance_secs {
        return Err(PaymentError::WebhookSignature(format!(
            "x-timestamp is {}s away from now, tolerance is {tolerance_secs}s",
            now.abs_diff(sent)
        )));
    }
    Ok(())
}

/// Top-level fields common to Airwallex events
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    /// Older deliveries name the event here instead of `name`
    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    #[serde(default)]
    pub event_type: Option<String>,

    #[serde(default)]
    pub account_id: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub data: Value,

    #[serde(default)]
    pub object: Option<Value>,
}

impl WebhookPayload {
    /// Event name, whichever field carried it
    pub fn event_type(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or(self.kind.as_deref())
            .or(self.event_type.as_deref())
    }

    /// The resource the event is about
    ///
    /// `data.object` first, then `data` itself when it carries an `id`, then
    /// the top-level `object`. A bare `data` object is the last resort.
    pub fn resource(&self) -> Option<&Value> {
        self.data
            .get("object")
            .or_else(|| self.data.get("id").map(|_| &self.data))
            .or(self.object.as_ref())
            .or_else(|| self.data.is_object().then_some(&self.data))
    }

    fn resource_str(&self, field: &str) -> Option<String> {
        self.resource()
            .and_then(|r| r.get(field))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn resource_amount(&self) -> Option<Decimal> {
        self.resource()
            .and_then(|r| r.get("amount"))
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Classified webhook event
#[derive(Clone, Debug, PartialEq)]
pub enum WebhookEvent {
    /// Payment captured
    PaymentSucceeded {
        event_id: Option<String>,
        intent_id: Option<String>,
        amount: Option<Decimal>,
        currency: Option<String>,
    },

    PaymentFailed {
        event_id: Option<String>,
        intent_id: Option<String>,
        failure_reason: Option<String>,
    },

    /// Anything we don't act on
    Other { event_type: String },
}

impl WebhookEvent {
    pub fn from_payload(payload: &WebhookPayload) -> Self {
        match payload.event_type() {
            Some("payment_intent.succeeded") => Self::PaymentSucceeded {
                event_id: payload.id.clone(),
                intent_id: payload.resource_str("id"),
                amount: payload.resource_amount(),
                currency: payload.resource_str("currency"),
            },
            Some("payment_intent.failed") => Self::PaymentFailed {
                event_id: payload.id.clone(),
                intent_id: payload.resource_str("id"),
                failure_reason: payload.resource_str("failure_reason"),
            },
            other => Self::Other {
                event_type: other.unwrap_or("unknown").to_string(),
            },
        }
    }
}

/// Receives verified payment events
#[async_trait]
pub trait PaymentEventSink: Send + Sync {
    async fn publish(&self, event: &WebhookEvent) -> Result<()>;
}

/// Sink that only logs
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingEventSink;

#[async_trait]
impl PaymentEventSink for LoggingEventSink {
    async fn publish(&self, event: &WebhookEvent) -> Result<()> {
        match event {
            WebhookEvent::PaymentSucceeded {
                intent_id,
                amount,
                currency,
                ..
            } => {
                tracing::info!(
                    intent_id = ?intent_id,
                    amount = ?amount,
                    currency = ?currency,
                    "Payment intent succeeded"
                );
            }
            WebhookEvent::PaymentFailed {
                intent_id,
                failure_reason,
                ..
            } => {
                tracing::warn!(
                    intent_id = ?intent_id,
                    failure_reason = ?failure_reason,
                    "Payment intent failed"
                );
            }
            WebhookEvent::Other { event_type } => {
                tracing::debug!(event_type = %event_type, "Unhandled webhook event");
            }
        }
        Ok(())
    }
}

/// Webhook handler
#[derive(Clone)]
pub struct WebhookHandler {
    sink: Arc<dyn PaymentEventSink>,
}

impl Default for WebhookHandler {
    fn default() -> Self {
        Self::new(Arc::new(LoggingEventSink))
    }
}

impl WebhookHandler {
    pub fn new(sink: Arc<dyn PaymentEventSink>) -> Self {
        Self { sink }
    }

    /// Parse a verified body
    pub fn parse(&self, raw_body: &[u8]) -> Result<WebhookPayload> {
        serde_json::from_slice(raw_body).map_err(|e| PaymentError::WebhookParse(e.to_string()))
    }

    /// Process a verified delivery
    pub async fn handle(&self, raw_body: &[u8]) -> Result<WebhookEvent> {
        let payload = self.parse(raw_body)?;
        tracing::info!(
            event_id = ?payload.id,
            event_type = payload.event_type().unwrap_or("unknown"),
            "Processing Airwallex webhook"
        );
        tracing::debug!(payload = %String::from_utf8_lossy(raw_body), "Webhook payload");

        let event = WebhookEvent::from_payload(&payload);
        self.sink.publish(&event).await?;
        Ok(event)
    }
}
