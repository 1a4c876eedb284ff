//! Payment Intent Creation
//!
//! Builds the Airwallex order payload from a priced cart and posts it to
//! the payment intents API. Amounts go over the wire as fixed two-decimal
//! strings.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shop_core::{CartItem, ShippingAddress, to_fixed2};
use uuid::Uuid;

use crate::auth::{self, ApiAuthenticator};
use crate::config::AirwallexConfig;
use crate::error::{PaymentError, Result};

const CREATE_INTENT_PATH: &str = "/api/v1/pa/payment_intents/create";

/// Everything needed to create one payment intent
#[derive(Debug, Clone)]
pub struct PaymentIntentRequest {
    pub amount: Decimal,
    pub currency: String,
    pub cart_items: Vec<CartItem>,
    pub return_url: String,
    pub shipping_address: Option<ShippingAddress>,
    pub shipping_amount: Option<Decimal>,
    pub tax_amount: Option<Decimal>,
}

/// Identifiers attached to each creation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderIds {
    /// Idempotency key for the API call
    pub request_id: String,
    pub merchant_order_id: String,
}

impl OrderIds {
    /// Fresh ids: a v4 request id and `ORD-{unix millis}-{8 hex chars}`
    pub fn generate() -> Self {
        let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
        Self {
            request_id: Uuid::new_v4().to_string(),
            merchant_order_id: format!("ORD-{}-{suffix}", chrono::Utc::now().timestamp_millis()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateIntentPayload {
    pub request_id: String,
    pub merchant_order_id: String,
    pub amount: String,
    pub currency: String,
    pub return_url: String,
    pub order: OrderBlock,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderBlock {
    pub products: Vec<ProductLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping: Option<ShippingBlock>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductLine {
    pub name: String,
    pub desc: String,
    pub unit_price: String,
    pub currency: String,
    pub quantity: u32,
    pub image_url: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShippingBlock {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub shipping_method: String,
    pub address: ShippingAddressBlock,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_amount: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShippingAddressBlock {
    pub city: String,
    pub country_code: String,
    pub postcode: String,
    pub state: String,
    pub street: String,
}

impl ProductLine {
    fn book(item: &CartItem, currency: &str) -> Self {
        Self {
            name: item.book.title.clone(),
            desc: format!("Book: {}", item.book.title),
            unit_price: to_fixed2(item.book.price),
            currency: currency.to_string(),
            quantity: item.quantity,
            image_url: item.book.image_url.clone(),
            url: item.book.image_url.clone(),
        }
    }

    fn tax(amount: Decimal, currency: &str) -> Self {
        Self {
            name: "Tax".into(),
            desc: "Tax".into(),
            unit_price: to_fixed2(amount),
            currency: currency.to_string(),
            quantity: 1,
            image_url: String::new(),
            url: String::new(),
        }
    }
}

/// Build the create-intent body
///
/// Tax travels as an extra product line so it shows up on the hosted page.
/// The shipping block is only present with an address, and its fee only
/// when positive.
pub fn build_order_payload(request: &PaymentIntentRequest, ids: OrderIds) -> CreateIntentPayload {
    let currency = request.currency.as_str();

    let mut products: Vec<ProductLine> = request
        .cart_items
        .iter()
        .map(|item| ProductLine::book(item, currency))
        .collect();

    if let Some(tax) = request.tax_amount.filter(|t| *t > Decimal::ZERO) {
        products.push(ProductLine::tax(tax, currency));
    }

    let shipping = request.shipping_address.as_ref().map(|address| ShippingBlock {
        first_name: address.first_name.clone(),
        last_name: address.last_name.clone(),
        phone_number: String::new(),
        shipping_method: "Standard".into(),
        address: ShippingAddressBlock {
            city: address.city.clone(),
            country_code: address.country.clone(),
            postcode: address.zip_code.clone(),
            state: address.state.clone(),
            street: address.street.clone(),
        },
        fee_amount: request
            .shipping_amount
            .filter(|fee| *fee > Decimal::ZERO)
            .map(to_fixed2),
    });

    CreateIntentPayload {
        request_id: ids.request_id,
        merchant_order_id: ids.merchant_order_id,
        amount: to_fixed2(request.amount),
        currency: request.currency.clone(),
        return_url: request.return_url.clone(),
        order: OrderBlock { products, shipping },
    }
}

/// What the frontend needs to open the hosted payment page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntentResult {
    pub id: String,
    pub client_secret: String,
    pub currency: String,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosted_checkout_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawIntentResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    client_secret: Option<String>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    amount: Option<Decimal>,
    #[serde(default)]
    hosted_checkout_url: Option<String>,
}

/// Payment gateway trait (Strategy pattern)
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(&self, request: &PaymentIntentRequest) -> Result<PaymentIntentResult>;

    fn name(&self) -> &str;
}

/// Airwallex payment intents client
pub struct AirwallexClient {
    http: reqwest::Client,
    base_url: String,
    auth: Arc<dyn ApiAuthenticator>,
}

impl AirwallexClient {
    /// Build the client and pick its authentication strategy
    pub fn new(config: &AirwallexConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PaymentError::Config(format!("Failed to build HTTP client: {e}")))?;
        let auth = auth::from_config(config, http.clone());

        Ok(Self::with_authenticator(http, &config.base_url, auth))
    }

    pub fn with_authenticator(http: reqwest::Client, base_url: &str, auth: Arc<dyn ApiAuthenticator>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    /// Name of the authentication strategy in use
    pub fn auth_mode(&self) -> &str {
        self.auth.name()
    }

    async fn post_intent(&self, payload: &CreateIntentPayload) -> Result<RawIntentResponse> {
        let mut request = self
            .http
            .post(format!("{}{CREATE_INTENT_PATH}", self.base_url))
            .header(ACCEPT, "application/json")
            .json(payload);

        if let Some(authorization) = self.auth.authorization().await? {
            request = request.header(AUTHORIZATION, authorization);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = status.as_u16(),
                merchant_order_id = %payload.merchant_order_id,
                "Airwallex rejected payment intent"
            );
            return Err(PaymentError::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| PaymentError::ContractViolation(format!("payment intent response: {e}")))
    }
}

#[async_trait]
impl PaymentGateway for AirwallexClient {
    async fn create_payment_intent(&self, request: &PaymentIntentRequest) -> Result<PaymentIntentResult> {
        let payload = build_order_payload(request, OrderIds::generate());

        tracing::info!(
            merchant_order_id = %payload.merchant_order_id,
            amount = %payload.amount,
            currency = %payload.currency,
            products = payload.order.products.len(),
            "Creating payment intent"
        );

        let raw = self.post_intent(&payload).await?;

        let id = raw
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| PaymentError::ContractViolation("payment intent response has no id".into()))?;
        let client_secret = raw.client_secret.filter(|s| !s.is_empty()).ok_or_else(|| {
            PaymentError::ContractViolation("payment intent response has no client_secret".into())
        })?;

        tracing::info!(intent_id = %id, "Payment intent created");

        Ok(PaymentIntentResult {
            id,
            client_secret,
            currency: raw.currency.unwrap_or_else(|| request.currency.clone()),
            amount: raw.amount.unwrap_or(request.amount),
            hosted_checkout_url: raw.hosted_checkout_url,
        })
    }

    fn name(&self) -> &str {
        "airwallex"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::NoAuthentication;
    use rust_decimal_macros::dec;
    use serde_json::{Value, json};
    use shop_core::Book;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn address() -> ShippingAddress {
        ShippingAddress {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            street: "1 Main St".into(),
            city: "New York".into(),
            state: "NY".into(),
            zip_code: "10001".into(),
            country: "US".into(),
        }
    }

    fn request() -> PaymentIntentRequest {
        let mut book = Book::new("1", "Dune", dec!(10));
        book.image_url = "https://img.example/dune.jpg".into();

        PaymentIntentRequest {
            amount: dec!(27.5),
            currency: "USD".into(),
            cart_items: vec![CartItem::new(book, 2)],
            return_url: "http://localhost:3000/checkout/success".into(),
            shipping_address: Some(address()),
            shipping_amount: Some(dec!(5)),
            tax_amount: Some(dec!(2.5)),
        }
    }

    fn ids() -> OrderIds {
        OrderIds {
            request_id: "req-1".into(),
            merchant_order_id: "ORD-1-ABCDEF12".into(),
        }
    }

    #[test]
    fn test_order_ids_format() {
        let ids = OrderIds::generate();
        assert!(Uuid::parse_str(&ids.request_id).is_ok());

        let parts: Vec<&str> = ids.merchant_order_id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 8);
        assert_eq!(parts[2], parts[2].to_uppercase());

        assert_ne!(OrderIds::generate().request_id, ids.request_id);
    }

    #[test]
    fn test_payload_shape() {
        let payload = serde_json::to_value(build_order_payload(&request(), ids())).unwrap();

        assert_eq!(payload["amount"], "27.50");
        assert_eq!(payload["request_id"], "req-1");
        assert_eq!(payload["return_url"], "http://localhost:3000/checkout/success");

        let products = payload["order"]["products"].as_array().unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0]["name"], "Dune");
        assert_eq!(products[0]["desc"], "Book: Dune");
        assert_eq!(products[0]["unit_price"], "10.00");
        assert_eq!(products[0]["quantity"], 2);
        assert_eq!(products[0]["url"], "https://img.example/dune.jpg");
        assert_eq!(products[1]["name"], "Tax");
        assert_eq!(products[1]["unit_price"], "2.50");
        assert_eq!(products[1]["quantity"], 1);

        let shipping = &payload["order"]["shipping"];
        assert_eq!(shipping["fee_amount"], "5.00");
        assert_eq!(shipping["shipping_method"], "Standard");
        assert_eq!(shipping["phone_number"], "");
        assert_eq!(shipping["address"]["country_code"], "US");
        assert_eq!(shipping["address"]["postcode"], "10001");
        assert_eq!(shipping["address"]["street"], "1 Main St");
    }

    #[test]
    fn test_payload_omits_zero_tax_and_missing_address() {
        let mut request = request();
        request.tax_amount = Some(Decimal::ZERO);
        request.shipping_address = None;

        let payload = serde_json::to_value(build_order_payload(&request, ids())).unwrap();
        assert_eq!(payload["order"]["products"].as_array().unwrap().len(), 1);
        assert!(payload["order"].get("shipping").is_none());
    }

    #[test]
    fn test_payload_omits_zero_shipping_fee() {
        let mut request = request();
        request.shipping_amount = Some(Decimal::ZERO);

        let payload = serde_json::to_value(build_order_payload(&request, ids())).unwrap();
        assert!(payload["order"]["shipping"].get("fee_amount").is_none());
    }

    fn client(server: &MockServer) -> AirwallexClient {
        AirwallexClient::with_authenticator(reqwest::Client::new(), &server.uri(), Arc::new(NoAuthentication))
    }

    #[tokio::test]
    async fn test_create_payment_intent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CREATE_INTENT_PATH))
            .and(body_partial_json(json!({"amount": "27.50", "currency": "USD"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "int_123",
                "client_secret": "cs_456",
                "currency": "USD",
                "amount": 27.5,
                "status": "REQUIRES_PAYMENT_METHOD"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client(&server).create_payment_intent(&request()).await.unwrap();
        assert_eq!(result.id, "int_123");
        assert_eq!(result.client_secret, "cs_456");
        assert_eq!(result.amount, dec!(27.5));
        assert_eq!(result.hosted_checkout_url, None);
    }

    #[tokio::test]
    async fn test_create_sends_bearer_token_after_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/authentication/login"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"token": "tok_abc"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(CREATE_INTENT_PATH))
            .and(header("authorization", "Bearer tok_abc"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "int_1",
                "client_secret": "cs_1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = AirwallexConfig {
            client_id: Some("cid".into()),
            api_key: Some("key".into()),
            base_url: server.uri(),
            ..Default::default()
        };
        let client = AirwallexClient::new(&config).unwrap();
        assert_eq!(client.auth_mode(), "bearer-login");

        let result = client.create_payment_intent(&request()).await.unwrap();
        assert_eq!(result.currency, "USD");
        assert_eq!(result.amount, dec!(27.5));
    }

    #[tokio::test]
    async fn test_upstream_rejection_keeps_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CREATE_INTENT_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": "validation_error",
                "message": "amount must be positive"
            })))
            .mount(&server)
            .await;

        let err = client(&server).create_payment_intent(&request()).await.unwrap_err();
        match &err {
            PaymentError::Api { status, .. } => assert_eq!(*status, 400),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.details().unwrap()["code"], Value::from("validation_error"));
    }

    #[tokio::test]
    async fn test_missing_client_secret_is_contract_violation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CREATE_INTENT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "int_123"})))
            .mount(&server)
            .await;

        let err = client(&server).create_payment_intent(&request()).await.unwrap_err();
        assert!(matches!(err, PaymentError::ContractViolation(_)));
    }
}
