//! Domain Models
//!
//! Core data types for the bookshop checkout flow.
//! Uses `rust_decimal` for all monetary values - never use f64 for money!

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ModelError, Result};
use crate::money::round2;

/// A book in the catalog
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Catalog identifier (unique)
    #[validate(length(min = 1))]
    pub id: String,

    /// Display title
    #[validate(length(min = 1))]
    pub title: String,

    /// Unit price in USD
    #[validate(custom(function = "non_negative"))]
    pub price: Decimal,

    /// Cover image
    #[serde(default)]
    pub image_url: String,

    #[serde(default)]
    pub description: String,
}

impl Book {
    pub fn new(id: impl Into<String>, title: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            image_url: String::new(),
            description: String::new(),
        }
    }
}

fn non_negative(value: &Decimal) -> std::result::Result<(), validator::ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(validator::ValidationError::new("negative_amount"));
    }
    Ok(())
}

/// A book plus how many copies the customer wants
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CartItem {
    #[validate(nested)]
    pub book: Book,

    /// Number of copies (at least one)
    #[validate(range(min = 1))]
    pub quantity: u32,
}

impl CartItem {
    pub fn new(book: Book, quantity: u32) -> Self {
        Self { book, quantity }
    }

    /// Unit price times quantity, unrounded
    ///
    /// Errors when the product does not fit in a `Decimal`.
    pub fn line_total(&self) -> Result<Decimal> {
        self.book
            .price
            .checked_mul(Decimal::from(self.quantity))
            .ok_or_else(|| self.too_large())
    }

    fn too_large(&self) -> ModelError {
        ModelError::InvalidCartItem {
            book_id: self.book.id.clone(),
            reason: "amount is too large".into(),
        }
    }
}

/// An ordered cart, unique by book id
///
/// Adding a book that is already present merges quantities instead of
/// creating a second line; lines keep the order they were first added in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from raw lines, merging duplicate book ids
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            cart.add(item);
        }
        cart
    }

    /// Add a line, merging with an existing line for the same book
    pub fn add(&mut self, item: CartItem) {
        match self.items.iter_mut().find(|i| i.book.id == item.book.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            }
            None => self.items.push(item),
        }
    }

    /// Validate every line (positive quantity, non-negative price)
    pub fn validate(&self) -> Result<()> {
        for item in &self.items {
            item.validate().map_err(|e| {
                ModelError::InvalidCartItem {
                    book_id: item.book.id.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        Ok(())
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Total number of copies across all lines
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of line totals, rounded to cents
    pub fn subtotal(&self) -> Result<Decimal> {
        Self::subtotal_of(&self.items)
    }

    /// Subtotal of arbitrary lines, without merging them first
    pub fn subtotal_of(items: &[CartItem]) -> Result<Decimal> {
        let sum = items.iter().try_fold(Decimal::ZERO, |sum, item| {
            sum.checked_add(item.line_total()?)
                .ok_or_else(|| item.too_large())
        })?;
        Ok(round2(sum))
    }
}

/// Where the order ships to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[validate(length(min = 1, message = "first name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "last name is required"))]
    pub last_name: String,

    #[validate(email(message = "email is not valid"))]
    pub email: String,

    /// Street line (sent as `address` on the wire)
    #[serde(rename = "address")]
    #[validate(length(min = 1, message = "street address is required"))]
    pub street: String,

    #[validate(length(min = 1, message = "city is required"))]
    pub city: String,

    #[serde(default)]
    pub state: String,

    #[validate(length(min = 1, message = "zip code is required"))]
    pub zip_code: String,

    /// ISO 3166-1 alpha-2 country code
    #[validate(length(equal = 2, message = "country must be a 2-letter ISO code"))]
    pub country: String,
}

impl ShippingAddress {
    /// Validate, folding field errors into one message
    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| ModelError::InvalidAddress(e.to_string()))
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// The part of the address that tax and shipping care about
    pub fn destination(&self) -> Destination {
        Destination::from(self)
    }
}

/// Destination used for tax and shipping quotes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    #[validate(length(min = 1, message = "country is required"))]
    pub country: String,

    #[serde(default)]
    pub zip_code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
}

impl Destination {
    pub fn new(country: impl Into<String>, zip_code: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            zip_code: zip_code.into(),
            city: None,
            state: None,
            street: None,
        }
    }

    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| ModelError::InvalidAddress(e.to_string()))
    }
}

impl From<&ShippingAddress> for Destination {
    fn from(address: &ShippingAddress) -> Self {
        let present = |s: &str| (!s.trim().is_empty()).then(|| s.to_string());
        Self {
            country: address.country.clone(),
            zip_code: address.zip_code.clone(),
            city: present(&address.city),
            state: present(&address.state),
            street: present(&address.street),
        }
    }
}

/// Price breakdown shown to the customer and charged to the payment provider
///
/// Every component is rounded to cents on its own, so `total` is only
/// guaranteed to match `subtotal + tax + shipping` within one cent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,

    /// Effective tax rate as a percentage (8.875 means 8.875%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<Decimal>,
}

impl PricingBreakdown {
    /// Largest allowed drift between `total` and the sum of its parts
    pub const TOLERANCE: Decimal = dec!(0.01);

    /// Sum of the rounded components, `None` on overflow
    pub fn components_sum(&self) -> Option<Decimal> {
        self.subtotal.checked_add(self.tax)?.checked_add(self.shipping)
    }

    /// Whether `total` agrees with its components within one cent
    pub fn is_consistent(&self) -> bool {
        self.components_sum()
            .and_then(|sum| self.total.checked_sub(sum))
            .is_some_and(|drift| drift.abs() <= Self::TOLERANCE)
    }

    /// Reject client-supplied breakdowns that could not have come from us
    pub fn check(&self) -> Result<()> {
        let parts = [self.subtotal, self.tax, self.shipping, self.total];
        if parts.iter().any(|p| p.is_sign_negative() && !p.is_zero()) {
            return Err(ModelError::InvalidPricing("amounts must not be negative".into()));
        }
        let Some(sum) = self.components_sum() else {
            return Err(ModelError::InvalidPricing("amounts are too large".into()));
        };
        if !self.is_consistent() {
            return Err(ModelError::InvalidPricing(format!(
                "total {} does not match subtotal + tax + shipping = {sum}",
                self.total
            )));
        }
        Ok(())
    }
}
