//! Domain DTOs for the product API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.
//!
//! Validation lives on the payload types so the client can reject a request
//! before it reaches the network. The server validates again; the client
//! check only saves a round-trip.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;

/// Server-assigned product identifier.
pub type ProductId = i64;

/// A single product returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub description: String,
    pub price: f64,
    #[serde(default, deserialize_with = "nullable_text")]
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// True when every editable field matches `other`, ignoring identity and
    /// timestamps.
    pub fn same_fields(&self, other: &Product) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.price == other.price
            && self.category == other.category
    }
}

/// The server reports unset optional text as `null`; it reads as empty here.
fn nullable_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Request payload for creating a new product. All fields are required.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductCreate {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
}

impl ProductCreate {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_name(&self.name)?;
        validate_price(self.price)
    }
}

/// Request payload for updating an existing product. Only the fields present
/// in the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ProductUpdate {
    /// A full draft carrying every editable field of `product`.
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: Some(product.name.clone()),
            description: Some(product.description.clone()),
            price: Some(product.price),
            category: Some(product.category.clone()),
        }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        Ok(())
    }
}

/// Pagination and search parameters for listing products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub skip: u32,
    pub limit: u32,
    pub search: String,
}

impl ListQuery {
    pub const DEFAULT_LIMIT: u32 = 10;

    pub fn new(skip: u32, limit: u32, search: impl Into<String>) -> Self {
        Self {
            skip,
            limit,
            search: search.into(),
        }
    }

    /// The query for the page immediately after this one.
    pub fn next_page(&self) -> Self {
        Self {
            skip: self.skip.saturating_add(self.limit),
            ..self.clone()
        }
    }

    /// The query for the page immediately before this one, clamped at zero.
    pub fn previous_page(&self) -> Self {
        Self {
            skip: self.skip.saturating_sub(self.limit),
            ..self.clone()
        }
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_LIMIT, "")
    }
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::Validation("name must not be empty".to_string()));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), ApiError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::Validation(format!(
            "price must be a non-negative number, got {price}"
        )));
    }
    Ok(())
}
