//! Stateless HTTP request builder and response parser for the product API.
//!
//! # Design
//! `ProductClient` holds only a `base_url` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Every operation is exactly one request: nothing here
//! retries, caches or deduplicates.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{ListQuery, Product, ProductCreate, ProductId, ProductUpdate};

/// Synchronous, stateless client for the product API.
#[derive(Debug, Clone)]
pub struct ProductClient {
    base_url: String,
}

impl ProductClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_products(&self, query: &ListQuery) -> Result<HttpRequest, ApiError> {
        if query.limit == 0 {
            return Err(ApiError::Validation("limit must be greater than zero".to_string()));
        }
        let path = format!(
            "{}/products?skip={}&limit={}&search={}",
            self.base_url,
            query.skip,
            query.limit,
            urlencoding::encode(&query.search)
        );
        Ok(self.request(HttpMethod::Get, path, None))
    }

    pub fn build_get_product(&self, id: ProductId) -> HttpRequest {
        self.request(HttpMethod::Get, self.product_path(id), None)
    }

    pub fn build_create_product(&self, input: &ProductCreate) -> Result<HttpRequest, ApiError> {
        input.validate()?;
        let body = to_json(input)?;
        Ok(self.request(
            HttpMethod::Post,
            format!("{}/products", self.base_url),
            Some(body),
        ))
    }

    pub fn build_update_product(
        &self,
        id: ProductId,
        input: &ProductUpdate,
    ) -> Result<HttpRequest, ApiError> {
        input.validate()?;
        let body = to_json(input)?;
        Ok(self.request(HttpMethod::Put, self.product_path(id), Some(body)))
    }

    pub fn build_delete_product(&self, id: ProductId) -> HttpRequest {
        self.request(HttpMethod::Delete, self.product_path(id), None)
    }

    pub fn parse_list_products(&self, response: HttpResponse) -> Result<Vec<Product>, ApiError> {
        check_status(&response, &[200])?;
        from_json(&response.body)
    }

    pub fn parse_get_product(&self, response: HttpResponse) -> Result<Product, ApiError> {
        check_status(&response, &[200])?;
        from_json(&response.body)
    }

    pub fn parse_create_product(&self, response: HttpResponse) -> Result<Product, ApiError> {
        check_status(&response, &[200, 201])?;
        from_json(&response.body)
    }

    pub fn parse_update_product(&self, response: HttpResponse) -> Result<Product, ApiError> {
        check_status(&response, &[200])?;
        from_json(&response.body)
    }

    pub fn parse_delete_product(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, &[200, 204])
    }

    fn product_path(&self, id: ProductId) -> String {
        format!("{}/products/{id}", self.base_url)
    }

    fn request(&self, method: HttpMethod, path: String, body: Option<String>) -> HttpRequest {
        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        debug!(%method, %path, "built request");
        HttpRequest {
            method,
            path,
            headers,
            body,
        }
    }
}

/// Map statuses outside `accepted` to the matching `ApiError` variant.
fn check_status(response: &HttpResponse, accepted: &[u16]) -> Result<(), ApiError> {
    if accepted.contains(&response.status) {
        return Ok(());
    }
    Err(ApiError::from_status(response.status, response.body.clone()))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn from_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
