//! In-memory implementation of the product REST API, rooted at `/api/v1`.

pub mod config;
pub mod error;

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderValue, Method, StatusCode},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

pub use config::ServerConfig;
pub use error::AppError;

pub const API_PREFIX: &str = "/api/v1";
pub const DEFAULT_LIMIT: usize = 100;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct ProductCreate {
    pub name: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub description: String,
    pub price: f64,
    #[serde(default, deserialize_with = "nullable_text")]
    pub category: String,
}

/// Optional text fields accept `null` as well as being left out.
fn nullable_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
}

#[derive(Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
    pub search: Option<String>,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

/// Products keyed by id. Ids come from a counter and are never reused.
#[derive(Debug)]
pub struct Store {
    products: BTreeMap<i64, Product>,
    next_id: i64,
}

impl Store {
    pub fn new() -> Self {
        Self {
            products: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn list(&self, params: &ListParams) -> Vec<Product> {
        let search = params.search.as_deref().unwrap_or("");
        self.products
            .values()
            .filter(|p| search.is_empty() || p.name.contains(search))
            .skip(params.skip)
            .take(params.limit)
            .cloned()
            .collect()
    }

    pub fn get(&self, id: i64) -> Option<&Product> {
        self.products.get(&id)
    }

    pub fn insert(&mut self, input: ProductCreate) -> Result<Product, AppError> {
        validate_name(&input.name)?;
        validate_price(input.price)?;
        let now = Utc::now();
        let product = Product {
            id: self.next_id,
            name: input.name,
            description: input.description,
            price: input.price,
            category: input.category,
            created_at: now,
            updated_at: now,
        };
        self.next_id += 1;
        self.products.insert(product.id, product.clone());
        Ok(product)
    }

    pub fn update(&mut self, id: i64, input: ProductUpdate) -> Result<Product, AppError> {
        let product = self.products.get_mut(&id).ok_or(AppError::NotFound)?;
        if let Some(name) = &input.name {
            validate_name(name)?;
        }
        if let Some(price) = input.price {
            validate_price(price)?;
        }
        if let Some(name) = input.name {
            product.name = name;
        }
        if let Some(description) = input.description {
            product.description = description;
        }
        if let Some(price) = input.price {
            product.price = price;
        }
        if let Some(category) = input.category {
            product.category = category;
        }
        product.updated_at = next_timestamp(product.updated_at);
        Ok(product.clone())
    }

    pub fn remove(&mut self, id: i64) -> Result<Product, AppError> {
        self.products.remove(&id).ok_or(AppError::NotFound)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

pub type Db = Arc<RwLock<Store>>;

/// Router with a fresh store and no CORS policy.
pub fn app() -> Router {
    routes(Arc::new(RwLock::new(Store::new())))
}

/// Router with a fresh store, CORS for the configured frontend origin and
/// request tracing.
pub fn app_with_config(config: &ServerConfig) -> Result<Router, AppError> {
    let origin = HeaderValue::from_str(&config.cors_origin)
        .map_err(|_| AppError::Config(format!("invalid CORS origin {:?}", config.cors_origin)))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);
    Ok(app().layer(cors).layer(TraceLayer::new_for_http()))
}

fn routes(db: Db) -> Router {
    let api = Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .with_state(db);
    Router::new().nest(API_PREFIX, api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Serve `router` until ctrl-c.
pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
}

async fn list_products(
    State(db): State<Db>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Product>>, AppError> {
    let Query(params) = params?;
    Ok(Json(db.read().await.list(&params)))
}

async fn create_product(
    State(db): State<Db>,
    input: Result<Json<ProductCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let Json(input) = input?;
    let product = db.write().await.insert(input)?;
    info!(id = product.id, name = %product.name, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

async fn get_product(
    State(db): State<Db>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Product>, AppError> {
    let Path(id) = id?;
    let store = db.read().await;
    store.get(id).cloned().map(Json).ok_or(AppError::NotFound)
}

async fn update_product(
    State(db): State<Db>,
    id: Result<Path<i64>, PathRejection>,
    input: Result<Json<ProductUpdate>, JsonRejection>,
) -> Result<Json<Product>, AppError> {
    let Path(id) = id?;
    let Json(input) = input?;
    let product = db.write().await.update(id, input)?;
    info!(id, "product updated");
    Ok(Json(product))
}

async fn delete_product(
    State(db): State<Db>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    db.write().await.remove(id)?;
    info!(id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn validate_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".to_string()));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::Validation("price must be non-negative".to_string()));
    }
    Ok(())
}

/// `updated_at` must move strictly forward even when the clock has not.
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + TimeDelta::microseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(name: &str, price: f64) -> ProductCreate {
        ProductCreate {
            name: name.to_string(),
            description: String::new(),
            price,
            category: "tools".to_string(),
        }
    }

    fn params(skip: usize, limit: usize, search: Option<&str>) -> ListParams {
        ListParams {
            skip,
            limit,
            search: search.map(str::to_string),
        }
    }

    #[test]
    fn create_defaults_optional_text() {
        let input: ProductCreate = serde_json::from_str(r#"{"name":"Bare","price":1.5}"#).unwrap();
        assert_eq!(input.description, "");
        assert_eq!(input.category, "");

        let input: ProductCreate =
            serde_json::from_str(r#"{"name":"Bare","description":null,"price":1.5,"category":null}"#)
                .unwrap();
        assert_eq!(input.description, "");
        assert_eq!(input.category, "");
    }

    #[test]
    fn create_rejects_missing_name() {
        let result: Result<ProductCreate, _> = serde_json::from_str(r#"{"price":1.0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn insert_assigns_increasing_ids_and_equal_timestamps() {
        let mut store = Store::new();
        let a = store.insert(create("A", 1.0)).unwrap();
        let b = store.insert(create("B", 2.0)).unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(a.created_at, a.updated_at);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut store = Store::new();
        let a = store.insert(create("A", 1.0)).unwrap();
        store.remove(a.id).unwrap();
        let b = store.insert(create("B", 1.0)).unwrap();
        assert_eq!(b.id, 2);
    }

    #[test]
    fn insert_validates() {
        let mut store = Store::new();
        assert!(matches!(
            store.insert(create(" ", 1.0)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            store.insert(create("A", -1.0)),
            Err(AppError::Validation(_))
        ));
        assert!(store.list(&params(0, 10, None)).is_empty());
    }

    #[test]
    fn update_merges_and_advances_timestamp() {
        let mut store = Store::new();
        let created = store.insert(create("Lamp", 10.0)).unwrap();
        let updated = store
            .update(
                created.id,
                ProductUpdate {
                    name: None,
                    description: None,
                    price: Some(12.5),
                    category: None,
                },
            )
            .unwrap();
        assert_eq!(updated.price, 12.5);
        assert_eq!(updated.name, "Lamp");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[test]
    fn invalid_update_leaves_product_untouched() {
        let mut store = Store::new();
        let created = store.insert(create("Lamp", 10.0)).unwrap();
        let result = store.update(
            created.id,
            ProductUpdate {
                name: Some("Renamed".to_string()),
                description: None,
                price: Some(-2.0),
                category: None,
            },
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(store.get(created.id), Some(&created));
    }

    #[test]
    fn list_filters_and_paginates_in_id_order() {
        let mut store = Store::new();
        for name in ["red lamp", "blue lamp", "chair", "red chair"] {
            store.insert(create(name, 1.0)).unwrap();
        }
        let lamps: Vec<i64> = store
            .list(&params(0, 10, Some("lamp")))
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(lamps, vec![1, 2]);

        let page: Vec<i64> = store
            .list(&params(1, 2, Some("")))
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(page, vec![2, 3]);
    }

    #[test]
    fn next_timestamp_is_strictly_later() {
        let future = Utc::now() + TimeDelta::hours(1);
        assert!(next_timestamp(future) > future);
    }
}
