//! # Product Routes
//!
//! Catalog CRUD under `/product`.
//!
//! ```text
//! POST   /product/add-product                {productCode, productName, price, productQty?}
//! GET    /product/get-products               → [ {productCode, productName, price, productQty, pid} ]
//! PUT    /product/update-product/{code}      {price, productQty}
//! DELETE /product/delete-product/{code}
//! ```
//!
//! Prices and quantities are accepted as numbers or strings and returned as
//! two-decimal strings.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use grocery_core::money::decimal;
use grocery_core::types::Quantity;
use grocery_core::validation::{
    validate_price, validate_product_code, validate_product_name, validate_stock_quantity,
};
use grocery_core::{Money, Product, ValidationError};

use crate::error::ApiError;
use crate::routes::MessageResponse;
use crate::state::AppState;

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddProductRequest {
    #[serde(default)]
    pub product_code: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default, with = "decimal::option")]
    pub price: Option<Money>,
    #[serde(default, with = "decimal::option")]
    pub product_qty: Option<Quantity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[serde(default, with = "decimal::option")]
    pub price: Option<Money>,
    #[serde(default, with = "decimal::option")]
    pub product_qty: Option<Quantity>,
}

/// Catalog entry as the till sees it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub product_code: String,
    pub product_name: String,
    #[serde(with = "decimal")]
    pub price: Money,
    #[serde(with = "decimal")]
    pub product_qty: Quantity,
    /// Same as `product_code`; older till screens key rows on it.
    pub pid: String,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        ProductDto {
            price: product.unit_price(),
            product_qty: product.stock_qty,
            pid: product.product_code.clone(),
            product_code: product.product_code,
            product_name: product.product_name,
        }
    }
}

// =============================================================================
// Router
// =============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add-product", post(add_product))
        .route("/get-products", get(get_products))
        .route("/update-product/{product_code}", put(update_product))
        .route("/delete-product/{product_code}", delete(delete_product))
}

// =============================================================================
// Handlers
// =============================================================================

async fn add_product(
    State(state): State<AppState>,
    payload: Result<Json<AddProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductDto>), ApiError> {
    let Json(req) = payload?;
    let code = req.product_code.trim();
    let name = req.product_name.trim();

    validate_product_code(code)?;
    validate_product_name(name)?;
    let price = req.price.ok_or_else(|| ValidationError::required("price"))?;
    validate_price(price)?;
    let qty = req.product_qty.unwrap_or_default();
    validate_stock_quantity(qty)?;

    let product = state.db.products().insert(code, name, price, qty).await?;

    info!(product_code = %product.product_code, "Product added");
    Ok((StatusCode::CREATED, Json(product.into())))
}

async fn get_products(State(state): State<AppState>) -> Result<Json<Vec<ProductDto>>, ApiError> {
    let products = state.db.products().list().await?;
    Ok(Json(products.into_iter().map(ProductDto::from).collect()))
}

async fn update_product(
    State(state): State<AppState>,
    Path(product_code): Path<String>,
    payload: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Result<Json<ProductDto>, ApiError> {
    let Json(req) = payload?;

    let price = req.price.ok_or_else(|| ValidationError::required("price"))?;
    validate_price(price)?;
    let qty = req
        .product_qty
        .ok_or_else(|| ValidationError::required("productQty"))?;
    validate_stock_quantity(qty)?;

    let product = state
        .db
        .products()
        .update_price_and_stock(&product_code, price, qty)
        .await?;

    info!(product_code = %product.product_code, "Product updated");
    Ok(Json(product.into()))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(product_code): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.db.products().delete(&product_code).await?;

    info!(product_code = %product_code, "Product deleted");
    Ok(Json(MessageResponse::new("Product deleted successfully")))
}
