//! Product catalog handlers.
//!
//! Anyone may view a product's details; the listing needs a signed-in user
//! and every change needs the `Admin` role.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::instrument;

use product_catalog_core::ProductId;

use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{Product, ProductForm};
use crate::services::ProductService;
use crate::state::AppState;

/// List all products.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Result<Json<Vec<Product>>> {
    let products = ProductService::new(state.stores()).list().await?;
    Ok(Json(products))
}

/// Create a product under a fresh id.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(form): Json<ProductForm>,
) -> Result<impl IntoResponse> {
    let product = ProductService::new(state.stores()).create(&form).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Show one product.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn details(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductService::new(state.stores()).details(id).await?;
    Ok(Json(product))
}

/// Load a product for editing.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn edit(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductService::new(state.stores()).get(id).await?;
    if product.is_empty() {
        return Err(AppError::NotFound(format!("product {id}")));
    }
    Ok(Json(product))
}

/// Overwrite a product.
///
/// The body's id must match the path.
#[instrument(skip_all, fields(product_id = %id, admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(form): Json<ProductForm>,
) -> Result<Json<Product>> {
    if form.id != id {
        tracing::warn!(body_id = %form.id, "Product id does not match path");
        return Err(AppError::NotFound(format!("product {id}")));
    }
    let product = ProductService::new(state.stores()).update(id, &form).await?;
    Ok(Json(product))
}

/// Remove a product. Unknown ids are ignored.
#[instrument(skip_all, fields(product_id = %id, admin_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    ProductService::new(state.stores()).remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
