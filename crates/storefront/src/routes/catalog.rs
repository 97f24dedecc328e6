//! Catalog route handlers.
//!
//! Public, read-only, and served from the catalog cache.

use axum::{
    Json,
    extract::State,
};
use tracing::instrument;

use super::ApiPath;
use crate::error::{AppError, Result};
use crate::models::{Category, CategoryPage, ProductWithVariants, VariantPage};
use crate::state::AppState;

/// All categories.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.catalog().categories().await?))
}

/// A category and its products.
#[instrument(skip(state))]
pub async fn category(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> Result<Json<CategoryPage>> {
    state
        .catalog()
        .category_page(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Category".to_string()))
}

/// Every product with its variants.
#[instrument(skip(state))]
pub async fn products(State(state): State<AppState>) -> Result<Json<Vec<ProductWithVariants>>> {
    Ok(Json(state.catalog().products().await?))
}

/// A variant with its product, sibling variants and related products.
#[instrument(skip(state))]
pub async fn variant(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> Result<Json<VariantPage>> {
    state
        .catalog()
        .variant_page(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product variant".to_string()))
}
