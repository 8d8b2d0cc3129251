use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::IntoParams;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app_error::{AppError, ErrorRes},
    app_state::AppState,
    models::ProductEntity,
    validation::positive_id,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(get_products))
        .routes(utoipa_axum::routes!(get_product))
}

#[derive(Deserialize, IntoParams)]
struct ProductsQuery {
    /// Only return products of this category.
    category: Option<String>,
}

/// List the catalog, optionally filtered by category.
#[utoipa::path(
    get,
    path = "/products",
    tags = ["Products"],
    params(ProductsQuery),
    responses(
        (status = 200, description = "List products", body = Vec<ProductEntity>)
    )
)]
async fn get_products(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let category = query.category.as_deref().filter(|c| !c.is_empty());
    let products = state.store.list_products(category).await?;

    Ok(Json(products))
}

/// Fetch a single product.
#[utoipa::path(
    get,
    path = "/products/{id}",
    tags = ["Products"],
    params(
        ("id" = i32, Path, description = "Product ID to fetch")
    ),
    responses(
        (status = 200, description = "Get product successfully", body = ProductEntity),
        (status = 400, description = "Invalid product ID", body = ErrorRes),
        (status = 404, description = "Product not found", body = ErrorRes)
    )
)]
async fn get_product(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let id = positive_id(&id, "Product ID")?;

    let product = state
        .store
        .find_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    Ok(Json(product))
}
