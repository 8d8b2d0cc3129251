use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app_error::{AppError, ErrorRes},
    app_state::AppState,
    models::{CartItemEntity, CartLineView, NewCartLine},
    validation::{parse_body, positive_id, positive_int, require_fields},
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(add_to_cart))
        .routes(utoipa_axum::routes!(get_cart, clear_cart))
}

/// Accepted body of `POST /cart`. Ids may also be sent as numeric strings.
///
/// Only describes the body in the OpenAPI document; the handler reads the raw
/// JSON field by field so it can report every missing field at once.
#[allow(dead_code)]
#[derive(Deserialize, ToSchema)]
struct AddToCartReq {
    user_id: i32,
    product_id: i32,
    quantity: i32,
}

#[derive(Serialize, ToSchema)]
struct AddToCartRes {
    status: &'static str,
    message: &'static str,
    item: CartItemEntity,
}

#[derive(Serialize, ToSchema)]
struct ClearCartRes {
    status: &'static str,
    message: &'static str,
    removed: usize,
}

/// Add units of a product to a user's cart.
///
/// Adding a product already in the cart raises its quantity; the resulting
/// quantity may never exceed the product's stock.
#[utoipa::path(
    post,
    path = "/cart",
    tags = ["Cart"],
    request_body = AddToCartReq,
    responses(
        (status = 201, description = "Product added to cart", body = AddToCartRes),
        (status = 400, description = "Invalid payload or insufficient stock", body = ErrorRes),
        (status = 404, description = "Product does not exist", body = ErrorRes)
    )
)]
async fn add_to_cart(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    const FIELDS: [&str; 3] = ["user_id", "product_id", "quantity"];

    let payload = parse_body(&body)?;
    let fields = require_fields(payload.as_ref(), &FIELDS)?;

    let line = NewCartLine {
        user_id: positive_int(&fields["user_id"], "user_id")?,
        product_id: positive_int(&fields["product_id"], "product_id")?,
        quantity: positive_int(&fields["quantity"], "quantity")?,
    };

    let item = state.store.add_to_cart(line).await?;

    Ok((
        StatusCode::CREATED,
        Json(AddToCartRes {
            status: "ok",
            message: "Product added to cart",
            item,
        }),
    ))
}

/// Fetch the lines of a user's cart with current product name and price.
#[utoipa::path(
    get,
    path = "/cart/{user_id}",
    tags = ["Cart"],
    params(
        ("user_id" = i32, Path, description = "Owner of the cart")
    ),
    responses(
        (status = 200, description = "Get cart successfully", body = Vec<CartLineView>),
        (status = 400, description = "Invalid user ID", body = ErrorRes)
    )
)]
async fn get_cart(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = positive_id(&user_id, "User ID")?;
    let lines = state.store.cart_lines(user_id).await?;

    Ok(Json(lines))
}

/// Empty a user's cart. Clearing an empty cart succeeds.
#[utoipa::path(
    delete,
    path = "/cart/{user_id}",
    tags = ["Cart"],
    params(
        ("user_id" = i32, Path, description = "Owner of the cart")
    ),
    responses(
        (status = 200, description = "Cart emptied", body = ClearCartRes),
        (status = 400, description = "Invalid user ID", body = ErrorRes)
    )
)]
async fn clear_cart(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = positive_id(&user_id, "User ID")?;
    let removed = state.store.clear_cart(user_id).await?;

    Ok(Json(ClearCartRes {
        status: "ok",
        message: "Cart emptied",
        removed,
    }))
}
