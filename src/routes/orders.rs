use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app_error::{AppError, ErrorRes},
    app_state::AppState,
    models::{OrderDetail, OrderEntity},
    validation::{parse_body, positive_id, positive_int, require_fields},
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(create_order))
        .routes(utoipa_axum::routes!(get_order))
        .routes(utoipa_axum::routes!(get_user_orders))
}

/// OpenAPI description of the checkout body, which is validated field by field.
#[allow(dead_code)]
#[derive(Deserialize, ToSchema)]
struct CreateOrderReq {
    user_id: i32,
}

#[derive(Serialize, ToSchema)]
struct CreateOrderRes {
    status: &'static str,
    message: &'static str,
    order_id: i32,
    #[schema(value_type = String, example = "13.00")]
    total: BigDecimal,
}

/// Check out a user's cart into a new order.
///
/// Prices are taken from the catalog at checkout time. If any product in the
/// cart has vanished or lacks stock, nothing is written and the cart is kept.
#[utoipa::path(
    post,
    path = "/orders",
    tags = ["Orders"],
    request_body = CreateOrderReq,
    responses(
        (status = 201, description = "Order placed", body = CreateOrderRes),
        (status = 400, description = "Invalid payload, empty cart or insufficient stock", body = ErrorRes),
        (status = 404, description = "A product in the cart no longer exists", body = ErrorRes)
    )
)]
async fn create_order(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payload = parse_body(&body)?;
    let fields = require_fields(payload.as_ref(), &["user_id"])?;
    let user_id = positive_int(&fields["user_id"], "user_id")?;

    let receipt = state.store.checkout(user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderRes {
            status: "ok",
            message: "Order placed successfully",
            order_id: receipt.order_id,
            total: receipt.total,
        }),
    ))
}

/// Fetch an order with its line items.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    tags = ["Orders"],
    params(
        ("id" = i32, Path, description = "Order ID to fetch")
    ),
    responses(
        (status = 200, description = "Get order successfully", body = OrderDetail),
        (status = 400, description = "Invalid order ID", body = ErrorRes),
        (status = 404, description = "Order not found", body = ErrorRes)
    )
)]
async fn get_order(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let id = positive_id(&id, "Order ID")?;

    let order = state
        .store
        .find_order(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {id} not found")))?;

    Ok(Json(order))
}

/// List a user's orders, newest first.
#[utoipa::path(
    get,
    path = "/users/{user_id}/orders",
    tags = ["Orders"],
    params(
        ("user_id" = i32, Path, description = "Owner of the orders")
    ),
    responses(
        (status = 200, description = "List user orders", body = Vec<OrderEntity>),
        (status = 400, description = "Invalid user ID", body = ErrorRes)
    )
)]
async fn get_user_orders(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = positive_id(&user_id, "User ID")?;
    let orders = state.store.orders_for_user(user_id).await?;

    Ok(Json(orders))
}
