use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header::CONTENT_TYPE},
};
use bigdecimal::BigDecimal;
use minishop::{
    app_state::AppState, config::Config, models::ProductEntity, routes, store::MemoryStore,
};
use serde_json::{Value, json};
use tower::ServiceExt;

fn product(id: i32, name: &str, price: &str, category: &str, stock: i32) -> ProductEntity {
    ProductEntity {
        id,
        name: name.into(),
        price: price.parse::<BigDecimal>().unwrap(),
        category: category.into(),
        stock,
    }
}

fn app_with(store: MemoryStore) -> Router {
    routes::app(AppState::new(Arc::new(store), Config::default()))
}

fn app() -> Router {
    app_with(MemoryStore::with_products([
        product(1, "Pencil", "1.50", "office", 10),
        product(2, "Notebook", "5.00", "office", 5),
        product(3, "Lamp", "20.00", "home", 2),
    ]))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(body) => {
            request = request.header(CONTENT_TYPE, "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

async fn add(app: &Router, user_id: i32, product_id: i32, quantity: i32) -> (StatusCode, Value) {
    let body = json!({ "user_id": user_id, "product_id": product_id, "quantity": quantity });
    call(app, Method::POST, "/cart", Some(&body.to_string())).await
}

#[tokio::test]
async fn lists_and_filters_products() {
    let app = app();

    let (status, body) = call(&app, Method::GET, "/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
    assert_eq!(body[0]["price"], "1.50");

    let (_, body) = call(&app, Method::GET, "/products?category=home", None).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Lamp"]);

    let (_, body) = call(&app, Method::GET, "/products?category=", None).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn product_lookup_reports_bad_and_unknown_ids() {
    let app = app();

    let (status, body) = call(&app, Method::GET, "/products/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Notebook");

    let (status, body) = call(&app, Method::GET, "/products/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Product ID must be a valid integer");

    let (status, body) = call(&app, Method::GET, "/products/0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Product ID must be a positive number");

    let (status, body) = call(&app, Method::GET, "/products/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product not found");
}

#[tokio::test]
async fn add_to_cart_validates_the_payload() {
    let app = app();

    let (status, body) = call(&app, Method::POST, "/cart", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No data received");

    let (status, body) = call(&app, Method::POST, "/cart", Some("{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No data received");

    let (status, body) = call(&app, Method::POST, "/cart", Some(r#"{"user_id": 1}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields: product_id, quantity");

    let (status, body) = call(
        &app,
        Method::POST,
        "/cart",
        Some(r#"{"user_id": 1, "product_id": "x", "quantity": 1}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "product_id must be a valid integer");

    let (status, body) = call(
        &app,
        Method::POST,
        "/cart",
        Some(r#"{"user_id": 1, "product_id": 1, "quantity": -2}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "quantity must be a positive number");

    let (status, body) = call(&app, Method::POST, "/cart", Some("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Request body is not valid JSON"));
}

#[tokio::test]
async fn add_to_cart_accepts_numeric_strings() {
    let app = app();

    let (status, body) = call(
        &app,
        Method::POST,
        "/cart",
        Some(r#"{"user_id": "1", "product_id": "2", "quantity": "3"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["item"]["quantity"], 3);
}

#[tokio::test]
async fn add_to_cart_enforces_stock_and_existence() {
    let app = app();

    let (status, _) = add(&app, 1, 2, 3).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = add(&app, 1, 2, 3).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Insufficient stock"));

    let (_, cart) = call(&app, Method::GET, "/cart/1", None).await;
    assert_eq!(cart[0]["quantity"], 3);

    let (status, body) = add(&app, 1, 99, 1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product 99 does not exist");
}

#[tokio::test]
async fn checkout_turns_the_cart_into_an_order() {
    let app = app();

    add(&app, 1, 1, 2).await;
    add(&app, 1, 2, 2).await;

    let (status, cart) = call(&app, Method::GET, "/cart/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart.as_array().unwrap().len(), 2);

    let (status, body) = call(&app, Method::POST, "/orders", Some(r#"{"user_id": 1}"#)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["total"], "13.00");
    let order_id = body["order_id"].as_i64().unwrap();

    let (_, cart) = call(&app, Method::GET, "/cart/1", None).await;
    assert_eq!(cart, json!([]));

    let (status, detail) = call(&app, Method::GET, &format!("/orders/{order_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["order"]["total"], "13.00");
    let subtotals: Vec<&str> = detail["order_items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["subtotal"].as_str().unwrap())
        .collect();
    assert_eq!(subtotals, ["3.00", "10.00"]);

    let (_, orders) = call(&app, Method::GET, "/users/1/orders", None).await;
    assert_eq!(orders.as_array().unwrap().len(), 1);

    let (_, orders) = call(&app, Method::GET, "/users/2/orders", None).await;
    assert_eq!(orders, json!([]));
}

#[tokio::test]
async fn checkout_of_an_empty_cart_is_rejected() {
    let app = app();

    let (status, body) = call(&app, Method::POST, "/orders", Some(r#"{"user_id": 7}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cart is empty");

    let (status, body) = call(&app, Method::POST, "/orders", Some(r#"{"user": 7}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields: user_id");
}

#[tokio::test]
async fn checkout_with_a_vanished_product_keeps_the_cart() {
    let store = MemoryStore::with_products([
        product(1, "Pencil", "1.50", "office", 10),
        product(2, "Notebook", "5.00", "office", 5),
    ]);
    let app = app_with(store.clone());

    add(&app, 1, 1, 1).await;
    add(&app, 1, 2, 1).await;
    store.remove_product(2).await;

    let (status, body) = call(&app, Method::POST, "/orders", Some(r#"{"user_id": 1}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product with ID 2 not found");

    assert_eq!(store.raw_cart_len(1).await, 2);
    let (_, orders) = call(&app, Method::GET, "/users/1/orders", None).await;
    assert_eq!(orders, json!([]));
}

#[tokio::test]
async fn clearing_a_cart_is_idempotent() {
    let app = app();
    add(&app, 4, 1, 1).await;

    let (status, body) = call(&app, Method::DELETE, "/cart/4", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 1);

    let (status, body) = call(&app, Method::DELETE, "/cart/4", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 0);
}

#[tokio::test]
async fn unknown_orders_and_routes_are_not_found() {
    let app = app();

    let (status, body) = call(&app, Method::GET, "/orders/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Order 42 not found");

    let (status, body) = call(&app, Method::GET, "/nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Endpoint not found");
}

#[tokio::test]
async fn serves_the_openapi_document() {
    let app = app();

    let (status, body) = call(&app, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "Minishop Catalog API");
    assert!(body["paths"]["/orders"]["post"].is_object());
}
