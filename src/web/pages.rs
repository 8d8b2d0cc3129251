use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use bigdecimal::BigDecimal;
use serde::Deserialize;

use crate::{
    models::{CartLineView, OrderDetail, ProductEntity},
    validation::positive_id,
};

use super::{WebState, error::WebError};

#[derive(Template, WebTemplate)]
#[template(path = "products.html")]
pub struct ProductsPage {
    pub category: Option<String>,
    pub products: Vec<ProductEntity>,
}

#[derive(Template, WebTemplate)]
#[template(path = "product.html")]
pub struct ProductPage {
    pub product: ProductEntity,
}

/// One cart line with its subtotal at the current price.
pub struct CartRow {
    pub product_id: i32,
    pub name: String,
    pub price: BigDecimal,
    pub quantity: i32,
    pub subtotal: BigDecimal,
}

#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartPage {
    pub message: Option<String>,
    pub rows: Vec<CartRow>,
    pub total: BigDecimal,
}

impl CartPage {
    fn new(lines: Vec<CartLineView>, message: Option<String>) -> Self {
        let mut total = BigDecimal::from(0);
        let rows = lines
            .into_iter()
            .map(|line| {
                let subtotal = &line.price * BigDecimal::from(line.quantity);
                total += &subtotal;
                CartRow {
                    product_id: line.product_id,
                    name: line.name,
                    price: line.price,
                    quantity: line.quantity,
                    subtotal,
                }
            })
            .collect();

        Self {
            message,
            rows,
            total,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "order.html")]
pub struct OrderPage {
    pub message: Option<String>,
    pub detail: OrderDetail,
}

#[derive(Deserialize)]
pub struct ProductsQuery {
    category: Option<String>,
}

/// Raw add-to-cart form; the catalog service validates the values.
#[derive(Deserialize)]
pub struct AddToCartForm {
    product_id: Option<String>,
    quantity: Option<String>,
}

fn page_id(raw: &str, field: &str) -> Result<i32, WebError> {
    positive_id(raw, field).map_err(|err| WebError::BadRequest(err.to_string()))
}

pub async fn home() -> Redirect {
    Redirect::to("/products")
}

pub async fn products(
    State(state): State<WebState>,
    Query(query): Query<ProductsQuery>,
) -> Result<impl IntoResponse, WebError> {
    let category = query.category.filter(|c| !c.is_empty());

    let products = state
        .catalog
        .products(category.as_deref())
        .await
        .map_err(WebError::catalog("Failed to load products"))?;

    Ok(ProductsPage { category, products })
}

pub async fn product(
    Path(id): Path<String>,
    State(state): State<WebState>,
) -> Result<impl IntoResponse, WebError> {
    let id = page_id(&id, "Product ID")?;

    let product = state
        .catalog
        .product(id)
        .await
        .map_err(WebError::catalog("Failed to load product"))?;

    Ok(ProductPage { product })
}

pub async fn cart(State(state): State<WebState>) -> Result<impl IntoResponse, WebError> {
    let lines = state
        .catalog
        .cart(state.config.user_id)
        .await
        .map_err(WebError::catalog("Failed to load cart"))?;

    Ok(CartPage::new(lines, None))
}

pub async fn add_to_cart(
    State(state): State<WebState>,
    Form(form): Form<AddToCartForm>,
) -> Result<impl IntoResponse, WebError> {
    let user_id = state.config.user_id;

    let ack = state
        .catalog
        .add_to_cart(user_id, form.product_id.as_deref(), form.quantity.as_deref())
        .await
        .map_err(WebError::catalog("Failed to add product to cart"))?;

    let lines = state
        .catalog
        .cart(user_id)
        .await
        .map_err(WebError::catalog("Failed to load cart"))?;

    Ok(CartPage::new(lines, Some(ack.message)))
}

pub async fn clear_cart(State(state): State<WebState>) -> Result<impl IntoResponse, WebError> {
    let ack = state
        .catalog
        .clear_cart(state.config.user_id)
        .await
        .map_err(WebError::catalog("Failed to empty cart"))?;

    Ok(CartPage::new(Vec::new(), Some(ack.message)))
}

pub async fn checkout(State(state): State<WebState>) -> Result<impl IntoResponse, WebError> {
    let placed = state
        .catalog
        .checkout(state.config.user_id)
        .await
        .map_err(WebError::catalog("Checkout failed"))?;

    tracing::info!("Order #{} placed for {}", placed.order_id, placed.total);

    let detail = state
        .catalog
        .order(placed.order_id)
        .await
        .map_err(WebError::catalog("Failed to load order"))?;

    Ok(OrderPage {
        message: Some(placed.message),
        detail,
    })
}

pub async fn order(
    Path(id): Path<String>,
    State(state): State<WebState>,
) -> Result<impl IntoResponse, WebError> {
    let id = page_id(&id, "Order ID")?;

    let detail = state
        .catalog
        .order(id)
        .await
        .map_err(WebError::catalog("Failed to load order"))?;

    Ok(OrderPage {
        message: None,
        detail,
    })
}
