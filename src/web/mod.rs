//! Server-rendered storefront that talks to the catalog service over HTTP.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{api::catalog::CatalogClient, config::WebConfig};

pub mod error;
pub mod pages;

use error::WebError;

#[derive(Clone)]
pub struct WebState {
    pub catalog: CatalogClient,
    pub config: Arc<WebConfig>,
}

impl WebState {
    pub fn new(catalog: CatalogClient, config: WebConfig) -> Self {
        Self {
            catalog,
            config: Arc::new(config),
        }
    }
}

/// The complete storefront application.
pub fn app(state: WebState) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/products", get(pages::products))
        .route("/products/{id}", get(pages::product))
        .route("/cart", get(pages::cart).post(pages::add_to_cart))
        .route("/cart/clear", post(pages::clear_cart))
        .route("/checkout", post(pages::checkout))
        .route("/orders/{id}", get(pages::order))
        .fallback(|| async { WebError::PageNotFound })
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
