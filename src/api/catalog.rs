use std::time::Duration;

use bigdecimal::BigDecimal;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, json};
use thiserror::Error;

use crate::models::{CartLineView, OrderDetail, ProductEntity};

/// Failure talking to the catalog service.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The service answered with a non-2xx status and this message.
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error("The catalog service did not respond in time. Please try again.")]
    Timeout,

    #[error("Could not connect to the catalog service. Check that it is running.")]
    Unreachable,

    #[error("Unexpected response from the catalog service: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Status the gateway should answer with for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Status { status, .. } => *status,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Unreachable | ApiError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Unreachable
        } else {
            ApiError::InvalidResponse(err.to_string())
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize, Debug)]
pub struct Ack {
    pub message: String,
}

#[derive(Deserialize, Debug)]
pub struct PlacedOrder {
    pub order_id: i32,
    pub total: BigDecimal,
    pub message: String,
}

/// HTTP client for the catalog service API.
#[derive(Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: String,
}

impl CatalogClient {
    /// Every request made through the client gives up after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn products(&self, category: Option<&str>) -> Result<Vec<ProductEntity>, ApiError> {
        let mut request = self.http.get(self.url("/products"));
        if let Some(category) = category {
            request = request.query(&[("category", category)]);
        }
        send(request).await
    }

    pub async fn product(&self, id: i32) -> Result<ProductEntity, ApiError> {
        let url = self.url(&format!("/products/{id}"));
        send(self.http.get(url)).await
    }

    pub async fn cart(&self, user_id: i32) -> Result<Vec<CartLineView>, ApiError> {
        let url = self.url(&format!("/cart/{user_id}"));
        send(self.http.get(url)).await
    }

    /// Forwards the raw form values; the catalog service validates them and
    /// reports absent ones as missing fields.
    pub async fn add_to_cart(
        &self,
        user_id: i32,
        product_id: Option<&str>,
        quantity: Option<&str>,
    ) -> Result<Ack, ApiError> {
        let mut body = Map::new();
        body.insert("user_id".into(), json!(user_id));
        if let Some(product_id) = product_id {
            body.insert("product_id".into(), json!(product_id));
        }
        if let Some(quantity) = quantity {
            body.insert("quantity".into(), json!(quantity));
        }
        send(self.http.post(self.url("/cart")).json(&body)).await
    }

    pub async fn clear_cart(&self, user_id: i32) -> Result<Ack, ApiError> {
        let url = self.url(&format!("/cart/{user_id}"));
        send(self.http.delete(url)).await
    }

    pub async fn checkout(&self, user_id: i32) -> Result<PlacedOrder, ApiError> {
        let body = json!({ "user_id": user_id });
        send(self.http.post(self.url("/orders")).json(&body)).await
    }

    pub async fn order(&self, id: i32) -> Result<OrderDetail, ApiError> {
        let url = self.url(&format!("/orders/{id}"));
        send(self.http.get(url)).await
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
    let response = request.send().await.map_err(ApiError::from_transport)?;
    let status = response.status();

    if status.is_success() {
        return response.json().await.map_err(ApiError::from_transport);
    }

    let body = response.text().await.map_err(ApiError::from_transport)?;
    let message = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(body) => body.error,
        Err(_) => format!("Error {}: {}", status.as_u16(), body),
    };

    Err(ApiError::Status { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_passes_through_and_transport_errors_map_to_gateway_codes() {
        let err = ApiError::Status {
            status: StatusCode::NOT_FOUND,
            message: "Product not found".into(),
        };
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Product not found");

        assert_eq!(ApiError::Timeout.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(ApiError::Unreachable.status(), StatusCode::BAD_GATEWAY);
    }

    fn assert_send<T: Send>(_: T) {}

    #[test]
    fn request_futures_can_cross_threads() {
        let client = CatalogClient::new("http://127.0.0.1:5000", Duration::from_secs(5)).unwrap();

        assert_send(client.products(Some("office")));
        assert_send(client.product(1));
        assert_send(client.cart(1));
        assert_send(client.add_to_cart(1, Some("2"), Some("3")));
        assert_send(client.clear_cart(1));
        assert_send(client.checkout(1));
        assert_send(client.order(1));
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let client = CatalogClient::new("http://127.0.0.1:5000/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.url("/products"), "http://127.0.0.1:5000/products");
    }
}
