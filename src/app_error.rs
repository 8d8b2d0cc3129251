use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Every failure the catalog service can report to a client.
#[derive(Error, Debug)]
pub enum AppError {
    /// A missing or malformed request field.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error(
        "Insufficient stock for product {product_id}: requested {requested}, maximum available {available}"
    )]
    InsufficientStock {
        product_id: i32,
        requested: i64,
        available: i32,
    },

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Endpoint not found")]
    UnknownRoute,

    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InsufficientStock { .. } | AppError::EmptyCart => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) | AppError::UnknownRoute => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Body of every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Driver and pool details stay in the logs
        let error = if status.is_server_error() {
            tracing::error!("Request failed: {:#}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorRes { error })).into_response()
    }
}
