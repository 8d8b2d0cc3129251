use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::catalog::ApiError;

/// Error of a storefront page handler, rendered as the error page.
#[derive(Error, Debug)]
pub enum WebError {
    /// A call to the catalog service failed; `context` says what the page was doing.
    #[error("{context}: {source}")]
    Catalog {
        context: &'static str,
        source: ApiError,
    },

    #[error("{0}")]
    BadRequest(String),

    #[error("Page not found")]
    PageNotFound,
}

impl WebError {
    pub fn catalog(context: &'static str) -> impl FnOnce(ApiError) -> WebError {
        move |source| WebError::Catalog { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Catalog { source, .. } => source.status(),
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::PageNotFound => StatusCode::NOT_FOUND,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub status: u16,
    pub message: String,
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!("{self}");
        } else {
            tracing::debug!("{self}");
        }

        let page = ErrorPage {
            status: status.as_u16(),
            message: self.to_string(),
        };

        (status, page).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_errors_keep_the_backend_status() {
        let err = WebError::catalog("Failed to load product")(ApiError::Status {
            status: StatusCode::NOT_FOUND,
            message: "Product not found".into(),
        });

        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Failed to load product: Product not found");
    }

    #[test]
    fn timeouts_render_as_gateway_timeout() {
        let err = WebError::catalog("Failed to load products")(ApiError::Timeout);
        assert_eq!(err.into_response().status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
