use axum::{
    Json, Router,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    routing,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;
use utoipa_axum::router::OpenApiRouter;

use crate::{app_error::AppError, app_state::AppState, config::CorsConfig};

pub mod carts;
pub mod orders;
pub mod products;

/// Every catalog route, with its OpenAPI description.
pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    products::routes_with_openapi()
        .merge(carts::routes_with_openapi())
        .merge(orders::routes_with_openapi())
}

/// The complete catalog service application.
pub fn app(state: AppState) -> Router {
    let routes = routes_with_openapi();

    let mut openapi = routes.get_openapi().clone();
    openapi.info = utoipa::openapi::InfoBuilder::new()
        .title("Minishop Catalog API")
        .version(env!("CARGO_PKG_VERSION"))
        .build();

    let cors = cors_layer(&state.config.cors);

    Router::new()
        .merge(routes)
        .route(
            "/api-docs/openapi.json",
            routing::get(move || {
                let openapi = openapi.clone();
                async move { Json(openapi) }
            }),
        )
        .fallback(|| async { AppError::UnknownRoute })
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    match &config.origins {
        None => layer.allow_origin(Any),
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!("Ignoring invalid CORS origin {origin}");
                        None
                    }
                })
                .collect();
            layer.allow_origin(AllowOrigin::list(origins))
        }
    }
}
