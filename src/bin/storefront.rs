use anyhow::{Context, Result};
use minishop::{
    api::catalog::CatalogClient,
    bootstrap, config,
    web::{self, WebState},
};

#[tokio::main]
async fn main() -> Result<()> {
    bootstrap::init_tracing();
    bootstrap::init_env();

    let config = config::load_web()?;
    tracing::info!(
        "Using catalog service at {} (timeout {:?})",
        config.backend_url,
        config.request_timeout
    );

    let catalog = CatalogClient::new(config.backend_url.clone(), config.request_timeout)
        .context("Failed to build HTTP client")?;

    let server = config.server.clone();
    let app = web::app(WebState::new(catalog, config));

    bootstrap::serve("Storefront", app, &server).await
}
