//! Catalog, cart and checkout service of a small shop, plus the storefront
//! gateway that renders it.
//!
//! The `minishop` binary serves the JSON API from [`routes`]; the
//! `storefront` binary serves HTML pages from [`web`] and reaches the API
//! through [`api::catalog::CatalogClient`].

pub mod api;
pub mod app_error;
pub mod app_state;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod schema;
pub mod services;
pub mod store;
pub mod validation;
pub mod web;
