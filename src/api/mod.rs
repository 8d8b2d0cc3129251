//! Clients for services this crate calls over HTTP.

pub mod catalog;
