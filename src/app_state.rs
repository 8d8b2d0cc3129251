use std::sync::Arc;

use crate::{config::Config, store::ShopStore};

/// State shared by every catalog service handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ShopStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn ShopStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
